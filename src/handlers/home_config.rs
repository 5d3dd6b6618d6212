// src/handlers/home_config.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        auth::UserRole,
        dashboard::{AdminHomeConfig, RoleConfigQuery, RoleConfigResponse},
        home::{HolidayPayload, HomeConfig, QuickAccessPayload, UpdateHolidayPayload, UpdateQuickAccessPayload},
    },
    services::home_service::{self, role_config},
};

// GET /api/dashboard/config
#[utoipa::path(
    get,
    path = "/api/dashboard/config",
    tag = "Home Config",
    responses(
        (status = 200, description = "Configuração completa, incluindo itens inativos", body = AdminHomeConfig),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let data = app_state
        .home_service
        .get_config()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(AdminHomeConfig {
            data,
            config: role_config(UserRole::Admin),
        }),
    ))
}

// GET /api/dashboard/config/role
#[utoipa::path(
    get,
    path = "/api/dashboard/config/role",
    tag = "Home Config",
    params(("role" = Option<String>, Query, description = "Papel consultado; padrão é o do próprio usuário")),
    responses(
        (status = 200, description = "Widgets, permissões e seções do papel", body = RoleConfigResponse),
        (status = 403, description = "Papel desconhecido ou usuário não admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role_config(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Query(query): Query<RoleConfigQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = match query.role.as_deref() {
        Some(raw) => UserRole::parse(raw)
            .ok_or(AppError::Forbidden)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        None => guard.user().0.role,
    };

    Ok((
        StatusCode::OK,
        Json(RoleConfigResponse {
            role,
            config: role_config(role),
        }),
    ))
}

// POST /api/dashboard/config/quick-access
#[utoipa::path(
    post,
    path = "/api/dashboard/config/quick-access",
    tag = "Home Config",
    request_body = QuickAccessPayload,
    responses((status = 201, description = "Atalho adicionado", body = HomeConfig)),
    security(("api_jwt" = []))
)]
pub async fn add_quick_access(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Json(payload): Json<QuickAccessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let config = app_state
        .home_service
        .modify(guard.user().actor(), "QUICK_ACCESS_ADDED", |config| {
            home_service::add_quick_access(config, payload);
            Ok(())
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(config)))
}

// PUT /api/dashboard/config/quick-access/{id}
#[utoipa::path(
    put,
    path = "/api/dashboard/config/quick-access/{id}",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do atalho")),
    request_body = UpdateQuickAccessPayload,
    responses(
        (status = 200, description = "Atalho atualizado", body = HomeConfig),
        (status = 404, description = "Atalho não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quick_access(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuickAccessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "QUICK_ACCESS_UPDATED", |config| {
            home_service::update_quick_access(config, id, payload)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// PATCH /api/dashboard/config/quick-access/{id}/toggle
#[utoipa::path(
    patch,
    path = "/api/dashboard/config/quick-access/{id}/toggle",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do atalho")),
    responses(
        (status = 200, description = "Atalho ativado/desativado", body = HomeConfig),
        (status = 404, description = "Atalho não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_quick_access(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "QUICK_ACCESS_TOGGLED", |config| {
            home_service::toggle_quick_access(config, id)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// DELETE /api/dashboard/config/quick-access/{id}
#[utoipa::path(
    delete,
    path = "/api/dashboard/config/quick-access/{id}",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do atalho")),
    responses(
        (status = 200, description = "Atalho removido", body = HomeConfig),
        (status = 404, description = "Atalho não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quick_access(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "QUICK_ACCESS_DELETED", |config| {
            home_service::delete_quick_access(config, id)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// POST /api/dashboard/config/holidays
#[utoipa::path(
    post,
    path = "/api/dashboard/config/holidays",
    tag = "Home Config",
    request_body = HolidayPayload,
    responses((status = 201, description = "Feriado adicionado", body = HomeConfig)),
    security(("api_jwt" = []))
)]
pub async fn add_holiday(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Json(payload): Json<HolidayPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let config = app_state
        .home_service
        .modify(guard.user().actor(), "HOLIDAY_ADDED", |config| {
            home_service::add_holiday(config, payload);
            Ok(())
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(config)))
}

// PUT /api/dashboard/config/holidays/{id}
#[utoipa::path(
    put,
    path = "/api/dashboard/config/holidays/{id}",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do feriado")),
    request_body = UpdateHolidayPayload,
    responses(
        (status = 200, description = "Feriado atualizado", body = HomeConfig),
        (status = 404, description = "Feriado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_holiday(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHolidayPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "HOLIDAY_UPDATED", |config| {
            home_service::update_holiday(config, id, payload)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// PATCH /api/dashboard/config/holidays/{id}/toggle
#[utoipa::path(
    patch,
    path = "/api/dashboard/config/holidays/{id}/toggle",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do feriado")),
    responses(
        (status = 200, description = "Feriado ativado/desativado", body = HomeConfig),
        (status = 404, description = "Feriado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_holiday(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "HOLIDAY_TOGGLED", |config| {
            home_service::toggle_holiday(config, id)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// DELETE /api/dashboard/config/holidays/{id}
#[utoipa::path(
    delete,
    path = "/api/dashboard/config/holidays/{id}",
    tag = "Home Config",
    params(("id" = Uuid, Path, description = "ID do feriado")),
    responses(
        (status = 200, description = "Feriado removido", body = HomeConfig),
        (status = 404, description = "Feriado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_holiday(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .home_service
        .modify(guard.user().actor(), "HOLIDAY_DELETED", |config| {
            home_service::delete_holiday(config, id)
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}
