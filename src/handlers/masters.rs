// src/handlers/masters.rs

use axum::{
    extract::{Path, State},
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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{MasterEditors, RequireRole},
    },
    models::master::{
        CreateMasterPayload, CreateSubMasterPayload, ExpenseMaster, ExpenseSubMaster, MasterWithSubs,
        UpdateMasterPayload, UpdateSubMasterPayload,
    },
};

// GET /api/masters
#[utoipa::path(
    get,
    path = "/api/masters",
    tag = "Masters",
    responses((status = 200, description = "Categorias ativas com seus itens", body = Vec<MasterWithSubs>)),
    security(("api_jwt" = []))
)]
pub async fn list_masters(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let masters = app_state
        .master_service
        .list_active()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(masters)))
}

// POST /api/masters
#[utoipa::path(
    post,
    path = "/api/masters",
    tag = "Masters",
    request_body = CreateMasterPayload,
    responses(
        (status = 201, description = "Categoria criada", body = ExpenseMaster),
        (status = 409, description = "Nome ou código já existem")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Json(payload): Json<CreateMasterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let master = app_state
        .master_service
        .create_master(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(master)))
}

// PUT /api/masters/{id}
#[utoipa::path(
    put,
    path = "/api/masters/{id}",
    tag = "Masters",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = UpdateMasterPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = ExpenseMaster),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMasterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let master = app_state
        .master_service
        .update_master(guard.user().actor(), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(master)))
}

// DELETE /api/masters/{id}
#[utoipa::path(
    delete,
    path = "/api/masters/{id}",
    tag = "Masters",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria e itens desativados"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .master_service
        .deactivate_master(guard.user().actor(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/masters/sub
#[utoipa::path(
    post,
    path = "/api/masters/sub",
    tag = "Masters",
    request_body = CreateSubMasterPayload,
    responses(
        (status = 201, description = "Item criado", body = ExpenseSubMaster),
        (status = 400, description = "Taxa negativa"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sub_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Json(payload): Json<CreateSubMasterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sub = app_state
        .master_service
        .create_sub_master(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sub)))
}

// PUT /api/masters/sub/{id}
#[utoipa::path(
    put,
    path = "/api/masters/sub/{id}",
    tag = "Masters",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateSubMasterPayload,
    responses(
        (status = 200, description = "Item atualizado", body = ExpenseSubMaster),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sub_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubMasterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sub = app_state
        .master_service
        .update_sub_master(guard.user().actor(), id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(sub)))
}

// DELETE /api/masters/sub/{id}
#[utoipa::path(
    delete,
    path = "/api/masters/sub/{id}",
    tag = "Masters",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item desativado"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_sub_master(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<MasterEditors>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .master_service
        .deactivate_sub_master(guard.user().actor(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
