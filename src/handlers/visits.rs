// src/handlers/visits.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{ExecutiveOnly, RequireRole, VisitPlanners},
    },
    models::visit::{
        CancelVisitPayload, CheckPayload, CreatePlannedVisitPayload, CreateUnplannedVisitPayload, Visit,
        VisitListQuery,
    },
};

// POST /api/visits/planned
#[utoipa::path(
    post,
    path = "/api/visits/planned",
    tag = "Visits",
    request_body = CreatePlannedVisitPayload,
    responses(
        (status = 201, description = "Visita planejada criada (já aprovada)", body = Visit),
        (status = 400, description = "Executivo inválido"),
        (status = 403, description = "Apenas gerentes ou admins")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_planned(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<VisitPlanners>,
    Json(payload): Json<CreatePlannedVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .create_planned(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(visit)))
}

// POST /api/visits/unplanned
#[utoipa::path(
    post,
    path = "/api/visits/unplanned",
    tag = "Visits",
    request_body = CreateUnplannedVisitPayload,
    responses(
        (status = 201, description = "Visita não planejada criada", body = Visit),
        (status = 403, description = "Apenas executivos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_unplanned(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExecutiveOnly>,
    Json(payload): Json<CreateUnplannedVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .create_unplanned(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(visit)))
}

// GET /api/visits
#[utoipa::path(
    get,
    path = "/api/visits",
    tag = "Visits",
    params(
        ("fromDate" = Option<String>, Query, description = "Data planejada inicial (AAAA-MM-DD)"),
        ("toDate" = Option<String>, Query, description = "Data planejada final, inclusiva")
    ),
    responses((status = 200, description = "Visitas visíveis para o papel", body = Vec<Visit>)),
    security(("api_jwt" = []))
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<VisitListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let visits = app_state
        .visit_service
        .list(user.actor(), query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visits)))
}

// GET /api/visits/{id}
#[utoipa::path(
    get,
    path = "/api/visits/{id}",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita", body = Visit),
        (status = 404, description = "Visita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .get(user.actor(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// POST /api/visits/{id}/check-in
#[utoipa::path(
    post,
    path = "/api/visits/{id}/check-in",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    request_body = CheckPayload,
    responses(
        (status = 200, description = "Check-in realizado", body = Visit),
        (status = 403, description = "Visita de outro executivo"),
        (status = 409, description = "Check-in já realizado ou visita cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .check_in(user.actor(), id, payload.location)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// POST /api/visits/{id}/check-out
#[utoipa::path(
    post,
    path = "/api/visits/{id}/check-out",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    request_body = CheckPayload,
    responses(
        (status = 200, description = "Check-out realizado", body = Visit),
        (status = 409, description = "Sem check-in ou check-out já realizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .check_out(user.actor(), id, payload.location)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// POST /api/visits/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/visits/{id}/cancel",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    request_body = CancelVisitPayload,
    responses(
        (status = 200, description = "Visita cancelada", body = Visit),
        (status = 409, description = "Visita já cancelada ou concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .cancel(user.actor(), id, payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}
