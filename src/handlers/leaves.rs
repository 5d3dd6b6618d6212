// src/handlers/leaves.rs

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
        rbac::{ExecutiveOnly, LeaveApprovers, RequireRole},
    },
    models::{
        approval::{ApprovalPayload, ApprovalStage},
        leave::{ApplyLeavePayload, Leave, LeaveListQuery},
    },
};

// POST /api/leaves
#[utoipa::path(
    post,
    path = "/api/leaves",
    tag = "Leaves",
    request_body = ApplyLeavePayload,
    responses(
        (status = 201, description = "Pedido de licença registrado", body = Leave),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_leave(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExecutiveOnly>,
    Json(payload): Json<ApplyLeavePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let leave = app_state
        .leave_service
        .apply(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(leave)))
}

// GET /api/leaves
#[utoipa::path(
    get,
    path = "/api/leaves",
    tag = "Leaves",
    params(
        ("status" = Option<String>, Query, description = "Status geral do fluxo"),
        ("startDate" = Option<String>, Query, description = "Início do período (AAAA-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Fim do período, inclusivo")
    ),
    responses((status = 200, description = "Licenças visíveis para o papel", body = Vec<Leave>)),
    security(("api_jwt" = []))
)]
pub async fn list_leaves(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<LeaveListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let leaves = app_state
        .leave_service
        .list(user.actor(), query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leaves)))
}

// GET /api/leaves/{id}
#[utoipa::path(
    get,
    path = "/api/leaves/{id}",
    tag = "Leaves",
    params(("id" = Uuid, Path, description = "ID da licença")),
    responses(
        (status = 200, description = "Licença", body = Leave),
        (status = 404, description = "Licença não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_leave(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let leave = app_state
        .leave_service
        .get(user.actor(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leave)))
}

// POST /api/leaves/{id}/approve/{stage}
#[utoipa::path(
    post,
    path = "/api/leaves/{id}/approve/{stage}",
    tag = "Leaves",
    params(
        ("id" = Uuid, Path, description = "ID da licença"),
        ("stage" = String, Path, description = "manager ou hr")
    ),
    request_body = ApprovalPayload,
    responses(
        (status = 200, description = "Etapa aprovada", body = Leave),
        (status = 403, description = "Etapa fora do fluxo ou papel incorreto"),
        (status = 409, description = "Etapa anterior pendente ou fluxo finalizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_leave(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<LeaveApprovers>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let stage = ApprovalStage::parse(&stage)
        .ok_or(AppError::Forbidden)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let leave = app_state
        .leave_approvals
        .approve(id, stage, guard.user().actor(), payload.remarks)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leave)))
}

// POST /api/leaves/{id}/reject/{stage}
#[utoipa::path(
    post,
    path = "/api/leaves/{id}/reject/{stage}",
    tag = "Leaves",
    params(
        ("id" = Uuid, Path, description = "ID da licença"),
        ("stage" = String, Path, description = "manager ou hr")
    ),
    request_body = ApprovalPayload,
    responses(
        (status = 200, description = "Licença rejeitada", body = Leave),
        (status = 403, description = "Etapa fora do fluxo ou papel incorreto"),
        (status = 409, description = "Fluxo já finalizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_leave(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<LeaveApprovers>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let stage = ApprovalStage::parse(&stage)
        .ok_or(AppError::Forbidden)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let leave = app_state
        .leave_approvals
        .reject(id, stage, guard.user().actor(), payload.remarks)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leave)))
}
