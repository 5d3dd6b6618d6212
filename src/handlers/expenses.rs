// src/handlers/expenses.rs

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
        rbac::{ExecutiveOnly, ExpenseApprovers, RequireRole},
    },
    models::{
        approval::{ApprovalPayload, ApprovalStage},
        expense::{AttachReceiptPayload, CreateExpensePayload, Expense, ExpenseListQuery, ExpenseListResponse},
    },
};

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada com aprovações pendentes", body = Expense),
        (status = 400, description = "Quantidade ou item de despesa inválido"),
        (status = 403, description = "Visita de outro executivo"),
        (status = 404, description = "Visita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExecutiveOnly>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .create(guard.user().actor(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// PUT /api/expenses/{id}/receipt
#[utoipa::path(
    put,
    path = "/api/expenses/{id}/receipt",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = AttachReceiptPayload,
    responses(
        (status = 200, description = "Recibo anexado", body = Expense),
        (status = 400, description = "Nome de arquivo inválido"),
        (status = 403, description = "Despesa de outro executivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExecutiveOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachReceiptPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_service
        .attach_receipt(guard.user().actor(), id, &payload.file_name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(
        ("visitId" = Option<Uuid>, Query, description = "Filtra por visita"),
        ("status" = Option<String>, Query, description = "Status geral do fluxo"),
        ("startDate" = Option<String>, Query, description = "Data da despesa inicial (AAAA-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Data da despesa final, inclusiva")
    ),
    responses((status = 200, description = "Despesas visíveis com total", body = ExpenseListResponse)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ExpenseListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .expense_service
        .list(user.actor(), query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/expenses/{id}
#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Despesa", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let expense = app_state
        .expense_service
        .get(user.actor(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/approve/{stage}
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/approve/{stage}",
    tag = "Expenses",
    params(
        ("id" = Uuid, Path, description = "ID da despesa"),
        ("stage" = String, Path, description = "manager, finance ou hr")
    ),
    request_body = ApprovalPayload,
    responses(
        (status = 200, description = "Etapa aprovada", body = Expense),
        (status = 403, description = "Papel não corresponde à etapa"),
        (status = 409, description = "Etapa anterior pendente ou fluxo finalizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExpenseApprovers>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let stage = ApprovalStage::parse(&stage)
        .ok_or(AppError::Forbidden)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_approvals
        .approve(id, stage, guard.user().actor(), payload.remarks)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}

// POST /api/expenses/{id}/reject/{stage}
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/reject/{stage}",
    tag = "Expenses",
    params(
        ("id" = Uuid, Path, description = "ID da despesa"),
        ("stage" = String, Path, description = "manager, finance ou hr")
    ),
    request_body = ApprovalPayload,
    responses(
        (status = 200, description = "Despesa rejeitada", body = Expense),
        (status = 403, description = "Papel não corresponde à etapa"),
        (status = 409, description = "Fluxo já finalizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<ExpenseApprovers>,
    Path((id, stage)): Path<(Uuid, String)>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let stage = ApprovalStage::parse(&stage)
        .ok_or(AppError::Forbidden)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let expense = app_state
        .expense_approvals
        .reject(id, stage, guard.user().actor(), payload.remarks)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(expense)))
}
