// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        activity::ActivityLog,
        dashboard::{HomeScreen, QuickOverview, RoleDashboardData},
    },
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Resumo mensal do papel do usuário", body = RoleDashboardData),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let data = app_state
        .dashboard_service
        .compute(user.0.id, user.0.role, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(data)))
}

// GET /api/dashboard/overview
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "Dashboard",
    responses((status = 200, description = "Visão rápida do mês corrente", body = QuickOverview)),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .overview_service
        .compute(user.0.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/dashboard/activities
#[utoipa::path(
    get,
    path = "/api/dashboard/activities",
    tag = "Dashboard",
    responses((status = 200, description = "Atividades dos últimos 7 dias", body = Vec<ActivityLog>)),
    security(("api_jwt" = []))
)]
pub async fn get_activities(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let activities = app_state
        .dashboard_service
        .recent_activities(user.0.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(activities)))
}

// GET /api/dashboard/home
#[utoipa::path(
    get,
    path = "/api/dashboard/home",
    tag = "Dashboard",
    responses((status = 200, description = "Tela inicial montada para o usuário", body = HomeScreen)),
    security(("api_jwt" = []))
)]
pub async fn get_home(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let AuthenticatedUser(user) = user;

    let screen = app_state
        .home_service
        .home_screen(user, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(screen)))
}
