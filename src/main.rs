//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = match AppState::new().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:?}", e);
            return Err(e);
        }
    };

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", post(handlers::users::create_user))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}", delete(handlers::users::deactivate_user));

    let visit_routes = Router::new()
        .route("/", get(handlers::visits::list_visits))
        .route("/planned", post(handlers::visits::create_planned))
        .route("/unplanned", post(handlers::visits::create_unplanned))
        .route("/{id}", get(handlers::visits::get_visit))
        .route("/{id}/check-in", post(handlers::visits::check_in))
        .route("/{id}/check-out", post(handlers::visits::check_out))
        .route("/{id}/cancel", post(handlers::visits::cancel_visit));

    let expense_routes = Router::new()
        .route(
            "/",
            post(handlers::expenses::create_expense).get(handlers::expenses::list_expenses),
        )
        .route("/{id}", get(handlers::expenses::get_expense))
        .route("/{id}/receipt", put(handlers::expenses::attach_receipt))
        .route("/{id}/approve/{stage}", post(handlers::expenses::approve_expense))
        .route("/{id}/reject/{stage}", post(handlers::expenses::reject_expense));

    let leave_routes = Router::new()
        .route(
            "/",
            post(handlers::leaves::apply_leave).get(handlers::leaves::list_leaves),
        )
        .route("/{id}", get(handlers::leaves::get_leave))
        .route("/{id}/approve/{stage}", post(handlers::leaves::approve_leave))
        .route("/{id}/reject/{stage}", post(handlers::leaves::reject_leave));

    let master_routes = Router::new()
        .route(
            "/",
            get(handlers::masters::list_masters).post(handlers::masters::create_master),
        )
        .route(
            "/{id}",
            put(handlers::masters::update_master).delete(handlers::masters::deactivate_master),
        )
        .route("/sub", post(handlers::masters::create_sub_master))
        .route(
            "/sub/{id}",
            put(handlers::masters::update_sub_master).delete(handlers::masters::deactivate_sub_master),
        );

    // Administração da tela inicial (somente admin, checado no extrator)
    let home_config_routes = Router::new()
        .route("/", get(handlers::home_config::get_config))
        .route("/role", get(handlers::home_config::get_role_config))
        .route("/quick-access", post(handlers::home_config::add_quick_access))
        .route(
            "/quick-access/{id}",
            put(handlers::home_config::update_quick_access).delete(handlers::home_config::delete_quick_access),
        )
        .route("/quick-access/{id}/toggle", patch(handlers::home_config::toggle_quick_access))
        .route("/holidays", post(handlers::home_config::add_holiday))
        .route(
            "/holidays/{id}",
            put(handlers::home_config::update_holiday).delete(handlers::home_config::delete_holiday),
        )
        .route("/holidays/{id}/toggle", patch(handlers::home_config::toggle_holiday));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::get_dashboard))
        .route("/overview", get(handlers::dashboard::get_overview))
        .route("/activities", get(handlers::dashboard::get_activities))
        .route("/home", get(handlers::dashboard::get_home))
        .nest("/config", home_config_routes);

    // Tudo abaixo de /api (exceto auth) passa pelo auth_guard
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/visits", visit_routes)
        .nest("/expenses", expense_routes)
        .nest("/leaves", leave_routes)
        .nest("/masters", master_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let server_addr = app_state.config.server_addr;

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
