// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ActivityRepository, DashboardRepository, ExpenseRepository, HomeConfigRepository, LeaveRepository,
        MasterRepository, UserRepository, VisitRepository,
    },
    services::{
        activity_service::ActivityLogService,
        approval::{ApprovalService, EXPENSE_PIPELINE, LEAVE_PIPELINE},
        auth::AuthService,
        dashboard_service::DashboardService,
        expense_service::ExpenseService,
        home_service::HomeService,
        leave_service::LeaveService,
        master_service::MasterService,
        overview_service::OverviewService,
        visit_service::VisitService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_UPLOAD_BASE_PATH: &str = "/uploads";

// Configuração lida do ambiente (.env é opcional)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: SocketAddr,
    pub max_connections: u32,
    pub business_offset: FixedOffset,
    pub upload_base_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let server_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_owned())
            .parse()
            .context("SERVER_ADDR inválido")?;

        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS inválido")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let offset_minutes = match env::var("BUSINESS_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw.parse().context("BUSINESS_UTC_OFFSET_MINUTES inválido")?,
            Err(_) => 0,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            max_connections,
            business_offset: business_offset(offset_minutes)?,
            upload_base_path: env::var("UPLOAD_BASE_PATH").unwrap_or_else(|_| DEFAULT_UPLOAD_BASE_PATH.to_owned()),
        })
    }
}

/// Fuso do negócio em minutos a leste de UTC (ex.: 330 para IST).
pub fn business_offset(minutes: i32) -> anyhow::Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("offset fora do intervalo: {minutes} minutos"))
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub config: AppConfig,
    pub auth_service: AuthService,
    pub visit_service: VisitService,
    pub expense_service: ExpenseService,
    pub expense_approvals: ApprovalService<ExpenseRepository>,
    pub leave_service: LeaveService,
    pub leave_approvals: ApprovalService<LeaveRepository>,
    pub master_service: MasterService,
    pub overview_service: OverviewService,
    pub dashboard_service: DashboardService,
    pub home_service: HomeService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = AppConfig::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let visit_repo = VisitRepository::new(db_pool.clone());
        let expense_repo = ExpenseRepository::new(db_pool.clone());
        let leave_repo = LeaveRepository::new(db_pool.clone());
        let master_repo = MasterRepository::new(db_pool.clone());
        let dashboard_store = Arc::new(DashboardRepository::new(db_pool.clone()));

        let activity = ActivityLogService::new(Arc::new(ActivityRepository::new(db_pool.clone())));
        let offset = config.business_offset;

        let auth_service = AuthService::new(user_repo.clone(), activity.clone(), config.jwt_secret.clone());
        let visit_service = VisitService::new(visit_repo.clone(), user_repo.clone(), activity.clone());
        let expense_service = ExpenseService::new(
            expense_repo.clone(),
            visit_repo,
            master_repo.clone(),
            user_repo.clone(),
            activity.clone(),
            config.upload_base_path.clone(),
        );
        let expense_approvals = ApprovalService::new(expense_repo, &EXPENSE_PIPELINE, activity.clone());
        let leave_service = LeaveService::new(leave_repo.clone(), user_repo, activity.clone());
        let leave_approvals = ApprovalService::new(leave_repo, &LEAVE_PIPELINE, activity.clone());
        let master_service = MasterService::new(master_repo, activity.clone());

        let overview_service = OverviewService::new(dashboard_store.clone(), offset);
        let dashboard_service = DashboardService::new(dashboard_store, offset);
        let home_service = HomeService::new(
            Arc::new(HomeConfigRepository::new(db_pool.clone())),
            overview_service.clone(),
            activity,
            offset,
        );

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            config,
            auth_service,
            visit_service,
            expense_service,
            expense_approvals,
            leave_service,
            leave_approvals,
            master_service,
            overview_service,
            dashboard_service,
            home_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_in_minutes_east_of_utc() {
        assert_eq!(business_offset(330).unwrap().local_minus_utc(), 330 * 60);
        assert_eq!(business_offset(-180).unwrap().local_minus_utc(), -180 * 60);
    }

    #[test]
    fn offset_beyond_a_day_is_rejected() {
        assert!(business_offset(24 * 60).is_err());
    }
}
