// src/db/activity_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ActivitySink,
    models::activity::NewActivity,
};

// Trilha de auditoria: somente inserção. A leitura fica no DashboardRepository
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for ActivityRepository {
    async fn append(&self, entry: NewActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, activity_type, entity_type, entity_id, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.activity_type)
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id)
        .bind(&entry.description)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
