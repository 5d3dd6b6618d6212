// src/db/home_config_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use crate::{
    common::error::AppError,
    db::HomeConfigStore,
    models::home::{HomeConfig, HomeConfigRow},
};

#[derive(Clone)]
pub struct HomeConfigRepository {
    pool: PgPool,
}

impl HomeConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HomeConfigStore for HomeConfigRepository {
    // Busca a configuração; cria a linha vazia na primeira leitura
    async fn load_or_create(&self) -> Result<HomeConfig, AppError> {
        sqlx::query("INSERT INTO home_config (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, HomeConfigRow>("SELECT * FROM home_config WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    // Grava o agregado inteiro numa única escrita, condicionada ao updated_at lido
    async fn save_if_unchanged(
        &self,
        config: &HomeConfig,
        expected: Option<DateTime<Utc>>,
    ) -> Result<Option<HomeConfig>, AppError> {
        let row = sqlx::query_as::<_, HomeConfigRow>(
            r#"
            UPDATE home_config SET
                quick_access = $1,
                upcoming_holidays = $2,
                updated_at = clock_timestamp()
            WHERE id = 1 AND ($3::timestamptz IS NULL OR updated_at = $3)
            RETURNING *
            "#,
        )
        .bind(Json(&config.quick_access))
        .bind(Json(&config.upcoming_holidays))
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
