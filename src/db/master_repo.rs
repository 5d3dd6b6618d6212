// src/db/master_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::master::{ExpenseMaster, ExpenseSubMaster, RateUnit, UpdateMasterPayload, UpdateSubMasterPayload},
};

#[derive(Clone)]
pub struct MasterRepository {
    pool: PgPool,
}

// Nome e código de categoria são únicos
fn map_unique(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.contains("code") => AppError::UniqueConstraintViolation("code"),
                _ => AppError::UniqueConstraintViolation("name"),
            };
        }
    }
    AppError::StoreUnavailable(e)
}

impl MasterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn create_master(&self, name: &str, code: &str, created_by: Uuid) -> Result<ExpenseMaster, AppError> {
        sqlx::query_as::<_, ExpenseMaster>(
            "INSERT INTO expense_masters (name, code, created_by) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(code)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)
    }

    pub async fn list_masters(&self, only_active: bool) -> Result<Vec<ExpenseMaster>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseMaster>(
            "SELECT * FROM expense_masters WHERE (NOT $1 OR is_active) ORDER BY name",
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_master(&self, id: Uuid) -> Result<Option<ExpenseMaster>, AppError> {
        let row = sqlx::query_as::<_, ExpenseMaster>("SELECT * FROM expense_masters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // Campos ausentes mantêm o valor atual
    pub async fn update_master(
        &self,
        id: Uuid,
        changes: &UpdateMasterPayload,
        code: Option<String>,
    ) -> Result<Option<ExpenseMaster>, AppError> {
        sqlx::query_as::<_, ExpenseMaster>(
            r#"
            UPDATE expense_masters
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(code)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)
    }

    // Desativação lógica: despesas antigas continuam apontando para a categoria
    pub async fn deactivate_master(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE expense_masters SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE expense_sub_masters SET is_active = FALSE, updated_at = NOW() WHERE master_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ITENS (SUB-MASTERS)
    // =========================================================================

    pub async fn create_sub_master(
        &self,
        master_id: Uuid,
        name: &str,
        rate: Decimal,
        unit: RateUnit,
        created_by: Uuid,
    ) -> Result<ExpenseSubMaster, AppError> {
        let row = sqlx::query_as::<_, ExpenseSubMaster>(
            r#"
            INSERT INTO expense_sub_masters (master_id, name, rate, unit, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(master_id)
        .bind(name)
        .bind(rate)
        .bind(unit)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_sub_masters(
        &self,
        master_id: Option<Uuid>,
        only_active: bool,
    ) -> Result<Vec<ExpenseSubMaster>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseSubMaster>(
            r#"
            SELECT * FROM expense_sub_masters
            WHERE ($1::uuid IS NULL OR master_id = $1)
              AND (NOT $2 OR is_active)
            ORDER BY name
            "#,
        )
        .bind(master_id)
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_sub_master(&self, id: Uuid) -> Result<Option<ExpenseSubMaster>, AppError> {
        let row = sqlx::query_as::<_, ExpenseSubMaster>("SELECT * FROM expense_sub_masters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update_sub_master(
        &self,
        id: Uuid,
        changes: &UpdateSubMasterPayload,
    ) -> Result<Option<ExpenseSubMaster>, AppError> {
        let row = sqlx::query_as::<_, ExpenseSubMaster>(
            r#"
            UPDATE expense_sub_masters
            SET name = COALESCE($2, name),
                rate = COALESCE($3, rate),
                unit = COALESCE($4, unit),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.rate)
        .bind(changes.unit)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn deactivate_sub_master(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE expense_sub_masters SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
