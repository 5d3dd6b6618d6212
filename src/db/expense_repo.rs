// src/db/expense_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApprovalStore, OwnerScope},
    models::{
        approval::{Workflow, WorkflowStatus},
        expense::{Expense, ExpenseRow, NewExpense},
    },
};

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, e: &NewExpense) -> Result<Expense, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (
                visit_id, executive_id, master_id, sub_master_id,
                quantity, calculated_amount, actual_amount,
                description, expense_date, status, approvals
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(e.visit_id)
        .bind(e.executive_id)
        .bind(e.master_id)
        .bind(e.sub_master_id)
        .bind(e.quantity)
        .bind(e.calculated_amount)
        .bind(e.actual_amount)
        .bind(&e.description)
        .bind(e.expense_date)
        .bind(WorkflowStatus::Pending)
        .bind(Json(&e.approvals))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Expense::from))
    }

    pub async fn list(
        &self,
        scope: &OwnerScope,
        visit_id: Option<Uuid>,
        status: Option<WorkflowStatus>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Expense>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT * FROM expenses
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND ($2::uuid IS NULL OR visit_id = $2)
              AND ($3::workflow_status IS NULL OR status = $3)
              AND ($4::date IS NULL OR expense_date >= $4)
              AND ($5::date IS NULL OR expense_date <= $5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(scope.as_filter())
        .bind(visit_id)
        .bind(status)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Expense::from).collect())
    }

    pub async fn set_receipt(&self, id: Uuid, path: &str) -> Result<Option<Expense>, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            "UPDATE expenses SET receipt_image = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Expense::from))
    }
}

#[async_trait]
impl ApprovalStore for ExpenseRepository {
    type Record = Expense;

    async fn find_workflow(&self, id: Uuid) -> Result<Option<Workflow>, AppError> {
        Ok(self.find_by_id(id).await?.map(|e| e.workflow()))
    }

    async fn commit_workflow(
        &self,
        id: Uuid,
        expected: WorkflowStatus,
        workflow: &Workflow,
    ) -> Result<Option<Expense>, AppError> {
        // Concorrência otimista: só grava se ninguém mudou o status desde a leitura
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            UPDATE expenses
            SET status = $3, approvals = $4, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(workflow.status)
        .bind(Json(&workflow.approvals))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Expense::from))
    }
}
