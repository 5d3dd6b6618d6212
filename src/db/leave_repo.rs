// src/db/leave_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApprovalStore, OwnerScope},
    models::{
        approval::{Workflow, WorkflowStatus},
        leave::{Leave, LeaveRow, NewLeave},
    },
};

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, l: &NewLeave) -> Result<Leave, AppError> {
        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            INSERT INTO leaves (
                executive_id, leave_type, from_date, to_date, number_of_days, reason,
                status, approvals
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(l.executive_id)
        .bind(&l.leave_type)
        .bind(l.from_date)
        .bind(l.to_date)
        .bind(l.number_of_days)
        .bind(&l.reason)
        .bind(WorkflowStatus::Pending)
        .bind(Json(&l.approvals))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Leave>, AppError> {
        let row = sqlx::query_as::<_, LeaveRow>("SELECT * FROM leaves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Leave::from))
    }

    // Filtro de período aplicado sobre a data de início
    pub async fn list(
        &self,
        scope: &OwnerScope,
        status: Option<WorkflowStatus>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Leave>, AppError> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT * FROM leaves
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND ($2::workflow_status IS NULL OR status = $2)
              AND ($3::date IS NULL OR from_date >= $3)
              AND ($4::date IS NULL OR from_date <= $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(scope.as_filter())
        .bind(status)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Leave::from).collect())
    }
}

#[async_trait]
impl ApprovalStore for LeaveRepository {
    type Record = Leave;

    async fn find_workflow(&self, id: Uuid) -> Result<Option<Workflow>, AppError> {
        Ok(self.find_by_id(id).await?.map(|l| l.workflow()))
    }

    async fn commit_workflow(
        &self,
        id: Uuid,
        expected: WorkflowStatus,
        workflow: &Workflow,
    ) -> Result<Option<Leave>, AppError> {
        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            UPDATE leaves
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

        Ok(row.map(Leave::from))
    }
}
