// src/db/dashboard_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, time::{MonthWindow, TimeWindow}},
    db::{DashboardStore, OwnerScope, VisitScope},
    models::{
        activity::ActivityLog,
        approval::{ApprovalStage, WorkflowStatus},
        dashboard::{ExpenseTally, LastVisit, LeaveTally, MonthlyExpense, VisitTally},
    },
};

// Consultas de leitura dos agregadores. Cada métrica é uma consulta independente,
// sem transação englobando as demais.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Etapa ainda pendente dentro da lista JSONB de aprovações
const PENDING_STAGE_FILTER: &str = r#"
    ($3::text IS NULL OR EXISTS (
        SELECT 1 FROM jsonb_array_elements(approvals) AS a
        WHERE a->>'stage' = $3 AND a->>'status' = 'pending'
    ))
"#;

#[async_trait]
impl DashboardStore for DashboardRepository {
    async fn expense_totals(&self, executive_id: Uuid, month: &MonthWindow) -> Result<MonthlyExpense, AppError> {
        let totals = sqlx::query_as::<_, MonthlyExpense>(
            r#"
            SELECT COALESCE(SUM(actual_amount), 0) AS amount, COUNT(*) AS count
            FROM expenses
            WHERE executive_id = $1 AND expense_date BETWEEN $2 AND $3
            "#,
        )
        .bind(executive_id)
        .bind(month.first_day)
        .bind(month.last_day)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn last_active_visit(&self, executive_id: Uuid) -> Result<Option<LastVisit>, AppError> {
        let visit = sqlx::query_as::<_, LastVisit>(
            r#"
            SELECT from_address, to_address, purpose, check_in_time, status
            FROM visits
            WHERE executive_id = $1 AND status IN ('in-progress', 'completed')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(executive_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(visit)
    }

    async fn check_in_times(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Vec<DateTime<Utc>>, AppError> {
        let times = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT check_in_time FROM visits
            WHERE executive_id = $1
              AND check_in_time IS NOT NULL
              AND check_in_time >= $2 AND check_in_time < $3
            "#,
        )
        .bind(executive_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(times)
    }

    async fn first_check_in(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Option<DateTime<Utc>>, AppError> {
        let time = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT check_in_time FROM visits
            WHERE executive_id = $1
              AND check_in_time >= $2 AND check_in_time < $3
            ORDER BY check_in_time ASC
            LIMIT 1
            "#,
        )
        .bind(executive_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.pool)
        .await?;
        Ok(time)
    }

    async fn visit_tally(&self, scope: VisitScope, window: &TimeWindow) -> Result<VisitTally, AppError> {
        let (executive_id, manager_id) = match scope {
            VisitScope::Executive(id) => (Some(id), None),
            VisitScope::Manager(id) => (None, Some(id)),
            VisitScope::Everyone => (None, None),
        };

        let tally = sqlx::query_as::<_, VisitTally>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress
            FROM visits
            WHERE ($1::uuid IS NULL OR executive_id = $1)
              AND ($2::uuid IS NULL OR manager_id = $2)
              AND created_at >= $3 AND created_at < $4
            "#,
        )
        .bind(executive_id)
        .bind(manager_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(tally)
    }

    async fn expense_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<ExpenseTally, AppError> {
        let tally = sqlx::query_as::<_, ExpenseTally>(
            r#"
            SELECT
                COUNT(*) AS count,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_count,
                COALESCE(SUM(actual_amount), 0) AS total_amount,
                COALESCE(SUM(actual_amount) FILTER (WHERE status = 'pending'), 0) AS pending_amount,
                COALESCE(SUM(actual_amount) FILTER (WHERE status IN ('finance_approved', 'hr_approved')), 0) AS cleared_amount,
                COALESCE(SUM(actual_amount) FILTER (WHERE status = 'hr_approved'), 0) AS approved_amount
            FROM expenses
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND expense_date BETWEEN $2 AND $3
            "#,
        )
        .bind(scope.as_filter())
        .bind(month.first_day)
        .bind(month.last_day)
        .fetch_one(&self.pool)
        .await?;
        Ok(tally)
    }

    async fn leave_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<LeaveTally, AppError> {
        let tally = sqlx::query_as::<_, LeaveTally>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'hr_approved') AS approved
            FROM leaves
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND from_date BETWEEN $2 AND $3
            "#,
        )
        .bind(scope.as_filter())
        .bind(month.first_day)
        .bind(month.last_day)
        .fetch_one(&self.pool)
        .await?;
        Ok(tally)
    }

    async fn count_expenses_awaiting(
        &self,
        scope: &OwnerScope,
        status: Option<WorkflowStatus>,
        pending_stage: Option<ApprovalStage>,
    ) -> Result<i64, AppError> {
        let sql = format!(
            r#"
            SELECT COUNT(*) FROM expenses
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND ($2::workflow_status IS NULL OR status = $2)
              AND {PENDING_STAGE_FILTER}
            "#
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.as_filter())
            .bind(status)
            .bind(pending_stage.map(|s| s.as_str()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_leaves_awaiting(
        &self,
        scope: &OwnerScope,
        status: Option<WorkflowStatus>,
        pending_stage: Option<ApprovalStage>,
    ) -> Result<i64, AppError> {
        let sql = format!(
            r#"
            SELECT COUNT(*) FROM leaves
            WHERE ($1::uuid[] IS NULL OR executive_id = ANY($1))
              AND ($2::workflow_status IS NULL OR status = $2)
              AND {PENDING_STAGE_FILTER}
            "#
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.as_filter())
            .bind(status)
            .bind(pending_stage.map(|s| s.as_str()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn active_subordinates(&self, manager_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE manager_id = $1 AND is_active",
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn count_active_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn recent_activities(&self, user_id: Uuid, since: DateTime<Utc>, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let rows = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT * FROM activity_logs
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
