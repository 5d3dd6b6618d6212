// src/db/visit_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::VisitScope,
    models::visit::{GeoPoint, NewVisit, Visit, VisitRow, VisitStatus},
};

#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, v: &NewVisit) -> Result<Visit, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO visits (
                visit_type, executive_id, manager_id, planned_date, approved_by, approved_at,
                from_address, to_address, from_lat, from_lng, to_lat, to_lng,
                purpose, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(v.visit_type)
        .bind(v.executive_id)
        .bind(v.manager_id)
        .bind(v.planned_date)
        .bind(v.approved_by)
        .bind(v.approved_at)
        .bind(&v.from_address)
        .bind(&v.to_address)
        .bind(v.from_location.map(|p| p.lat))
        .bind(v.from_location.map(|p| p.lng))
        .bind(v.to_location.map(|p| p.lat))
        .bind(v.to_location.map(|p| p.lng))
        .bind(&v.purpose)
        .bind(v.status)
        .bind(&v.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Visit>, AppError> {
        let row = sqlx::query_as::<_, VisitRow>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Visit::from))
    }

    // Lista por escopo, com filtro opcional de data planejada (fim inclusivo)
    pub async fn list(
        &self,
        scope: VisitScope,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Result<Vec<Visit>, AppError> {
        let (executive_id, manager_id) = match scope {
            VisitScope::Executive(id) => (Some(id), None),
            VisitScope::Manager(id) => (None, Some(id)),
            VisitScope::Everyone => (None, None),
        };

        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT * FROM visits
            WHERE ($1::uuid IS NULL OR executive_id = $1)
              AND ($2::uuid IS NULL OR manager_id = $2)
              AND ($3::date IS NULL OR planned_date >= $3)
              AND ($4::date IS NULL OR planned_date <= $4)
            ORDER BY planned_date DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(executive_id)
        .bind(manager_id)
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }

    // Cada UPDATE confere o estado esperado para não sobrescrever uma mudança concorrente
    pub async fn check_in(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> Result<Option<Visit>, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            UPDATE visits
            SET check_in_time = $2, check_in_lat = $3, check_in_lng = $4,
                status = $5, updated_at = NOW()
            WHERE id = $1 AND check_in_time IS NULL AND status IN ('pending', 'approved')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(location.map(|p| p.lat))
        .bind(location.map(|p| p.lng))
        .bind(VisitStatus::InProgress)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Visit::from))
    }

    pub async fn check_out(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> Result<Option<Visit>, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            UPDATE visits
            SET check_out_time = $2, check_out_lat = $3, check_out_lng = $4,
                status = $5, updated_at = NOW()
            WHERE id = $1 AND check_in_time IS NOT NULL AND check_out_time IS NULL
              AND status = 'in-progress'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(location.map(|p| p.lat))
        .bind(location.map(|p| p.lng))
        .bind(VisitStatus::Completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Visit::from))
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        cancelled_by: Uuid,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Visit>, AppError> {
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            UPDATE visits
            SET status = $2, cancel_reason = $3, cancelled_by = $4, cancelled_at = $5,
                updated_at = NOW()
            WHERE id = $1 AND status NOT IN ('cancelled', 'completed')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(VisitStatus::Cancelled)
        .bind(reason)
        .bind(cancelled_by)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Visit::from))
    }
}
