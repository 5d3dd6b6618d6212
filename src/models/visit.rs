// src/models/visit.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "visit_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitType {
    Planned,
    Unplanned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "visit_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum VisitStatus {
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

// Ponto geográfico simples (lat/lng)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[schema(example = 19.0760)]
    pub lat: f64,
    #[schema(example = 72.8777)]
    pub lng: f64,
}

impl GeoPoint {
    pub fn from_columns(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

// Linha crua da tabela `visits`
#[derive(Debug, Clone, FromRow)]
pub struct VisitRow {
    pub id: Uuid,
    pub visit_type: VisitType,
    pub executive_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub planned_date: Option<NaiveDate>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub from_address: String,
    pub to_address: String,
    pub from_lat: Option<f64>,
    pub from_lng: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lng: Option<f64>,
    pub purpose: String,
    pub status: VisitStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub cancel_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub visit_type: VisitType,
    pub executive_id: Uuid,
    pub manager_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub planned_date: Option<NaiveDate>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub from_address: String,
    pub to_address: String,
    pub from_location: Option<GeoPoint>,
    pub to_location: Option<GeoPoint>,
    pub purpose: String,
    pub status: VisitStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_in_location: Option<GeoPoint>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_location: Option<GeoPoint>,
    pub cancel_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(r: VisitRow) -> Self {
        Self {
            id: r.id,
            visit_type: r.visit_type,
            executive_id: r.executive_id,
            manager_id: r.manager_id,
            planned_date: r.planned_date,
            approved_by: r.approved_by,
            approved_at: r.approved_at,
            from_location: GeoPoint::from_columns(r.from_lat, r.from_lng),
            to_location: GeoPoint::from_columns(r.to_lat, r.to_lng),
            from_address: r.from_address,
            to_address: r.to_address,
            purpose: r.purpose,
            status: r.status,
            check_in_time: r.check_in_time,
            check_in_location: GeoPoint::from_columns(r.check_in_lat, r.check_in_lng),
            check_out_time: r.check_out_time,
            check_out_location: GeoPoint::from_columns(r.check_out_lat, r.check_out_lng),
            cancel_reason: r.cancel_reason,
            cancelled_by: r.cancelled_by,
            cancelled_at: r.cancelled_at,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl Visit {
    /// Regras de check-in: uma única vez e nunca em visita cancelada ou concluída.
    pub fn can_check_in(&self) -> Result<(), &'static str> {
        if self.check_in_time.is_some() {
            return Err("already_checked_in");
        }
        match self.status {
            VisitStatus::Cancelled => Err("visit_cancelled"),
            VisitStatus::Completed => Err("already_checked_out"),
            _ => Ok(()),
        }
    }

    pub fn can_check_out(&self) -> Result<(), &'static str> {
        if self.status == VisitStatus::Cancelled {
            return Err("visit_cancelled");
        }
        if self.check_in_time.is_none() {
            return Err("check_in_required");
        }
        if self.check_out_time.is_some() {
            return Err("already_checked_out");
        }
        Ok(())
    }

    pub fn can_cancel(&self) -> Result<(), &'static str> {
        match self.status {
            VisitStatus::Cancelled => Err("visit_already_cancelled"),
            VisitStatus::Completed => Err("visit_completed"),
            _ => Ok(()),
        }
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlannedVisitPayload {
    pub executive_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-12-20")]
    pub planned_date: NaiveDate,
    #[validate(length(min = 1, message = "required"))]
    pub from_address: String,
    #[validate(length(min = 1, message = "required"))]
    pub to_address: String,
    pub from_location: Option<GeoPoint>,
    pub to_location: Option<GeoPoint>,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Demonstração de produto")]
    pub purpose: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnplannedVisitPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub planned_date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "required"))]
    pub from_address: String,
    #[validate(length(min = 1, message = "required"))]
    pub to_address: String,
    pub from_location: Option<GeoPoint>,
    pub to_location: Option<GeoPoint>,
    #[validate(length(min = 1, message = "required"))]
    pub purpose: String,
    pub notes: Option<String>,
}

// Dados internos para inserir uma visita
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub visit_type: VisitType,
    pub executive_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub planned_date: Option<NaiveDate>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub from_address: String,
    pub to_address: String,
    pub from_location: Option<GeoPoint>,
    pub to_location: Option<GeoPoint>,
    pub purpose: String,
    pub status: VisitStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckPayload {
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelVisitPayload {
    #[schema(example = "Cliente remarcou")]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitListQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}
