// src/models/leave.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::approval::{StageApproval, Workflow, WorkflowStatus};

#[derive(Debug, Clone, FromRow)]
pub struct LeaveRow {
    pub id: Uuid,
    pub executive_id: Uuid,
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: Decimal,
    pub reason: String,
    pub status: WorkflowStatus,
    pub approvals: Json<Vec<StageApproval>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    pub id: Uuid,
    pub executive_id: Uuid,
    #[schema(example = "casual")]
    pub leave_type: String,
    #[schema(value_type = String, format = Date)]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub to_date: NaiveDate,
    #[schema(example = "2")]
    pub number_of_days: Decimal,
    pub reason: String,
    pub status: WorkflowStatus,
    pub approvals: Vec<StageApproval>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeaveRow> for Leave {
    fn from(r: LeaveRow) -> Self {
        Self {
            id: r.id,
            executive_id: r.executive_id,
            leave_type: r.leave_type,
            from_date: r.from_date,
            to_date: r.to_date,
            number_of_days: r.number_of_days,
            reason: r.reason,
            status: r.status,
            approvals: r.approvals.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl Leave {
    pub fn workflow(&self) -> Workflow {
        Workflow {
            owner_id: self.executive_id,
            status: self.status,
            approvals: self.approvals.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_leave_range"))]
pub struct ApplyLeavePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "sick")]
    pub leave_type: String,
    #[schema(value_type = String, format = Date, example = "2025-12-22")]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-12-23")]
    pub to_date: NaiveDate,
    #[schema(example = "2")]
    pub number_of_days: Decimal,
    #[validate(length(min = 1, message = "required"))]
    pub reason: String,
}

fn validate_leave_range(payload: &ApplyLeavePayload) -> Result<(), ValidationError> {
    if payload.to_date < payload.from_date {
        return Err(ValidationError::new("invalid_date_range"));
    }
    if payload.number_of_days <= Decimal::ZERO {
        return Err(ValidationError::new("invalid_number_of_days"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub executive_id: Uuid,
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub number_of_days: Decimal,
    pub reason: String,
    pub approvals: Vec<StageApproval>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListQuery {
    pub status: Option<WorkflowStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payload(from: &str, to: &str, days: Decimal) -> ApplyLeavePayload {
        ApplyLeavePayload {
            leave_type: "casual".into(),
            from_date: from.parse().unwrap(),
            to_date: to.parse().unwrap(),
            number_of_days: days,
            reason: "Família".into(),
        }
    }

    #[test]
    fn rejects_inverted_date_range() {
        assert!(payload("2025-12-23", "2025-12-22", dec!(1)).validate().is_err());
    }

    #[test]
    fn accepts_half_day_leave() {
        assert!(payload("2025-12-22", "2025-12-22", dec!(0.5)).validate().is_ok());
    }
}
