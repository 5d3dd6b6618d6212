// src/models/expense.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::approval::{StageApproval, Workflow, WorkflowStatus};

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub executive_id: Uuid,
    pub master_id: Uuid,
    pub sub_master_id: Uuid,
    pub quantity: Decimal,
    pub calculated_amount: Decimal,
    pub actual_amount: Decimal,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub receipt_image: Option<String>,
    pub status: WorkflowStatus,
    pub approvals: Json<Vec<StageApproval>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub executive_id: Uuid,
    pub master_id: Uuid,
    pub sub_master_id: Uuid,
    #[schema(example = "3")]
    pub quantity: Decimal,
    // quantidade × tarifa, calculado na criação e nunca alterado
    #[schema(example = "450.00")]
    pub calculated_amount: Decimal,
    #[schema(example = "500.00")]
    pub actual_amount: Decimal,
    pub description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-12-16")]
    pub expense_date: NaiveDate,
    pub receipt_image: Option<String>,
    pub status: WorkflowStatus,
    pub approvals: Vec<StageApproval>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(r: ExpenseRow) -> Self {
        Self {
            id: r.id,
            visit_id: r.visit_id,
            executive_id: r.executive_id,
            master_id: r.master_id,
            sub_master_id: r.sub_master_id,
            quantity: r.quantity,
            calculated_amount: r.calculated_amount,
            actual_amount: r.actual_amount,
            description: r.description,
            expense_date: r.expense_date,
            receipt_image: r.receipt_image,
            status: r.status,
            approvals: r.approvals.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl Expense {
    pub fn workflow(&self) -> Workflow {
        Workflow {
            owner_id: self.executive_id,
            status: self.status,
            approvals: self.approvals.clone(),
        }
    }
}

/// Valor calculado pelo sistema. O valor informado pelo executivo não interfere aqui.
pub fn calculate_amount(quantity: Decimal, rate: Decimal) -> Decimal {
    quantity * rate
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    pub visit_id: Uuid,
    pub master_id: Uuid,
    pub sub_master_id: Uuid,
    #[schema(example = "3")]
    pub quantity: Decimal,
    #[schema(example = "500.00")]
    pub actual_amount: Decimal,
    #[validate(length(max = 500, message = "too_long"))]
    pub description: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-12-16")]
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub visit_id: Uuid,
    pub executive_id: Uuid,
    pub master_id: Uuid,
    pub sub_master_id: Uuid,
    pub quantity: Decimal,
    pub calculated_amount: Decimal,
    pub actual_amount: Decimal,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub approvals: Vec<StageApproval>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachReceiptPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "receipt-1734350000.jpg")]
    pub file_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    pub visit_id: Option<Uuid>,
    pub status: Option<WorkflowStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    pub count: usize,
    pub total_amount: Decimal,
    pub data: Vec<Expense>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn calculated_amount_ignores_the_claimed_amount() {
        let calculated = calculate_amount(dec!(3), dec!(150));
        assert_eq!(calculated, dec!(450));

        let claimed = dec!(500);
        assert_ne!(calculated, claimed);
    }

    #[test]
    fn fractional_quantities_keep_precision() {
        assert_eq!(calculate_amount(dec!(12.5), dec!(8.40)), dec!(105.000));
    }
}
