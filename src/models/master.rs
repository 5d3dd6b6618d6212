// src/models/master.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rate_unit", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    PerKm,
    PerDay,
    Fixed,
    PerUnit,
}

// Categoria de despesa (ex: Viagem, Alimentação)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseMaster {
    pub id: Uuid,
    #[schema(example = "Travel")]
    pub name: String,
    #[schema(example = "TRV")]
    pub code: String,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item cobrável de uma categoria, com tarifa por unidade
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSubMaster {
    pub id: Uuid,
    pub master_id: Uuid,
    #[schema(example = "Bike")]
    pub name: String,
    #[schema(example = "150.00")]
    pub rate: Decimal,
    pub unit: RateUnit,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterWithSubs {
    #[serde(flatten)]
    pub master: ExpenseMaster,
    pub sub_masters: Vec<ExpenseSubMaster>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMasterPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Travel")]
    pub name: String,
    #[validate(length(min = 1, max = 16, message = "invalid_code"))]
    #[schema(example = "trv")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMasterPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 16, message = "invalid_code"))]
    pub code: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubMasterPayload {
    pub master_id: Uuid,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[schema(example = "150.00")]
    pub rate: Decimal,
    pub unit: RateUnit,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubMasterPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub rate: Option<Decimal>,
    pub unit: Option<RateUnit>,
    pub is_active: Option<bool>,
}
