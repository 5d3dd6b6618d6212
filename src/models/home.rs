// src/models/home.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Atalho exibido na tela inicial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickAccessItem {
    pub id: Uuid,
    #[schema(example = "Minhas Despesas")]
    pub title: String,
    pub image: Option<String>,
    #[schema(example = "#6366F1")]
    pub bg_color: String,
    #[schema(example = "/expenses")]
    pub route: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: Uuid,
    #[schema(example = "Diwali")]
    pub title: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub image: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

// Linha única da tabela home_config
#[derive(Debug, Clone, FromRow)]
pub struct HomeConfigRow {
    pub quick_access: Json<Vec<QuickAccessItem>>,
    pub upcoming_holidays: Json<Vec<Holiday>>,
    pub updated_at: DateTime<Utc>,
}

/// Configuração global (um único agregado para todos os usuários).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeConfig {
    pub quick_access: Vec<QuickAccessItem>,
    pub upcoming_holidays: Vec<Holiday>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<HomeConfigRow> for HomeConfig {
    fn from(r: HomeConfigRow) -> Self {
        Self {
            quick_access: r.quick_access.0,
            upcoming_holidays: r.upcoming_holidays.0,
            updated_at: Some(r.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveHomeConfig {
    pub quick_access: Vec<QuickAccessItem>,
    pub upcoming_holidays: Vec<Holiday>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickAccessPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub image: Option<String>,
    pub bg_color: Option<String>,
    pub route: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuickAccessPayload {
    pub title: Option<String>,
    pub image: Option<String>,
    pub bg_color: Option<String>,
    pub route: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub image: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolidayPayload {
    pub title: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
    pub order: Option<i32>,
}
