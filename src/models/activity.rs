// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Visit,
    Expense,
    Leave,
    User,
    Master,
    Dashboard,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Visit => "visit",
            EntityType::Expense => "expense",
            EntityType::Leave => "leave",
            EntityType::User => "user",
            EntityType::Master => "master",
            EntityType::Dashboard => "dashboard",
        }
    }
}

// Linha da tabela activity_logs (somente inserção)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "EXPENSE_MANAGER_APPROVED")]
    pub activity_type: String,
    #[schema(example = "expense")]
    pub entity_type: String,
    pub entity_id: Uuid,
    pub description: String,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub activity_type: String,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub description: String,
    pub metadata: Value,
}

impl NewActivity {
    pub fn new(
        user_id: Uuid,
        activity_type: impl Into<String>,
        entity_type: EntityType,
        entity_id: Uuid,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            activity_type: activity_type.into(),
            entity_type,
            entity_id,
            description: description.into(),
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}
