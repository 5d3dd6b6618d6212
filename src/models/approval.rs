// src/models/approval.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::auth::UserRole;

// Etapas possíveis de um fluxo de aprovação. A ordem real vem do pipeline de cada entidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStage {
    Manager,
    Finance,
    Hr,
}

impl ApprovalStage {
    /// Papel exigido para agir nesta etapa.
    pub fn approver_role(&self) -> UserRole {
        match self {
            ApprovalStage::Manager => UserRole::Manager,
            ApprovalStage::Finance => UserRole::Finance,
            ApprovalStage::Hr => UserRole::Hr,
        }
    }

    /// Status geral da entidade depois que esta etapa aprova.
    pub fn approved_status(&self) -> WorkflowStatus {
        match self {
            ApprovalStage::Manager => WorkflowStatus::ManagerApproved,
            ApprovalStage::Finance => WorkflowStatus::FinanceApproved,
            ApprovalStage::Hr => WorkflowStatus::HrApproved,
        }
    }

    /// Nome de etapa vindo da rota. Desconhecido vira `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "manager" => Some(ApprovalStage::Manager),
            "finance" => Some(ApprovalStage::Finance),
            "hr" => Some(ApprovalStage::Hr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStage::Manager => "manager",
            ApprovalStage::Finance => "finance",
            ApprovalStage::Hr => "hr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

// Status geral (composto) de despesas e licenças
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "workflow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    ManagerApproved,
    FinanceApproved,
    HrApproved,
    Rejected,
}

/// Registro de uma etapa, guardado em ordem na coluna JSONB `approvals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageApproval {
    pub stage: ApprovalStage,
    pub approver_role: UserRole,
    #[serde(default)]
    pub status: StageStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl StageApproval {
    pub fn pending(stage: ApprovalStage) -> Self {
        Self {
            stage,
            approver_role: stage.approver_role(),
            status: StageStatus::Pending,
            approved_by: None,
            approved_at: None,
            remarks: None,
        }
    }
}

/// Recorte de uma despesa/licença que o motor de aprovação precisa enxergar.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    pub owner_id: Uuid,
    pub status: WorkflowStatus,
    pub approvals: Vec<StageApproval>,
}

impl Workflow {
    pub fn stage(&self, stage: ApprovalStage) -> Option<&StageApproval> {
        self.approvals.iter().find(|a| a.stage == stage)
    }
}

// Corpo das rotas de aprovar/rejeitar
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    #[schema(example = "Conferido com o recibo")]
    pub remarks: Option<String>,
}
