// src/services/approval.rs
//
// Motor de aprovação compartilhado por despesas e licenças. O pipeline é puro
// (só decide a transição); o `ApprovalService` carrega, grava e audita.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ApprovalStore,
    models::{
        activity::{EntityType, NewActivity},
        approval::{ApprovalStage, StageApproval, StageStatus, Workflow, WorkflowStatus},
        auth::Actor,
    },
    services::activity_service::ActivityLogService,
};

/// Sequência ordenada de etapas de uma entidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalPipeline {
    pub entity: EntityType,
    pub stages: &'static [ApprovalStage],
}

pub static EXPENSE_PIPELINE: ApprovalPipeline = ApprovalPipeline {
    entity: EntityType::Expense,
    stages: &[ApprovalStage::Manager, ApprovalStage::Finance, ApprovalStage::Hr],
};

pub static LEAVE_PIPELINE: ApprovalPipeline = ApprovalPipeline {
    entity: EntityType::Leave,
    stages: &[ApprovalStage::Manager, ApprovalStage::Hr],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "APPROVED",
            Decision::Rejected => "REJECTED",
        }
    }
}

impl ApprovalPipeline {
    /// Registros iniciais, todos pendentes, na ordem do pipeline.
    pub fn initial_approvals(&self) -> Vec<StageApproval> {
        self.stages.iter().copied().map(StageApproval::pending).collect()
    }

    /// `hr_approved` (última etapa aprovada) e `rejected` são finais.
    pub fn is_terminal(&self, status: WorkflowStatus) -> bool {
        status == WorkflowStatus::Rejected
            || self.stages.last().map(|s| s.approved_status()) == Some(status)
    }

    // Etapa fora do pipeline ou papel diferente do exigido: acesso negado
    fn authorize(&self, stage: ApprovalStage, actor: Actor) -> Result<usize, AppError> {
        let index = self
            .stages
            .iter()
            .position(|s| *s == stage)
            .ok_or(AppError::Forbidden)?;

        if actor.role != stage.approver_role() {
            return Err(AppError::Forbidden);
        }
        Ok(index)
    }

    // Um registro por etapa, na ordem do pipeline, mesmo que o armazenado esteja incompleto
    fn normalized(&self, workflow: &Workflow) -> Vec<StageApproval> {
        self.stages
            .iter()
            .map(|s| workflow.stage(*s).cloned().unwrap_or_else(|| StageApproval::pending(*s)))
            .collect()
    }

    pub fn approve(
        &self,
        workflow: &Workflow,
        stage: ApprovalStage,
        actor: Actor,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Workflow, AppError> {
        let index = self.authorize(stage, actor)?;
        if self.is_terminal(workflow.status) {
            return Err(AppError::InvalidState("already_finalized"));
        }

        let mut approvals = self.normalized(workflow);
        if index > 0 && approvals[index - 1].status != StageStatus::Approved {
            return Err(AppError::PrecedenceViolation(stage.as_str()));
        }
        if approvals[index].status == StageStatus::Approved {
            return Err(AppError::InvalidState("stage_already_approved"));
        }

        approvals[index] = decided(stage, StageStatus::Approved, actor, remarks, now);

        Ok(Workflow {
            owner_id: workflow.owner_id,
            status: stage.approved_status(),
            approvals,
        })
    }

    // Rejeição não depende das etapas anteriores
    pub fn reject(
        &self,
        workflow: &Workflow,
        stage: ApprovalStage,
        actor: Actor,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Workflow, AppError> {
        let index = self.authorize(stage, actor)?;
        if self.is_terminal(workflow.status) {
            return Err(AppError::InvalidState("already_finalized"));
        }

        let mut approvals = self.normalized(workflow);
        approvals[index] = decided(stage, StageStatus::Rejected, actor, remarks, now);

        Ok(Workflow {
            owner_id: workflow.owner_id,
            status: WorkflowStatus::Rejected,
            approvals,
        })
    }

    fn activity_type(&self, stage: ApprovalStage, decision: Decision) -> String {
        format!(
            "{}_{}_{}",
            self.entity.as_str().to_uppercase(),
            stage.as_str().to_uppercase(),
            decision.as_str()
        )
    }
}

fn decided(
    stage: ApprovalStage,
    status: StageStatus,
    actor: Actor,
    remarks: Option<String>,
    now: DateTime<Utc>,
) -> StageApproval {
    StageApproval {
        stage,
        approver_role: stage.approver_role(),
        status,
        approved_by: Some(actor.id),
        approved_at: Some(now),
        remarks,
    }
}

#[derive(Clone)]
pub struct ApprovalService<S> {
    store: S,
    pipeline: &'static ApprovalPipeline,
    activity: ActivityLogService,
}

impl<S: ApprovalStore> ApprovalService<S> {
    pub fn new(store: S, pipeline: &'static ApprovalPipeline, activity: ActivityLogService) -> Self {
        Self { store, pipeline, activity }
    }

    pub async fn approve(
        &self,
        id: Uuid,
        stage: ApprovalStage,
        actor: Actor,
        remarks: Option<String>,
    ) -> Result<S::Record, AppError> {
        self.decide(id, stage, actor, remarks, Decision::Approved).await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        stage: ApprovalStage,
        actor: Actor,
        remarks: Option<String>,
    ) -> Result<S::Record, AppError> {
        self.decide(id, stage, actor, remarks, Decision::Rejected).await
    }

    async fn decide(
        &self,
        id: Uuid,
        stage: ApprovalStage,
        actor: Actor,
        remarks: Option<String>,
        decision: Decision,
    ) -> Result<S::Record, AppError> {
        let current = self
            .store
            .find_workflow(id)
            .await?
            .ok_or(AppError::NotFound(self.pipeline.entity.as_str()))?;

        let now = Utc::now();
        let next = match decision {
            Decision::Approved => self.pipeline.approve(&current, stage, actor, remarks.clone(), now)?,
            Decision::Rejected => self.pipeline.reject(&current, stage, actor, remarks.clone(), now)?,
        };

        // Grava apenas se o status não mudou desde a leitura
        let record = self
            .store
            .commit_workflow(id, current.status, &next)
            .await?
            .ok_or_else(|| {
                tracing::warn!(%id, stage = stage.as_str(), "⚠️ Conflito de concorrência na aprovação");
                AppError::InvalidState("concurrent_update")
            })?;

        let activity_type = self.pipeline.activity_type(stage, decision);
        tracing::info!(%id, user_id = %actor.id, "✅ {}", activity_type);

        self.activity.record(
            NewActivity::new(
                actor.id,
                activity_type,
                self.pipeline.entity,
                id,
                format!(
                    "{} {} at {} stage",
                    self.pipeline.entity.as_str(),
                    decision.as_str().to_lowercase(),
                    stage.as_str()
                ),
            )
            .with_metadata(json!({
                "stage": stage.as_str(),
                "status": next.status,
                "remarks": remarks,
            })),
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::auth::UserRole,
        services::activity_service::testing::{ChannelSink, FailingSink},
    };
    use async_trait::async_trait;
    use std::{collections::HashMap, sync::{Arc, Mutex}};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<Uuid, Workflow>>,
        // Simula outra requisição alterando o registro entre a leitura e a gravação
        lose_race: bool,
    }

    impl MemoryStore {
        fn with(pipeline: &ApprovalPipeline) -> (Self, Uuid) {
            let id = Uuid::new_v4();
            let store = MemoryStore::default();
            store.rows.lock().unwrap().insert(
                id,
                Workflow {
                    owner_id: Uuid::new_v4(),
                    status: WorkflowStatus::Pending,
                    approvals: pipeline.initial_approvals(),
                },
            );
            (store, id)
        }
    }

    #[async_trait]
    impl ApprovalStore for MemoryStore {
        type Record = Workflow;

        async fn find_workflow(&self, id: Uuid) -> Result<Option<Workflow>, AppError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn commit_workflow(
            &self,
            id: Uuid,
            expected: WorkflowStatus,
            workflow: &Workflow,
        ) -> Result<Option<Workflow>, AppError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&id) {
                Some(current) if current.status == expected && !self.lose_race => {
                    *current = workflow.clone();
                    Ok(Some(workflow.clone()))
                }
                _ => Ok(None),
            }
        }
    }

    fn actor(role: UserRole) -> Actor {
        Actor { id: Uuid::new_v4(), role }
    }

    fn service(store: MemoryStore, pipeline: &'static ApprovalPipeline) -> (ApprovalService<MemoryStore>, mpsc::UnboundedReceiver<NewActivity>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let activity = ActivityLogService::new(Arc::new(ChannelSink(tx)));
        (ApprovalService::new(store, pipeline, activity), rx)
    }

    #[tokio::test]
    async fn expense_walks_the_whole_pipeline() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        let wf = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::ManagerApproved);

        let wf = svc.approve(id, ApprovalStage::Finance, actor(UserRole::Finance), None).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::FinanceApproved);

        let hr = actor(UserRole::Hr);
        let wf = svc.approve(id, ApprovalStage::Hr, hr, Some("ok".into())).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::HrApproved);
        assert!(wf.approvals.iter().all(|a| a.status == StageStatus::Approved));

        let hr_record = wf.stage(ApprovalStage::Hr).unwrap();
        assert_eq!(hr_record.approved_by, Some(hr.id));
        assert_eq!(hr_record.remarks.as_deref(), Some("ok"));
        assert!(hr_record.approved_at.is_some());
    }

    #[tokio::test]
    async fn hr_cannot_skip_finance() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        let wf = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::ManagerApproved);

        let err = svc.approve(id, ApprovalStage::Hr, actor(UserRole::Hr), None).await.unwrap_err();
        assert!(matches!(err, AppError::PrecedenceViolation("hr")));
    }

    #[tokio::test]
    async fn finance_before_manager_is_a_precedence_violation() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        let err = svc.approve(id, ApprovalStage::Finance, actor(UserRole::Finance), None).await.unwrap_err();
        assert!(matches!(err, AppError::PrecedenceViolation(_)));
    }

    #[tokio::test]
    async fn role_must_match_the_stage() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        let err = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Finance), None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = svc.reject(id, ApprovalStage::Hr, actor(UserRole::Admin), None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn leave_has_no_finance_stage() {
        let (store, id) = MemoryStore::with(&LEAVE_PIPELINE);
        let (svc, _rx) = service(store, &LEAVE_PIPELINE);

        let err = svc.approve(id, ApprovalStage::Finance, actor(UserRole::Finance), None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap();
        let wf = svc.approve(id, ApprovalStage::Hr, actor(UserRole::Hr), None).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::HrApproved);
    }

    #[tokio::test]
    async fn finalized_workflows_reject_further_decisions() {
        let (store, id) = MemoryStore::with(&LEAVE_PIPELINE);
        let (svc, _rx) = service(store, &LEAVE_PIPELINE);

        let wf = svc.reject(id, ApprovalStage::Manager, actor(UserRole::Manager), Some("no".into())).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::Rejected);
        assert_eq!(wf.stage(ApprovalStage::Manager).unwrap().status, StageStatus::Rejected);

        let err = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState("already_finalized")));

        let err = svc.reject(id, ApprovalStage::Hr, actor(UserRole::Hr), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState("already_finalized")));
    }

    #[tokio::test]
    async fn approving_the_same_stage_twice_fails() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap();
        let err = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState("stage_already_approved")));
    }

    #[tokio::test]
    async fn missing_entity_is_not_found() {
        let (svc, _rx) = service(MemoryStore::default(), &EXPENSE_PIPELINE);
        let err = svc.approve(Uuid::new_v4(), ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("expense")));
    }

    #[tokio::test]
    async fn losing_a_concurrent_write_is_reported() {
        let (mut store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        store.lose_race = true;
        let (svc, _rx) = service(store, &EXPENSE_PIPELINE);

        let err = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState("concurrent_update")));
    }

    #[tokio::test]
    async fn decisions_emit_activity() {
        let (store, id) = MemoryStore::with(&EXPENSE_PIPELINE);
        let (svc, mut rx) = service(store, &EXPENSE_PIPELINE);
        let manager = actor(UserRole::Manager);

        svc.approve(id, ApprovalStage::Manager, manager, None).await.unwrap();
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.activity_type, "EXPENSE_MANAGER_APPROVED");
        assert_eq!(entry.user_id, manager.id);
        assert_eq!(entry.entity_type, EntityType::Expense);
        assert_eq!(entry.entity_id, id);

        svc.reject(id, ApprovalStage::Finance, actor(UserRole::Finance), None).await.unwrap();
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.activity_type, "EXPENSE_FINANCE_REJECTED");
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_the_approval() {
        let (store, id) = MemoryStore::with(&LEAVE_PIPELINE);
        let activity = ActivityLogService::new(Arc::new(FailingSink));
        let svc = ApprovalService::new(store, &LEAVE_PIPELINE, activity);

        let wf = svc.approve(id, ApprovalStage::Manager, actor(UserRole::Manager), None).await.unwrap();
        assert_eq!(wf.status, WorkflowStatus::ManagerApproved);
    }

    #[test]
    fn terminal_statuses() {
        assert!(EXPENSE_PIPELINE.is_terminal(WorkflowStatus::HrApproved));
        assert!(EXPENSE_PIPELINE.is_terminal(WorkflowStatus::Rejected));
        assert!(!EXPENSE_PIPELINE.is_terminal(WorkflowStatus::FinanceApproved));
        assert!(LEAVE_PIPELINE.is_terminal(WorkflowStatus::HrApproved));
        assert!(!LEAVE_PIPELINE.is_terminal(WorkflowStatus::ManagerApproved));
    }
}
