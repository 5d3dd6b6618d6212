// src/db/store.rs
//
// Fronteiras de persistência usadas pelos serviços centrais. Os repositórios Postgres
// implementam estes traits; os testes usam implementações em memória.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time::{MonthWindow, TimeWindow}},
    models::{
        activity::{ActivityLog, NewActivity},
        approval::{ApprovalStage, Workflow, WorkflowStatus},
        dashboard::{ExpenseTally, LastVisit, LeaveTally, MonthlyExpense, VisitTally},
        home::HomeConfig,
    },
};

/// Entidades com fluxo de aprovação (despesa, licença).
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    type Record: Send;

    async fn find_workflow(&self, id: Uuid) -> Result<Option<Workflow>, AppError>;

    /// Grava a transição somente se o status geral ainda for `expected`.
    /// `None` significa que outra requisição alterou o registro antes.
    async fn commit_workflow(
        &self,
        id: Uuid,
        expected: WorkflowStatus,
        workflow: &Workflow,
    ) -> Result<Option<Self::Record>, AppError>;
}

/// Destino da trilha de auditoria.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn append(&self, entry: NewActivity) -> Result<(), AppError>;
}

/// Configuração global da tela inicial.
#[async_trait]
pub trait HomeConfigStore: Send + Sync {
    async fn load_or_create(&self) -> Result<HomeConfig, AppError>;

    /// Grava o agregado somente se `updated_at` ainda for `expected`.
    /// `None` significa que outra escrita chegou antes.
    async fn save_if_unchanged(
        &self,
        config: &HomeConfig,
        expected: Option<DateTime<Utc>>,
    ) -> Result<Option<HomeConfig>, AppError>;
}

/// Dono dos registros considerados numa consulta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    Owners(Vec<Uuid>),
    Everyone,
}

impl OwnerScope {
    pub fn single(id: Uuid) -> Self {
        OwnerScope::Owners(vec![id])
    }

    pub fn includes(&self, id: Uuid) -> bool {
        match self {
            OwnerScope::Owners(ids) => ids.contains(&id),
            OwnerScope::Everyone => true,
        }
    }

    pub(crate) fn as_filter(&self) -> Option<Vec<Uuid>> {
        match self {
            OwnerScope::Owners(ids) => Some(ids.clone()),
            OwnerScope::Everyone => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitScope {
    Executive(Uuid),
    Manager(Uuid),
    Everyone,
}

/// Consultas de leitura dos agregadores (visão rápida e dashboards).
#[async_trait]
pub trait DashboardStore: Send + Sync {
    // --- visão rápida ---
    async fn expense_totals(&self, executive_id: Uuid, month: &MonthWindow) -> Result<MonthlyExpense, AppError>;
    async fn last_active_visit(&self, executive_id: Uuid) -> Result<Option<LastVisit>, AppError>;
    async fn check_in_times(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Vec<DateTime<Utc>>, AppError>;
    async fn first_check_in(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Option<DateTime<Utc>>, AppError>;

    // --- dashboards por papel ---
    async fn visit_tally(&self, scope: VisitScope, window: &TimeWindow) -> Result<VisitTally, AppError>;
    async fn expense_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<ExpenseTally, AppError>;
    async fn leave_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<LeaveTally, AppError>;

    /// Despesas com status geral `status` (e, se informado, com `pending_stage` ainda pendente).
    async fn count_expenses_awaiting(
        &self,
        scope: &OwnerScope,
        status: Option<WorkflowStatus>,
        pending_stage: Option<ApprovalStage>,
    ) -> Result<i64, AppError>;

    async fn count_leaves_awaiting(
        &self,
        scope: &OwnerScope,
        status: Option<WorkflowStatus>,
        pending_stage: Option<ApprovalStage>,
    ) -> Result<i64, AppError>;

    async fn active_subordinates(&self, manager_id: Uuid) -> Result<Vec<Uuid>, AppError>;
    async fn count_active_users(&self) -> Result<i64, AppError>;
    async fn recent_activities(&self, user_id: Uuid, since: DateTime<Utc>, limit: i64) -> Result<Vec<ActivityLog>, AppError>;
}

/// Implementação em memória dos traits, usada pelos testes dos serviços.
#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::{ActivitySink, DashboardStore, HomeConfigStore, OwnerScope, VisitScope};
    use crate::{
        common::{error::AppError, time::{MonthWindow, TimeWindow}},
        models::{
            activity::{ActivityLog, NewActivity},
            home::HomeConfig,
            approval::{ApprovalStage, StageApproval, StageStatus, WorkflowStatus},
            dashboard::{ExpenseTally, LastVisit, LeaveTally, MonthlyExpense, VisitTally},
            visit::VisitStatus,
        },
    };

    #[derive(Debug, Clone)]
    pub struct MemUser {
        pub id: Uuid,
        pub manager_id: Option<Uuid>,
        pub is_active: bool,
    }

    #[derive(Debug, Clone)]
    pub struct MemVisit {
        pub executive_id: Uuid,
        pub manager_id: Option<Uuid>,
        pub status: VisitStatus,
        pub created_at: DateTime<Utc>,
        pub check_in_time: Option<DateTime<Utc>>,
        pub to_address: String,
    }

    #[derive(Debug, Clone)]
    pub struct MemExpense {
        pub executive_id: Uuid,
        pub expense_date: NaiveDate,
        pub status: WorkflowStatus,
        pub actual_amount: Decimal,
        pub approvals: Vec<StageApproval>,
    }

    #[derive(Debug, Clone)]
    pub struct MemLeave {
        pub executive_id: Uuid,
        pub from_date: NaiveDate,
        pub status: WorkflowStatus,
        pub approvals: Vec<StageApproval>,
    }

    #[derive(Default)]
    pub struct MemoryDashboardStore {
        pub users: Vec<MemUser>,
        pub visits: Vec<MemVisit>,
        pub expenses: Vec<MemExpense>,
        pub leaves: Vec<MemLeave>,
        pub activities: Vec<ActivityLog>,
    }

    fn stage_pending(approvals: &[StageApproval], stage: Option<ApprovalStage>) -> bool {
        match stage {
            None => true,
            Some(stage) => approvals
                .iter()
                .any(|a| a.stage == stage && a.status == StageStatus::Pending),
        }
    }

    fn visit_in_scope(v: &MemVisit, scope: VisitScope) -> bool {
        match scope {
            VisitScope::Executive(id) => v.executive_id == id,
            VisitScope::Manager(id) => v.manager_id == Some(id),
            VisitScope::Everyone => true,
        }
    }

    #[async_trait]
    impl DashboardStore for MemoryDashboardStore {
        async fn expense_totals(&self, executive_id: Uuid, month: &MonthWindow) -> Result<MonthlyExpense, AppError> {
            let rows: Vec<_> = self
                .expenses
                .iter()
                .filter(|e| e.executive_id == executive_id && month.contains_date(e.expense_date))
                .collect();
            Ok(MonthlyExpense {
                amount: rows.iter().map(|e| e.actual_amount).sum(),
                count: rows.len() as i64,
            })
        }

        async fn last_active_visit(&self, executive_id: Uuid) -> Result<Option<LastVisit>, AppError> {
            Ok(self
                .visits
                .iter()
                .filter(|v| v.executive_id == executive_id)
                .filter(|v| matches!(v.status, VisitStatus::InProgress | VisitStatus::Completed))
                .max_by_key(|v| v.created_at)
                .map(|v| LastVisit {
                    from: "Escritório".into(),
                    to: v.to_address.clone(),
                    purpose: "Visita".into(),
                    check_in_time: v.check_in_time,
                    status: v.status,
                }))
        }

        async fn check_in_times(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Vec<DateTime<Utc>>, AppError> {
            Ok(self
                .visits
                .iter()
                .filter(|v| v.executive_id == executive_id)
                .filter_map(|v| v.check_in_time)
                .filter(|t| window.contains(*t))
                .collect())
        }

        async fn first_check_in(&self, executive_id: Uuid, window: &TimeWindow) -> Result<Option<DateTime<Utc>>, AppError> {
            Ok(self.check_in_times(executive_id, window).await?.into_iter().min())
        }

        async fn visit_tally(&self, scope: VisitScope, window: &TimeWindow) -> Result<VisitTally, AppError> {
            let rows: Vec<_> = self
                .visits
                .iter()
                .filter(|v| visit_in_scope(v, scope) && window.contains(v.created_at))
                .collect();
            Ok(VisitTally {
                total: rows.len() as i64,
                completed: rows.iter().filter(|v| v.status == VisitStatus::Completed).count() as i64,
                in_progress: rows.iter().filter(|v| v.status == VisitStatus::InProgress).count() as i64,
            })
        }

        async fn expense_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<ExpenseTally, AppError> {
            let rows: Vec<_> = self
                .expenses
                .iter()
                .filter(|e| scope.includes(e.executive_id) && month.contains_date(e.expense_date))
                .collect();
            let amount_where = |keep: &dyn Fn(WorkflowStatus) -> bool| -> Decimal {
                rows.iter().filter(|e| keep(e.status)).map(|e| e.actual_amount).sum()
            };
            Ok(ExpenseTally {
                count: rows.len() as i64,
                pending_count: rows.iter().filter(|e| e.status == WorkflowStatus::Pending).count() as i64,
                total_amount: amount_where(&|_| true),
                pending_amount: amount_where(&|s| s == WorkflowStatus::Pending),
                cleared_amount: amount_where(&|s| {
                    matches!(s, WorkflowStatus::FinanceApproved | WorkflowStatus::HrApproved)
                }),
                approved_amount: amount_where(&|s| s == WorkflowStatus::HrApproved),
            })
        }

        async fn leave_tally(&self, scope: &OwnerScope, month: &MonthWindow) -> Result<LeaveTally, AppError> {
            let rows: Vec<_> = self
                .leaves
                .iter()
                .filter(|l| scope.includes(l.executive_id) && month.contains_date(l.from_date))
                .collect();
            Ok(LeaveTally {
                total: rows.len() as i64,
                pending: rows.iter().filter(|l| l.status == WorkflowStatus::Pending).count() as i64,
                approved: rows.iter().filter(|l| l.status == WorkflowStatus::HrApproved).count() as i64,
            })
        }

        async fn count_expenses_awaiting(
            &self,
            scope: &OwnerScope,
            status: Option<WorkflowStatus>,
            pending_stage: Option<ApprovalStage>,
        ) -> Result<i64, AppError> {
            Ok(self
                .expenses
                .iter()
                .filter(|e| scope.includes(e.executive_id))
                .filter(|e| status.is_none_or(|s| e.status == s))
                .filter(|e| stage_pending(&e.approvals, pending_stage))
                .count() as i64)
        }

        async fn count_leaves_awaiting(
            &self,
            scope: &OwnerScope,
            status: Option<WorkflowStatus>,
            pending_stage: Option<ApprovalStage>,
        ) -> Result<i64, AppError> {
            Ok(self
                .leaves
                .iter()
                .filter(|l| scope.includes(l.executive_id))
                .filter(|l| status.is_none_or(|s| l.status == s))
                .filter(|l| stage_pending(&l.approvals, pending_stage))
                .count() as i64)
        }

        async fn active_subordinates(&self, manager_id: Uuid) -> Result<Vec<Uuid>, AppError> {
            Ok(self
                .users
                .iter()
                .filter(|u| u.is_active && u.manager_id == Some(manager_id))
                .map(|u| u.id)
                .collect())
        }

        async fn count_active_users(&self) -> Result<i64, AppError> {
            Ok(self.users.iter().filter(|u| u.is_active).count() as i64)
        }

        async fn recent_activities(&self, user_id: Uuid, since: DateTime<Utc>, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
            let mut rows: Vec<ActivityLog> = self
                .activities
                .iter()
                .filter(|a| a.user_id == user_id && a.created_at >= since)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(limit as usize);
            Ok(rows)
        }
    }

    /// Descarta a trilha de auditoria.
    pub struct DiscardSink;

    #[async_trait]
    impl ActivitySink for DiscardSink {
        async fn append(&self, _entry: NewActivity) -> Result<(), AppError> {
            Ok(())
        }
    }

    pub struct MemoryHomeConfigStore {
        config: Mutex<HomeConfig>,
    }

    impl MemoryHomeConfigStore {
        pub fn new(updated_at: DateTime<Utc>) -> Self {
            Self {
                config: Mutex::new(HomeConfig {
                    quick_access: Vec::new(),
                    upcoming_holidays: Vec::new(),
                    updated_at: Some(updated_at),
                }),
            }
        }

        pub fn snapshot(&self) -> HomeConfig {
            self.config.lock().unwrap().clone()
        }

        /// Simula uma escrita de outro admin.
        pub fn touch(&self) {
            let mut config = self.config.lock().unwrap();
            config.updated_at = config.updated_at.map(|t| t + Duration::seconds(1));
        }
    }

    #[async_trait]
    impl HomeConfigStore for MemoryHomeConfigStore {
        async fn load_or_create(&self) -> Result<HomeConfig, AppError> {
            Ok(self.snapshot())
        }

        async fn save_if_unchanged(
            &self,
            config: &HomeConfig,
            expected: Option<DateTime<Utc>>,
        ) -> Result<Option<HomeConfig>, AppError> {
            let mut current = self.config.lock().unwrap();
            if current.updated_at != expected {
                return Ok(None);
            }
            let mut saved = config.clone();
            saved.updated_at = current.updated_at.map(|t| t + Duration::seconds(1));
            *current = saved.clone();
            Ok(Some(saved))
        }
    }
}
