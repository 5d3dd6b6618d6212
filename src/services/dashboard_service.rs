// src/services/dashboard_service.rs
//
// Um resumo mensal por papel. Cada papel tem seu próprio conjunto de métricas,
// calculado a partir de consultas diferentes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        time::{month_window, MonthWindow},
    },
    db::{DashboardStore, OwnerScope, VisitScope},
    models::{
        activity::ActivityLog,
        approval::{ApprovalStage, WorkflowStatus},
        auth::UserRole,
        dashboard::{
            AdminMonthly, ExecutiveDashboard, ExecutiveMonthly, FinanceMonthly, HrMonthly, ManagerMonthly,
            MonthlyOnly, RoleDashboardData,
        },
    },
};

const RECENT_WINDOW_DAYS: i64 = 7;
const DASHBOARD_ACTIVITY_LIMIT: i64 = 50;
const FEED_ACTIVITY_LIMIT: i64 = 100;

/// Período de referência de um cálculo.
#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub as_of: DateTime<Utc>,
    pub month: MonthWindow,
}

#[async_trait]
pub trait RoleDashboard: Send + Sync {
    async fn compute(&self, store: &dyn DashboardStore, user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError>;
}

pub struct ExecutiveView;
pub struct ManagerView;
pub struct FinanceView;
pub struct HrView;
pub struct AdminView;

#[async_trait]
impl RoleDashboard for ExecutiveView {
    async fn compute(&self, store: &dyn DashboardStore, user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError> {
        let own = OwnerScope::single(user_id);

        let visits = store.visit_tally(VisitScope::Executive(user_id), &period.month.span).await?;
        let expenses = store.expense_tally(&own, &period.month).await?;
        let leaves = store.leave_tally(&own, &period.month).await?;
        let recent_activities = store
            .recent_activities(user_id, period.as_of - Duration::days(RECENT_WINDOW_DAYS), DASHBOARD_ACTIVITY_LIMIT)
            .await?;

        let monthly = ExecutiveMonthly {
            total_visits: visits.total,
            completed_visits: visits.completed,
            in_progress_visits: visits.in_progress,
            total_expenses: expenses.total_amount,
            approved_expenses: expenses.approved_amount,
            pending_expenses: expenses.pending_amount,
            total_leaves: leaves.total,
            approved_leaves: leaves.approved,
        };

        Ok(RoleDashboardData::Executive(ExecutiveDashboard { monthly, recent_activities }))
    }
}

#[async_trait]
impl RoleDashboard for ManagerView {
    async fn compute(&self, store: &dyn DashboardStore, user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError> {
        let team = store.active_subordinates(user_id).await?;
        let team_size = team.len() as i64;
        let scope = OwnerScope::Owners(team);

        // Visitas planejadas já carregam o id do gerente; não filtra pela equipe
        let visits = store.visit_tally(VisitScope::Manager(user_id), &period.month.span).await?;
        let expenses = store.expense_tally(&scope, &period.month).await?;
        let leaves = store.leave_tally(&scope, &period.month).await?;
        let pending_expense_approvals = store
            .count_expenses_awaiting(&scope, Some(WorkflowStatus::Pending), None)
            .await?;
        // Só a etapa do gerente importa, qualquer que seja o status geral
        let pending_leave_approvals = store
            .count_leaves_awaiting(&scope, None, Some(ApprovalStage::Manager))
            .await?;

        Ok(RoleDashboardData::Manager(MonthlyOnly {
            monthly: ManagerMonthly {
                total_visits: visits.total,
                total_expenses: expenses.total_amount,
                total_leaves: leaves.total,
                pending_expense_approvals,
                pending_leave_approvals,
                team_size,
            },
        }))
    }
}

#[async_trait]
impl RoleDashboard for FinanceView {
    async fn compute(&self, store: &dyn DashboardStore, _user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError> {
        let expenses = store.expense_tally(&OwnerScope::Everyone, &period.month).await?;
        let pending_approvals = store
            .count_expenses_awaiting(
                &OwnerScope::Everyone,
                Some(WorkflowStatus::ManagerApproved),
                Some(ApprovalStage::Finance),
            )
            .await?;

        let total_expenses = expenses.total_amount;
        let approved_expenses = expenses.cleared_amount;

        Ok(RoleDashboardData::Finance(MonthlyOnly {
            monthly: FinanceMonthly {
                total_expenses,
                approved_expenses,
                // Pendente é o restante, não uma consulta separada
                pending_expenses: total_expenses - approved_expenses,
                pending_approvals,
                total_claims: expenses.count,
            },
        }))
    }
}

#[async_trait]
impl RoleDashboard for HrView {
    async fn compute(&self, store: &dyn DashboardStore, _user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError> {
        let everyone = OwnerScope::Everyone;

        let expenses = store.expense_tally(&everyone, &period.month).await?;
        let leaves = store.leave_tally(&everyone, &period.month).await?;
        let pending_expense_approvals = store
            .count_expenses_awaiting(&everyone, Some(WorkflowStatus::FinanceApproved), Some(ApprovalStage::Hr))
            .await?;
        let pending_leave_approvals = store
            .count_leaves_awaiting(&everyone, Some(WorkflowStatus::ManagerApproved), Some(ApprovalStage::Hr))
            .await?;
        let total_employees = store.count_active_users().await?;

        Ok(RoleDashboardData::Hr(MonthlyOnly {
            monthly: HrMonthly {
                total_expenses: expenses.total_amount,
                approved_expenses: expenses.approved_amount,
                pending_expense_approvals,
                total_leaves: leaves.total,
                approved_leaves: leaves.approved,
                pending_leave_approvals,
                total_employees,
            },
        }))
    }
}

#[async_trait]
impl RoleDashboard for AdminView {
    async fn compute(&self, store: &dyn DashboardStore, _user_id: Uuid, period: &Period) -> Result<RoleDashboardData, AppError> {
        let everyone = OwnerScope::Everyone;

        let total_users = store.count_active_users().await?;
        let visits = store.visit_tally(VisitScope::Everyone, &period.month.span).await?;
        let expenses = store.expense_tally(&everyone, &period.month).await?;
        let leaves = store.leave_tally(&everyone, &period.month).await?;

        Ok(RoleDashboardData::Admin(MonthlyOnly {
            monthly: AdminMonthly {
                total_users,
                total_visits: visits.total,
                total_expenses: expenses.total_amount,
                total_leaves: leaves.total,
                pending_expenses: expenses.pending_count,
                pending_leaves: leaves.pending,
            },
        }))
    }
}

/// O conjunto de papéis é fechado: todo papel tem um painel.
pub fn dashboard_for(role: UserRole) -> &'static dyn RoleDashboard {
    match role {
        UserRole::Executive => &ExecutiveView,
        UserRole::Manager => &ManagerView,
        UserRole::Finance => &FinanceView,
        UserRole::Hr => &HrView,
        UserRole::Admin => &AdminView,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DashboardStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub async fn compute(&self, user_id: Uuid, role: UserRole, as_of: DateTime<Utc>) -> Result<RoleDashboardData, AppError> {
        let period = Period {
            as_of,
            month: month_window(as_of, self.offset),
        };
        tracing::debug!(%user_id, role = role.as_str(), "📊 Calculando dashboard");
        dashboard_for(role).compute(self.store.as_ref(), user_id, &period).await
    }

    // Feed de atividades: últimos 7 dias, mais recentes primeiro
    pub async fn recent_activities(&self, user_id: Uuid, as_of: DateTime<Utc>) -> Result<Vec<ActivityLog>, AppError> {
        self.store
            .recent_activities(user_id, as_of - Duration::days(RECENT_WINDOW_DAYS), FEED_ACTIVITY_LIMIT)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::store::memory::{MemExpense, MemLeave, MemUser, MemVisit, MemoryDashboardStore},
        models::{
            approval::{StageApproval, StageStatus},
            visit::VisitStatus,
        },
        services::approval::{EXPENSE_PIPELINE, LEAVE_PIPELINE},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const AS_OF: &str = "2025-06-15T10:00:00Z";

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn service(store: MemoryDashboardStore) -> DashboardService {
        DashboardService::new(Arc::new(store), FixedOffset::east_opt(0).unwrap())
    }

    fn user(manager_id: Option<Uuid>, is_active: bool) -> MemUser {
        MemUser { id: Uuid::new_v4(), manager_id, is_active }
    }

    fn visit(executive_id: Uuid, manager_id: Option<Uuid>, status: VisitStatus, created: &str) -> MemVisit {
        MemVisit {
            executive_id,
            manager_id,
            status,
            created_at: utc(created),
            check_in_time: None,
            to_address: "Cliente".into(),
        }
    }

    // Registros de etapa coerentes com o status geral
    fn approvals_for(stages: &[ApprovalStage], status: WorkflowStatus) -> Vec<StageApproval> {
        let approved = match status {
            WorkflowStatus::ManagerApproved => 1,
            WorkflowStatus::FinanceApproved => 2,
            WorkflowStatus::HrApproved => stages.len(),
            _ => 0,
        };
        stages
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut record = StageApproval::pending(*s);
                if i < approved {
                    record.status = StageStatus::Approved;
                }
                record
            })
            .collect()
    }

    fn expense(executive_id: Uuid, date: &str, status: WorkflowStatus, amount: Decimal) -> MemExpense {
        MemExpense {
            executive_id,
            expense_date: date.parse().unwrap(),
            status,
            actual_amount: amount,
            approvals: approvals_for(EXPENSE_PIPELINE.stages, status),
        }
    }

    fn leave(executive_id: Uuid, date: &str, status: WorkflowStatus) -> MemLeave {
        MemLeave {
            executive_id,
            from_date: date.parse().unwrap(),
            status,
            approvals: approvals_for(LEAVE_PIPELINE.stages, status),
        }
    }

    #[tokio::test]
    async fn admin_scenario() {
        let users: Vec<MemUser> = (0..10).map(|_| user(None, true)).chain([user(None, false)]).collect();
        let exec = users[0].id;
        let store = MemoryDashboardStore {
            visits: vec![
                visit(exec, None, VisitStatus::Completed, "2025-06-01T09:00:00Z"),
                visit(exec, None, VisitStatus::Approved, "2025-06-02T09:00:00Z"),
                visit(exec, None, VisitStatus::InProgress, "2025-06-10T09:00:00Z"),
                visit(exec, None, VisitStatus::Cancelled, "2025-06-14T09:00:00Z"),
                visit(exec, None, VisitStatus::Completed, "2025-05-31T09:00:00Z"),
            ],
            expenses: vec![
                expense(exec, "2025-06-02", WorkflowStatus::Pending, dec!(300)),
                expense(exec, "2025-06-03", WorkflowStatus::Pending, dec!(200)),
                expense(exec, "2025-06-04", WorkflowStatus::ManagerApproved, dec!(250)),
                expense(exec, "2025-06-05", WorkflowStatus::HrApproved, dec!(450)),
            ],
            users,
            ..Default::default()
        };

        let data = service(store).compute(Uuid::new_v4(), UserRole::Admin, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Admin(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel de admin");
        };
        assert_eq!(
            monthly,
            AdminMonthly {
                total_users: 10,
                total_visits: 4,
                total_expenses: dec!(1200),
                total_leaves: 0,
                pending_expenses: 2,
                pending_leaves: 0,
            }
        );
    }

    #[tokio::test]
    async fn finance_pending_is_total_minus_approved() {
        let exec = Uuid::new_v4();
        let store = MemoryDashboardStore {
            expenses: vec![
                expense(exec, "2025-06-02", WorkflowStatus::Pending, dec!(100)),
                expense(exec, "2025-06-03", WorkflowStatus::ManagerApproved, dec!(80)),
                expense(exec, "2025-06-04", WorkflowStatus::FinanceApproved, dec!(60)),
                expense(exec, "2025-06-05", WorkflowStatus::HrApproved, dec!(40)),
                expense(exec, "2025-06-06", WorkflowStatus::Rejected, dec!(20)),
                // fora do mês, mas ainda aguardando o financeiro
                expense(exec, "2025-05-20", WorkflowStatus::ManagerApproved, dec!(999)),
            ],
            ..Default::default()
        };

        let data = service(store).compute(Uuid::new_v4(), UserRole::Finance, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Finance(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel financeiro");
        };
        assert_eq!(monthly.total_expenses, dec!(300));
        assert_eq!(monthly.approved_expenses, dec!(100));
        assert_eq!(monthly.pending_expenses, monthly.total_expenses - monthly.approved_expenses);
        assert_eq!(monthly.pending_approvals, 2);
        assert_eq!(monthly.total_claims, 5);
    }

    #[tokio::test]
    async fn manager_sees_only_the_active_team() {
        let manager = Uuid::new_v4();
        let member = user(Some(manager), true);
        let former = user(Some(manager), false);
        let outsider = user(None, true);
        let (m, f, o) = (member.id, former.id, outsider.id);

        let store = MemoryDashboardStore {
            users: vec![member, former, outsider],
            visits: vec![
                visit(m, Some(manager), VisitStatus::Approved, "2025-06-03T09:00:00Z"),
                visit(o, Some(manager), VisitStatus::Approved, "2025-06-04T09:00:00Z"),
                visit(m, None, VisitStatus::Approved, "2025-06-05T09:00:00Z"),
            ],
            expenses: vec![
                expense(m, "2025-06-02", WorkflowStatus::Pending, dec!(70)),
                expense(m, "2025-04-02", WorkflowStatus::Pending, dec!(30)),
                expense(f, "2025-06-02", WorkflowStatus::Pending, dec!(500)),
                expense(o, "2025-06-02", WorkflowStatus::Pending, dec!(500)),
            ],
            leaves: vec![
                leave(m, "2025-06-20", WorkflowStatus::Pending),
                leave(m, "2025-06-21", WorkflowStatus::ManagerApproved),
                leave(o, "2025-06-20", WorkflowStatus::Pending),
            ],
            ..Default::default()
        };

        let data = service(store).compute(manager, UserRole::Manager, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Manager(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel do gerente");
        };
        assert_eq!(
            monthly,
            ManagerMonthly {
                total_visits: 2,
                total_expenses: dec!(70),
                total_leaves: 2,
                pending_expense_approvals: 2,
                pending_leave_approvals: 1,
                team_size: 1,
            }
        );
    }

    #[tokio::test]
    async fn manager_without_team_sees_zeros() {
        let manager = Uuid::new_v4();
        let store = MemoryDashboardStore {
            expenses: vec![expense(Uuid::new_v4(), "2025-06-02", WorkflowStatus::Pending, dec!(70))],
            ..Default::default()
        };

        let data = service(store).compute(manager, UserRole::Manager, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Manager(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel do gerente");
        };
        assert_eq!(monthly.team_size, 0);
        assert_eq!(monthly.total_expenses, Decimal::ZERO);
        assert_eq!(monthly.pending_expense_approvals, 0);
    }

    #[tokio::test]
    async fn manager_counts_leaves_by_manager_stage_only() {
        let manager = Uuid::new_v4();
        let member = user(Some(manager), true);
        let m = member.id;

        // RH recusou antes do gerente decidir: status geral recusado, etapa do gerente pendente
        let mut rejected_early = leave(m, "2025-06-20", WorkflowStatus::Rejected);
        rejected_early.approvals[1].status = StageStatus::Rejected;
        let mut rejected_by_manager = leave(m, "2025-06-22", WorkflowStatus::Rejected);
        rejected_by_manager.approvals[0].status = StageStatus::Rejected;

        let store = MemoryDashboardStore {
            users: vec![member],
            leaves: vec![leave(m, "2025-06-18", WorkflowStatus::Pending), rejected_early, rejected_by_manager],
            ..Default::default()
        };

        let data = service(store).compute(manager, UserRole::Manager, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Manager(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel do gerente");
        };
        assert_eq!(monthly.pending_leave_approvals, 2);
        assert_eq!(monthly.total_leaves, 3);
    }

    #[tokio::test]
    async fn hr_counts_only_items_waiting_for_hr() {
        let exec = Uuid::new_v4();
        let store = MemoryDashboardStore {
            users: vec![user(None, true), user(None, true), user(None, false)],
            expenses: vec![
                expense(exec, "2025-06-02", WorkflowStatus::FinanceApproved, dec!(10)),
                expense(exec, "2025-06-03", WorkflowStatus::ManagerApproved, dec!(20)),
                expense(exec, "2025-06-04", WorkflowStatus::HrApproved, dec!(30)),
            ],
            leaves: vec![
                leave(exec, "2025-06-10", WorkflowStatus::ManagerApproved),
                leave(exec, "2025-06-11", WorkflowStatus::Pending),
                leave(exec, "2025-06-12", WorkflowStatus::HrApproved),
            ],
            ..Default::default()
        };

        let data = service(store).compute(Uuid::new_v4(), UserRole::Hr, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Hr(MonthlyOnly { monthly }) = data else {
            panic!("esperava o painel de RH");
        };
        assert_eq!(
            monthly,
            HrMonthly {
                total_expenses: dec!(60),
                approved_expenses: dec!(30),
                pending_expense_approvals: 1,
                total_leaves: 3,
                approved_leaves: 1,
                pending_leave_approvals: 1,
                total_employees: 2,
            }
        );
    }

    #[tokio::test]
    async fn executive_dashboard_has_monthly_figures_and_recent_activity() {
        let exec = Uuid::new_v4();
        let activity = |days_ago: i64| ActivityLog {
            id: Uuid::new_v4(),
            user_id: exec,
            activity_type: "VISIT_CHECKIN".into(),
            entity_type: "visit".into(),
            entity_id: Uuid::new_v4(),
            description: "Checked in".into(),
            metadata: json!({}),
            created_at: utc(AS_OF) - Duration::days(days_ago),
        };
        let store = MemoryDashboardStore {
            visits: vec![
                visit(exec, None, VisitStatus::Completed, "2025-06-01T09:00:00Z"),
                visit(exec, None, VisitStatus::InProgress, "2025-06-14T09:00:00Z"),
                visit(exec, None, VisitStatus::Approved, "2025-06-15T09:00:00Z"),
            ],
            expenses: vec![
                expense(exec, "2025-06-02", WorkflowStatus::Pending, dec!(100)),
                expense(exec, "2025-06-03", WorkflowStatus::HrApproved, dec!(40)),
                expense(exec, "2025-06-04", WorkflowStatus::ManagerApproved, dec!(5)),
            ],
            leaves: vec![
                leave(exec, "2025-06-20", WorkflowStatus::HrApproved),
                leave(exec, "2025-06-25", WorkflowStatus::Rejected),
            ],
            activities: vec![activity(1), activity(3), activity(10)],
            ..Default::default()
        };

        let data = service(store).compute(exec, UserRole::Executive, utc(AS_OF)).await.unwrap();
        let RoleDashboardData::Executive(dashboard) = data else {
            panic!("esperava o painel do executivo");
        };
        assert_eq!(
            dashboard.monthly,
            ExecutiveMonthly {
                total_visits: 3,
                completed_visits: 1,
                in_progress_visits: 1,
                total_expenses: dec!(145),
                approved_expenses: dec!(40),
                pending_expenses: dec!(100),
                total_leaves: 2,
                approved_leaves: 1,
            }
        );
        assert_eq!(dashboard.recent_activities.len(), 2);
        assert!(dashboard.recent_activities[0].created_at > dashboard.recent_activities[1].created_at);
    }
}
