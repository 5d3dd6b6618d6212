// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{
    activity::ActivityLog,
    auth::{User, UserRole},
    home::{ActiveHomeConfig, HomeConfig},
    visit::VisitStatus,
};

// =============================================================================
//  Totais mensais calculados no banco
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct VisitTally {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct ExpenseTally {
    pub count: i64,
    pub pending_count: i64,
    pub total_amount: Decimal,
    pub pending_amount: Decimal,
    /// Já liberado pelo financeiro (`finance_approved` ou `hr_approved`)
    pub cleared_amount: Decimal,
    pub approved_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct LeaveTally {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
}

// =============================================================================
//  Quick overview (executivo)
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpense {
    #[schema(example = "1200.00")]
    pub amount: Decimal,
    #[schema(example = 4)]
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastVisit {
    #[sqlx(rename = "from_address")]
    pub from: String,
    #[sqlx(rename = "to_address")]
    pub to: String,
    pub purpose: String,
    pub check_in_time: Option<DateTime<Utc>>,
    pub status: VisitStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickOverview {
    pub monthly_expense: MonthlyExpense,
    pub last_visit: Option<LastVisit>,
    pub present_days_this_month: i64,
    pub today_check_in_time: Option<DateTime<Utc>>,
}

// =============================================================================
//  Dashboards por papel (cada um com seu próprio formato)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveMonthly {
    pub total_visits: i64,
    pub completed_visits: i64,
    pub in_progress_visits: i64,
    pub total_expenses: Decimal,
    pub approved_expenses: Decimal,
    pub pending_expenses: Decimal,
    pub total_leaves: i64,
    pub approved_leaves: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveDashboard {
    pub monthly: ExecutiveMonthly,
    pub recent_activities: Vec<ActivityLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerMonthly {
    pub total_visits: i64,
    pub total_expenses: Decimal,
    pub total_leaves: i64,
    pub pending_expense_approvals: i64,
    pub pending_leave_approvals: i64,
    pub team_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceMonthly {
    pub total_expenses: Decimal,
    pub approved_expenses: Decimal,
    pub pending_expenses: Decimal,
    pub pending_approvals: i64,
    pub total_claims: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HrMonthly {
    pub total_expenses: Decimal,
    pub approved_expenses: Decimal,
    pub pending_expense_approvals: i64,
    pub total_leaves: i64,
    pub approved_leaves: i64,
    pub pending_leave_approvals: i64,
    pub total_employees: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminMonthly {
    pub total_users: i64,
    pub total_visits: i64,
    pub total_expenses: Decimal,
    pub total_leaves: i64,
    pub pending_expenses: i64,
    pub pending_leaves: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOnly<T> {
    pub monthly: T,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RoleDashboardData {
    Executive(ExecutiveDashboard),
    Manager(MonthlyOnly<ManagerMonthly>),
    Finance(MonthlyOnly<FinanceMonthly>),
    Hr(MonthlyOnly<HrMonthly>),
    Admin(MonthlyOnly<AdminMonthly>),
}

// =============================================================================
//  Tela inicial
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSection {
    pub key: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleWidgetConfig {
    pub widgets: Vec<&'static str>,
    pub permissions: Vec<&'static str>,
    pub sections: Vec<WidgetSection>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleShortcut {
    pub title: &'static str,
    pub route: &'static str,
    pub bg_color: &'static str,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeScreen {
    #[schema(example = "Good Morning")]
    pub greeting: &'static str,
    pub user: User,
    pub role: UserRole,
    pub quick_overview: QuickOverview,
    pub quick_access: Vec<RoleShortcut>,
    pub config: RoleWidgetConfig,
    pub dashboard: ActiveHomeConfig,
}

// Visão do admin sobre a configuração global
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminHomeConfig {
    pub data: HomeConfig,
    pub config: RoleWidgetConfig,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfigResponse {
    pub role: UserRole,
    pub config: RoleWidgetConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct RoleConfigQuery {
    pub role: Option<String>,
}
