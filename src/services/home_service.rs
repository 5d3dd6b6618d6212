// src/services/home_service.rs

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time::greeting_for},
    db::HomeConfigStore,
    models::{
        activity::{EntityType, NewActivity},
        auth::{Actor, User, UserRole},
        dashboard::{HomeScreen, RoleShortcut, RoleWidgetConfig, WidgetSection},
        home::{
            ActiveHomeConfig, Holiday, HolidayPayload, HomeConfig, QuickAccessItem, QuickAccessPayload,
            UpdateHolidayPayload, UpdateQuickAccessPayload,
        },
    },
    services::{activity_service::ActivityLogService, overview_service::OverviewService},
};

const DEFAULT_BG_COLOR: &str = "#6366F1";

// =============================================================================
//  Configuração fixa por papel
// =============================================================================

fn section(key: &'static str, title: &'static str, icon: &'static str) -> WidgetSection {
    WidgetSection { key, title, icon }
}

pub fn role_config(role: UserRole) -> RoleWidgetConfig {
    match role {
        UserRole::Admin => RoleWidgetConfig {
            widgets: vec!["systemHealth", "userManagement", "auditLogs", "backupStatus", "serverMetrics"],
            permissions: vec!["view_all", "manage_users", "view_audit"],
            sections: vec![
                section("systemHealth", "System Health", "activity"),
                section("userManagement", "User Management", "users"),
                section("auditLogs", "Audit Logs", "file-text"),
                section("backupStatus", "Backup Status", "database"),
                section("serverMetrics", "Server Metrics", "bar-chart"),
            ],
        },
        UserRole::Hr => RoleWidgetConfig {
            widgets: vec!["teamOverview", "attendanceTracking", "leaveRequests", "recruitment", "performance"],
            permissions: vec!["view_employees", "manage_leave", "manage_attendance", "recruitment"],
            sections: vec![
                section("teamOverview", "Team Overview", "users"),
                section("attendanceTracking", "Attendance", "calendar"),
                section("leaveRequests", "Leave Requests", "inbox"),
                section("recruitment", "Recruitment", "briefcase"),
                section("performance", "Performance", "star"),
            ],
        },
        UserRole::Finance => RoleWidgetConfig {
            widgets: vec!["budget", "expenses", "payroll", "invoicing", "reports"],
            permissions: vec!["view_finance", "manage_budget", "view_payroll"],
            sections: vec![
                section("budget", "Budget Overview", "pie-chart"),
                section("expenses", "Expense Tracking", "credit-card"),
                section("payroll", "Payroll", "dollar-sign"),
                section("invoicing", "Invoicing", "file-invoice"),
                section("reports", "Financial Reports", "bar-chart"),
            ],
        },
        UserRole::Manager => RoleWidgetConfig {
            widgets: vec!["teamPerformance", "projects", "tasks", "attendance", "reports"],
            permissions: vec!["view_team", "manage_tasks", "view_attendance", "manage_team"],
            sections: vec![
                section("teamPerformance", "Team Performance", "trending-up"),
                section("projects", "Projects", "folder"),
                section("tasks", "Tasks", "check-square"),
                section("attendance", "Team Attendance", "calendar"),
                section("reports", "Reports", "bar-chart"),
            ],
        },
        UserRole::Executive => RoleWidgetConfig {
            widgets: vec!["overview", "revenue", "teamHealth", "goals", "alerts"],
            permissions: vec!["view_summary", "view_revenue", "view_all_reports"],
            sections: vec![
                section("overview", "Company Overview", "bar-chart-2"),
                section("revenue", "Revenue", "trending-up"),
                section("teamHealth", "Team Health", "heart"),
                section("goals", "Goals", "target"),
                section("alerts", "Alerts", "alert-circle"),
            ],
        },
    }
}

pub fn role_shortcuts(role: UserRole) -> Vec<RoleShortcut> {
    let items: [(&'static str, &'static str, &'static str); 3] = match role {
        UserRole::Admin => [
            ("Users", "/admin/users", "#3B82F6"),
            ("Settings", "/admin/settings", "#8B5CF6"),
            ("Logs", "/admin/logs", "#EF4444"),
        ],
        UserRole::Hr => [
            ("Employees", "/hr/employees", "#10B981"),
            ("Leave", "/hr/leave", "#F59E0B"),
            ("Recruitment", "/hr/recruitment", "#3B82F6"),
        ],
        UserRole::Finance => [
            ("Budget", "/finance/budget", "#06B6D4"),
            ("Expenses", "/finance/expenses", "#EC4899"),
            ("Reports", "/finance/reports", "#8B5CF6"),
        ],
        UserRole::Manager => [
            ("Team", "/manager/team", "#10B981"),
            ("Tasks", "/manager/tasks", "#F59E0B"),
            ("Projects", "/manager/projects", "#3B82F6"),
        ],
        UserRole::Executive => [
            ("Dashboard", "/executive/summary", "#3B82F6"),
            ("Reports", "/executive/reports", "#8B5CF6"),
            ("Analytics", "/executive/analytics", "#10B981"),
        ],
    };

    items
        .into_iter()
        .zip(1..)
        .map(|((title, route, bg_color), order)| RoleShortcut { title, route, bg_color, order })
        .collect()
}

// =============================================================================
//  Operações sobre o agregado global
// =============================================================================

/// Somente itens ativos, ordenados por `order`.
pub fn active_view(config: &HomeConfig) -> ActiveHomeConfig {
    let mut quick_access: Vec<QuickAccessItem> =
        config.quick_access.iter().filter(|i| i.is_active).cloned().collect();
    quick_access.sort_by_key(|i| i.order);

    let mut upcoming_holidays: Vec<Holiday> =
        config.upcoming_holidays.iter().filter(|h| h.is_active).cloned().collect();
    upcoming_holidays.sort_by_key(|h| h.order);

    ActiveHomeConfig { quick_access, upcoming_holidays }
}

fn next_order(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

pub fn add_quick_access(config: &mut HomeConfig, payload: QuickAccessPayload) -> Uuid {
    let id = Uuid::new_v4();
    let order = payload.order.unwrap_or_else(|| next_order(config.quick_access.len()));
    config.quick_access.push(QuickAccessItem {
        id,
        title: payload.title,
        image: payload.image,
        bg_color: payload.bg_color.unwrap_or_else(|| DEFAULT_BG_COLOR.to_owned()),
        route: payload.route,
        is_active: true,
        order,
    });
    id
}

pub fn update_quick_access(config: &mut HomeConfig, id: Uuid, changes: UpdateQuickAccessPayload) -> Result<(), AppError> {
    let item = config
        .quick_access
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or(AppError::NotFound("quickAccessItem"))?;

    if let Some(title) = changes.title {
        item.title = title;
    }
    if let Some(image) = changes.image {
        item.image = Some(image);
    }
    if let Some(bg_color) = changes.bg_color {
        item.bg_color = bg_color;
    }
    if let Some(route) = changes.route {
        item.route = Some(route);
    }
    if let Some(is_active) = changes.is_active {
        item.is_active = is_active;
    }
    if let Some(order) = changes.order {
        item.order = order;
    }
    Ok(())
}

pub fn toggle_quick_access(config: &mut HomeConfig, id: Uuid) -> Result<(), AppError> {
    let item = config
        .quick_access
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or(AppError::NotFound("quickAccessItem"))?;
    item.is_active = !item.is_active;
    Ok(())
}

pub fn delete_quick_access(config: &mut HomeConfig, id: Uuid) -> Result<(), AppError> {
    let before = config.quick_access.len();
    config.quick_access.retain(|i| i.id != id);
    if config.quick_access.len() == before {
        return Err(AppError::NotFound("quickAccessItem"));
    }
    Ok(())
}

pub fn add_holiday(config: &mut HomeConfig, payload: HolidayPayload) -> Uuid {
    let id = Uuid::new_v4();
    let order = payload.order.unwrap_or_else(|| next_order(config.upcoming_holidays.len()));
    config.upcoming_holidays.push(Holiday {
        id,
        title: payload.title,
        date: payload.date,
        image: payload.image,
        is_active: true,
        order,
    });
    id
}

pub fn update_holiday(config: &mut HomeConfig, id: Uuid, changes: UpdateHolidayPayload) -> Result<(), AppError> {
    let holiday = config
        .upcoming_holidays
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or(AppError::NotFound("holiday"))?;

    if let Some(title) = changes.title {
        holiday.title = title;
    }
    if let Some(date) = changes.date {
        holiday.date = date;
    }
    if let Some(image) = changes.image {
        holiday.image = Some(image);
    }
    if let Some(is_active) = changes.is_active {
        holiday.is_active = is_active;
    }
    if let Some(order) = changes.order {
        holiday.order = order;
    }
    Ok(())
}

pub fn toggle_holiday(config: &mut HomeConfig, id: Uuid) -> Result<(), AppError> {
    let holiday = config
        .upcoming_holidays
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or(AppError::NotFound("holiday"))?;
    holiday.is_active = !holiday.is_active;
    Ok(())
}

pub fn delete_holiday(config: &mut HomeConfig, id: Uuid) -> Result<(), AppError> {
    let before = config.upcoming_holidays.len();
    config.upcoming_holidays.retain(|h| h.id != id);
    if config.upcoming_holidays.len() == before {
        return Err(AppError::NotFound("holiday"));
    }
    Ok(())
}

// =============================================================================
//  Serviço
// =============================================================================

#[derive(Clone)]
pub struct HomeService {
    repo: Arc<dyn HomeConfigStore>,
    overview: OverviewService,
    activity: ActivityLogService,
    offset: FixedOffset,
}

impl HomeService {
    pub fn new(
        repo: Arc<dyn HomeConfigStore>,
        overview: OverviewService,
        activity: ActivityLogService,
        offset: FixedOffset,
    ) -> Self {
        Self { repo, overview, activity, offset }
    }

    pub async fn home_screen(&self, user: User, as_of: DateTime<Utc>) -> Result<HomeScreen, AppError> {
        let quick_overview = self.overview.compute(user.id, as_of).await?;
        let config = self.repo.load_or_create().await?;

        Ok(HomeScreen {
            greeting: greeting_for(as_of, self.offset),
            role: user.role,
            quick_access: role_shortcuts(user.role),
            config: role_config(user.role),
            dashboard: active_view(&config),
            quick_overview,
            user,
        })
    }

    pub async fn get_config(&self) -> Result<HomeConfig, AppError> {
        self.repo.load_or_create().await
    }

    /// Lê, altera e grava o agregado inteiro de uma vez.
    /// Se outra escrita chegou entre a leitura e a gravação, nada é gravado.
    pub async fn modify<F>(&self, actor: Actor, activity_type: &'static str, change: F) -> Result<HomeConfig, AppError>
    where
        F: FnOnce(&mut HomeConfig) -> Result<(), AppError>,
    {
        let mut config = self.repo.load_or_create().await?;
        let expected = config.updated_at;
        change(&mut config)?;
        let saved = self
            .repo
            .save_if_unchanged(&config, expected)
            .await?
            .ok_or(AppError::InvalidState("concurrent_update"))?;

        self.activity.record(NewActivity::new(
            actor.id,
            activity_type,
            EntityType::Dashboard,
            Uuid::nil(),
            format!("Home configuration changed ({})", activity_type),
        ));
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::memory::{DiscardSink, MemoryDashboardStore, MemoryHomeConfigStore};

    fn empty() -> HomeConfig {
        HomeConfig {
            quick_access: Vec::new(),
            upcoming_holidays: Vec::new(),
            updated_at: None,
        }
    }

    fn quick(title: &str, order: Option<i32>) -> QuickAccessPayload {
        QuickAccessPayload {
            title: title.into(),
            image: None,
            bg_color: None,
            route: Some(format!("/{}", title.to_lowercase())),
            order,
        }
    }

    #[test]
    fn active_items_are_sorted_by_order() {
        let mut config = empty();
        add_quick_access(&mut config, quick("Visitas", Some(3)));
        let hidden = add_quick_access(&mut config, quick("Oculto", Some(0)));
        add_quick_access(&mut config, quick("Despesas", Some(1)));
        toggle_quick_access(&mut config, hidden).unwrap();

        let view = active_view(&config);
        let titles: Vec<_> = view.quick_access.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Despesas", "Visitas"]);
    }

    #[test]
    fn default_order_is_the_position() {
        let mut config = empty();
        add_quick_access(&mut config, quick("A", None));
        add_quick_access(&mut config, quick("B", None));
        assert_eq!(config.quick_access[1].order, 1);
        assert_eq!(config.quick_access[0].bg_color, DEFAULT_BG_COLOR);
    }

    #[test]
    fn update_and_delete_unknown_items_fail() {
        let mut config = empty();
        let missing = Uuid::new_v4();
        assert!(matches!(
            update_quick_access(&mut config, missing, UpdateQuickAccessPayload::default()),
            Err(AppError::NotFound("quickAccessItem"))
        ));
        assert!(matches!(delete_holiday(&mut config, missing), Err(AppError::NotFound("holiday"))));
    }

    #[test]
    fn holidays_can_be_edited_toggled_and_removed() {
        let mut config = empty();
        let id = add_holiday(
            &mut config,
            HolidayPayload {
                title: "Diwali".into(),
                date: "2025-10-20".parse().unwrap(),
                image: None,
                order: None,
            },
        );

        update_holiday(
            &mut config,
            id,
            UpdateHolidayPayload { title: Some("Deepavali".into()), ..Default::default() },
        )
        .unwrap();
        assert_eq!(config.upcoming_holidays[0].title, "Deepavali");

        toggle_holiday(&mut config, id).unwrap();
        assert!(active_view(&config).upcoming_holidays.is_empty());

        delete_holiday(&mut config, id).unwrap();
        assert!(config.upcoming_holidays.is_empty());
    }

    fn home_service(store: Arc<MemoryHomeConfigStore>) -> HomeService {
        let offset = FixedOffset::east_opt(0).unwrap();
        let overview = OverviewService::new(Arc::new(MemoryDashboardStore::default()), offset);
        HomeService::new(store, overview, ActivityLogService::new(Arc::new(DiscardSink)), offset)
    }

    fn admin() -> Actor {
        Actor { id: Uuid::new_v4(), role: UserRole::Admin }
    }

    #[tokio::test]
    async fn modify_saves_the_changed_aggregate() {
        let store = Arc::new(MemoryHomeConfigStore::new("2025-06-01T00:00:00Z".parse().unwrap()));
        let svc = home_service(store.clone());

        let saved = svc
            .modify(admin(), "QUICK_ACCESS_ADDED", |config| {
                add_quick_access(config, quick("Visitas", None));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(saved.quick_access.len(), 1);
        assert_eq!(store.snapshot().quick_access.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_edit_is_not_overwritten() {
        let store = Arc::new(MemoryHomeConfigStore::new("2025-06-01T00:00:00Z".parse().unwrap()));
        let svc = home_service(store.clone());

        let err = svc
            .modify(admin(), "HOLIDAY_ADDED", |config| {
                // outro admin grava entre a leitura e a gravação
                store.touch();
                add_holiday(
                    config,
                    HolidayPayload {
                        title: "Holi".into(),
                        date: "2026-03-04".parse().unwrap(),
                        image: None,
                        order: None,
                    },
                );
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState("concurrent_update")));
        assert!(store.snapshot().upcoming_holidays.is_empty());
    }

    #[test]
    fn every_role_has_three_shortcuts_in_order() {
        for role in [UserRole::Admin, UserRole::Hr, UserRole::Finance, UserRole::Manager, UserRole::Executive] {
            let shortcuts = role_shortcuts(role);
            let orders: Vec<_> = shortcuts.iter().map(|s| s.order).collect();
            assert_eq!(orders, [1, 2, 3]);
            assert_eq!(role_config(role).widgets.len(), role_config(role).sections.len());
        }
        assert_eq!(role_shortcuts(UserRole::Finance)[1].route, "/finance/expenses");
    }
}
