// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::create_user,
        handlers::users::deactivate_user,

        // --- Visits ---
        handlers::visits::create_planned,
        handlers::visits::create_unplanned,
        handlers::visits::list_visits,
        handlers::visits::get_visit,
        handlers::visits::check_in,
        handlers::visits::check_out,
        handlers::visits::cancel_visit,

        // --- Expenses ---
        handlers::expenses::create_expense,
        handlers::expenses::attach_receipt,
        handlers::expenses::list_expenses,
        handlers::expenses::get_expense,
        handlers::expenses::approve_expense,
        handlers::expenses::reject_expense,

        // --- Leaves ---
        handlers::leaves::apply_leave,
        handlers::leaves::list_leaves,
        handlers::leaves::get_leave,
        handlers::leaves::approve_leave,
        handlers::leaves::reject_leave,

        // --- Masters ---
        handlers::masters::list_masters,
        handlers::masters::create_master,
        handlers::masters::update_master,
        handlers::masters::deactivate_master,
        handlers::masters::create_sub_master,
        handlers::masters::update_sub_master,
        handlers::masters::deactivate_sub_master,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::get_overview,
        handlers::dashboard::get_activities,
        handlers::dashboard::get_home,

        // --- Home Config ---
        handlers::home_config::get_config,
        handlers::home_config::get_role_config,
        handlers::home_config::add_quick_access,
        handlers::home_config::update_quick_access,
        handlers::home_config::toggle_quick_access,
        handlers::home_config::delete_quick_access,
        handlers::home_config::add_holiday,
        handlers::home_config::update_holiday,
        handlers::home_config::toggle_holiday,
        handlers::home_config::delete_holiday,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::CreateUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Approval ---
            models::approval::ApprovalStage,
            models::approval::StageStatus,
            models::approval::WorkflowStatus,
            models::approval::StageApproval,
            models::approval::ApprovalPayload,

            // --- Visits ---
            models::visit::VisitType,
            models::visit::VisitStatus,
            models::visit::GeoPoint,
            models::visit::Visit,
            models::visit::CreatePlannedVisitPayload,
            models::visit::CreateUnplannedVisitPayload,
            models::visit::CheckPayload,
            models::visit::CancelVisitPayload,

            // --- Expenses ---
            models::expense::Expense,
            models::expense::CreateExpensePayload,
            models::expense::AttachReceiptPayload,
            models::expense::ExpenseListResponse,

            // --- Leaves ---
            models::leave::Leave,
            models::leave::ApplyLeavePayload,

            // --- Masters ---
            models::master::RateUnit,
            models::master::ExpenseMaster,
            models::master::ExpenseSubMaster,
            models::master::MasterWithSubs,
            models::master::CreateMasterPayload,
            models::master::UpdateMasterPayload,
            models::master::CreateSubMasterPayload,
            models::master::UpdateSubMasterPayload,

            // --- Activity ---
            models::activity::EntityType,
            models::activity::ActivityLog,

            // --- Dashboard ---
            models::dashboard::MonthlyExpense,
            models::dashboard::LastVisit,
            models::dashboard::QuickOverview,
            models::dashboard::ExecutiveMonthly,
            models::dashboard::ExecutiveDashboard,
            models::dashboard::ManagerMonthly,
            models::dashboard::FinanceMonthly,
            models::dashboard::HrMonthly,
            models::dashboard::AdminMonthly,
            models::dashboard::RoleDashboardData,
            models::dashboard::WidgetSection,
            models::dashboard::RoleWidgetConfig,
            models::dashboard::RoleShortcut,
            models::dashboard::HomeScreen,
            models::dashboard::AdminHomeConfig,
            models::dashboard::RoleConfigResponse,

            // --- Home Config ---
            models::home::QuickAccessItem,
            models::home::Holiday,
            models::home::HomeConfig,
            models::home::ActiveHomeConfig,
            models::home::QuickAccessPayload,
            models::home::UpdateQuickAccessPayload,
            models::home::HolidayPayload,
            models::home::UpdateHolidayPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Cadastro pela Administração"),
        (name = "Visits", description = "Visitas de Campo, Check-in e Check-out"),
        (name = "Expenses", description = "Despesas e Fluxo Gerente → Financeiro → RH"),
        (name = "Leaves", description = "Licenças e Fluxo Gerente → RH"),
        (name = "Masters", description = "Categorias e Itens de Despesa"),
        (name = "Dashboard", description = "Visão Rápida, Resumo por Papel e Tela Inicial"),
        (name = "Home Config", description = "Atalhos e Feriados da Tela Inicial")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
