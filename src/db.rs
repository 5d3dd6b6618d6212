pub mod store;
pub use store::{ActivitySink, ApprovalStore, DashboardStore, HomeConfigStore, OwnerScope, VisitScope};

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;
pub mod leave_repo;
pub use leave_repo::LeaveRepository;
pub mod master_repo;
pub use master_repo::MasterRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod home_config_repo;
pub use home_config_repo::HomeConfigRepository;
