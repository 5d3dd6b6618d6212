pub mod activity_service;
pub mod approval;
pub mod auth;
pub mod dashboard_service;
pub mod expense_service;
pub mod home_service;
pub mod leave_service;
pub mod master_service;
pub mod overview_service;
pub mod visit_service;
