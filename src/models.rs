pub mod activity;
pub mod approval;
pub mod auth;
pub mod dashboard;
pub mod expense;
pub mod home;
pub mod leave;
pub mod master;
pub mod visit;
