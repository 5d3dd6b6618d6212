pub mod auth;
pub mod dashboard;
pub mod expenses;
pub mod home_config;
pub mod leaves;
pub mod masters;
pub mod users;
pub mod visits;
