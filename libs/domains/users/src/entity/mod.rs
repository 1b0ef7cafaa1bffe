//! SeaORM entities for the `users` and `audit_logs` tables.

pub mod audit_log;
pub mod user;

/// OpenAPI tag shared by the users endpoints
pub const TAG: &str = "users";
