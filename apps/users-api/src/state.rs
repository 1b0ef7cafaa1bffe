//! Shared application state.

use axum_helpers::JwtAuth;
use domain_users::{PgUserRepository, UserService};
use sea_orm::DatabaseConnection;

/// Cloned into each router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
    pub users: UserService<PgUserRepository>,
    /// Verifies bearer tokens on protected routes
    pub jwt_auth: JwtAuth,
}
