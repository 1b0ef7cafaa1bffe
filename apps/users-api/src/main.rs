use axum_helpers::{
    JwtAuth,
    server::{create_production_app, create_router, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{BootstrapOutcome, EmailNotifier, PgUserRepository, UserService};
use email::{EmailService, SmtpProvider};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = database::postgres::connect_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<migration::Migrator>(&db)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let smtp = SmtpProvider::new(config.smtp.clone())?;
    let email = EmailService::new(Arc::new(smtp), config.email.clone())?;
    let users = UserService::new(
        PgUserRepository::new(db.clone()),
        Arc::new(EmailNotifier::new(email)),
    );

    if let Some(seed) = &config.admin {
        match users.ensure_admin(seed).await? {
            BootstrapOutcome::AlreadyPresent => info!("Admin bootstrap skipped"),
            BootstrapOutcome::Promoted(id) => info!(user_id = %id, "Admin bootstrap promoted account"),
            BootstrapOutcome::Created(id) => info!(user_id = %id, "Admin bootstrap created account"),
        }
    } else {
        info!("ADMIN_EMAIL not set, skipping admin bootstrap");
    }

    let jwt_auth = JwtAuth::new(&config.jwt);

    let state = AppState {
        config,
        db,
        users,
        jwt_auth,
    };

    let api_routes = api::routes(&state);

    // create_router adds /api prefix, docs and middleware
    let router = create_router::<openapi::ApiDoc>(api_routes).await?;

    // - /health: liveness with app name/version
    // - /ready: database round trip
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting users API");

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, async move {
        info!("Shutting down: closing database connections");
        match state.db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
