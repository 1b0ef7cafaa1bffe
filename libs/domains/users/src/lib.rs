//! Users Domain
//!
//! Account management with role-based access control and an audited
//! professional-status workflow.
//!
//! # Features
//!
//! - Self-registration with email verification
//! - Role-based access guard over every account operation
//! - Professional-status upgrade: staff only, idempotent, audited,
//!   notifies the user by email
//! - Role assignment, audited the same way
//! - Startup admin provisioning
//! - Password hashing with Argon2
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, JWT → Principal
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │   Service   │ ──► │  Notifier   │  ← background email
//! └──────┬──────┘     └─────────────┘
//!        │ authorize()
//! ┌──────▼──────┐
//! │ Repository  │  ← user record + audit entry committed together
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{EmailNotifier, InMemoryUserRepository, UserService, handlers};
//! use email::{EmailService, EmailServiceConfig, MockSmtpProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let email = EmailService::new(Arc::new(MockSmtpProvider::new()), EmailServiceConfig::default())?;
//! let service = UserService::new(
//!     InMemoryUserRepository::new(),
//!     Arc::new(EmailNotifier::new(email)),
//! );
//!
//! let auth = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-32-characters!!")?);
//! let router = handlers::router(service, auth);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod audit;
pub mod bootstrap;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use access::{Action, Capability, Principal, authorize};
pub use audit::{AuditField, AuditLogEntry, AuditRecorder, InMemoryAuditLog};
pub use bootstrap::{AdminSeed, BootstrapOutcome};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    ChangeRole, CreateUser, Link, ProfessionalStatus, RegisterUser, Role, UpdateProfile, User,
    UserFilter, UserList, UserResponse,
};
pub use notifier::{EmailNotifier, UserNotifier};
pub use postgres::{PgAuditLog, PgUserRepository};
pub use repository::{AccountChange, ChangeOutcome, InMemoryUserRepository, UserRepository};
pub use service::UserService;
