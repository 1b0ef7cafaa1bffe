//! Transactional email for the users service.
//!
//! - **Models**: [`Email`]
//! - **Providers**: [`SmtpProvider`] (lettre) and [`MockSmtpProvider`] for tests
//! - **Templates**: Handlebars [`TemplateEngine`] with the account templates
//!   pre-registered
//! - **Service**: [`EmailService`] renders a template and hands it to a provider
//!
//! ```ignore
//! use email::{EmailService, EmailServiceConfig, SmtpConfig, SmtpProvider};
//! use core_config::FromEnv;
//!
//! let provider = SmtpProvider::new(SmtpConfig::from_env()?)?;
//! let service = EmailService::new(Arc::new(provider), EmailServiceConfig::from_env()?)?;
//! service.send_verification_email("ada@example.com", "Ada", user_id, &token).await?;
//! ```

pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod templates;

pub use error::{NotificationError, NotificationResult};
pub use models::Email;
pub use provider::{EmailProvider, MockSmtpProvider, SendResult, SmtpConfig, SmtpProvider};
pub use service::{EmailService, EmailServiceConfig};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
