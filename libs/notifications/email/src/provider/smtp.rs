//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use eyre::{Result, WrapErr};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;

/// SMTP provider configuration
///
/// Environment variables:
/// - `SMTP_HOST` (default: localhost)
/// - `SMTP_PORT` (default: 1025, Mailpit)
/// - `SMTP_USERNAME` / `SMTP_PASSWORD` (optional)
/// - `SMTP_USE_TLS` (default: false)
/// - `EMAIL_FROM_ADDRESS` (default: noreply@localhost)
/// - `EMAIL_FROM_NAME` (default: Users)
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", "1025")?,
            username: env_optional("SMTP_USERNAME"),
            password: env_optional("SMTP_PASSWORD"),
            from_email: env_or_default("EMAIL_FROM_ADDRESS", "noreply@localhost"),
            from_name: env_or_default("EMAIL_FROM_NAME", "Users"),
            use_tls: env_parse("SMTP_USE_TLS", "false")?,
        })
    }
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let credentials = config
            .username
            .clone()
            .map(|user| Credentials::new(user, config.password.clone().unwrap_or_default()));

        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
        } else {
            // Plain connection (Mailpit/Mailhog in development)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port);

        if let Some(creds) = credentials {
            builder = builder.credentials(creds);
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            tls = config.use_tls,
            "SMTP provider configured"
        );

        Ok(Self {
            transport: builder.build(),
            config: Arc::new(config),
        })
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .wrap_err("Invalid from address")?;

        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            let reply_to_mailbox: Mailbox =
                reply_to.parse().wrap_err("Invalid reply-to address")?;
            builder = builder.reply_to(reply_to_mailbox);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        self.transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".into(),
            port: 1025,
            username: None,
            password: None,
            from_email: "noreply@example.com".into(),
            from_name: "Users".into(),
            use_tls: false,
        }
    }

    #[test]
    fn test_config_defaults_to_mailpit() {
        temp_env::with_vars_unset(
            ["SMTP_HOST", "SMTP_PORT", "SMTP_USERNAME", "SMTP_USE_TLS"],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.host, "localhost");
                assert_eq!(config.port, 1025);
                assert!(config.username.is_none());
                assert!(!config.use_tls);
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_port() {
        temp_env::with_var("SMTP_PORT", Some("smtp"), || {
            assert!(SmtpConfig::from_env().is_err());
        });
    }

    #[tokio::test]
    async fn test_build_message_requires_body() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("ada@example.com", "Empty");

        assert!(provider.build_message(&email).is_err());
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("not an address", "Hi").with_text("Body");

        assert!(provider.build_message(&email).is_err());
    }

    #[tokio::test]
    async fn test_build_multipart_message() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("ada@example.com", "Hi")
            .with_text("Body")
            .with_html("<p>Body</p>");

        let message = provider.build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
    }
}
