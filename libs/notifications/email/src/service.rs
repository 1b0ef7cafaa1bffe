//! Renders account emails and hands them to the configured provider.

use crate::error::NotificationResult;
use crate::models::Email;
use crate::provider::EmailProvider;
use crate::templates::{EMAIL_VERIFICATION, PROFESSIONAL_STATUS_GRANTED, TemplateEngine};
use core_config::{ConfigError, FromEnv, env_or_default};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Links and branding used in rendered emails.
///
/// Environment variables:
/// - `APP_NAME` (default: Users)
/// - `PUBLIC_API_URL` (default: http://localhost:8080), base of verification links
/// - `FRONTEND_URL` (default: http://localhost:3000), base of profile links
#[derive(Debug, Clone)]
pub struct EmailServiceConfig {
    pub app_name: String,
    pub public_api_url: String,
    pub frontend_url: String,
}

impl Default for EmailServiceConfig {
    fn default() -> Self {
        Self {
            app_name: "Users".to_string(),
            public_api_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl FromEnv for EmailServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app_name: env_or_default("APP_NAME", "Users"),
            public_api_url: env_or_default("PUBLIC_API_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            frontend_url: env_or_default("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[derive(Clone)]
pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    config: EmailServiceConfig,
}

impl EmailService {
    pub fn new(provider: Arc<dyn EmailProvider>, config: EmailServiceConfig) -> NotificationResult<Self> {
        Ok(Self {
            provider,
            templates: Arc::new(TemplateEngine::new()?),
            config,
        })
    }

    pub fn verification_link(&self, user_id: Uuid, token: &str) -> String {
        format!(
            "{}/api/users/{user_id}/verify-email/{token}",
            self.config.public_api_url
        )
    }

    /// Send the `email_verification` template with the API verification link.
    pub async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        user_id: Uuid,
        token: &str,
    ) -> NotificationResult<String> {
        let data = json!({
            "name": name,
            "app_name": self.config.app_name,
            "verification_link": self.verification_link(user_id, token),
        });

        self.send_template(to, EMAIL_VERIFICATION, &data).await
    }

    pub async fn send_professional_status_email(
        &self,
        to: &str,
        name: &str,
        user_id: Uuid,
    ) -> NotificationResult<String> {
        let data = json!({
            "name": name,
            "app_name": self.config.app_name,
            "profile_link": format!("{}/users/{user_id}", self.config.frontend_url),
        });

        self.send_template(to, PROFESSIONAL_STATUS_GRANTED, &data).await
    }

    /// Render `template` and send it; returns the provider message id.
    async fn send_template(&self, to: &str, template: &str, data: &serde_json::Value) -> NotificationResult<String> {
        let rendered = self.templates.render(template, data)?;

        let mut email = Email::new(to, rendered.subject).with_template(template);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;

        let result = self.provider.send(&email).await?;

        info!(
            email_id = %email.id,
            template,
            provider = self.provider.name(),
            message_id = %result.message_id,
            "Email dispatched"
        );

        Ok(result.message_id)
    }

    pub async fn health_check(&self) -> NotificationResult<()> {
        Ok(self.provider.health_check().await?)
    }
}
