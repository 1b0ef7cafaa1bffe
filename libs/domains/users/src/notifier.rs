//! Outbound account notifications.

use async_trait::async_trait;
use email::EmailService;

use crate::error::UserResult;
use crate::models::User;

/// Notifications sent as side effects of account operations.
///
/// Callers dispatch these on a spawned task and only log failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// Ask the user to confirm their email address with `token`
    async fn verification_requested(&self, user: &User, token: &str) -> UserResult<()>;

    async fn professional_status_granted(&self, user: &User) -> UserResult<()>;
}

/// [`UserNotifier`] backed by the `email` crate's templates and provider
#[derive(Clone)]
pub struct EmailNotifier {
    email: EmailService,
}

impl EmailNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email }
    }
}

#[async_trait]
impl UserNotifier for EmailNotifier {
    async fn verification_requested(&self, user: &User, token: &str) -> UserResult<()> {
        self.email
            .send_verification_email(&user.email, user.display_name(), user.id, token)
            .await?;
        Ok(())
    }

    async fn professional_status_granted(&self, user: &User) -> UserResult<()> {
        self.email
            .send_professional_status_email(&user.email, user.display_name(), user.id)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use crate::models::Role;
    use email::templates::{EMAIL_VERIFICATION, PROFESSIONAL_STATUS_GRANTED};
    use email::{EmailServiceConfig, MockSmtpProvider};
    use std::sync::Arc;

    fn notifier(provider: MockSmtpProvider) -> EmailNotifier {
        EmailNotifier::new(
            EmailService::new(Arc::new(provider), EmailServiceConfig::default()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_verification_email_uses_token() {
        let provider = MockSmtpProvider::new();
        let user = User::new("ada", "ada@example.com", "hash", Role::Anonymous);

        notifier(provider.clone())
            .verification_requested(&user, "abc123")
            .await
            .unwrap();

        let sent = provider
            .sent_with_template("ada@example.com", EMAIL_VERIFICATION)
            .await;
        assert_eq!(sent.len(), 1);
        assert!(
            sent[0]
                .body_text
                .as_deref()
                .unwrap()
                .contains(&format!("/api/users/{}/verify-email/abc123", user.id))
        );
    }

    #[tokio::test]
    async fn test_professional_status_email_greets_by_first_name() {
        let provider = MockSmtpProvider::new();
        let mut user = User::new("ada", "ada@example.com", "hash", Role::Authenticated);
        user.first_name = Some("Ada".into());

        notifier(provider.clone())
            .professional_status_granted(&user)
            .await
            .unwrap();

        let sent = provider
            .sent_with_template("ada@example.com", PROFESSIONAL_STATUS_GRANTED)
            .await;
        assert!(sent[0].body_text.as_deref().unwrap().contains("Hello Ada"));
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_notification_error() {
        let user = User::new("ada", "ada@example.com", "hash", Role::Authenticated);

        let err = notifier(MockSmtpProvider::failing("smtp down"))
            .professional_status_granted(&user)
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Notification(_)));
    }
}
