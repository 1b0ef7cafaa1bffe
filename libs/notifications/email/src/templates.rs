//! Handlebars email templates.
//!
//! [`TemplateEngine::new`] registers the account templates:
//! - `email_verification`: `name`, `app_name`, `verification_link`
//! - `professional_status_granted`: `name`, `app_name`, `profile_link`

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

pub const EMAIL_VERIFICATION: &str = "email_verification";
pub const PROFESSIONAL_STATUS_GRANTED: &str = "professional_status_granted";

#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Template definition; each part is a Handlebars source string
#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Handlebars-based template engine.
///
/// Runs in strict mode, so a missing variable is an error instead of an
/// empty string.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let mut engine = Self {
            handlebars,
            templates: HashMap::new(),
        };
        engine.register_defaults()?;

        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> NotificationResult<()> {
        let parts = [
            ("subject", Some(&template.subject)),
            ("text", template.body_text.as_ref()),
            ("html", template.body_html.as_ref()),
        ];

        for (part, source) in parts {
            if let Some(source) = source {
                self.handlebars
                    .register_template_string(&format!("{}_{part}", template.name), source)
                    .map_err(|e| {
                        NotificationError::Template(format!(
                            "failed to register {part} of '{}': {e}",
                            template.name
                        ))
                    })?;
            }
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render(&self, name: &str, data: &Value) -> NotificationResult<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| NotificationError::Template(format!("template not found: {name}")))?;

        let render_part = |part: &str| {
            self.handlebars
                .render(&format!("{name}_{part}"), data)
                .map_err(|e| {
                    NotificationError::Template(format!("failed to render {part} of '{name}': {e}"))
                })
        };

        Ok(RenderedTemplate {
            subject: render_part("subject")?,
            body_text: template
                .body_text
                .as_ref()
                .map(|_| render_part("text"))
                .transpose()?,
            body_html: template
                .body_html
                .as_ref()
                .map(|_| render_part("html"))
                .transpose()?,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn register_defaults(&mut self) -> NotificationResult<()> {
        self.register(EmailTemplate {
            name: EMAIL_VERIFICATION.to_string(),
            subject: "Verify your email for {{app_name}}".to_string(),
            body_text: Some(
                r#"Hello {{name}},

Please verify your email address by opening the link below:

{{verification_link}}

If you didn't create an account, you can safely ignore this email.

Best regards,
The {{app_name}} Team"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Verify Your Email</h1>
    <p>Hello {{name}},</p>
    <p>Please verify your email address by clicking the button below:</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{{verification_link}}"
           style="background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
            Verify Email
        </a>
    </p>
    <p style="color: #666; font-size: 14px;">If you didn't create an account, you can safely ignore this email.</p>
    <p>Best regards,<br>The {{app_name}} Team</p>
</body>
</html>"#
                    .to_string(),
            ),
        })?;

        self.register(EmailTemplate {
            name: PROFESSIONAL_STATUS_GRANTED.to_string(),
            subject: "Your {{app_name}} account is now professional".to_string(),
            body_text: Some(
                r#"Hello {{name}},

Your account has been upgraded to professional status.

View your profile: {{profile_link}}

Best regards,
The {{app_name}} Team"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Professional Status Granted</h1>
    <p>Hello {{name}},</p>
    <p>Your account has been upgraded to <strong>professional</strong> status.</p>
    <p><a href="{{profile_link}}">View your profile</a></p>
    <p>Best regards,<br>The {{app_name}} Team</p>
</body>
</html>"#
                    .to_string(),
            ),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.has_template(EMAIL_VERIFICATION));
        assert!(engine.has_template(PROFESSIONAL_STATUS_GRANTED));
        assert!(!engine.has_template("welcome"));
    }

    #[test]
    fn test_verification_rendering() {
        let engine = TemplateEngine::new().unwrap();

        let data = serde_json::json!({
            "name": "Ada",
            "app_name": "Users",
            "verification_link": "https://users.example.com/api/users/1/verify-email/abc",
        });

        let rendered = engine.render(EMAIL_VERIFICATION, &data).unwrap();

        assert_eq!(rendered.subject, "Verify your email for Users");
        assert!(rendered.body_text.unwrap().contains("/verify-email/abc"));
        assert!(rendered.body_html.unwrap().contains("Hello Ada"));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let engine = TemplateEngine::new().unwrap();
        let data = serde_json::json!({ "name": "Ada" });

        let err = engine.render(PROFESSIONAL_STATUS_GRANTED, &data).unwrap_err();
        assert!(matches!(err, NotificationError::Template(_)));
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope", &serde_json::json!({})).is_err());
    }

    #[test]
    fn test_custom_template() {
        let mut engine = TemplateEngine::new().unwrap();

        engine
            .register(EmailTemplate {
                name: "custom".to_string(),
                subject: "Custom: {{title}}".to_string(),
                body_text: Some("{{content}}".to_string()),
                body_html: None,
            })
            .unwrap();

        let rendered = engine
            .render(
                "custom",
                &serde_json::json!({ "title": "Test", "content": "Hello World" }),
            )
            .unwrap();
        assert_eq!(rendered.subject, "Custom: Test");
        assert_eq!(rendered.body_text.unwrap(), "Hello World");
        assert!(rendered.body_html.is_none());
    }
}
