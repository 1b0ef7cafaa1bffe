//! Audit logging for security-relevant events.
//!
//! Events are emitted on the `audit` tracing target so the subscriber can
//! route them separately from application logs.
//!
//! # Example
//! ```ignore
//! use axum_helpers::audit::{AuditEvent, AuditOutcome};
//!
//! AuditEvent::new(
//!     Some(actor_id.to_string()),
//!     "user.update_profile",
//!     Some(format!("user:{target_id}")),
//!     AuditOutcome::Denied,
//! )
//! .with_details(json!({"role": "manager"}))
//! .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    /// Action failed (bad credentials, storage error)
    Failure,
    /// Action was refused by authorization
    Denied,
}

/// Structured audit event; build it, then call [`AuditEvent::log`].
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Acting user, if known
    pub user_id: Option<String>,
    /// Action identifier (e.g. "user.change_role")
    pub action: String,
    /// Resource affected (e.g. "user:0190...")
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    /// Attach extra context, serialized to JSON.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Emit the event on the `audit` target.
    pub fn log(self) {
        match self.outcome {
            AuditOutcome::Success => tracing::info!(
                target: "audit",
                user_id = self.user_id,
                action = %self.action,
                resource = self.resource,
                outcome = "success",
                ip = self.ip_address,
                details = ?self.details,
                "audit event"
            ),
            AuditOutcome::Failure | AuditOutcome::Denied => tracing::warn!(
                target: "audit",
                user_id = self.user_id,
                action = %self.action,
                resource = self.resource,
                outcome = if self.outcome == AuditOutcome::Denied { "denied" } else { "failure" },
                ip = self.ip_address,
                details = ?self.details,
                "audit event"
            ),
        }
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}
