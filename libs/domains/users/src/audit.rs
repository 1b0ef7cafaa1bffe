//! Append-only audit trail of role and professional-status changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strum::Display;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{UserError, UserResult};

/// Audited user field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditField {
    #[sea_orm(string_value = "role")]
    Role,
    #[sea_orm(string_value = "professional_status")]
    ProfessionalStatus,
}

/// One recorded change. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Nil for changes made by the startup bootstrap
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub field: AuditField,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(
        actor_id: Uuid,
        target_id: Uuid,
        field: AuditField,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            actor_id,
            target_id,
            field,
            old_value: old_value.into(),
            new_value: new_value.into(),
            created_at: Utc::now(),
        }
    }
}

/// Audit storage.
///
/// `record` failing means the change it describes must not be applied.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, entry: AuditLogEntry) -> UserResult<()>;

    /// Entries for one user, oldest first
    async fn entries_for(&self, target_id: Uuid) -> UserResult<Vec<AuditLogEntry>>;
}

/// In-memory audit log. Clones share the same entries.
///
/// [`set_available`](Self::set_available) simulates an outage: while
/// unavailable every call fails with [`UserError::Storage`].
#[derive(Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn ensure_available(&self) -> UserResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(UserError::Storage("audit log unavailable".to_string()))
        }
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditRecorder for InMemoryAuditLog {
    async fn record(&self, entry: AuditLogEntry) -> UserResult<()> {
        self.ensure_available()?;

        tracing::debug!(
            entry_id = %entry.id,
            target_id = %entry.target_id,
            field = %entry.field,
            "Recorded audit entry"
        );
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn entries_for(&self, target_id: Uuid) -> UserResult<Vec<AuditLogEntry>> {
        self.ensure_available()?;

        let entries = self.entries.read().await;
        let mut matching: Vec<_> = entries
            .iter()
            .filter(|e| e.target_id == target_id)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.created_at);
        Ok(matching)
    }
}
