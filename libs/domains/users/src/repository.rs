use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::audit::{AuditField, AuditLogEntry, AuditRecorder, InMemoryAuditLog};
use crate::error::{UserError, UserResult};
use crate::models::{ProfessionalStatus, Role, UpdateProfile, User, UserFilter};

/// A state change that is written together with its audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    GrantProfessionalStatus,
    AssignRole(Role),
}

impl AccountChange {
    /// Apply the change to `user` and describe it.
    ///
    /// Returns `None` (and leaves `user` untouched) when the change would not
    /// alter anything.
    pub fn apply(self, user: &mut User, actor_id: Uuid, now: DateTime<Utc>) -> Option<AuditLogEntry> {
        let (field, old_value, new_value) = match self {
            AccountChange::GrantProfessionalStatus => {
                if user.is_professional {
                    return None;
                }
                user.is_professional = true;
                user.professional_status_updated_at = Some(now);
                (
                    AuditField::ProfessionalStatus,
                    ProfessionalStatus::Standard.to_string(),
                    ProfessionalStatus::Professional.to_string(),
                )
            }
            AccountChange::AssignRole(role) => {
                if user.role == role {
                    return None;
                }
                let old = user.role;
                user.role = role;
                (AuditField::Role, old.to_string(), role.to_string())
            }
        };

        user.updated_at = now;

        let mut entry = AuditLogEntry::new(actor_id, user.id, field, old_value, new_value);
        entry.created_at = now;
        Some(entry)
    }
}

/// Result of [`UserRepository::apply_audited_change`]
#[derive(Debug, Clone)]
pub enum ChangeOutcome {
    /// User and audit entry were written together
    Applied { user: User, entry: AuditLogEntry },
    /// Nothing to do; no audit entry was written
    Unchanged(User),
}

impl ChangeOutcome {
    pub fn user(&self) -> &User {
        match self {
            ChangeOutcome::Applied { user, .. } | ChangeOutcome::Unchanged(user) => user,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            ChangeOutcome::Applied { user, .. } | ChangeOutcome::Unchanged(user) => user,
        }
    }
}

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; email and nickname must be unused
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List users with optional filters, newest first
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Count users matching the filter (pagination ignored)
    async fn count(&self, filter: UserFilter) -> UserResult<usize>;

    /// Apply a profile update to the stored user.
    ///
    /// Writes only the profile columns and `updated_at`, against the current
    /// row, so it cannot undo a concurrent audited change.
    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> UserResult<User>;

    /// Check `token` and mark the email verified (see [`User::confirm_email`]).
    ///
    /// Serialized with [`UserRepository::apply_audited_change`] so the
    /// `anonymous` promotion never overwrites a role assigned meanwhile.
    async fn confirm_email(&self, id: Uuid, token: &str) -> UserResult<User>;

    /// Whether any user holds `role`
    async fn exists_with_role(&self, role: Role) -> UserResult<bool>;

    /// Apply `change` to the target and record it in the audit log as one
    /// unit: either both are persisted or neither is.
    ///
    /// Changes to the same target are serialized.
    async fn apply_audited_change(
        &self,
        target_id: Uuid,
        change: AccountChange,
        actor_id: Uuid,
    ) -> UserResult<ChangeOutcome>;

    /// Audit entries for a user, oldest first
    async fn audit_entries(&self, target_id: Uuid) -> UserResult<Vec<AuditLogEntry>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    audit: Arc<dyn AuditRecorder>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::with_audit_log(InMemoryAuditLog::new())
    }

    /// Use `audit` for audit entries; keep a clone to inspect or toggle it
    pub fn with_audit_log(audit: InMemoryAuditLog) -> Self {
        Self::with_recorder(Arc::new(audit))
    }

    pub fn with_recorder(audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            audit,
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique(users: &HashMap<Uuid, User>, user: &User) -> UserResult<()> {
    for other in users.values().filter(|u| u.id != user.id) {
        if other.email.eq_ignore_ascii_case(&user.email) {
            return Err(UserError::DuplicateEmail(user.email.clone()));
        }
        if other.nickname == user.nickname {
            return Err(UserError::DuplicateNickname(user.nickname.clone()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        check_unique(&users, &user)?;
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        Ok(user)
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();

        // Sort by created_at descending (newest first)
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<usize> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count())
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        user.apply_profile_update(update, Utc::now());

        tracing::info!(user_id = %id, "Updated profile");
        Ok(user.clone())
    }

    async fn confirm_email(&self, id: Uuid, token: &str) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;

        user.confirm_email(token, Utc::now())?;

        tracing::info!(user_id = %id, role = %user.role, "Confirmed email");
        Ok(user.clone())
    }

    async fn exists_with_role(&self, role: Role) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.role == role))
    }

    async fn apply_audited_change(
        &self,
        target_id: Uuid,
        change: AccountChange,
        actor_id: Uuid,
    ) -> UserResult<ChangeOutcome> {
        // Held until the user is written back; this is what serializes
        // concurrent changes to the same target.
        let mut users = self.users.write().await;

        let mut user = users
            .get(&target_id)
            .cloned()
            .ok_or(UserError::NotFound(target_id))?;

        let Some(entry) = change.apply(&mut user, actor_id, Utc::now()) else {
            return Ok(ChangeOutcome::Unchanged(user));
        };

        // The audit write decides whether the change lands at all
        self.audit.record(entry.clone()).await?;
        users.insert(user.id, user.clone());

        tracing::info!(
            user_id = %user.id,
            actor_id = %actor_id,
            field = %entry.field,
            new_value = %entry.new_value,
            "Applied audited change"
        );
        Ok(ChangeOutcome::Applied { user, entry })
    }

    async fn audit_entries(&self, target_id: Uuid) -> UserResult<Vec<AuditLogEntry>> {
        self.audit.entries_for(target_id).await
    }
}
