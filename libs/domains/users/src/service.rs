use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::access::{Action, Principal, authorize};
use crate::audit::AuditLogEntry;
use crate::bootstrap::{AdminSeed, BootstrapOutcome};
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, RegisterUser, Role, UpdateProfile, User, UserFilter, UserResponse};
use crate::notifier::UserNotifier;
use crate::repository::{AccountChange, ChangeOutcome, UserRepository};

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    notifier: Arc<dyn UserNotifier>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<R: UserRepository + 'static> UserService<R> {
    pub fn new(repository: R, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            repository: Arc::new(repository),
            notifier,
        }
    }

    /// Self-registration.
    ///
    /// The account starts as `anonymous` with a verification token; the
    /// verification email is sent in the background.
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserResponse> {
        input.validate()?;
        self.validate_password(&input.password)?;

        let password_hash = self.hash_password(&input.password)?;
        let token = generate_verification_token();

        let mut user = User::new(
            input.nickname,
            normalize_email(&input.email),
            password_hash,
            Role::Anonymous,
        );
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.verification_token = Some(token.clone());

        let created = self.repository.create(user).await?;
        info!(user_id = %created.id, "User registered");

        let notifier = Arc::clone(&self.notifier);
        let recipient = created.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.verification_requested(&recipient, &token).await {
                warn!(user_id = %recipient.id, error = %e, "Failed to send verification email");
            }
        });

        Ok(created.into())
    }

    /// Confirm the email address with the token sent at registration.
    ///
    /// Promotes `anonymous` to `authenticated`; other roles are kept.
    pub async fn verify_email(&self, user_id: Uuid, token: &str) -> UserResult<UserResponse> {
        let updated = self.repository.confirm_email(user_id, token).await?;
        info!(user_id = %updated.id, role = %updated.role, "Email verified");
        Ok(updated.into())
    }

    /// Create a verified account on behalf of staff.
    ///
    /// Only admins may create `admin` or `manager` accounts.
    pub async fn create_user(&self, actor: &Principal, input: CreateUser) -> UserResult<UserResponse> {
        authorize(actor, None, Action::CreateUser)?;

        let role = input.role.unwrap_or(Role::Authenticated);
        if role.is_staff() {
            authorize(actor, None, Action::ChangeRole)?;
        }

        input.validate()?;
        self.validate_password(&input.password)?;

        let password_hash = self.hash_password(&input.password)?;

        let mut user = User::new(input.nickname, normalize_email(&input.email), password_hash, role);
        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.email_verified = true;

        let created = self.repository.create(user).await?;
        info!(user_id = %created.id, actor_id = %actor.id, role = %created.role, "User created by staff");
        Ok(created.into())
    }

    /// Get a user by ID (self, or staff)
    pub async fn get_user(&self, actor: &Principal, id: Uuid) -> UserResult<UserResponse> {
        authorize(actor, Some(id), Action::ViewUser)?;

        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    /// The caller's own record
    pub async fn current_user(&self, actor: &Principal) -> UserResult<UserResponse> {
        self.get_user(actor, actor.id).await
    }

    /// List users with filters; returns the page and the total match count
    pub async fn list_users(
        &self,
        actor: &Principal,
        filter: UserFilter,
    ) -> UserResult<(Vec<UserResponse>, usize)> {
        authorize(actor, None, Action::ListUsers)?;

        let filter = filter.normalized();
        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter).await?;
        let responses: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();
        Ok((responses, total))
    }

    /// Partial profile update; self only
    pub async fn update_profile(
        &self,
        actor: &Principal,
        id: Uuid,
        input: UpdateProfile,
    ) -> UserResult<UserResponse> {
        authorize(actor, Some(id), Action::UpdateProfile)?;
        input.validate()?;

        let updated = self.repository.update_profile(id, input).await?;
        Ok(updated.into())
    }

    /// Grant professional status.
    ///
    /// # Behavior
    ///
    /// - staff only; denial has no side effects
    /// - already professional: returns the record unchanged, no audit entry,
    ///   no email
    /// - otherwise the flag and its audit entry are persisted together, then
    ///   the notification email is sent in the background; a failed email
    ///   does not undo the change
    pub async fn upgrade_professional_status(
        &self,
        actor: &Principal,
        id: Uuid,
    ) -> UserResult<UserResponse> {
        authorize(actor, Some(id), Action::UpgradeProfessionalStatus)?;

        let outcome = self
            .repository
            .apply_audited_change(id, AccountChange::GrantProfessionalStatus, actor.id)
            .await?;

        match outcome {
            ChangeOutcome::Applied { user, entry } => {
                info!(
                    user_id = %user.id,
                    actor_id = %actor.id,
                    audit_entry_id = %entry.id,
                    "Professional status granted"
                );

                let notifier = Arc::clone(&self.notifier);
                let recipient = user.clone();
                tokio::spawn(async move {
                    if let Err(e) = notifier.professional_status_granted(&recipient).await {
                        warn!(
                            user_id = %recipient.id,
                            error = %e,
                            "Failed to send professional status email"
                        );
                    }
                });

                Ok(user.into())
            }
            ChangeOutcome::Unchanged(user) => {
                info!(user_id = %user.id, "User is already professional");
                Ok(user.into())
            }
        }
    }

    /// Assign a role; admin only, never on oneself. Audited like the
    /// professional-status upgrade. Assigning the current role is a no-op.
    pub async fn change_role(&self, actor: &Principal, id: Uuid, role: Role) -> UserResult<UserResponse> {
        authorize(actor, Some(id), Action::ChangeRole)?;

        let outcome = self
            .repository
            .apply_audited_change(id, AccountChange::AssignRole(role), actor.id)
            .await?;

        if let ChangeOutcome::Applied { ref entry, .. } = outcome {
            info!(
                user_id = %id,
                actor_id = %actor.id,
                old_role = %entry.old_value,
                new_role = %entry.new_value,
                "Role changed"
            );
        }

        Ok(outcome.into_user().into())
    }

    /// Audit trail of one user, oldest first (staff only)
    pub async fn audit_log(&self, actor: &Principal, id: Uuid) -> UserResult<Vec<AuditLogEntry>> {
        authorize(actor, Some(id), Action::ViewAuditLog)?;

        if self.repository.get_by_id(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        self.repository.audit_entries(id).await
    }

    /// Make sure an admin account exists. Idempotent; meant to run once at
    /// startup.
    ///
    /// An existing account with the seed email is promoted through the
    /// audited role-change path, attributed to [`Principal::system`].
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> UserResult<BootstrapOutcome> {
        if self.repository.exists_with_role(Role::Admin).await? {
            info!("Admin account already present");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let email = normalize_email(&seed.email);
        if let Some(existing) = self.repository.get_by_email(&email).await? {
            let system = Principal::system();
            self.repository
                .apply_audited_change(existing.id, AccountChange::AssignRole(Role::Admin), system.id)
                .await?;

            info!(user_id = %existing.id, "Promoted existing account to admin");
            return Ok(BootstrapOutcome::Promoted(existing.id));
        }

        self.validate_password(&seed.password)?;
        let password_hash = self.hash_password(&seed.password)?;

        let mut admin = User::new(seed.nickname.clone(), email, password_hash, Role::Admin);
        admin.email_verified = true;

        let created = self.repository.create(admin).await?;
        info!(user_id = %created.id, "Created admin account");
        Ok(BootstrapOutcome::Created(created.id))
    }

    /// Check a password against the stored hash of `user_id`
    pub async fn verify_credentials(&self, user_id: Uuid, password: &str) -> UserResult<bool> {
        let user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        self.verify_password(password, &user.password_hash)
    }

    // Helper methods

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn validate_password(&self, password: &str) -> UserResult<()> {
        if password.len() < 8 {
            return Err(UserError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if password.len() > 128 {
            return Err(UserError::Validation(
                "Password cannot exceed 128 characters".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(UserError::Validation(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(UserError::Validation(
                "Password must contain at least one lowercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(UserError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }

        let special_chars = "!@#$%^&*()_+-=[]{}|;:,.<>?";
        if !password.chars().any(|c| special_chars.contains(c)) {
            return Err(UserError::Validation(
                "Password must contain at least one special character (!@#$%^&*()_+-=[]{}|;:,.<>?)".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 64 hex characters
fn generate_verification_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditRecorder, InMemoryAuditLog};
    use crate::notifier::MockUserNotifier;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const PASSWORD: &str = "Str0ng!pass";

    fn register_input(nickname: &str) -> RegisterUser {
        RegisterUser {
            nickname: nickname.to_string(),
            email: format!("{nickname}@Example.com"),
            password: PASSWORD.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    fn quiet_notifier() -> MockUserNotifier {
        let mut notifier = MockUserNotifier::new();
        notifier
            .expect_verification_requested()
            .returning(|_, _| Ok(()));
        notifier
            .expect_professional_status_granted()
            .returning(|_| Ok(()));
        notifier
    }

    async fn seed(repo: &InMemoryUserRepository, nickname: &str, role: Role) -> User {
        let mut user = User::new(nickname, format!("{nickname}@example.com"), "hash", role);
        user.email_verified = true;
        repo.create(user).await.unwrap()
    }

    #[test]
    fn test_verification_token_is_64_hex() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_verification_token());
    }

    #[test]
    fn test_password_policy() {
        let service = UserService::new(InMemoryUserRepository::new(), Arc::new(quiet_notifier()));

        assert!(service.validate_password(PASSWORD).is_ok());
        for weak in ["Sh0rt!", "alllower1!", "ALLUPPER1!", "NoDigits!!", "NoSpecial11"] {
            assert!(service.validate_password(weak).is_err(), "{weak}");
        }
        assert!(service.validate_password(&"Aa1!".repeat(40)).is_err());
    }

    #[tokio::test]
    async fn test_register_sends_verification_email() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut notifier = MockUserNotifier::new();
        notifier
            .expect_verification_requested()
            .times(1)
            .returning(move |user, token| {
                tx.send((user.email.clone(), token.to_string())).unwrap();
                Ok(())
            });

        let service = UserService::new(InMemoryUserRepository::new(), Arc::new(notifier));
        let user = service.register(register_input("ada")).await.unwrap();

        assert_eq!(user.role, Role::Anonymous);
        assert_eq!(user.email, "ada@example.com");
        assert!(!user.email_verified);

        let (email, token) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(token.len(), 64);
    }

    #[tokio::test]
    async fn test_register_survives_notification_failure() {
        let mut notifier = MockUserNotifier::new();
        notifier
            .expect_verification_requested()
            .returning(|_, _| Err(UserError::Notification("smtp down".into())));

        let service = UserService::new(InMemoryUserRepository::new(), Arc::new(notifier));
        assert!(service.register(register_input("ada")).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password_and_duplicates() {
        let service = UserService::new(InMemoryUserRepository::new(), Arc::new(quiet_notifier()));

        let mut weak = register_input("ada");
        weak.password = "password".into();
        assert!(matches!(service.register(weak).await, Err(UserError::Validation(_))));

        service.register(register_input("ada")).await.unwrap();

        let mut same_email = register_input("grace");
        same_email.email = "ADA@example.com".into();
        assert!(matches!(
            service.register(same_email).await,
            Err(UserError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_email_promotes_anonymous() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::new(repo.clone(), Arc::new(quiet_notifier()));
        let registered = service.register(register_input("ada")).await.unwrap();
        let token = repo
            .get_by_id(registered.id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();

        assert!(matches!(
            service.verify_email(registered.id, "wrong").await,
            Err(UserError::InvalidVerificationToken)
        ));

        let verified = service.verify_email(registered.id, &token).await.unwrap();
        assert!(verified.email_verified);
        assert_eq!(verified.role, Role::Authenticated);

        assert!(matches!(
            service.verify_email(registered.id, &token).await,
            Err(UserError::EmailAlreadyVerified)
        ));
    }

    #[tokio::test]
    async fn test_create_user_role_rules() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::new(repo.clone(), Arc::new(quiet_notifier()));
        let manager = Principal::from(&seed(&repo, "boss", Role::Manager).await);
        let admin = Principal::from(&seed(&repo, "root", Role::Admin).await);

        let input = |nickname: &str, role: Option<Role>| CreateUser {
            nickname: nickname.into(),
            email: format!("{nickname}@example.com"),
            password: PASSWORD.into(),
            first_name: None,
            last_name: None,
            role,
        };

        let created = service.create_user(&manager, input("staffer", None)).await.unwrap();
        assert_eq!(created.role, Role::Authenticated);
        assert!(created.email_verified);

        assert!(matches!(
            service
                .create_user(&manager, input("deputy", Some(Role::Manager)))
                .await,
            Err(UserError::PermissionDenied { .. })
        ));

        let deputy = service
            .create_user(&admin, input("deputy", Some(Role::Manager)))
            .await
            .unwrap();
        assert_eq!(deputy.role, Role::Manager);

        let member = Principal::new(created.id, Role::Authenticated);
        assert!(service.create_user(&member, input("nope", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_upgrade_records_audit_and_notifies_once() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let target = seed(&repo, "ada", Role::Authenticated).await;
        let manager = Principal::from(&seed(&repo, "boss", Role::Manager).await);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut notifier = MockUserNotifier::new();
        notifier
            .expect_professional_status_granted()
            .times(1)
            .returning(move |user| {
                tx.send(user.id).unwrap();
                Ok(())
            });

        let service = UserService::new(repo, Arc::new(notifier));

        let upgraded = service
            .upgrade_professional_status(&manager, target.id)
            .await
            .unwrap();
        assert!(upgraded.is_professional);
        assert!(upgraded.professional_status_updated_at.is_some());

        let again = service
            .upgrade_professional_status(&manager, target.id)
            .await
            .unwrap();
        assert!(again.is_professional);

        let notified = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(notified, Some(target.id));

        let entries = audit.entries_for(target.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_id, manager.id);
    }

    #[tokio::test]
    async fn test_upgrade_denied_for_non_staff() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let target = seed(&repo, "ada", Role::Authenticated).await;

        let mut notifier = MockUserNotifier::new();
        notifier.expect_professional_status_granted().never();
        let service = UserService::new(repo.clone(), Arc::new(notifier));

        let self_actor = Principal::from(&target);
        let err = service
            .upgrade_professional_status(&self_actor, target.id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UserError::PermissionDenied {
                action: Action::UpgradeProfessionalStatus
            }
        ));
        assert!(!repo.get_by_id(target.id).await.unwrap().unwrap().is_professional);
        assert!(audit.is_empty().await);
    }

    #[tokio::test]
    async fn test_upgrade_missing_user() {
        let audit = InMemoryAuditLog::new();
        let service = UserService::new(
            InMemoryUserRepository::with_audit_log(audit.clone()),
            Arc::new(quiet_notifier()),
        );
        let admin = Principal::new(Uuid::now_v7(), Role::Admin);
        let missing = Uuid::now_v7();

        let err = service
            .upgrade_professional_status(&admin, missing)
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(id) if id == missing));
        assert!(audit.is_empty().await);
    }

    #[tokio::test]
    async fn test_upgrade_fails_when_audit_unavailable() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let target = seed(&repo, "ada", Role::Authenticated).await;

        let mut notifier = MockUserNotifier::new();
        notifier.expect_professional_status_granted().never();
        let service = UserService::new(repo.clone(), Arc::new(notifier));

        audit.set_available(false);
        let err = service
            .upgrade_professional_status(&Principal::new(Uuid::now_v7(), Role::Admin), target.id)
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Storage(_)));
        assert!(!repo.get_by_id(target.id).await.unwrap().unwrap().is_professional);
    }

    #[tokio::test]
    async fn test_upgrade_succeeds_when_email_fails() {
        let repo = InMemoryUserRepository::new();
        let target = seed(&repo, "ada", Role::Authenticated).await;

        let mut notifier = MockUserNotifier::new();
        notifier
            .expect_professional_status_granted()
            .returning(|_| Err(UserError::Notification("smtp down".into())));
        let service = UserService::new(repo, Arc::new(notifier));

        let upgraded = service
            .upgrade_professional_status(&Principal::new(Uuid::now_v7(), Role::Manager), target.id)
            .await
            .unwrap();
        assert!(upgraded.is_professional);
    }

    #[tokio::test]
    async fn test_upgrade_propagates_storage_error_from_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_apply_audited_change()
            .returning(|_, _, _| Err(UserError::Storage("connection reset".into())));

        let service = UserService::new(repo, Arc::new(quiet_notifier()));
        let err = service
            .upgrade_professional_status(&Principal::new(Uuid::now_v7(), Role::Admin), Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Storage(_)));
    }

    #[tokio::test]
    async fn test_change_role_is_audited() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let target = seed(&repo, "ada", Role::Authenticated).await;
        let admin = Principal::from(&seed(&repo, "root", Role::Admin).await);
        let service = UserService::new(repo, Arc::new(quiet_notifier()));

        let updated = service.change_role(&admin, target.id, Role::Manager).await.unwrap();
        assert_eq!(updated.role, Role::Manager);

        // same role again: no new entry
        service.change_role(&admin, target.id, Role::Manager).await.unwrap();

        let entries = service.audit_log(&admin, target.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].old_value, "authenticated");
        assert_eq!(entries[0].new_value, "manager");

        assert!(matches!(
            service.change_role(&admin, admin.id, Role::Manager).await,
            Err(UserError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_profile_only_self() {
        let repo = InMemoryUserRepository::new();
        let target = seed(&repo, "ada", Role::Authenticated).await;
        let admin = Principal::from(&seed(&repo, "root", Role::Admin).await);
        let service = UserService::new(repo, Arc::new(quiet_notifier()));

        let update = UpdateProfile {
            bio: Some(Some("Analyst".into())),
            ..Default::default()
        };

        assert!(matches!(
            service.update_profile(&admin, target.id, update.clone()).await,
            Err(UserError::PermissionDenied { .. })
        ));

        let updated = service
            .update_profile(&Principal::from(&target), target.id, update)
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Analyst"));
    }

    #[tokio::test]
    async fn test_list_users_requires_staff_and_reports_total() {
        let repo = InMemoryUserRepository::new();
        let member = seed(&repo, "ada", Role::Authenticated).await;
        let manager = Principal::from(&seed(&repo, "boss", Role::Manager).await);
        let service = UserService::new(repo, Arc::new(quiet_notifier()));

        assert!(
            service
                .list_users(&Principal::from(&member), UserFilter::default())
                .await
                .is_err()
        );

        let (page, total) = service
            .list_users(
                &manager,
                UserFilter {
                    limit: 1,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let service = UserService::new(repo, Arc::new(quiet_notifier()));
        let seed = AdminSeed {
            email: "Root@Example.com".into(),
            nickname: "root".into(),
            password: PASSWORD.into(),
        };

        let first = service.ensure_admin(&seed).await.unwrap();
        assert!(matches!(first, BootstrapOutcome::Created(_)));

        let second = service.ensure_admin(&seed).await.unwrap();
        assert_eq!(second, BootstrapOutcome::AlreadyPresent);
        assert!(audit.is_empty().await);

        let BootstrapOutcome::Created(id) = first else {
            unreachable!()
        };
        assert!(service.verify_credentials(id, PASSWORD).await.unwrap());
        assert!(!service.verify_credentials(id, "Wr0ng!pass").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing_account() {
        let audit = InMemoryAuditLog::new();
        let repo = InMemoryUserRepository::with_audit_log(audit.clone());
        let existing = seed(&repo, "root", Role::Authenticated).await;
        let service = UserService::new(repo.clone(), Arc::new(quiet_notifier()));

        let outcome = service
            .ensure_admin(&AdminSeed {
                email: existing.email.clone(),
                nickname: "ignored".into(),
                password: PASSWORD.into(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, BootstrapOutcome::Promoted(existing.id));
        assert_eq!(repo.get_by_id(existing.id).await.unwrap().unwrap().role, Role::Admin);

        let entries = audit.entries_for(existing.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_id, Uuid::nil());
    }
}
