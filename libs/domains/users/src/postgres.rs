use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditLogEntry, AuditRecorder},
    entity::{audit_log, user},
    error::{UserError, UserResult},
    models::{Role, UpdateProfile, User, UserFilter},
    repository::{AccountChange, ChangeOutcome, UserRepository},
};

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filter: &UserFilter) -> Select<user::Entity> {
        let mut query = user::Entity::find();

        if let Some(ref email) = filter.email {
            query = query.filter(user::Column::Email.contains(email.to_lowercase()));
        }
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role.to_string()));
        }
        if let Some(is_professional) = filter.is_professional {
            query = query.filter(user::Column::IsProfessional.eq(is_professional));
        }

        query
    }

    /// Pre-check so the common case gets a precise error without relying on
    /// the constraint name.
    async fn check_unique(&self, candidate: &User) -> UserResult<()> {
        let clash = user::Entity::find()
            .filter(user::Column::Id.ne(candidate.id))
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(candidate.email.as_str()))
                    .add(user::Column::Nickname.eq(candidate.nickname.as_str())),
            )
            .one(&self.db)
            .await?;

        match clash {
            Some(other) if other.email == candidate.email => {
                Err(UserError::DuplicateEmail(candidate.email.clone()))
            }
            Some(_) => Err(UserError::DuplicateNickname(candidate.nickname.clone())),
            None => Ok(()),
        }
    }
}

/// `SELECT ... FOR UPDATE` on one user. A concurrent writer of the same row
/// waits until `txn` ends, then sees the committed state.
async fn lock_user(txn: &DatabaseTransaction, id: Uuid) -> UserResult<user::Model> {
    user::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(UserError::NotFound(id))
}

fn profile_columns(model: user::Model, user: &User) -> user::ActiveModel {
    let mut active = model.into_active_model();
    active.first_name = Set(user.first_name.clone());
    active.last_name = Set(user.last_name.clone());
    active.bio = Set(user.bio.clone());
    active.profile_picture_url = Set(user.profile_picture_url.clone());
    active.linkedin_profile_url = Set(user.linkedin_profile_url.clone());
    active.github_profile_url = Set(user.github_profile_url.clone());
    active.updated_at = Set(user.updated_at.into());
    active
}

fn verification_columns(model: user::Model, user: &User) -> user::ActiveModel {
    let mut active = model.into_active_model();
    active.email_verified = Set(user.email_verified);
    active.verification_token = Set(user.verification_token.clone());
    active.role = Set(user.role);
    active.updated_at = Set(user.updated_at.into());
    active
}

fn audited_columns(model: user::Model, user: &User) -> user::ActiveModel {
    let mut active = model.into_active_model();
    active.role = Set(user.role);
    active.is_professional = Set(user.is_professional);
    active.professional_status_updated_at = Set(user.professional_status_updated_at.map(Into::into));
    active.updated_at = Set(user.updated_at.into());
    active
}

/// Map a unique violation that slipped past the pre-check (concurrent insert)
fn map_write_error(err: DbErr, candidate: &User) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            UserError::DuplicateEmail(candidate.email.clone())
        }
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateNickname(candidate.nickname.clone())
        }
        _ => UserError::Storage(err.to_string()),
    }
}

async fn insert_audit_entry<C: ConnectionTrait>(conn: &C, entry: AuditLogEntry) -> UserResult<()> {
    audit_log::ActiveModel::from(entry).insert(conn).await?;
    Ok(())
}

async fn select_audit_entries<C: ConnectionTrait>(
    conn: &C,
    target_id: Uuid,
) -> UserResult<Vec<AuditLogEntry>> {
    let models = audit_log::Entity::find()
        .filter(audit_log::Column::TargetId.eq(target_id))
        .order_by_asc(audit_log::Column::CreatedAt)
        .order_by_asc(audit_log::Column::Id)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(Into::into).collect())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        self.check_unique(&user).await?;

        let model = user::ActiveModel::from(user.clone())
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, &user))?;

        tracing::info!(user_id = %model.id, role = %model.role, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let models = Self::filtered(&filter)
            .order_by_desc(user::Column::CreatedAt)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<usize> {
        let total = Self::filtered(&filter).count(&self.db).await?;
        Ok(total as usize)
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> UserResult<User> {
        let txn = self.db.begin().await?;
        let model = lock_user(&txn, id).await?;

        let mut user: User = model.clone().into();
        user.apply_profile_update(update, Utc::now());

        let model = profile_columns(model, &user).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = %id, "Updated profile");
        Ok(model.into())
    }

    async fn confirm_email(&self, id: Uuid, token: &str) -> UserResult<User> {
        let txn = self.db.begin().await?;
        let model = lock_user(&txn, id).await?;

        let mut user: User = model.clone().into();
        if let Err(e) = user.confirm_email(token, Utc::now()) {
            txn.rollback().await?;
            return Err(e);
        }

        let model = verification_columns(model, &user).update(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id = %id, role = %model.role, "Confirmed email");
        Ok(model.into())
    }

    async fn exists_with_role(&self, role: Role) -> UserResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn apply_audited_change(
        &self,
        target_id: Uuid,
        change: AccountChange,
        actor_id: Uuid,
    ) -> UserResult<ChangeOutcome> {
        let txn = self.db.begin().await?;
        let model = lock_user(&txn, target_id).await?;

        let mut user: User = model.clone().into();
        let Some(entry) = change.apply(&mut user, actor_id, Utc::now()) else {
            txn.rollback().await?;
            return Ok(ChangeOutcome::Unchanged(user));
        };

        audited_columns(model, &user).update(&txn).await?;
        insert_audit_entry(&txn, entry.clone()).await?;
        txn.commit().await?;

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
        select_audit_entries(&self.db, target_id).await
    }
}

/// Standalone PostgreSQL audit recorder over the `audit_logs` table.
///
/// [`PgUserRepository`] writes entries inside its own transaction; this type
/// is for reading the trail or recording outside a user change.
#[derive(Clone)]
pub struct PgAuditLog {
    db: DatabaseConnection,
}

impl PgAuditLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRecorder for PgAuditLog {
    async fn record(&self, entry: AuditLogEntry) -> UserResult<()> {
        insert_audit_entry(&self.db, entry).await
    }

    async fn entries_for(&self, target_id: Uuid) -> UserResult<Vec<AuditLogEntry>> {
        select_audit_entries(&self.db, target_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(is_professional: bool) -> user::Model {
        let now = Utc::now().into();
        user::Model {
            id: Uuid::now_v7(),
            nickname: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Authenticated,
            first_name: Some("Ada".into()),
            last_name: None,
            bio: None,
            profile_picture_url: None,
            linkedin_profile_url: None,
            github_profile_url: None,
            is_professional,
            professional_status_updated_at: None,
            email_verified: true,
            verification_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_unchanged_grant_writes_nothing() {
        let model = user_model(true);
        let id = model.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let outcome = repo
            .apply_audited_change(id, AccountChange::GrantProfessionalStatus, Uuid::now_v7())
            .await
            .unwrap();

        assert!(matches!(outcome, ChangeOutcome::Unchanged(u) if u.is_professional));
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);
        let id = Uuid::now_v7();

        let err = repo
            .apply_audited_change(id, AccountChange::GrantProfessionalStatus, Uuid::now_v7())
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(missing) if missing == id));
    }

    /// The SET list of the last UPDATE statement (the row lock's
    /// `FOR UPDATE` comes earlier)
    fn update_set_clause(db: DatabaseConnection) -> String {
        let log = format!("{:?}", db.into_transaction_log());
        let update = &log[log.rfind("UPDATE").unwrap()..];
        update[..update.find("WHERE").unwrap()].to_string()
    }

    #[tokio::test]
    async fn test_profile_update_writes_only_profile_columns() {
        let model = user_model(true);
        let id = model.id;
        let mut updated = model.clone();
        updated.bio = Some("Analyst".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model], vec![updated]])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        let user = repo
            .update_profile(
                id,
                UpdateProfile {
                    bio: Some(Some("Analyst".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(user.bio.as_deref(), Some("Analyst"));
        assert!(user.is_professional);

        let set = update_set_clause(db);
        assert!(set.contains("bio"));
        assert!(!set.contains("is_professional"));
        assert!(!set.contains("role"));
    }

    #[tokio::test]
    async fn test_wrong_token_writes_nothing() {
        let mut model = user_model(false);
        model.email_verified = false;
        model.verification_token = Some("tok".into());
        let id = model.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model]])
            .into_connection();
        let repo = PgUserRepository::new(db.clone());

        let err = repo.confirm_email(id, "nope").await.unwrap_err();

        assert!(matches!(err, UserError::InvalidVerificationToken));
        // only the row lock's FOR UPDATE
        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches("UPDATE").count(), 1);
    }
}
