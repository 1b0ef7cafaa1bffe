//! Role capabilities and the access guard.
//!
//! Every service operation that acts on behalf of a caller goes through
//! [`authorize`] before touching storage. A denial has no side effects other
//! than a security event on the `audit` tracing target.

use axum_helpers::{AuditEvent, AuditOutcome, JwtClaims};
use serde_json::json;
use std::str::FromStr;
use strum::Display;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    EditOwnProfile,
    ViewOwnAccount,
    ViewAnyAccount,
    ManageAccounts,
    GrantProfessionalStatus,
    ViewAuditLog,
    AssignRoles,
}

impl Role {
    pub fn has_capability(&self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin => true,
            Role::Manager => !matches!(capability, AssignRoles),
            Role::Authenticated => matches!(capability, EditOwnProfile | ViewOwnAccount),
            Role::Anonymous => matches!(capability, ViewOwnAccount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    ViewUser,
    ListUsers,
    CreateUser,
    UpdateProfile,
    UpgradeProfessionalStatus,
    ChangeRole,
    ViewAuditLog,
}

/// The acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// Actor recorded for changes made at startup rather than by a caller.
    pub fn system() -> Self {
        Self {
            id: Uuid::nil(),
            role: Role::Admin,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// The role in the token is taken as-is; it is not re-read from storage.
impl TryFrom<&JwtClaims> for Principal {
    type Error = UserError;

    fn try_from(claims: &JwtClaims) -> UserResult<Self> {
        let id = claims.user_id().map_err(|_| UserError::Unauthorized)?;
        let role = Role::from_str(&claims.role).map_err(|_| UserError::Unauthorized)?;
        Ok(Self::new(id, role))
    }
}

fn is_permitted(actor: &Principal, target: Option<Uuid>, action: Action) -> bool {
    let is_self = target == Some(actor.id);
    let can = |capability| actor.role.has_capability(capability);

    match action {
        Action::ViewUser => {
            (is_self && can(Capability::ViewOwnAccount)) || can(Capability::ViewAnyAccount)
        }
        Action::ListUsers | Action::CreateUser => can(Capability::ManageAccounts),
        Action::UpdateProfile => is_self && can(Capability::EditOwnProfile),
        Action::UpgradeProfessionalStatus => can(Capability::GrantProfessionalStatus),
        Action::ChangeRole => !is_self && can(Capability::AssignRoles),
        Action::ViewAuditLog => can(Capability::ViewAuditLog),
    }
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// `target` is `None` for collection-level actions (listing, creating).
///
/// # Rules
///
/// - profile edits are self-only, for every role
/// - an admin cannot change their own role
/// - everything else follows [`Role::has_capability`]
pub fn authorize(actor: &Principal, target: Option<Uuid>, action: Action) -> UserResult<()> {
    if is_permitted(actor, target, action) {
        return Ok(());
    }

    AuditEvent::new(
        Some(actor.id.to_string()),
        format!("users.{action}"),
        target.map(|id| format!("user:{id}")),
        AuditOutcome::Denied,
    )
    .with_details(json!({ "role": actor.role.to_string() }))
    .log();

    Err(UserError::PermissionDenied { action })
}
