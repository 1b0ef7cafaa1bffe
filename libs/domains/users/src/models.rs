use chrono::{DateTime, Utc};
use regex::Regex;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

/// Letters, digits, hyphens and underscores
static NICKNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

fn validate_nickname(nickname: &str) -> Result<(), validator::ValidationError> {
    if !NICKNAME_PATTERN.is_match(nickname) {
        return Err(validator::ValidationError::new("invalid_nickname"));
    }
    Ok(())
}

pub const MAX_PAGE_SIZE: usize = 100;

/// Account roles, most privileged first
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Registered with a verified email
    #[sea_orm(string_value = "authenticated")]
    Authenticated,
    /// Registered, email not verified yet
    #[default]
    #[sea_orm(string_value = "anonymous")]
    Anonymous,
}

impl Role {
    /// Admin and Manager
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

/// Professional-status states. `Professional` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProfessionalStatus {
    Standard,
    Professional,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Unique public handle
    pub nickname: String,
    /// Unique, stored lowercased
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTime<Utc>>,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        nickname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            nickname: nickname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            first_name: None,
            last_name: None,
            bio: None,
            profile_picture_url: None,
            linkedin_profile_url: None,
            github_profile_url: None,
            is_professional: false,
            professional_status_updated_at: None,
            email_verified: false,
            verification_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn professional_status(&self) -> ProfessionalStatus {
        if self.is_professional {
            ProfessionalStatus::Professional
        } else {
            ProfessionalStatus::Standard
        }
    }

    /// First name if set, otherwise the nickname
    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.nickname)
    }

    /// Apply a partial profile update.
    ///
    /// Absent fields are left untouched; an explicit `null` clears the field.
    pub fn apply_profile_update(&mut self, update: UpdateProfile, now: DateTime<Utc>) {
        let UpdateProfile {
            first_name,
            last_name,
            bio,
            profile_picture_url,
            linkedin_profile_url,
            github_profile_url,
        } = update;

        for (field, value) in [
            (&mut self.first_name, first_name),
            (&mut self.last_name, last_name),
            (&mut self.bio, bio),
            (&mut self.profile_picture_url, profile_picture_url),
            (&mut self.linkedin_profile_url, linkedin_profile_url),
            (&mut self.github_profile_url, github_profile_url),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
        self.updated_at = now;
    }

    /// Mark the email verified if `token` matches the pending one.
    ///
    /// Promotes `anonymous` to `authenticated`; other roles are kept.
    pub fn confirm_email(&mut self, token: &str, now: DateTime<Utc>) -> UserResult<()> {
        if self.email_verified {
            return Err(UserError::EmailAlreadyVerified);
        }
        if self.verification_token.as_deref() != Some(token) {
            return Err(UserError::InvalidVerificationToken);
        }

        self.email_verified = true;
        self.verification_token = None;
        if self.role == Role::Anonymous {
            self.role = Role::Authenticated;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// User response DTO (no password hash, no verification token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTime<Utc>>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Operations available on this account
    #[serde(default)]
    pub links: Vec<Link>,
}

impl UserResponse {
    /// Attach the navigation links, rooted at `base` (e.g. `https://host/api/users`)
    pub fn with_links(mut self, base: &str) -> Self {
        self.links = user_links(base, self.id);
        self
    }
}

/// Hypermedia link to a related operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub rel: String,
    pub href: String,
    /// HTTP method
    pub method: String,
}

impl Link {
    fn new(rel: &str, method: &str, href: String) -> Self {
        Self {
            rel: rel.to_string(),
            href,
            method: method.to_string(),
        }
    }
}

pub fn user_links(base: &str, id: Uuid) -> Vec<Link> {
    let user = format!("{base}/{id}");
    vec![
        Link::new("self", "GET", user.clone()),
        Link::new("update_profile", "PUT", format!("{user}/profile")),
        Link::new("professional_status", "POST", format!("{user}/professional-status")),
        Link::new("role", "PUT", format!("{user}/role")),
        Link::new("audit_log", "GET", format!("{user}/audit-log")),
    ]
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_picture_url: user.profile_picture_url,
            linkedin_profile_url: user.linkedin_profile_url,
            github_profile_url: user.github_profile_url,
            is_professional: user.is_professional,
            professional_status_updated_at: user.professional_status_updated_at,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            links: Vec::new(),
        }
    }
}

/// Self-registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 3, max = 50), custom(function = "validate_nickname"))]
    pub nickname: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    /// 8-128 characters with upper, lower, digit and special character
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
}

/// Account created by staff
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50), custom(function = "validate_nickname"))]
    pub nickname: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    /// Defaults to `authenticated`; only admins may create staff accounts
    pub role: Option<Role>,
}

/// Partial profile update.
///
/// A missing field is left as is; `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 2000))]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(url, length(max = 2048))]
    pub profile_picture_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(url, length(max = 2048))]
    pub linkedin_profile_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    #[validate(url, length(max = 2048))]
    pub github_profile_url: Option<Option<String>>,
}

/// Distinguish `"field": null` (`Some(None)`) from a missing field (`None`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `PUT /{user_id}/role`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangeRole {
    pub role: Role,
}

/// Query filters for listing users
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    /// Case-insensitive substring match
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_professional: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            email: None,
            role: None,
            is_professional: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.email
            .as_ref()
            .is_none_or(|email| user.email.contains(&email.to_lowercase()))
            && self.role.is_none_or(|role| user.role == role)
            && self
                .is_professional
                .is_none_or(|flag| user.is_professional == flag)
    }

    /// Clamp the page size to `1..=MAX_PAGE_SIZE`
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

fn default_limit() -> usize {
    50
}

/// Paginated user list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub data: Vec<UserResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}
