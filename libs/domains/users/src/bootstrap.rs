//! Startup admin provisioning, see [`UserService::ensure_admin`](crate::UserService::ensure_admin).

use core_config::{ConfigError, FromEnv, env_optional, env_required};
use uuid::Uuid;

/// Credentials for the initial admin account.
///
/// Environment variables (all three or none):
/// - `ADMIN_EMAIL`
/// - `ADMIN_NICKNAME`
/// - `ADMIN_PASSWORD`
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("nickname", &self.nickname)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl FromEnv for AdminSeed {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email: env_required("ADMIN_EMAIL")?,
            nickname: env_required("ADMIN_NICKNAME")?,
            password: env_required("ADMIN_PASSWORD")?,
        })
    }
}

impl AdminSeed {
    /// `None` when `ADMIN_EMAIL` is unset; otherwise the other two are required.
    pub fn from_env_if_configured() -> Result<Option<Self>, ConfigError> {
        if env_optional("ADMIN_EMAIL").is_none() {
            return Ok(None);
        }
        Self::from_env().map(Some)
    }
}

/// What [`ensure_admin`](crate::UserService::ensure_admin) did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An admin already existed; nothing was written
    AlreadyPresent,
    /// The account with the seed email was promoted to admin
    Promoted(Uuid),
    /// A new verified admin account was created
    Created(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_absent_when_email_unset() {
        temp_env::with_vars(
            [
                ("ADMIN_EMAIL", None::<&str>),
                ("ADMIN_NICKNAME", Some("root")),
                ("ADMIN_PASSWORD", Some("Str0ng!pass")),
            ],
            || {
                assert!(AdminSeed::from_env_if_configured().unwrap().is_none());
            },
        );
    }

    #[test]
    fn test_seed_requires_all_fields() {
        temp_env::with_vars(
            [
                ("ADMIN_EMAIL", Some("root@example.com")),
                ("ADMIN_NICKNAME", Some("root")),
                ("ADMIN_PASSWORD", None),
            ],
            || {
                let err = AdminSeed::from_env_if_configured().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ADMIN_PASSWORD"));
            },
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let seed = AdminSeed {
            email: "root@example.com".into(),
            nickname: "root".into(),
            password: "Str0ng!pass".into(),
        };
        assert!(!format!("{seed:?}").contains("Str0ng"));
    }
}
