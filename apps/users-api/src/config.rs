use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_users::AdminSeed;
use email::{EmailServiceConfig, SmtpConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub email: EmailServiceConfig,
    /// Initial admin; `None` when `ADMIN_EMAIL` is unset
    pub admin: Option<AdminSeed>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // DATABASE_URL required
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?; // JWT_SECRET required
        let smtp = SmtpConfig::from_env()?;
        let email = EmailServiceConfig::from_env()?;
        let admin = AdminSeed::from_env_if_configured()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            jwt,
            smtp,
            email,
            admin,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "config-test-secret-with-32-characters";

    #[test]
    fn test_requires_database_url() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None::<&str>),
                ("JWT_SECRET", Some(SECRET)),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("DATABASE_URL"));
            },
        );
    }

    #[test]
    fn test_admin_seed_is_optional() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/users")),
                ("JWT_SECRET", Some(SECRET)),
                ("ADMIN_EMAIL", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.admin.is_none());
                assert_eq!(config.app.name, "users_api");
            },
        );
    }

    #[test]
    fn test_admin_seed_loaded_when_configured() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/users")),
                ("JWT_SECRET", Some(SECRET)),
                ("ADMIN_EMAIL", Some("root@example.com")),
                ("ADMIN_NICKNAME", Some("root")),
                ("ADMIN_PASSWORD", Some("Str0ng!pass")),
            ],
            || {
                let admin = Config::from_env().unwrap().admin.unwrap();
                assert_eq!(admin.email, "root@example.com");
            },
        );
    }
}
