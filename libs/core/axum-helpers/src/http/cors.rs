use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, env_required};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// CORS layer for the given origins.
///
/// Methods GET, POST, PUT, PATCH, OPTIONS; headers Content-Type,
/// Authorization, Accept, Cookie; credentials allowed; 1 hour max age.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Parse the required, comma-separated `CORS_ALLOWED_ORIGIN`.
///
/// - Development: `CORS_ALLOWED_ORIGIN=http://localhost:3000,http://localhost:5173`
/// - Production: `CORS_ALLOWED_ORIGIN=https://example.com`
pub fn cors_origins_from_env() -> Result<Vec<HeaderValue>, ConfigError> {
    let raw = env_required("CORS_ALLOWED_ORIGIN")?;

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>()
                .map_err(|e| ConfigError::ParseError {
                    key: "CORS_ALLOWED_ORIGIN".to_string(),
                    details: format!("'{s}': {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        return Err(ConfigError::ParseError {
            key: "CORS_ALLOWED_ORIGIN".to_string(),
            details: "cannot be empty".to_string(),
        });
    }

    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_split_and_trimmed() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGIN",
            Some("http://localhost:3000, https://app.example.com,"),
            || {
                let origins = cors_origins_from_env().unwrap();
                assert_eq!(origins.len(), 2);
                assert_eq!(origins[1], "https://app.example.com");
            },
        );
    }

    #[test]
    fn test_origins_required() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(matches!(
                cors_origins_from_env(),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_origins_not_empty() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(" , "), || {
            let err = cors_origins_from_env().unwrap_err();
            assert!(err.to_string().contains("cannot be empty"));
        });
    }
}
