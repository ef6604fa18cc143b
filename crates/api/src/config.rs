use std::fmt::Display;
use std::str::FromStr;

use todo_core::validation::{FieldLimits, DEFAULT_DESCRIPTION_MAX_BYTES, DEFAULT_NAME_MAX_BYTES};

/// A configuration variable that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{key} must be a valid {expected}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub expected: &'static str,
    pub reason: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound of the database connection pool (default: `10`).
    pub database_max_connections: u32,
    /// Byte maxima for request fields.
    pub field_limits: FieldLimits,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `8080`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `DATABASE_MAX_CONNECTIONS`       | `10`                    |
    /// | `CATEGORY_NAME_MAX_BYTES`        | `100`                   |
    /// | `CATEGORY_DESCRIPTION_MAX_BYTES` | `500`                   |
    /// | `TASK_NAME_MAX_BYTES`            | `100`                   |
    /// | `TASK_DESCRIPTION_MAX_BYTES`     | `500`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let field_limits = FieldLimits {
            category_name_max_bytes: parse_or(
                &lookup,
                "CATEGORY_NAME_MAX_BYTES",
                DEFAULT_NAME_MAX_BYTES,
            )?,
            category_description_max_bytes: parse_or(
                &lookup,
                "CATEGORY_DESCRIPTION_MAX_BYTES",
                DEFAULT_DESCRIPTION_MAX_BYTES,
            )?,
            task_name_max_bytes: parse_or(&lookup, "TASK_NAME_MAX_BYTES", DEFAULT_NAME_MAX_BYTES)?,
            task_description_max_bytes: parse_or(
                &lookup,
                "TASK_DESCRIPTION_MAX_BYTES",
                DEFAULT_DESCRIPTION_MAX_BYTES,
            )?,
        };

        Ok(Self {
            host,
            port: parse_or(&lookup, "PORT", 8080)?,
            cors_origins,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            field_limits,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            expected: std::any::type_name::<T>(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.field_limits, FieldLimits::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("TASK_NAME_MAX_BYTES", "20"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.field_limits.task_name_max_bytes, 20);
        assert_eq!(config.field_limits.category_name_max_bytes, 100);
    }

    #[test]
    fn invalid_value_names_the_variable() {
        let err = load(&[("CATEGORY_NAME_MAX_BYTES", "lots")]).unwrap_err();
        assert_eq!(err.key, "CATEGORY_NAME_MAX_BYTES");
        assert!(err.to_string().starts_with("CATEGORY_NAME_MAX_BYTES must be a valid"));
    }
}
