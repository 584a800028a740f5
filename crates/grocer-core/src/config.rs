//! `GROCER_*` environment configuration.

use std::env::VarError;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Loads `.env` (if present) and then reads [`AppConfig`] from the process
/// environment.
///
/// # Errors
///
/// Returns `ConfigError` if `DATABASE_URL` is missing or any value fails to
/// parse or validate.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Reads [`AppConfig`] from the process environment without touching `.env`.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Typed reads over an env-var lookup function.
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn required(&self, var: &str) -> Result<String, ConfigError> {
        (self.lookup)(var).map_err(|_| ConfigError::MissingEnvVar(var.to_owned()))
    }

    fn text(&self, var: &str, default: &str) -> String {
        (self.lookup)(var).unwrap_or_else(|_| default.to_owned())
    }

    fn parsed<T>(&self, var: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(var) {
            Ok(raw) => raw.trim().parse::<T>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    }
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: reason.into(),
    }
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let env = EnvReader { lookup };

    let config = AppConfig {
        database_url: env.required("DATABASE_URL")?,
        env: Environment::from_label(&env.text("GROCER_ENV", "development")),
        log_level: env.text("GROCER_LOG_LEVEL", "info"),
        db_max_connections: env.parsed("GROCER_DB_MAX_CONNECTIONS", 10)?,
        db_min_connections: env.parsed("GROCER_DB_MIN_CONNECTIONS", 1)?,
        db_acquire_timeout_secs: env.parsed("GROCER_DB_ACQUIRE_TIMEOUT_SECS", 10)?,
        off_base_url: env.text("GROCER_OFF_BASE_URL", "https://world.openfoodfacts.org"),
        off_request_timeout_secs: env.parsed("GROCER_OFF_REQUEST_TIMEOUT_SECS", 5)?,
        off_user_agent: env.text("GROCER_OFF_USER_AGENT", "grocer/0.1 (price-comparison)"),
        off_max_retries: env.parsed("GROCER_OFF_MAX_RETRIES", 1)?,
        off_retry_backoff_base_ms: env.parsed("GROCER_OFF_RETRY_BACKOFF_BASE_MS", 250)?,
        resolver_source_timeout_ms: env.parsed("GROCER_RESOLVER_SOURCE_TIMEOUT_MS", 4000)?,
        resolver_candidate_limit: env.parsed("GROCER_RESOLVER_CANDIDATE_LIMIT", 5)?,
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.db_max_connections == 0 {
        return Err(invalid("GROCER_DB_MAX_CONNECTIONS", "must be at least 1"));
    }
    if config.db_min_connections > config.db_max_connections {
        return Err(invalid(
            "GROCER_DB_MIN_CONNECTIONS",
            format!(
                "{} exceeds GROCER_DB_MAX_CONNECTIONS ({})",
                config.db_min_connections, config.db_max_connections
            ),
        ));
    }
    let url = config.off_base_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(
            "GROCER_OFF_BASE_URL",
            format!("expected an http(s) URL, got '{url}'"),
        ));
    }
    if config.resolver_candidate_limit == 0 {
        return Err(invalid("GROCER_RESOLVER_CANDIDATE_LIMIT", "must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
