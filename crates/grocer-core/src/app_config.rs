use std::fmt;

/// Deployment environment, read from `GROCER_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Maps a `GROCER_ENV` label; anything unrecognised is `Development`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime settings for every grocer binary.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub off_base_url: String,
    pub off_request_timeout_secs: u64,
    pub off_user_agent: String,
    /// Extra attempts on transient Open Food Facts failures.
    pub off_max_retries: u32,
    pub off_retry_backoff_base_ms: u64,
    /// Upper bound on each candidate source call.
    pub resolver_source_timeout_ms: u64,
    /// Per-source candidate limit; the resolver caps it at 5.
    pub resolver_candidate_limit: usize,
}

// Hand-written so the database URL (which embeds credentials) never lands
// in logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "db_pool",
                &(self.db_min_connections, self.db_max_connections),
            )
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("off_base_url", &self.off_base_url)
            .field("off_request_timeout_secs", &self.off_request_timeout_secs)
            .field("off_user_agent", &self.off_user_agent)
            .field(
                "off_retry",
                &(self.off_max_retries, self.off_retry_backoff_base_ms),
            )
            .field(
                "resolver_source_timeout_ms",
                &self.resolver_source_timeout_ms,
            )
            .field("resolver_candidate_limit", &self.resolver_candidate_limit)
            .finish()
    }
}
