//! Server configuration, loaded from environment variables at startup.

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Runtime configuration for taskmanager-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://taskmanager.db"`).
    pub database_url: String,

    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs go to a daily-rotated file in this directory instead
    /// of stdout.
    pub log_dir: Option<String>,

    /// Lifetime of a sign-in session in seconds (default: two weeks).
    pub session_ttl_secs: i64,

    /// Mark the session cookie `Secure` (enable behind HTTPS).
    pub cookie_secure: bool,

    /// Mail relay endpoint for welcome messages. Unset means the message is
    /// only written to the log.
    pub notify_webhook: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            database_url: "sqlite://taskmanager.db".to_owned(),
            db_max_connections: 5,
            log_level: "info".to_owned(),
            log_json: false,
            log_dir: None,
            session_ttl_secs: 14 * 24 * 60 * 60,
            cookie_secure: false,
            notify_webhook: None,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind_address: env_or("TASKMGR_BIND", &d.bind_address),
            database_url: env_or("TASKMGR_DATABASE_URL", &d.database_url),
            db_max_connections: parse_env("TASKMGR_DB_MAX_CONNECTIONS", d.db_max_connections),
            log_level: env_or("TASKMGR_LOG", &d.log_level),
            log_json: env_flag("TASKMGR_LOG_JSON"),
            log_dir: env_opt("TASKMGR_LOG_DIR"),
            session_ttl_secs: parse_env("TASKMGR_SESSION_TTL_SECS", d.session_ttl_secs)
                .clamp(1, MAX_SESSION_TTL_SECS),
            cookie_secure: env_flag("TASKMGR_COOKIE_SECURE"),
            notify_webhook: env_opt("TASKMGR_NOTIFY_WEBHOOK"),
        }
    }

    /// Session lifetime, clamped to `1s..=MAX_SESSION_TTL_SECS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs.clamp(1, MAX_SESSION_TTL_SECS))
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
