//! configuration types for givestream.

use serde::{Deserialize, Serialize};

/// main configuration for givestream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// address to bind the http server to.
    pub listen_addr: String,

    /// origins allowed to call the api cross-origin.
    pub cors_origins: Vec<String>,

    /// reverse proxies whose X-Forwarded-For headers are trusted,
    /// as ips or cidr ranges.
    pub trusted_proxies: Vec<String>,

    /// database configuration.
    pub database: DatabaseConfig,

    /// token and cookie configuration.
    pub auth: AuthConfig,

    /// per-route-class rate limit thresholds.
    pub rate_limits: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            cors_origins: vec![],
            trusted_proxies: vec![],
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,

    /// enable write-ahead logging for file-backed sqlite databases.
    pub write_ahead_log: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/givestream/db.sqlite".to_string(),
            write_ahead_log: true,
        }
    }
}

/// token and cookie configuration.
///
/// both secrets are required at startup; the serve command fails fast when
/// either is missing from the merged configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// hs256 signing secret for short-lived access tokens.
    pub access_token_secret: String,

    /// hs256 signing secret for refresh tokens (distinct from access).
    pub refresh_token_secret: String,

    /// access token lifetime in seconds.
    pub access_token_ttl_secs: u64,

    /// refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: u64,

    /// mark the refresh cookie `Secure` (requires https in browsers).
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl_secs: 900, // 15 minutes
            refresh_token_ttl_secs: 604_800, // 7 days
            secure_cookies: false,
        }
    }
}

/// per-route-class rate limit thresholds, in requests per minute per client.
///
/// counters are in-process only: they reset on restart and are not shared
/// across instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// login and token refresh.
    pub auth_per_minute: u32,

    /// public pledge submission.
    pub submission_per_minute: u32,

    /// public read endpoints (feed, stats).
    pub read_per_minute: u32,

    /// authenticated admin endpoints.
    pub admin_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_minute: 10,
            submission_per_minute: 12,
            read_per_minute: 120,
            admin_per_minute: 240,
        }
    }
}

impl Config {
    /// check that startup-critical values are present.
    ///
    /// returns the names of missing required settings.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.auth.access_token_secret.is_empty() {
            missing.push("auth.access_token_secret");
        }
        if self.auth.refresh_token_secret.is_empty() {
            missing.push("auth.refresh_token_secret");
        }
        missing
    }
}
