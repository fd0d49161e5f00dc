//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides for the database connection, and defines the constants used for
//! response headers, timeouts and default paths. `AppConfig` is the root
//! configuration struct containing all settings.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use const_format::formatcp;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Probe and greeting responses must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Static assets (CSS, JS) - one hour, they change only with a release
pub const HTTP_CACHE_STATIC_MAX_AGE: u32 = 3600;

pub const CACHE_CONTROL_STATIC: &str = formatcp!("public, max-age={}", HTTP_CACHE_STATIC_MAX_AGE);

/// Response header naming the error kind of a failed probe
pub const PROBE_ERROR_HEADER: &str = "x-probe-error";

// =============================================================================
// Endpoint Payloads
// =============================================================================

/// Message returned by `GET /hello`
pub const HELLO_MESSAGE: &str = "Hello from the backend!";

/// Probe query: the dependency reports its own database name and clock
pub const PROBE_QUERY: &str = "SELECT current_database()::text, NOW()";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASSWORD: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "postgres";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Kept below the probe timeout so a refused connection is reported as
/// unreachable before the probe itself times out
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 3;

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Directory for static files
pub const STATIC_DIR: &str = "static";

/// Default site title shown on the status page
pub const DEFAULT_SITE_NAME: &str = "dbpulse";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "dbpulse=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default base URL used by `dbpulse check`
pub const DEFAULT_CLIENT_URL: &str = formatcp!("http://127.0.0.1:{}", DEFAULT_HTTP_PORT);

// =============================================================================
// Environment Overrides
// =============================================================================

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_HTTP_HOST: &str = "HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "HTTP_PORT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Connection settings for the PostgreSQL dependency
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Status probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

/// PostgreSQL connection settings
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_host")]
    pub host: String,
    #[serde(default = "DatabaseConfig::default_port")]
    pub port: u16,
    #[serde(default = "DatabaseConfig::default_user")]
    pub user: String,
    #[serde(default = "DatabaseConfig::default_password")]
    pub password: String,
    /// Database name
    #[serde(default = "DatabaseConfig::default_name")]
    pub name: String,
    /// Upper bound on pooled connections
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    /// How long a probe may wait for a pooled connection
    #[serde(default = "DatabaseConfig::default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            user: Self::default_user(),
            password: Self::default_password(),
            name: Self::default_name(),
            max_connections: Self::default_max_connections(),
            acquire_timeout_seconds: Self::default_acquire_timeout(),
        }
    }
}

// Hand-written so the password never reaches logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .finish()
    }
}

impl DatabaseConfig {
    fn default_host() -> String {
        DEFAULT_DB_HOST.to_string()
    }
    fn default_port() -> u16 {
        DEFAULT_DB_PORT
    }
    fn default_user() -> String {
        DEFAULT_DB_USER.to_string()
    }
    fn default_password() -> String {
        DEFAULT_DB_PASSWORD.to_string()
    }
    fn default_name() -> String {
        DEFAULT_DB_NAME.to_string()
    }
    fn default_max_connections() -> u32 {
        DEFAULT_DB_MAX_CONNECTIONS
    }
    fn default_acquire_timeout() -> u64 {
        DEFAULT_DB_ACQUIRE_TIMEOUT_SECS
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    /// Build sqlx connect options from these settings
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .application_name(env!("CARGO_PKG_NAME"))
    }
}

/// Status probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound on a single probe, including connection acquisition
    #[serde(default = "ProbeConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Self::default_timeout(),
        }
    }
}

impl ProbeConfig {
    fn default_timeout() -> u64 {
        DEFAULT_PROBE_TIMEOUT_SECS
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Site title shown on the status page
    #[serde(default = "UiConfig::default_site_name")]
    pub site_name: String,
    /// Seconds between automatic refreshes of the status page (0 disables polling)
    #[serde(default)]
    pub poll_interval_seconds: u64,
    /// Directory served under /static
    #[serde(default = "UiConfig::default_static_dir")]
    pub static_dir: String,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            site_name: Self::default_site_name(),
            poll_interval_seconds: 0,
            static_dir: Self::default_static_dir(),
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_site_name() -> String {
        DEFAULT_SITE_NAME.to_string()
    }

    fn default_static_dir() -> String {
        STATIC_DIR.to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from built-in defaults.
    ///
    /// Used for the default config path so containers can run on environment
    /// variables alone.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `DB_*` and `HTTP_*` overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_DB_HOST) {
            self.database.host = host;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            self.database.port = parse_port(ENV_DB_PORT, &port)?;
        }
        if let Some(user) = lookup(ENV_DB_USER) {
            self.database.user = user;
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            self.database.password = password;
        }
        if let Some(name) = lookup(ENV_DB_NAME) {
            self.database.name = name;
        }
        if let Some(host) = lookup(ENV_HTTP_HOST) {
            self.http.host = host;
        }
        if let Some(port) = lookup(ENV_HTTP_PORT) {
            self.http.port = parse_port(ENV_HTTP_PORT, &port)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.host must not be empty".to_string(),
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.name must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.probe.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "probe.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.database.acquire_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "database.acquire_timeout_seconds must be at least 1".to_string(),
            ));
        }
        // sqlx reports a refused connection only once acquire_timeout elapses
        if self.database.acquire_timeout_seconds >= self.probe.timeout_seconds {
            return Err(ConfigError::Validation(format!(
                "database.acquire_timeout_seconds ({}) must be less than probe.timeout_seconds ({})",
                self.database.acquire_timeout_seconds, self.probe.timeout_seconds
            )));
        }
        Ok(())
    }
}

fn parse_port(var: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{var} is not a valid port: {value:?}")))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
