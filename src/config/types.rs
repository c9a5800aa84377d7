// Configuration types module
// One struct per TOML section; defaults live in `with_defaults`

use serde::Deserialize;

/// Relay configuration, immutable once loaded
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub upstream: UpstreamConfig,
    pub access: AccessConfig,
    pub cors: CorsConfig,
    pub relay: RelayConfig,
    pub health: HealthConfig,
}

/// Listen address; `workers` unset means one thread per core
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `debug` or `trace` turns on debug lines
    pub level: String,
    pub access_log: bool,
    /// `combined`, `common`, `json`, or a `$variable` pattern
    pub access_log_format: String,
    /// stdout when unset
    pub access_log_file: Option<String>,
    /// stderr when unset
    pub error_log_file: Option<String>,
}

/// Connection limits, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Upstream targets the relay forwards to
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the model repository serving exposure and workspace archives
    pub models_url: String,
    /// Base URL for the generic reverse proxy (unset disables it unless overridden)
    #[serde(default)]
    pub proxy_target: Option<String>,
    /// Let callers replace the proxy base with the `target` query parameter
    pub allow_target_override: bool,
    /// Path prefix that selects the generic reverse proxy
    pub proxy_prefix: String,
    /// User-Agent sent on download fetches
    pub user_agent: String,
}

/// Origin allow-list and server-to-server secret
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessConfig {
    /// Shared secret expected in `X-API-Key`; unset means development mode
    #[serde(default)]
    pub api_key: Option<String>,
    /// Browser origins allowed without a key
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Referer keyword that admits localhost origins during local development
    #[serde(default)]
    pub dev_referer_keyword: Option<String>,
}

/// Headers emitted on CORS responses
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_methods: String,
    pub allow_headers: String,
    pub expose_headers: String,
    pub max_age: u64,
}

/// Request handling limits
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    pub max_body_size: u64,
}

/// Liveness endpoint, answered before the access check
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    pub enabled: bool,
    pub liveness_path: String,
}
