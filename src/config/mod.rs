// Configuration module entry point
// Loads the relay configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use url::Url;

// Re-export public types
pub use state::AppState;
pub use types::{AccessConfig, Config, CorsConfig, UpstreamConfig};

/// Environment variable prefix, e.g. `RELAY_ACCESS__API_KEY`
const ENV_PREFIX: &str = "RELAY";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("access.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from an inline TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Reject base URLs and prefixes the resolver cannot work with
    fn validate(&self) -> Result<(), ConfigError> {
        check_base_url("upstream.models_url", &self.upstream.models_url)?;
        if let Some(target) = &self.upstream.proxy_target {
            check_base_url("upstream.proxy_target", target)?;
        }

        let prefix = &self.upstream.proxy_prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(ConfigError::Message(format!(
                "upstream.proxy_prefix must look like '/name', got '{prefix}'"
            )));
        }
        Ok(())
    }

    /// Whether requests are checked against the secret and allow-list
    pub const fn is_development_mode(&self) -> bool {
        self.access.api_key.is_none()
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8787)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 300)?
        .set_default("performance.write_timeout", 300)?
        .set_default("upstream.models_url", "https://models.physiomeproject.org")?
        .set_default("upstream.allow_target_override", false)?
        .set_default("upstream.proxy_prefix", "/cors-proxy")?
        .set_default(
            "upstream.user_agent",
            concat!("model-relay/", env!("CARGO_PKG_VERSION")),
        )?
        .set_default("access.allowed_origins", Vec::<String>::new())?
        .set_default("cors.allow_methods", "GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS")?
        .set_default("cors.allow_headers", "Content-Type, Authorization, X-API-Key")?
        .set_default(
            "cors.expose_headers",
            "Content-Disposition, Content-Length, Content-Type",
        )?
        .set_default("cors.max_age", 86_400)?
        .set_default("relay.max_body_size", 10_485_760)? // 10MB
        .set_default("health.enabled", true)?
        .set_default("health.liveness_path", "/healthz")
}

fn check_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::Message(format!("{key} is not a valid URL '{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Message(format!(
            "{key} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(())
}
