// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

// Re-export public types
pub use state::AppState;
pub use types::{Config, RoutesConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `ITEMS_SERVER__PORT=9000`
const ENV_PREFIX: &str = "ITEMS";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// Builder preloaded with every default value
fn builder_with_defaults() -> Result<Builder, config::ConfigError> {
    config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("logging.access_log", true)?
        .set_default("logging.show_headers", false)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_timeout", 10)?
        .set_default("http.server_name", "items-server/0.1")?
        .set_default("http.enable_cors", false)?
        .set_default("http.max_body_size", 10_485_760)? // 10MB
        .set_default("routes.items_path", "/api/v1/items")
}

impl Config {
    /// Load configuration from specified file path (without extension).
    ///
    /// Sources, lowest priority first: built-in defaults, the file (optional),
    /// then `ITEMS_*` environment variables with `__` between nested keys.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        builder_with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from TOML text layered over the defaults
    #[cfg(test)]
    pub fn load_from_str(toml: &str) -> Result<Self, config::ConfigError> {
        builder_with_defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Listen address from `server.host` (an IPv4 or IPv6 literal) and `server.port`
    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        self.server
            .host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.server.port))
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
