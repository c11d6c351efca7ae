// Configuration module entry point
// Loads the relay configuration and holds per-process state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, PerformanceConfig, UpstreamConfig};

/// Default Bot API location
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.telegram.org";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing files are fine: defaults and `RELAY_` environment variables still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("RELAY").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("http.server_name", "tg-relay/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("upstream.base_url", DEFAULT_UPSTREAM_BASE_URL)?
            .set_default("upstream.timeout_secs", 30)?
            .set_default("upstream.connect_timeout_secs", 10)?
            .build()?;

        settings.try_deserialize()
    }

    /// Load from "config" (any supported extension), or the path given as the first argument
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
        Self::load_from(&path)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
