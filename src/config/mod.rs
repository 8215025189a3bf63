// Configuration module entry point
// Loads configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SongsConfig,
    StaticFilesConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `STATIC_SERVER_SERVER__PORT=9000`
const ENV_PREFIX: &str = "STATIC_SERVER";

impl Config {
    /// Load configuration from specified file path (without extension).
    /// A missing file is not an error; every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("static_files.root", "static")?
            .set_default("static_files.index_files", vec!["index.html", "index.htm"])?
            .set_default("static_files.directory_listing", true)?
            .set_default("songs.enabled", true)?
            .set_default("songs.route", "/songs/")?
            .set_default("songs.dir", "songs")?
            .set_default("http.server_name", "StaticCors/1.0")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{addr}: {e}")))
    }
}
