// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AgentConfig, Config, EncoderConfig, HttpConfig};

/// Config file used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file (optional),
    /// `AGENT_<SECTION>__<KEY>` environment variables, and `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("AGENT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "qr-barcode-agent")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("agent.name", "QR & Barcode Generator Agent")?
            .set_default("agent.version", env!("CARGO_PKG_VERSION"))?
            .set_default("agent.descriptor_path", ".well-known/agent.json")?
            .set_default("encoder.width", 300)?
            .set_default("encoder.margin", 2)?
            .set_default("encoder.foreground", "#000000")?
            .set_default("encoder.background", "#ffffff")?
            .build()?;

        settings.try_deserialize()
    }

    /// Load from the path given as the first CLI argument, or `config`
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
