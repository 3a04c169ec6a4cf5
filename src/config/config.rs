use config::{Config, ConfigError, File};
use serde::Deserialize;

/// PostgreSQL database connection configuration.
///
/// Holds the `pool_logs` table: one append-only row per decimated
/// pool observation.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

/// Ethereum node connection configuration.
///
/// The ingestor opens a single WebSocket log subscription filtered to
/// `pool_addresses`. A node that cannot be reached at startup is fatal.
#[derive(Debug, Deserialize, Clone)]
pub struct NodeSettings {
    /// WebSocket endpoint of the node (e.g. wss://mainnet.infura.io/ws/v3/<key>)
    pub ws_url: String,
    /// Pool contract addresses to watch, 0x-prefixed hex
    pub pool_addresses: Vec<String>,
}

/// HTTP query API configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup and passed by reference into each
/// component. There is no process-wide configuration state.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub postgres: PostgresSettings,
    pub node: NodeSettings,
    #[serde(default)]
    pub api: ApiSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
