mod config;

pub use config::{ApiSettings, NodeSettings, PostgresSettings, Settings};
