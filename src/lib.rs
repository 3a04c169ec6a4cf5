pub mod abis;
pub mod api;
pub mod config;
pub mod db;
pub mod ingestor;
pub mod utils;

pub use config::Settings;
pub use db::Database;
pub use ingestor::PoolIngestor;
