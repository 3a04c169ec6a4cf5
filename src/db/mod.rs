use std::sync::Arc;

use crate::config::Settings;

pub mod error;
pub mod models;
pub mod postgres;

pub use error::StoreError;
pub use postgres::PostgresClient;

/// Database handle shared by the ingestor and the query API.
///
/// PostgreSQL holds the single append-only `pool_logs` table. Rows are
/// written one at a time by the ingestor and never updated or deleted.
#[derive(Clone)]
pub struct Database {
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    pub async fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let postgres = PostgresClient::new(settings.postgres.clone()).await?;

        // Apply the schema before anything reads or writes
        postgres.migrate().await?;

        Ok(Self {
            postgres: Arc::new(postgres),
        })
    }
}
