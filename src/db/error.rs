//! Error types for the pool log store.
//!
//! Query execution failures and invalid caller input are distinct variants;
//! "no matching row" is not an error and is expressed as `Ok(None)` or an
//! empty vector by the store operations.

/// Errors that can occur in the pool log store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A PostgreSQL statement failed.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A connection could not be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The block argument was neither the `latest` sentinel nor an integer.
    #[error("invalid block argument: {0:?}")]
    InvalidBlockArg(String),
}
