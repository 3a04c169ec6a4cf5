pub mod decoder;
pub mod ingestor;

pub use decoder::{decode_pool_update, DecodedUpdate};
pub use ingestor::{Decimator, PoolIngestor, SAMPLE_INTERVAL};
