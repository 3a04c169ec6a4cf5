//! Utility functions for the poolscope ingestor.
//!
//! - [`conversion`] - Hex encoding and lossy 256-bit to 64-bit narrowing

mod conversion;

pub use conversion::{hex_encode, topic_to_i64, u256_to_i64_lossy};
