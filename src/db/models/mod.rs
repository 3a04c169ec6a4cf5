pub mod pool_log;

pub use pool_log::PoolLog;
