pub mod pool;

pub use pool::PoolUpdate;
