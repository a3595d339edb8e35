//! # Pycket Redis
//! 
//! Redis adapter for the session store port.

pub mod options;
pub mod store;

pub use options::RedisOptions;
pub use store::{RedisConnector, RedisStore};
