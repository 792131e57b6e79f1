//! Token store implementations.

pub mod memory;
pub mod token_redis;

pub use memory::InMemoryTokenStore;
pub use token_redis::RedisTokenStore;
