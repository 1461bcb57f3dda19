//! Brandmark Storage
//!
//! Backends for the availability cache and the provider rate-limit counters.
//! Supports an in-process memory store and Redis.

pub mod memory_store;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use traits::{AvailabilityCache, RateLimitStore, Storage};

#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
