//! Subscription store adapters.
//!
//! - `in_memory` - process-local map, for development and tests
//! - `redis` - JSON values plus an index set
//! - `postgres` - one row per user, upsert on write

mod in_memory;
mod postgres;
mod redis;

pub use self::in_memory::InMemorySubscriptionStore;
pub use self::postgres::PostgresSubscriptionStore;
pub use self::redis::RedisSubscriptionStore;
