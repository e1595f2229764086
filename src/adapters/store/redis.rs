//! Redis-backed subscription store.
//!
//! Each record is a JSON string at `<prefix>:<user_id>`; the set
//! `<prefix>:index` holds every user id with a record so `list` does not
//! need `KEYS`/`SCAN`. `put` and `delete` update both in one MULTI/EXEC.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::SubscriptionStore;

#[derive(Clone)]
pub struct RedisSubscriptionStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
}

impl RedisSubscriptionStore {
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str, key_prefix: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| DomainError::new(ErrorCode::CacheError, "Timed out connecting to Redis"))?
            .map_err(cache_error)?;
        Ok(Self::new(conn, key_prefix, timeout))
    }

    fn record_key(&self, user_id: &str) -> String {
        record_key(&self.key_prefix, user_id)
    }

    fn index_key(&self) -> String {
        index_key(&self.key_prefix)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| DomainError::new(ErrorCode::CacheError, "Redis operation timed out"))?
            .map_err(cache_error)
    }
}

fn record_key(prefix: &str, user_id: &str) -> String {
    format!("{}:{}", prefix, user_id)
}

fn index_key(prefix: &str) -> String {
    format!("{}:index", prefix)
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Redis error: {}", e))
}

fn decode(raw: &str) -> Result<SubscriptionRecord, DomainError> {
    serde_json::from_str(raw).map_err(|e| {
        DomainError::new(
            ErrorCode::SerializationError,
            format!("Corrupt subscription record: {}", e),
        )
    })
}

#[async_trait]
impl SubscriptionStore for RedisSubscriptionStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SubscriptionRecord>, DomainError> {
        let key = self.record_key(user_id.as_str());
        let mut conn = self.conn.clone();

        let raw: Option<String> = self.bounded(conn.get(&key)).await?;
        raw.as_deref().map(decode).transpose()
    }

    async fn put(&self, record: &SubscriptionRecord) -> Result<(), DomainError> {
        let key = self.record_key(record.user_id.as_str());
        let body = serde_json::to_string(record)
            .map_err(|e| DomainError::new(ErrorCode::SerializationError, e.to_string()))?;
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(&key, body)
            .ignore()
            .sadd(self.index_key(), record.user_id.as_str())
            .ignore();

        self.bounded(pipe.query_async::<_, ()>(&mut conn)).await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        let key = self.record_key(user_id.as_str());
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&key)
            .ignore()
            .srem(self.index_key(), user_id.as_str())
            .ignore();

        self.bounded(pipe.query_async::<_, ()>(&mut conn)).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<SubscriptionRecord>, DomainError> {
        let mut conn = self.conn.clone();

        let user_ids: Vec<String> = self.bounded(conn.smembers(self.index_key())).await?;
        if user_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = user_ids.iter().map(|id| self.record_key(id)).collect();
        let raws: Vec<Option<String>> = self.bounded(conn.get(keys)).await?;

        let mut records = raws
            .iter()
            .flatten()
            .map(|raw| decode(raw))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records.truncate(limit);
        Ok(records)
    }
}

impl std::fmt::Debug for RedisSubscriptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSubscriptionStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::test_support::plus_record;

    #[test]
    fn keys_are_namespaced_by_prefix() {
        assert_eq!(record_key("subscription", "u1"), "subscription:u1");
        assert_eq!(index_key("subscription"), "subscription:index");
    }

    #[test]
    fn stored_json_decodes_back() {
        let record = plus_record("u1");
        let raw = serde_json::to_string(&record).unwrap();
        assert_eq!(decode(&raw).unwrap(), record);
    }

    #[test]
    fn corrupt_json_is_a_serialization_error() {
        let err = decode("{\"user_id\":").unwrap_err();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }

    // Round trips against a live server run separately:
    //
    // #[tokio::test]
    // #[ignore] // cargo test -- --ignored
    // async fn redis_store_round_trip() {
    //     let store = RedisSubscriptionStore::connect("redis://127.0.0.1/", "test-sub", Duration::from_secs(2)).await.unwrap();
    //     ...
    // }
}
