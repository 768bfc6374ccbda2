//! Record store client.
//!
//! A thin contract over a key-value store: plain values, hash fields, and an
//! optimistic transaction primitive (watch keys, then commit a batch of
//! writes that only lands if none of the watched keys changed).

mod memory;
mod optimistic;
mod redis_store;

pub use self::memory::MemoryStore;
pub use self::optimistic::{optimistic_update, RetryPolicy};
pub use self::redis_store::RedisStore;

use async_trait::async_trait;
use std::collections::HashMap;

/// Result type for store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] bb8_redis::redis::RedisError),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Store state poisoned")]
    Poisoned,

    #[error("Wrong value type at key {0}")]
    WrongType(String),
}

impl From<bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>> for StoreError {
    fn from(err: bb8_redis::bb8::RunError<bb8_redis::redis::RedisError>) -> Self {
        match err {
            bb8_redis::bb8::RunError::User(e) => StoreError::Redis(e),
            other => StoreError::Pool(other.to_string()),
        }
    }
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Set {
        key: String,
        value: String,
    },
    HashSet {
        key: String,
        field: String,
        value: String,
    },
}

/// Ordered writes committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain `SET`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.writes.push(Write::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queue a hash field write.
    pub fn hash_set(
        mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.writes.push(Write::HashSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Write> {
        self.writes.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// Result of committing a watched transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every write landed.
    Committed,
    /// A watched key changed since `watch`; nothing was written.
    Aborted,
}

/// Key-value store operations used by the server.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    /// Values of `fields` in the hash at `key`, aligned positionally with
    /// `fields`.
    async fn multi_get(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Start watching `keys`. The returned session reads and commits on
    /// the same connection.
    async fn watch(&self, keys: &[String]) -> StoreResult<Box<dyn Watch>>;
}

/// An open watch session.
#[async_trait]
pub trait Watch: Send {
    async fn get(&mut self, key: &str) -> StoreResult<Option<String>>;

    /// Drop the watch without writing.
    async fn unwatch(self: Box<Self>) -> StoreResult<()>;

    /// Apply `batch` atomically, unless a watched key changed.
    async fn commit(self: Box<Self>, batch: WriteBatch) -> StoreResult<CommitOutcome>;
}

/// Store key layout.
pub mod keys {
    /// Serialized user record.
    pub fn user(id: &str) -> String {
        format!("user:{}", id)
    }

    /// Hash of `userId -> rating` for a movie.
    pub fn movie_ratings(movie_id: &str) -> String {
        format!("movie:ratings:{}", movie_id)
    }

    /// Serialized rating summary for a movie.
    pub fn movie_summary(movie_id: &str) -> String {
        format!("movie:summary:{}", movie_id)
    }
}
