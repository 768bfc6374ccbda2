//! Redis-backed record store.

use super::{CommitOutcome, RecordStore, StoreResult, Watch, Write, WriteBatch};
use async_trait::async_trait;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis;
use bb8_redis::RedisConnectionManager;
use std::collections::HashMap;

/// Record store backed by a pooled Redis connection.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisStore {
    /// Connect to `redis_url` with a pool of up to `max_size` connections.
    pub async fn connect(redis_url: &str, max_size: u32) -> StoreResult<Self> {
        let manager = RedisConnectionManager::new(redis_url)?;
        let pool = Pool::builder().max_size(max_size).build(manager).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.pool.get().await?;
        let () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.pool.get().await?;
        let _added: i64 = redis::cmd("HSET")
            .arg(key)
            .arg(field)
            .arg(value)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.pool.get().await?;
        let values: HashMap<String, String> =
            redis::cmd("HGETALL").arg(key).query_async(&mut *conn).await?;
        Ok(values)
    }

    async fn multi_get(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(&mut *conn)
            .await?;
        Ok(values)
    }

    async fn watch(&self, keys: &[String]) -> StoreResult<Box<dyn Watch>> {
        // WATCH state lives on the connection, so the session keeps it
        // checked out until commit or unwatch. A session dropped before
        // either returns its connection still watching; UNWATCH clears that.
        let mut conn = self.pool.get_owned().await?;
        let () = redis::pipe()
            .cmd("UNWATCH")
            .ignore()
            .cmd("WATCH")
            .arg(keys)
            .ignore()
            .query_async(&mut *conn)
            .await?;
        Ok(Box::new(RedisWatch { conn }))
    }
}

/// Watch session holding its own pooled connection.
struct RedisWatch {
    conn: PooledConnection<'static, RedisConnectionManager>,
}

#[async_trait]
impl Watch for RedisWatch {
    async fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *self.conn)
            .await?;
        Ok(value)
    }

    async fn unwatch(mut self: Box<Self>) -> StoreResult<()> {
        let () = redis::cmd("UNWATCH").query_async(&mut *self.conn).await?;
        Ok(())
    }

    async fn commit(mut self: Box<Self>, batch: WriteBatch) -> StoreResult<CommitOutcome> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for write in batch {
            match write {
                Write::Set { key, value } => {
                    pipe.cmd("SET").arg(key).arg(value).ignore();
                }
                Write::HashSet { key, field, value } => {
                    pipe.cmd("HSET").arg(key).arg(field).arg(value).ignore();
                }
            }
        }

        // EXEC replies nil when a watched key was modified.
        let reply: Option<()> = pipe.query_async(&mut *self.conn).await?;
        Ok(match reply {
            Some(()) => CommitOutcome::Committed,
            None => CommitOutcome::Aborted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn connect(max_size: u32) -> RedisStore {
        let url = std::env::var("REDIS_URL").expect("REDIS_URL must point at a Redis server");
        RedisStore::connect(&url, max_size).await.unwrap()
    }

    fn unique_key(name: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("moocho:test:{}:{}", name, nanos)
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn commit_applies_batch_when_untouched() {
        let store = connect(2).await;
        let key = unique_key("commit");
        let hash = unique_key("commit-hash");

        let mut watch = store.watch(std::slice::from_ref(&key)).await.unwrap();
        assert_eq!(watch.get(&key).await.unwrap(), None);
        let batch = WriteBatch::new()
            .set(key.clone(), "1")
            .hash_set(hash.clone(), "u1", "7");

        assert_eq!(watch.commit(batch).await.unwrap(), CommitOutcome::Committed);
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("1"));
        let fields = vec!["u1".to_string(), "u2".to_string()];
        assert_eq!(
            store.multi_get(&hash, &fields).await.unwrap(),
            vec![Some("7".to_string()), None]
        );
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn nil_exec_reply_is_aborted() {
        let store = connect(2).await;
        let key = unique_key("abort");
        store.set(&key, "1").await.unwrap();

        let mut watch = store.watch(std::slice::from_ref(&key)).await.unwrap();
        assert_eq!(watch.get(&key).await.unwrap().as_deref(), Some("1"));
        store.set(&key, "2").await.unwrap();

        let outcome = watch
            .commit(WriteBatch::new().set(key.clone(), "3"))
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Aborted);
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn dropped_session_does_not_abort_the_next_one() {
        // One connection, so every call below reuses it.
        let store = connect(1).await;
        let stale = unique_key("stale");
        let fresh = unique_key("fresh");

        drop(store.watch(std::slice::from_ref(&stale)).await.unwrap());
        store.set(&stale, "changed").await.unwrap();

        let watch = store.watch(std::slice::from_ref(&fresh)).await.unwrap();
        let outcome = watch
            .commit(WriteBatch::new().set(fresh.clone(), "1"))
            .await
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Committed);
    }
}
