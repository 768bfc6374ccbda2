//! In-process record store.
//!
//! Used for local development (`STORE_BACKEND=memory`) and tests. Every key
//! carries a version stamped from a store-wide counter; a watch session
//! remembers the versions it saw and its commit aborts if any moved.

use super::{CommitOutcome, RecordStore, StoreError, StoreResult, Watch, Write, WriteBatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Value {
    String(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug)]
struct Slot {
    version: u64,
    value: Value,
}

#[derive(Debug, Default)]
struct State {
    slots: HashMap<String, Slot>,
    clock: u64,
}

impl State {
    /// Version of `key`; absent keys are version 0.
    fn version(&self, key: &str) -> u64 {
        self.slots.get(key).map(|s| s.version).unwrap_or(0)
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        match self.slots.get(key).map(|s| &s.value) {
            None => Ok(None),
            Some(Value::String(v)) => Ok(Some(v.clone())),
            Some(Value::Hash(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn get_hash(&self, key: &str) -> StoreResult<Option<&HashMap<String, String>>> {
        match self.slots.get(key).map(|s| &s.value) {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(Some(h)),
            Some(Value::String(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn set(&mut self, key: &str, value: String) {
        let version = self.tick();
        self.slots.insert(
            key.to_string(),
            Slot {
                version,
                value: Value::String(value),
            },
        );
    }

    fn hash_set(&mut self, key: &str, field: String, value: String) -> StoreResult<()> {
        let version = self.tick();
        let slot = self.slots.entry(key.to_string()).or_insert_with(|| Slot {
            version,
            value: Value::Hash(HashMap::new()),
        });
        match &mut slot.value {
            Value::Hash(h) => {
                h.insert(field, value);
                slot.version = version;
                Ok(())
            }
            Value::String(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    /// Check a batch can be applied before touching anything, so a wrong
    /// type never leaves half a batch written.
    fn check_batch(&self, batch: &WriteBatch) -> StoreResult<()> {
        for write in batch.iter() {
            if let Write::HashSet { key, .. } = write {
                if let Some(Slot {
                    value: Value::String(_),
                    ..
                }) = self.slots.get(key)
                {
                    return Err(StoreError::WrongType(key.clone()));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, batch: WriteBatch) -> StoreResult<()> {
        for write in batch {
            match write {
                Write::Set { key, value } => self.set(&key, value),
                Write::HashSet { key, field, value } => self.hash_set(&key, field, value)?,
            }
        }
        Ok(())
    }
}

/// Record store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<State>) -> StoreResult<MutexGuard<'_, State>> {
    state.lock().map_err(|_| StoreError::Poisoned)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        tokio::task::yield_now().await;
        self.lock()?.get_string(key)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.lock()?.set(key, value.to_string());
        Ok(())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.lock()?
            .hash_set(key, field.to_string(), value.to_string())
    }

    async fn hash_get_all(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        tokio::task::yield_now().await;
        Ok(self.lock()?.get_hash(key)?.cloned().unwrap_or_default())
    }

    async fn multi_get(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        tokio::task::yield_now().await;
        let state = self.lock()?;
        let hash = state.get_hash(key)?;
        Ok(fields
            .iter()
            .map(|f| hash.and_then(|h| h.get(f).cloned()))
            .collect())
    }

    async fn watch(&self, keys: &[String]) -> StoreResult<Box<dyn Watch>> {
        tokio::task::yield_now().await;
        let watched = {
            let state = self.lock()?;
            keys.iter()
                .map(|k| (k.clone(), state.version(k)))
                .collect()
        };
        Ok(Box::new(MemoryWatch {
            state: Arc::clone(&self.state),
            watched,
        }))
    }
}

/// Watch session over a [`MemoryStore`].
struct MemoryWatch {
    state: Arc<Mutex<State>>,
    watched: Vec<(String, u64)>,
}

#[async_trait]
impl Watch for MemoryWatch {
    async fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        tokio::task::yield_now().await;
        lock(&self.state)?.get_string(key)
    }

    async fn unwatch(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }

    async fn commit(self: Box<Self>, batch: WriteBatch) -> StoreResult<CommitOutcome> {
        tokio::task::yield_now().await;
        let mut state = lock(&self.state)?;
        let unchanged = self
            .watched
            .iter()
            .all(|(key, version)| state.version(key) == *version);
        if !unchanged {
            return Ok(CommitOutcome::Aborted);
        }
        state.check_batch(&batch)?;
        state.apply(batch)?;
        Ok(CommitOutcome::Committed)
    }
}
