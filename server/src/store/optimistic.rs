//! Optimistic read-modify-write over watched keys.
//!
//! Each attempt runs WATCH, READ, VALIDATE, BUILD-WRITES and COMMIT. If a
//! watched key changed before the commit, the attempt is thrown away and
//! restarted from WATCH, up to [`RetryPolicy::max_attempts`] times.

use super::{CommitOutcome, RecordStore, Watch, WriteBatch};
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Bound and backoff for [`optimistic_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up; at least 1
    pub max_attempts: u32,
    /// Delay after the first aborted attempt, doubled after each further one
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after attempt number `attempt` (1-based) aborted.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `plan` against the current values of `keys` and commit its writes
/// atomically, retrying while other writers get there first.
///
/// `plan` receives each key's value decoded as `R` (`None` if absent), in
/// the order of `keys`. It returns the writes to commit and the value to
/// hand back, or an error that ends the call without retrying. Running out
/// of attempts yields [`AppError::Unavailable`].
pub async fn optimistic_update<R, T, F, const N: usize>(
    store: &dyn RecordStore,
    policy: &RetryPolicy,
    action: &str,
    keys: &[String; N],
    mut plan: F,
) -> Result<T>
where
    R: DeserializeOwned,
    F: FnMut([Option<R>; N]) -> Result<(WriteBatch, T)>,
{
    for attempt in 1..=policy.max_attempts {
        let mut watch = store.watch(keys).await?;

        let records = match read_watched::<R, N>(watch.as_mut(), keys).await {
            Ok(records) => records,
            Err(err) => {
                release(watch).await;
                return Err(err);
            }
        };

        let (batch, output) = match plan(records) {
            Ok(step) => step,
            Err(err) => {
                release(watch).await;
                return Err(err);
            }
        };

        match watch.commit(batch).await? {
            CommitOutcome::Committed => {
                if attempt > 1 {
                    tracing::debug!(action, attempt, "Committed after retry");
                }
                return Ok(output);
            }
            CommitOutcome::Aborted => {
                tracing::debug!(action, attempt, keys = ?keys, "Watched key changed, retrying");
                let delay = policy.delay_for(attempt);
                if attempt < policy.max_attempts && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    tracing::warn!(
        action,
        attempts = policy.max_attempts,
        keys = ?keys,
        "Gave up after repeated commit conflicts"
    );
    Err(AppError::Unavailable(format!(
        "Could not {}, please try again",
        action
    )))
}

async fn read_watched<R: DeserializeOwned, const N: usize>(
    watch: &mut dyn Watch,
    keys: &[String; N],
) -> Result<[Option<R>; N]> {
    let mut records = Vec::with_capacity(N);
    for key in keys {
        let record = watch
            .get(key)
            .await?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()?;
        records.push(record);
    }
    records
        .try_into()
        .map_err(|_| AppError::Internal("watched key count mismatch".to_string()))
}

async fn release(watch: Box<dyn Watch>) {
    if let Err(e) = watch.unwatch().await {
        tracing::warn!("Failed to release watch: {}", e);
    }
}
