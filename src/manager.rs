use std::future::Future;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::LockSettings;
use crate::error::LockError;
use crate::store::KeyValueStore;

/// Value stored under a claimed lock key. Carries no holder identity; any
/// process that observes the key absent may claim it.
pub const LOCK_VALUE: &str = "locked";

/// Cooperative advisory mutex over a shared key-value store.
///
/// At most one process "runs" a critical section identified by a string key
/// at a time, provided every participant goes through the same protocol. The
/// only atomicity this relies on is the store's conditional set: claiming a
/// key succeeds for at most one concurrent claimant. Claims expire after the
/// configured TTL, so a crashed holder cannot wedge a key forever.
///
/// The lock is advisory. Nothing stops a process from touching the guarded
/// resource without asking, and [`release_lock`](Self::release_lock) does not
/// verify ownership.
pub struct LockManager<S> {
    store: S,
    settings: LockSettings,
}

impl<S> LockManager<S> {
    /// Wrap `store` with the default protocol timings (50 ms poll interval,
    /// 10 s acquisition deadline, 10 s claim TTL).
    pub fn new(store: S) -> Self {
        Self::with_settings(store, LockSettings::default())
    }

    pub fn with_settings(store: S, settings: LockSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }
}

impl<S: KeyValueStore> LockManager<S> {
    /// Single non-blocking claim attempt.
    ///
    /// Returns `true` if the key was absent and is now claimed by this call,
    /// `false` if it was already present (another holder, or a stale but
    /// unexpired claim). Store failures surface unchanged; nothing retries
    /// here.
    pub async fn try_lock(&self, key: &str) -> Result<bool, LockError> {
        let got_lock = self
            .store
            .set_if_absent(key, LOCK_VALUE, self.settings.ttl)
            .await
            .map_err(|source| LockError::Store {
                key: key.to_string(),
                source,
            })?;
        if got_lock {
            debug!(key, "acquired lock");
        } else {
            debug!(key, "lock already held");
        }
        Ok(got_lock)
    }

    /// Acquire `key`, polling until the claim succeeds or the deadline
    /// elapses.
    ///
    /// The deadline is checked at the top of each iteration, so the worst
    /// case wait before [`LockError::Timeout`] fires is the configured
    /// maximum plus one poll interval. Store errors abort immediately; only
    /// "not yet acquired" is retried. No fairness: under contention any
    /// waiter may win the next race.
    ///
    /// The wait suspends between attempts rather than blocking the thread,
    /// and is abandoned cleanly if the returned future is dropped.
    pub async fn get_lock(&self, key: &str) -> Result<(), LockError> {
        let start = Instant::now();
        loop {
            let waited = start.elapsed();
            if waited > self.settings.max_wait {
                debug!(key, ?waited, "timed out waiting for lock");
                return Err(LockError::Timeout {
                    key: key.to_string(),
                    waited,
                });
            }
            if self.try_lock(key).await? {
                return Ok(());
            }
            sleep(self.settings.test_interval).await;
        }
    }

    /// Whether `key` is currently free.
    ///
    /// Purely advisory: a `true` result can be invalidated by a concurrent
    /// claim before the caller acts on it. Not a substitute for
    /// [`try_lock`](Self::try_lock).
    pub async fn check_lock(&self, key: &str) -> Result<bool, LockError> {
        let present = self
            .store
            .exists(key)
            .await
            .map_err(|source| LockError::Store {
                key: key.to_string(),
                source,
            })?;
        Ok(!present)
    }

    /// Unconditionally delete `key` from the store.
    ///
    /// The claim record carries no holder identity, so this does not (and
    /// cannot) verify that the caller is the current holder: releasing a key
    /// someone else claimed frees their lock. Releasing an absent key is not
    /// an error.
    pub async fn release_lock(&self, key: &str) -> Result<(), LockError> {
        self.store
            .delete(key)
            .await
            .map_err(|source| LockError::Store {
                key: key.to_string(),
                source,
            })?;
        debug!(key, "released lock");
        Ok(())
    }

    /// Acquire `key`, run `critical_section`, and release exactly once
    /// afterwards regardless of how the section ends.
    ///
    /// If acquisition fails (store error or timeout) the section never runs
    /// and nothing is released. Otherwise the section's error, if any, takes
    /// precedence over a release failure: when both fail the release error is
    /// logged and discarded, and when only the release fails its error is
    /// returned.
    ///
    /// The TTL does not renew while the section runs; a section longer than
    /// the configured TTL can lose exclusivity to another claimant.
    pub async fn run_with_lock<T, F, Fut>(
        &self,
        key: &str,
        critical_section: F,
    ) -> anyhow::Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.get_lock(key).await?;
        let result = critical_section().await;
        match self.release_lock(key).await {
            Ok(()) => result,
            Err(release_err) => match result {
                Ok(_) => Err(release_err.into()),
                Err(cs_err) => {
                    // the critical section's error wins; keep the release
                    // failure visible
                    warn!(key, error = %release_err, "failed to release lock after critical section error");
                    Err(cs_err)
                }
            },
        }
    }
}
