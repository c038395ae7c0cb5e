use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the lock protocol.
///
/// `Store` means the backing store failed and the operation was aborted
/// immediately; nothing in this crate retries infrastructure failures.
/// `Timeout` means the key stayed contended for the whole wait window and
/// indicates contention, not infrastructure trouble.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock store operation failed for key {key:?}")]
    Store {
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("timed out after {waited:?} waiting for lock {key:?}")]
    Timeout { key: String, waited: Duration },
}

impl LockError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LockError::Timeout { .. })
    }
}
