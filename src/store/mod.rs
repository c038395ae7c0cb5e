//! Key-value store backends for the lock protocol.
//!
//! The lock manager never talks to a concrete store directly; it goes through
//! the `KeyValueStore` trait. Two implementations are provided: `RedisStore`
//! for multi-host coordination and `MemoryStore` for tests and single-process
//! runs.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

/// Trait for shared key-value stores usable as a lock backend.
///
/// The store is the single point of coordination between processes: the only
/// atomicity the protocol relies on is that `set_if_absent` is a true
/// compare-and-set (at most one concurrent claimant wins).
pub trait KeyValueStore: Send + Sync {
    /// Atomically set `key` to `value` with expiry `ttl`, only if `key` does
    /// not currently exist.
    ///
    /// Returns `true` if the set was applied (the key was absent and is now
    /// claimed by this call), `false` if the key was already present.
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Whether `key` currently exists in the store.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Delete `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
