//! Cooperative advisory distributed lock over a shared key-value store.
//!
//! Independent processes agree, through one shared store, that at most one of
//! them runs a critical section identified by a string key at a time. Claims
//! carry a TTL so a crashed holder cannot wedge a key forever; beyond that
//! the lock is strictly advisory and offers no fencing, fairness, or
//! consensus-grade guarantees.
//!
//! ```rust,no_run
//! use latchkey::{LockManager, RedisStore};
//!
//! async fn example() -> anyhow::Result<()> {
//!     // Connect once at process start and share the store handle.
//!     let store = RedisStore::connect("redis://127.0.0.1/").await?;
//!     let manager = LockManager::new(store);
//!
//!     manager
//!         .run_with_lock("doc:12345", || async {
//!             // ... exclusive work ...
//!             Ok(())
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod store;

pub use config::{LockConfig, LockSettings};
pub use error::LockError;
pub use manager::{LockManager, LOCK_VALUE};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
