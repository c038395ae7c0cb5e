use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;

use super::KeyValueStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store for tests and single-process runs.
///
/// Entries carry a deadline and read as absent once it passes, mirroring the
/// TTL behavior of the Redis backend. Uses the tokio clock so tests running
/// under a paused clock still see expiry.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for `key`, if present and unexpired. Test hook; not part
    /// of the `KeyValueStore` contract.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        Self::live(&mut entries, key, now).map(|e| e.value.clone())
    }

    fn live<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a Entry> {
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        entries.get(key)
    }
}

impl KeyValueStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        if Self::live(&mut entries, key, now).is_some() {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key, now).is_some())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() -> Result<()> {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("k", "locked", Duration::from_secs(10)).await?);
        assert!(store.exists("k").await?);
        assert!(!store.set_if_absent("k", "locked", Duration::from_secs(10)).await?);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(!store.exists("k").await?);
        assert!(store.set_if_absent("k", "locked", Duration::from_secs(10)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> Result<()> {
        let store = MemoryStore::new();
        store.delete("missing").await?;
        assert!(store.set_if_absent("k", "locked", Duration::from_secs(10)).await?);
        store.delete("k").await?;
        store.delete("k").await?;
        assert!(!store.exists("k").await?);
        Ok(())
    }
}
