use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use super::KeyValueStore;
use crate::config::LockConfig;

/// Redis-backed store for multi-host lock coordination.
///
/// Wraps a single multiplexed connection that reconnects on failure. The
/// handle is cheap to clone; the intended pattern is to connect once at
/// process start and share the store across all lock managers, closing it
/// only on shutdown.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> Result<Self> {
        debug!(url, "connecting to redis");
        let client = redis::Client::open(url)
            .with_context(|| format!("invalid redis url {url:?}"))?;
        let conn = client
            .get_connection_manager()
            .await
            .with_context(|| format!("failed to connect to redis at {url:?}"))?;
        Ok(Self { conn })
    }

    /// Connect using the url from `config`.
    pub async fn from_config(config: &LockConfig) -> Result<Self> {
        Self::connect(&config.redis_url).await
    }
}

impl KeyValueStore for RedisStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        // SET key value EX <ttl> NX: replies OK when applied, nil when the
        // key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs())
            .arg("NX")
            .query_async(&mut conn)
            .await
            .with_context(|| format!("redis SET NX failed for key {key:?}"))?;
        Ok(reply.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let present: bool = conn
            .exists(key)
            .await
            .with_context(|| format!("redis EXISTS failed for key {key:?}"))?;
        Ok(present)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _removed: i64 = conn
            .del(key)
            .await
            .with_context(|| format!("redis DEL failed for key {key:?}"))?;
        Ok(())
    }
}
