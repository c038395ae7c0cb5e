//! Two tasks contending for the same advisory lock over Redis.
//!
//! Requires a reachable Redis; set `LATCHKEY_REDIS_URL` to override the
//! default `redis://127.0.0.1/`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use latchkey::{LockConfig, LockManager, LockSettings, RedisStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = LockConfig::load().context("failed to load configuration")?;
    let store = RedisStore::from_config(&config)
        .await
        .context("failed to connect to redis")?;
    let manager = Arc::new(LockManager::with_settings(
        store,
        LockSettings::from_config(&config),
    ));

    let key = "demo:report";

    let worker = {
        let manager = manager.clone();
        tokio::spawn(async move {
            manager
                .run_with_lock(key, || async {
                    info!("worker holds the lock");
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(())
                })
                .await
        })
    };

    // Give the worker a head start, then contend for the same key.
    tokio::time::sleep(Duration::from_millis(10)).await;
    info!(free = manager.check_lock(key).await?, "probed lock");

    manager
        .run_with_lock(key, || async {
            info!("main task holds the lock");
            Ok(())
        })
        .await?;

    worker.await??;
    info!("done");
    Ok(())
}
