use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Milliseconds between successive acquisition attempts while waiting.
pub const LOCK_TEST_INTERVAL_MS: u64 = 50;
/// Milliseconds a caller waits for a contended lock before giving up.
pub const MAX_LOCK_WAIT_TIME_MS: u64 = 10_000;
/// Seconds the store retains a claim before auto-expiring it.
pub const LOCK_TTL_SECONDS: u64 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockConfig {
    /// Redis connection url shared by every lock manager in the process.
    pub redis_url: String,
    /// Poll interval between acquisition attempts, in milliseconds.
    pub lock_test_interval_ms: u64,
    /// Overall acquisition deadline, in milliseconds.
    pub max_lock_wait_time_ms: u64,
    /// Claim expiry, in seconds.
    pub lock_ttl_seconds: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1/".to_string(),
            lock_test_interval_ms: LOCK_TEST_INTERVAL_MS,
            max_lock_wait_time_ms: MAX_LOCK_WAIT_TIME_MS,
            lock_ttl_seconds: LOCK_TTL_SECONDS,
        }
    }
}

impl LockConfig {
    /// Load configuration: defaults overlaid with `LATCHKEY_*` environment
    /// variables (e.g. `LATCHKEY_REDIS_URL`).
    pub fn load() -> anyhow::Result<Self> {
        let defaults_json = serde_json::to_string(&Self::default())
            .with_context(|| "failed to serialize defaults")?;
        let settings = config::Config::builder()
            .add_source(
                config::File::from_str(&defaults_json, config::FileFormat::Json).required(false),
            )
            .add_source(config::Environment::with_prefix("LATCHKEY"))
            .build()
            .with_context(|| "failed to load configuration")?;
        let cfg: LockConfig = settings
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.lock_test_interval_ms == 0 {
            anyhow::bail!("lock_test_interval_ms must be positive");
        }
        if self.lock_ttl_seconds == 0 {
            anyhow::bail!("lock_ttl_seconds must be positive");
        }
        Ok(())
    }
}

/// Protocol timings derived from configuration.
#[derive(Debug, Clone)]
pub struct LockSettings {
    pub test_interval: Duration,
    pub max_wait: Duration,
    pub ttl: Duration,
}

impl LockSettings {
    pub fn from_config(config: &LockConfig) -> Self {
        Self {
            test_interval: Duration::from_millis(config.lock_test_interval_ms),
            max_wait: Duration::from_millis(config.max_lock_wait_time_ms),
            ttl: Duration::from_secs(config.lock_ttl_seconds),
        }
    }
}

impl Default for LockSettings {
    fn default() -> Self {
        Self::from_config(&LockConfig::default())
    }
}
