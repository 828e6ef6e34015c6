//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS, TIMEOUT_DEFAULT_SECS,
    TIMEOUT_LONG_RUNNING_SECS, TIMEOUT_SHORT_SECS, TIMEOUT_UPLOAD_SECS,
};
use crate::types::{TenantContext, TimeoutTier};

/// RPC client configuration, constructed once at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Base address of the API, e.g. `https://rpc.example.com/api`
    pub base_url: String,
    /// Bearer credential; never serialized
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Per-tier timeouts
    #[serde(default)]
    pub timeouts: TimeoutTiers,
    /// Retry settings
    #[serde(default)]
    pub retry: RetrySettings,
    /// Tenant context merged into every payload
    #[serde(default)]
    pub tenant: TenantContext,
}

/// Per-tier request timeouts in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutTiers {
    /// Interactive reads
    pub short_secs: u64,
    /// Standard reads and writes
    pub default_secs: u64,
    /// Reports and exports
    pub long_running_secs: u64,
    /// Uploads
    pub upload_secs: u64,
}

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    pub base_delay_ms: u64,
}

impl TimeoutTiers {
    /// Timeout applied to calls of `tier`.
    pub fn for_tier(&self, tier: TimeoutTier) -> Duration {
        let secs = match tier {
            TimeoutTier::Short => self.short_secs,
            TimeoutTier::Standard => self.default_secs,
            TimeoutTier::LongRunning => self.long_running_secs,
            TimeoutTier::Upload => self.upload_secs,
        };
        Duration::from_secs(secs)
    }

    /// Largest configured timeout, used as the connection-level ceiling.
    pub fn max(&self) -> Duration {
        let secs = self
            .short_secs
            .max(self.default_secs)
            .max(self.long_running_secs)
            .max(self.upload_secs);
        Duration::from_secs(secs)
    }
}

impl RetrySettings {
    /// Base backoff delay as a `Duration`.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for TimeoutTiers {
    fn default() -> Self {
        Self {
            short_secs: TIMEOUT_SHORT_SECS,
            default_secs: TIMEOUT_DEFAULT_SECS,
            long_running_secs: TIMEOUT_LONG_RUNNING_SECS,
            upload_secs: TIMEOUT_UPLOAD_SECS,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES, base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeouts: TimeoutTiers::default(),
            retry: RetrySettings::default(),
            tenant: TenantContext::default(),
        }
    }
}
