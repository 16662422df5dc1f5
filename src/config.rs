//! Core configuration
//!
//! Limits applied by the encoders plus the well-known contract addresses of
//! each Safe release. Settings come from defaults, a JSON file or
//! `SAFE_MULTISIG_*` environment variables.

use crate::error::{SafeError, SafeResult};
use crate::utils::logging;
use ethers_core::types::{Address, H160};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// Per-item data limit. Matches the 128 KiB transaction size cap most
/// nodes enforce on their mempool.
pub const DEFAULT_MAX_BATCH_ITEM_SIZE: usize = 128 * 1024;
pub const DEFAULT_MAX_BATCH_ITEMS: usize = 256;

pub const ENV_MAX_ITEM_SIZE: &str = "SAFE_MULTISIG_MAX_ITEM_SIZE";
pub const ENV_MAX_ITEMS: &str = "SAFE_MULTISIG_MAX_ITEMS";
pub const ENV_DEBUG: &str = "SAFE_MULTISIG_DEBUG";

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<CoreConfig> = RwLock::new(CoreConfig::default());
}

/// Encoder limits and logging switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    /// Largest `data` accepted for a single batch item, in bytes
    pub max_batch_item_size: usize,
    /// Largest number of items accepted in one batch
    pub max_batch_items: usize,
    pub debug_logging: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_batch_item_size: DEFAULT_MAX_BATCH_ITEM_SIZE,
            max_batch_items: DEFAULT_MAX_BATCH_ITEMS,
            debug_logging: false,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> SafeResult<Self> {
        let config: CoreConfig = serde_json::from_str(json)
            .map_err(|e| SafeError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SafeResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SafeError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Defaults overridden by any `SAFE_MULTISIG_*` variables that are set
    pub fn from_env() -> SafeResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> SafeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ITEM_SIZE) {
            self.max_batch_item_size = parse_usize(ENV_MAX_ITEM_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_ITEMS) {
            self.max_batch_items = parse_usize(ENV_MAX_ITEMS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEBUG) {
            self.debug_logging = matches!(raw.trim(), "1" | "true" | "yes" | "on");
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> SafeResult<()> {
        if self.max_batch_item_size == 0 {
            return Err(SafeError::Config("max_batch_item_size must be positive".into()));
        }
        if self.max_batch_items == 0 {
            return Err(SafeError::Config("max_batch_items must be positive".into()));
        }
        Ok(())
    }

    /// Push the logging switch into the global logger
    pub fn apply_logging(&self) {
        if self.debug_logging {
            logging::enable_debug();
        } else {
            logging::disable_debug();
        }
    }
}

fn parse_usize(key: &str, raw: &str) -> SafeResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| SafeError::Config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}

/// Snapshot of the process-wide configuration
pub fn global() -> CoreConfig {
    match GLOBAL_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide configuration
pub fn set_global(config: CoreConfig) -> SafeResult<()> {
    config.validate()?;
    config.apply_logging();
    let mut guard = GLOBAL_CONFIG
        .write()
        .map_err(|_| SafeError::Config("config lock poisoned".into()))?;
    *guard = config;
    Ok(())
}

// =============================================================================
// Deployments
// =============================================================================

/// Contract addresses of one Safe release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDeployment {
    pub version: SafeVersion,
    pub singleton: Address,
    pub singleton_l2: Address,
    pub proxy_factory: Address,
    pub multi_send: Address,
    pub multi_send_call_only: Address,
    pub fallback_handler: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeVersion {
    #[serde(rename = "1.3.0")]
    V1_3_0,
    #[serde(rename = "1.4.1")]
    V1_4_1,
}

impl SafeDeployment {
    pub fn v1_4_1() -> Self {
        Self {
            version: SafeVersion::V1_4_1,
            singleton: H160([
                0x41, 0x67, 0x5c, 0x09, 0x9f, 0x32, 0x34, 0x1b, 0xf8, 0x4b, 0xfc, 0x53, 0x82, 0xaf,
                0x53, 0x4d, 0xf5, 0xc7, 0x46, 0x1a,
            ]),
            singleton_l2: H160([
                0x29, 0xfc, 0xb4, 0x3b, 0x46, 0x53, 0x1b, 0xca, 0x00, 0x3d, 0xdc, 0x8f, 0xcb, 0x67,
                0xff, 0xe9, 0x19, 0x00, 0xc7, 0x62,
            ]),
            proxy_factory: H160([
                0x4e, 0x1d, 0xcf, 0x7a, 0xd4, 0xe4, 0x60, 0xcf, 0xd3, 0x07, 0x91, 0xcc, 0xc4, 0xf9,
                0xc8, 0xa4, 0xf8, 0x20, 0xec, 0x67,
            ]),
            multi_send: H160([
                0x38, 0x86, 0x9b, 0xf6, 0x6a, 0x61, 0xcf, 0x6b, 0xdb, 0x99, 0x6a, 0x6a, 0xe4, 0x0d,
                0x58, 0x53, 0xfd, 0x43, 0xb5, 0x26,
            ]),
            multi_send_call_only: H160([
                0x96, 0x41, 0xd7, 0x64, 0xfc, 0x13, 0xc8, 0xb6, 0x24, 0xc0, 0x44, 0x30, 0xc7, 0x35,
                0x6c, 0x1c, 0x7c, 0x81, 0x02, 0xe2,
            ]),
            fallback_handler: H160([
                0xfd, 0x07, 0x32, 0xdc, 0x9e, 0x30, 0x3f, 0x09, 0xfc, 0xef, 0x3a, 0x73, 0x88, 0xad,
                0x10, 0xa8, 0x34, 0x59, 0xec, 0x99,
            ]),
        }
    }

    pub fn v1_3_0() -> Self {
        Self {
            version: SafeVersion::V1_3_0,
            singleton: H160([
                0xd9, 0xdb, 0x27, 0x0c, 0x1b, 0x5e, 0x3b, 0xd1, 0x61, 0xe8, 0xc8, 0x50, 0x3c, 0x55,
                0xce, 0xab, 0xee, 0x70, 0x95, 0x52,
            ]),
            singleton_l2: H160([
                0x3e, 0x5c, 0x63, 0x64, 0x4e, 0x68, 0x35, 0x49, 0x05, 0x5b, 0x9b, 0xe8, 0x65, 0x3d,
                0xe2, 0x6e, 0x0b, 0x4c, 0xd3, 0x6e,
            ]),
            proxy_factory: H160([
                0xa6, 0xb7, 0x1e, 0x26, 0xc5, 0xe0, 0x84, 0x5f, 0x74, 0xc8, 0x12, 0x10, 0x2c, 0xa7,
                0x11, 0x4b, 0x6a, 0x89, 0x6a, 0xb2,
            ]),
            multi_send: H160([
                0xa2, 0x38, 0xcb, 0xeb, 0x14, 0x2c, 0x10, 0xef, 0x7a, 0xd8, 0x44, 0x2c, 0x6d, 0x1f,
                0x9e, 0x89, 0xe0, 0x7e, 0x77, 0x61,
            ]),
            multi_send_call_only: H160([
                0x40, 0xa2, 0xac, 0xcb, 0xd9, 0x2b, 0xca, 0x93, 0x8b, 0x02, 0x01, 0x0e, 0x17, 0xa5,
                0xb8, 0x92, 0x9b, 0x49, 0x13, 0x0d,
            ]),
            fallback_handler: H160([
                0xf4, 0x8f, 0x2b, 0x2d, 0x2a, 0x53, 0x4e, 0x40, 0x24, 0x87, 0xb3, 0xee, 0x7c, 0x18,
                0xc3, 0x3a, 0xec, 0x0f, 0xe5, 0xe4,
            ]),
        }
    }

    pub fn from_json(json: &str) -> SafeResult<Self> {
        serde_json::from_str(json).map_err(|e| SafeError::Config(format!("invalid deployment JSON: {}", e)))
    }
}

impl Default for SafeDeployment {
    fn default() -> Self {
        Self::v1_4_1()
    }
}
