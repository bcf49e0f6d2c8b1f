// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Settings persistence for the rendering proxy.
//!
//! [`ConfigStore`] moves opaque blobs by key; [`ConfigService`] turns them
//! into typed values as JSON. [`ProxyConfig`] holds the proxy tunables.
#![forbid(unsafe_code)]

use rnd_model::CompressionLevel;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Key of the [`ProxyConfig`] blob.
pub const PROXY_CONFIG_KEY: &str = "rendering-proxy";

/// Blob storage keyed by name.
pub trait ConfigStore {
    /// Bytes stored under `key`, [`ConfigError::NotFound`] if there are none.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replace whatever is stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Config loading and saving failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("no config stored under this key")]
    NotFound,
    /// Storage I/O failed.
    #[error("config storage: {0}")]
    Io(#[from] std::io::Error),
    /// The blob is not valid JSON for the requested type.
    #[error("malformed config: {0}")]
    Serde(#[from] serde_json::Error),
    /// The blob parsed but holds values the proxy cannot use.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Store-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Typed access to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Value stored under `key`; `None` when absent or empty.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Err(ConfigError::NotFound) => return Ok(None),
            other => other?,
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Store `value` under `key` as pretty JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        self.store.save_raw(key, &serde_json::to_vec_pretty(value)?)
    }

    /// Stored proxy tunables, defaults when none are stored.
    ///
    /// A stored blob is checked with [`ProxyConfig::validate`].
    pub fn load_proxy_config(&self) -> Result<ProxyConfig, ConfigError> {
        let config: ProxyConfig = self.load(PROXY_CONFIG_KEY)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Persist the proxy tunables after checking them.
    pub fn save_proxy_config(&self, config: &ProxyConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.save(PROXY_CONFIG_KEY, config)
    }
}

/// Tunables of a rendering proxy.
///
/// Missing fields in a stored blob take their default value, so older files
/// keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Memory budget of one proxy's plane cache, in bytes.
    pub cache_budget_bytes: usize,
    /// Compression level a new proxy starts with.
    pub default_compression: CompressionLevel,
    /// Quality factor sent to the engine for [`CompressionLevel::Medium`].
    pub medium_quality: f32,
    /// Quality factor sent to the engine for [`CompressionLevel::Low`].
    pub low_quality: f32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_budget_bytes: 64 * 1024 * 1024,
            default_compression: CompressionLevel::Medium,
            medium_quality: 0.85,
            low_quality: 0.5,
        }
    }
}

impl ProxyConfig {
    /// Quality factor for `level`; uncompressed is always 1.
    pub fn quality_for(&self, level: CompressionLevel) -> f32 {
        match level {
            CompressionLevel::Uncompressed => 1.0,
            CompressionLevel::Medium => self.medium_quality,
            CompressionLevel::Low => self.low_quality,
        }
    }

    /// Check that both quality factors lie in `(0, 1]` and the cache budget
    /// is not zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, quality) in [("medium", self.medium_quality), ("low", self.low_quality)] {
            if !(quality > 0.0 && quality <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} quality {quality} is outside (0, 1]"
                )));
            }
        }
        if self.cache_budget_bytes == 0 {
            return Err(ConfigError::Invalid("cache budget is zero".into()));
        }
        Ok(())
    }
}
