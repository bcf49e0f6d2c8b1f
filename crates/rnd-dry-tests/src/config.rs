// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake.

use rnd_config::{ConfigError, ConfigService, ConfigStore, ProxyConfig, PROXY_CONFIG_KEY};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Which store operations should fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreFault {
    /// Everything succeeds.
    #[default]
    None,
    /// `load_raw` fails.
    Load,
    /// `save_raw` fails.
    Save,
    /// Both fail.
    Both,
}

/// [`ConfigStore`] keeping blobs in memory, with call counters and fault
/// injection.
///
/// ```
/// use rnd_config::{ConfigService, ProxyConfig};
/// use rnd_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// ConfigService::new(store.clone())
///     .save_proxy_config(&ProxyConfig::default())
///     .unwrap();
/// assert!(store.contains_key("rendering-proxy"));
/// assert_eq!(store.saves(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    blobs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fault: StoreFault,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `config` under the proxy key.
    pub fn with_proxy_config(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let store = Self::new();
        ConfigService::new(store.clone()).save_proxy_config(config)?;
        store.lock().saves = 0;
        Ok(store)
    }

    /// Store holding a raw blob under the proxy key.
    pub fn with_raw_proxy_config(raw: &[u8]) -> Self {
        let store = Self::new();
        store
            .lock()
            .blobs
            .insert(PROXY_CONFIG_KEY.to_owned(), raw.to_vec());
        store
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Choose which operations fail from now on.
    pub fn set_fault(&self, fault: StoreFault) {
        self.lock().fault = fault;
    }

    /// Attempted loads, failures included.
    pub fn loads(&self) -> usize {
        self.lock().loads
    }

    /// Attempted saves, failures included.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    /// Whether a blob is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().blobs.contains_key(key)
    }

    /// Stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut s = self.lock();
        s.loads += 1;
        if matches!(s.fault, StoreFault::Load | StoreFault::Both) {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        s.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut s = self.lock();
        s.saves += 1;
        if matches!(s.fault, StoreFault::Save | StoreFault::Both) {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        s.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}
