// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory cache service.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::{CacheId, CacheService};

/// In-memory [`CacheService`] with least-recently-used eviction per slot.
///
/// The slot table sits behind one `Mutex`, so slots can be created and
/// removed from several threads. A poisoned lock is recovered rather than
/// propagated: the cache holds no invariant a panicking writer could break
/// beyond losing entries.
pub struct MemoryCacheService<V> {
    inner: Mutex<Inner<V>>,
}

struct Inner<V> {
    next_id: u64,
    slots: HashMap<CacheId, Slot<V>>,
}

struct Slot<V> {
    capacity: usize,
    entries: HashMap<u64, V>,
    // Front is least recently used.
    order: VecDeque<u64>,
}

impl<V> Slot<V> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }

    fn evict_overflow(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.entries.remove(&old);
            }
        }
    }
}

impl<V> MemoryCacheService<V> {
    /// Create a service with no slots.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                slots: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.lock().slots.len()
    }

    /// Number of entries in slot `id`, `None` if the slot does not exist.
    pub fn len(&self, id: CacheId) -> Option<usize> {
        self.lock().slots.get(&id).map(|s| s.entries.len())
    }

    /// Capacity of slot `id`, `None` if the slot does not exist.
    pub fn capacity(&self, id: CacheId) -> Option<usize> {
        self.lock().slots.get(&id).map(|s| s.capacity)
    }
}

impl<V> Default for MemoryCacheService<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheService<V> for MemoryCacheService<V>
where
    V: Clone + Send,
{
    fn create_cache(&self, capacity: usize) -> CacheId {
        let mut inner = self.lock();
        let id = CacheId(inner.next_id);
        inner.next_id += 1;
        inner.slots.insert(id, Slot::new(capacity));
        debug!(%id, capacity, "created cache slot");
        id
    }

    fn get_element(&self, id: CacheId, key: u64) -> Option<V> {
        let mut inner = self.lock();
        let slot = inner.slots.get_mut(&id)?;
        let value = slot.entries.get(&key).cloned()?;
        slot.touch(key);
        Some(value)
    }

    fn add_element(&self, id: CacheId, key: u64, value: V) {
        let mut inner = self.lock();
        if let Some(slot) = inner.slots.get_mut(&id) {
            slot.entries.insert(key, value);
            slot.touch(key);
            slot.evict_overflow();
        }
    }

    fn clear_cache(&self, id: CacheId) {
        if let Some(slot) = self.lock().slots.get_mut(&id) {
            slot.entries.clear();
            slot.order.clear();
        }
    }

    fn remove_cache(&self, id: CacheId) {
        if self.lock().slots.remove(&id).is_some() {
            debug!(%id, "removed cache slot");
        }
    }

    fn set_cache_entries(&self, id: CacheId, capacity: usize) {
        if let Some(slot) = self.lock().slots.get_mut(&id) {
            slot.capacity = capacity.max(1);
            slot.evict_overflow();
        }
    }
}
