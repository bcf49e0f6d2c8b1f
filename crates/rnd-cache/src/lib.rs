// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Slot-based cache service shared by rendering proxies.
//!
//! A [`CacheService`] holds any number of independent *slots*, one per
//! consumer. Each slot is a bounded map from an integer key to a value; the
//! consumer addresses its slot through the opaque [`CacheId`] it received at
//! creation. [`MemoryCacheService`] is the in-process implementation.
//!
//! # Absence Semantics
//!
//! Lookups on a missing key or a removed slot return `None`; writes to a
//! removed slot are dropped. Neither is an error: a cache miss just means the
//! consumer has to do the work again.
//!
//! # Sharing
//!
//! The trait takes `&self` and requires `Send + Sync` so one service can sit
//! behind an `Arc` and serve many proxies, creating and removing slots
//! concurrently. Access to a single slot is expected from one consumer at a
//! time.
#![forbid(unsafe_code)]

mod memory;
pub use memory::MemoryCacheService;

/// Opaque identifier of a cache slot.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CacheId(pub u64);

impl std::fmt::Display for CacheId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cache#{}", self.0)
    }
}

/// Shared cache of values keyed by `(slot, u64)`.
pub trait CacheService<V>: Send + Sync {
    /// Create a slot holding at most `capacity` entries (at least 1).
    fn create_cache(&self, capacity: usize) -> CacheId;

    /// Value stored under `key`, if any.
    fn get_element(&self, id: CacheId, key: u64) -> Option<V>;

    /// Store `value` under `key`, evicting the least recently used entry when
    /// the slot is full. Dropped if the slot does not exist.
    fn add_element(&self, id: CacheId, key: u64, value: V);

    /// Remove every entry of the slot; the slot itself stays.
    fn clear_cache(&self, id: CacheId);

    /// Remove the slot. No-op if it does not exist.
    fn remove_cache(&self, id: CacheId);

    /// Change the slot's capacity, evicting entries that no longer fit.
    fn set_cache_entries(&self, id: CacheId, capacity: usize);
}
