// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One proxy's view of the shared plane cache.

use std::sync::Arc;

use rnd_cache::{CacheId, CacheService};
use rnd_model::{PlaneDef, PlaneImage};
use tracing::debug;

/// Shared cache service as the proxy consumes it.
pub type SharedPlaneCache = Arc<dyn CacheService<Arc<PlaneImage>>>;

/// Lazily created cache slot holding decoded XY planes keyed by `z + sizeZ*t`.
///
/// The slot capacity is the byte budget divided by the running estimate of
/// one image's size. Dropping the `PlaneCache` removes the slot.
pub(crate) struct PlaneCache {
    service: SharedPlaneCache,
    slot: Option<CacheId>,
    budget: usize,
    image_size: usize,
    size_z: u32,
}

impl PlaneCache {
    pub(crate) fn new(service: SharedPlaneCache, budget: usize, size_z: u32) -> Self {
        Self {
            service,
            slot: None,
            budget,
            image_size: 1,
            size_z,
        }
    }

    fn capacity(&self) -> usize {
        (self.budget / self.image_size.max(1)).max(1)
    }

    // Regions share the full plane's z/t key, so they are never cached.
    fn key_for(&self, plane: &PlaneDef) -> Option<u64> {
        if plane.region.is_some() {
            return None;
        }
        plane.cache_key(self.size_z)
    }

    /// Cached image for `plane`. Always a miss unless `enabled`, XY and
    /// without a region.
    pub(crate) fn lookup(&self, plane: &PlaneDef, enabled: bool) -> Option<Arc<PlaneImage>> {
        if !enabled {
            return None;
        }
        let key = self.key_for(plane)?;
        let hit = self.service.get_element(self.slot?, key);
        debug!(key, hit = hit.is_some(), "plane cache lookup");
        hit
    }

    /// Store `image` for `plane` under the same conditions as [`Self::lookup`].
    pub(crate) fn store(&mut self, plane: &PlaneDef, image: &Arc<PlaneImage>, enabled: bool) {
        if !enabled {
            return;
        }
        let Some(key) = self.key_for(plane) else {
            return;
        };
        let slot = match self.slot {
            Some(slot) => slot,
            None => {
                let slot = self.service.create_cache(self.capacity());
                self.slot = Some(slot);
                slot
            }
        };
        self.service.add_element(slot, key, Arc::clone(image));
        debug!(key, %slot, "plane cached");
    }

    /// Record the size of the latest rendered payload, in bytes.
    pub(crate) fn record_image_size(&mut self, bytes: usize) {
        self.image_size = bytes.max(1);
    }

    /// Drop every entry; the slot survives.
    pub(crate) fn invalidate(&self) {
        if let Some(slot) = self.slot {
            self.service.clear_cache(slot);
        }
    }

    /// Release the slot; the next store creates a new one.
    pub(crate) fn dispose(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.service.remove_cache(slot);
            debug!(%slot, "plane cache disposed");
        }
    }

    /// Change the byte budget and resize the live slot.
    pub(crate) fn resize(&mut self, budget: usize) {
        self.budget = budget;
        if let Some(slot) = self.slot {
            self.service.set_cache_entries(slot, self.capacity());
        }
    }

    pub(crate) fn slot(&self) -> Option<CacheId> {
        self.slot
    }

    pub(crate) fn budget(&self) -> usize {
        self.budget
    }
}

impl Drop for PlaneCache {
    fn drop(&mut self) {
        self.dispose();
    }
}
