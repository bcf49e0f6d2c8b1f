// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resolution pyramid metadata, fetched once and memoized.

use tracing::{debug, warn};

use crate::error::absorb;
use crate::{ProxyError, RenderingControlProxy};

/// Memo cells; `None` means not fetched yet.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ResolutionState {
    pub(crate) levels: Option<u32>,
    pub(crate) selected: Option<u32>,
    pub(crate) tile: Option<(u32, u32)>,
    pub(crate) big_image: Option<bool>,
}

impl RenderingControlProxy {
    /// Number of pyramid levels; 1 when the engine cannot tell.
    pub fn resolution_levels(&mut self) -> u32 {
        if let Some(levels) = self.resolution.levels {
            return levels;
        }
        let levels = match self.remote(|e| e.resolution_levels()) {
            Ok(levels) => levels.max(1),
            Err(err) => {
                warn!(%err, "resolution levels unavailable, assuming one");
                1
            }
        };
        self.resolution.levels = Some(levels);
        levels
    }

    /// Selected pyramid level; 0 when the engine cannot tell.
    pub fn selected_resolution_level(&mut self) -> u32 {
        if let Some(level) = self.resolution.selected {
            return level;
        }
        let level = match self.remote(|e| e.resolution_level()) {
            Ok(level) => level,
            Err(err) => {
                warn!(%err, "selected resolution level unavailable, assuming 0");
                0
            }
        };
        self.resolution.selected = Some(level);
        level
    }

    /// Select a pyramid level, clamped to `[0, levels - 1]`.
    ///
    /// Unlike the settings setters, the memo only moves once the engine
    /// accepted the level.
    pub fn set_selected_resolution_level(&mut self, level: u32) -> Result<(), ProxyError> {
        let level = level.min(self.resolution_levels() - 1);
        let pushed = self.remote(|e| e.set_resolution_level(level));
        if absorb(pushed, "cannot set the resolution level")?.is_some() {
            debug!(level, "resolution level selected");
            self.resolution.selected = Some(level);
        }
        Ok(())
    }

    /// Tile width and height, `None` under connection loss.
    pub fn tile_size(&mut self) -> Result<Option<(u32, u32)>, ProxyError> {
        if let Some(tile) = self.resolution.tile {
            return Ok(Some(tile));
        }
        let tile = absorb(self.remote(|e| e.tile_size()), "cannot retrieve the tile size")?;
        if tile.is_some() {
            self.resolution.tile = tile;
        }
        Ok(tile)
    }

    /// Whether the pixel set is served as a pyramid. Big images bypass the
    /// plane cache.
    ///
    /// Only a successful answer is memoized; failures read as `false`.
    pub fn is_big_image(&mut self) -> bool {
        if let Some(big) = self.resolution.big_image {
            return big;
        }
        match self.remote(|e| e.requires_pixels_pyramid()) {
            Ok(big) => {
                self.resolution.big_image = Some(big);
                big
            }
            Err(err) => {
                warn!(%err, "pyramid flag unavailable");
                false
            }
        }
    }
}
