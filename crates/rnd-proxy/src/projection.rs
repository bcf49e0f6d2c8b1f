// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Z-projections over a chosen channel subset.

use rnd_model::{PlaneImage, ProjectionType, TextureData};
use tracing::{debug, instrument};

use crate::decode::{decode_compressed, from_packed};
use crate::error::absorb;
use crate::{ProxyError, RenderingControlProxy};

const PROJECTION_ERROR: &str = "cannot render the projected image";

/// Z-range and sampling of a projection, forwarded to the engine unchecked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectionRange {
    /// First section.
    pub start_z: i32,
    /// Last section.
    pub end_z: i32,
    /// Section stride.
    pub stepping: i32,
}

impl ProjectionRange {
    /// Range `[start_z, end_z]` sampled every `stepping` sections.
    pub fn new(start_z: i32, end_z: i32, stepping: i32) -> Self {
        Self {
            start_z,
            end_z,
            stepping,
        }
    }
}

impl RenderingControlProxy {
    /// Project `range` with `projection` over exactly `channels`, at the
    /// default timepoint. The result is never cached.
    ///
    /// The originally active channels are re-activated afterwards, whether
    /// or not the projection succeeded. Channels activated only for the
    /// projection stay active.
    #[instrument(skip(self))]
    pub fn render_projected(
        &mut self,
        range: ProjectionRange,
        projection: ProjectionType,
        channels: &[usize],
    ) -> Result<Option<PlaneImage>, ProxyError> {
        let original = self.active_channels();
        let projected = self
            .activate_only(channels)
            .and_then(|()| self.project(range, projection));
        let restored = self.reactivate(&original);
        let image = projected?;
        restored?;
        Ok(image)
    }

    /// [`Self::render_projected`] as an RGBA8 buffer.
    pub fn render_projected_as_texture(
        &mut self,
        range: ProjectionRange,
        projection: ProjectionType,
        channels: &[usize],
    ) -> Result<Option<TextureData>, ProxyError> {
        Ok(self
            .render_projected(range, projection, channels)?
            .map(|image| image.to_texture()))
    }

    fn activate_only(&mut self, channels: &[usize]) -> Result<(), ProxyError> {
        for w in 0..self.size_c() {
            self.set_active(w, false).into_result()?;
        }
        for &w in channels {
            self.set_active(w, true).into_result()?;
        }
        Ok(())
    }

    fn reactivate(&mut self, channels: &[usize]) -> Result<(), ProxyError> {
        // Keep going so one failure does not leave later channels off.
        let mut first_error = None;
        for &w in channels {
            if let Err(err) = self.set_active(w, true).into_result() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn project(
        &mut self,
        range: ProjectionRange,
        projection: ProjectionType,
    ) -> Result<Option<PlaneImage>, ProxyError> {
        let t = self.state.def.default_t;
        let ProjectionRange {
            start_z,
            end_z,
            stepping,
        } = range;
        let image = if self.compression.is_compressed() {
            let rendered = self.remote(|e| {
                e.render_projected_compressed(projection, t, stepping, start_z, end_z)
            });
            let Some(bytes) = absorb(rendered, PROJECTION_ERROR)? else {
                return Ok(None);
            };
            decode_compressed(&bytes, PROJECTION_ERROR)?
        } else {
            let rendered = self.remote(|e| {
                e.render_projected_as_packed_int(projection, t, stepping, start_z, end_z)
            });
            let Some(packed) = absorb(rendered, PROJECTION_ERROR)? else {
                return Ok(None);
            };
            let size = (self.pixels.size_x(), self.pixels.size_y());
            from_packed(packed, size, PROJECTION_ERROR)?
        };
        debug!(?projection, "projection rendered");
        Ok(Some(image))
    }
}
