// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plane rendering: cache, engine call, decode.

use std::sync::Arc;

use rnd_model::{CompressionLevel, PlaneDef, PlaneImage, TextureData};
use tracing::{debug, instrument};

use crate::decode::{decode_compressed, from_packed};
use crate::error::absorb;
use crate::{Mutation, ProxyError, RenderingControlProxy};

const RENDER_ERROR: &str = "cannot render the plane";

impl RenderingControlProxy {
    /// Render `plane` at the current compression level.
    ///
    /// XY planes of non-pyramidal pixel sets are served from the cache when
    /// possible; a repeat request returns the same `Arc`. `Ok(None)` means
    /// the engine could not be reached.
    pub fn render(&mut self, plane: &PlaneDef) -> Result<Option<Arc<PlaneImage>>, ProxyError> {
        self.render_with(plane, None)
    }

    /// Render `plane`, using `compression` for this call only when given.
    ///
    /// A one-off level different from the current one is applied, used and
    /// restored; each switch drops the cache slot. The restore also runs when
    /// the switch or the render fails.
    #[instrument(skip(self))]
    pub fn render_with(
        &mut self,
        plane: &PlaneDef,
        compression: Option<CompressionLevel>,
    ) -> Result<Option<Arc<PlaneImage>>, ProxyError> {
        match compression {
            Some(level) if level != self.compression => {
                let previous = self.compression;
                // The mirror moves even on a refused switch; always restore.
                let rendered = self
                    .set_compression(level)
                    .into_result()
                    .and_then(|()| self.render_plane(plane));
                let restored = self.set_compression(previous).into_result();
                let image = rendered?;
                restored?;
                Ok(image)
            }
            _ => self.render_plane(plane),
        }
    }

    /// Render `plane` as an RGBA8 buffer. Shares the cache with [`Self::render`].
    pub fn render_as_texture(&mut self, plane: &PlaneDef) -> Result<Option<TextureData>, ProxyError> {
        Ok(self.render(plane)?.map(|image| image.to_texture()))
    }

    fn render_plane(&mut self, plane: &PlaneDef) -> Result<Option<Arc<PlaneImage>>, ProxyError> {
        let cacheable = !self.is_big_image();
        if let Some(hit) = self.cache.lookup(plane, cacheable) {
            return Ok(Some(hit));
        }
        let image = if self.compression.is_compressed() {
            let rendered = self.remote(|e| e.render_compressed(plane));
            let Some(bytes) = absorb(rendered, RENDER_ERROR)? else {
                return Ok(None);
            };
            self.cache.record_image_size(bytes.len());
            decode_compressed(&bytes, RENDER_ERROR)?
        } else {
            let rendered = self.remote(|e| e.render_as_packed_int(plane));
            let Some(packed) = absorb(rendered, RENDER_ERROR)? else {
                return Ok(None);
            };
            self.cache.record_image_size(packed.len() * 3);
            from_packed(packed, plane.dimensions(&self.pixels), RENDER_ERROR)?
        };
        debug!(width = image.width(), height = image.height(), "plane rendered");
        let image = Arc::new(image);
        self.cache.store(plane, &image, cacheable);
        Ok(Some(image))
    }

    /// Switch compression level.
    ///
    /// Pushes the configured quality factor, records it in the settings and
    /// drops the cache slot; the next cached plane recreates it sized for the
    /// new payloads.
    pub fn set_compression(&mut self, level: CompressionLevel) -> Mutation {
        let quality = self.config.quality_for(level);
        let remote = self.remote(|e| e.set_compression_level(quality));
        self.state.def.compression = quality;
        self.compression = level;
        self.cache.dispose();
        let outcome = Mutation::from_remote(remote, "cannot set the compression level");
        if outcome.drifted() {
            self.state.drifted = true;
        }
        outcome
    }
}
