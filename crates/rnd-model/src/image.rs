// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decoded plane images and GPU-ready buffers.

use crate::ModelError;

/// A rendered plane as packed `0xAARRGGBB` pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaneImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PlaneImage {
    /// Wrap a packed-integer buffer returned by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::BufferSizeMismatch`] when `pixels.len()` is not
    /// `width * height`.
    pub fn from_packed(pixels: Vec<u32>, width: u32, height: u32) -> Result<Self, ModelError> {
        let expected = u64::from(width) * u64::from(height);
        if pixels.len() as u64 != expected {
            return Err(ModelError::BufferSizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from RGBA8 bytes (4 bytes per pixel).
    pub fn from_rgba8(rgba: &[u8], width: u32, height: u32) -> Result<Self, ModelError> {
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| u32::from_be_bytes([p[3], p[0], p[1], p[2]]))
            .collect();
        Self::from_packed(pixels, width, height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied()
    }

    /// Convert to an RGBA8 buffer for texture upload.
    pub fn to_texture(&self) -> TextureData {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let [a, r, g, b] = p.to_be_bytes();
            rgba.extend_from_slice(&[r, g, b, a]);
        }
        TextureData {
            width: self.width,
            height: self.height,
            rgba,
        }
    }
}

/// RGBA8 pixel buffer ready to hand to a GPU uploader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
}
