// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pixel sets and channel metadata used across the test suites.

use rnd_model::{ChannelMetadata, PixelsDescriptor};

/// Build a descriptor, for sizes known to be non-zero.
fn descriptor(id: i64, sizes: [u32; 5], pixel_type: &str) -> PixelsDescriptor {
    match PixelsDescriptor::new(id, sizes, pixel_type, false) {
        Ok(p) => p,
        Err(e) => unreachable!("fixture sizes are non-zero: {e}"),
    }
}

/// 512×256 pixels, 10 sections, 5 timepoints, 3 channels of `uint8`.
pub fn pixels() -> PixelsDescriptor {
    descriptor(1, [512, 256, 10, 5, 3], "uint8")
}

/// 16×8 pixels, 4 sections, 2 timepoints, 3 channels; keeps JPEG work cheap.
pub fn small_pixels() -> PixelsDescriptor {
    descriptor(2, [16, 8, 4, 2, 3], "uint8")
}

/// Single-channel 16×8 pixel set.
pub fn single_channel_pixels() -> PixelsDescriptor {
    descriptor(3, [16, 8, 4, 2, 1], "uint16")
}

/// One metadata entry per channel of `pixels`, global range `[10, 200]`.
pub fn channel_metadata(pixels: &PixelsDescriptor) -> Vec<ChannelMetadata> {
    (0..pixels.size_c() as usize)
        .map(|w| ChannelMetadata::new(w, 10.0, 200.0))
        .collect()
}
