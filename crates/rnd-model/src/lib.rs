// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Data model shared by the rendering proxy and its collaborators.
//!
//! Everything in this crate is a plain value: pixel-set metadata, the
//! rendering definition mirrored from the remote engine, plane selectors and
//! the decoded images produced for display. No I/O happens here.
//!
//! # Channel Invariant
//!
//! A [`RenderingDef`] always holds exactly one [`ChannelBinding`] per channel
//! index. The channel vector is private and only ever built with the pixel
//! set's channel count, so callers cannot add or drop bindings.
#![forbid(unsafe_code)]

mod colour;
mod image;
mod modes;
mod pixels;
mod plane;
mod settings;

pub use colour::{classify, PrimaryColour};
pub use image::{PlaneImage, TextureData};
pub use modes::{CompressionLevel, ProjectionType};
pub use pixels::{ChannelMetadata, PixelsDescriptor};
pub use plane::{Axis, PlaneDef, Region};
pub use settings::{
    BitResolution, ChannelBinding, RenderingDef, Rgba, DEFAULT_SETTINGS_NAME, GREYSCALE_MODEL,
    RGB_MODEL,
};

/// Errors raised while constructing or validating model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A pixel-set dimension was zero.
    #[error("pixel set dimension {axis} must be at least 1")]
    ZeroDimension {
        /// Name of the offending axis (`"x"`, `"y"`, `"z"`, `"t"` or `"c"`).
        axis: &'static str,
    },
    /// The value is not one of the eight supported quantization depths.
    #[error("bit resolution {0} not supported")]
    UnsupportedBitResolution(i32),
    /// A packed pixel buffer does not match the requested dimensions.
    #[error("packed buffer holds {actual} pixels, expected {width}x{height}")]
    BufferSizeMismatch {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Number of pixels actually supplied.
        actual: usize,
    },
}
