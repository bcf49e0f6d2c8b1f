// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rendering definition mirrored from the remote engine.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Color model name for composite RGB rendering.
pub const RGB_MODEL: &str = "rgb";

/// Color model name for single-channel greyscale rendering.
pub const GREYSCALE_MODEL: &str = "greyscale";

/// Group name for rendering definitions saved without a display name.
pub const DEFAULT_SETTINGS_NAME: &str = "Default";

/// RGBA color with 8-bit components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    /// Build from components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Red component.
    pub const fn red(self) -> u8 {
        self.0[0]
    }

    /// Green component.
    pub const fn green(self) -> u8 {
        self.0[1]
    }

    /// Blue component.
    pub const fn blue(self) -> u8 {
        self.0[2]
    }

    /// Alpha component.
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }
}

/// One of the eight quantization depths understood by the engine.
///
/// The engine identifies a depth of `n` bits by the value `2^n - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BitResolution(u8);

impl BitResolution {
    /// 8-bit quantization, the engine default.
    pub const DEPTH_8BIT: Self = Self(8);

    /// Depth from a number of bits in `1..=8`.
    pub fn from_bits(bits: u8) -> Result<Self, ModelError> {
        if (1..=8).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(ModelError::UnsupportedBitResolution(i32::from(bits)))
        }
    }

    /// Depth from the engine value (`1, 3, 7, ..., 255`).
    pub fn from_value(value: i32) -> Result<Self, ModelError> {
        (1..=8u8)
            .find(|&bits| (1i32 << bits) - 1 == value)
            .map(Self)
            .ok_or(ModelError::UnsupportedBitResolution(value))
    }

    /// Number of bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Engine value, `2^bits - 1`.
    pub const fn value(self) -> i32 {
        (1i32 << self.0) - 1
    }
}

/// Rendering parameters of one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Whether the channel contributes to the rendered image.
    pub active: bool,
    /// Lower end of the input window.
    pub input_start: f64,
    /// Upper end of the input window.
    pub input_end: f64,
    /// Quantization family name (e.g. `"linear"`).
    pub family: String,
    /// Curve coefficient of the family.
    pub curve_coefficient: f64,
    /// Whether noise reduction is applied.
    pub noise_reduction: bool,
    /// Display color.
    pub rgba: Rgba,
    /// Lowest value representable by the pixel type.
    pub lower_bound: f64,
    /// Highest value representable by the pixel type.
    pub upper_bound: f64,
}

impl Default for ChannelBinding {
    fn default() -> Self {
        Self {
            active: false,
            input_start: 0.0,
            input_end: 0.0,
            family: String::new(),
            curve_coefficient: 1.0,
            noise_reduction: false,
            rgba: Rgba::BLACK,
            lower_bound: 0.0,
            upper_bound: 0.0,
        }
    }
}

impl ChannelBinding {
    /// Input window as `(start, end)`.
    pub fn window(&self) -> (f64, f64) {
        (self.input_start, self.input_end)
    }

    /// Fields compared by [`RenderingDef::is_same_settings`].
    #[allow(clippy::float_cmp)]
    fn same_rendering(&self, other: &ChannelBinding) -> bool {
        self.input_start == other.input_start
            && self.input_end == other.input_end
            && self.curve_coefficient == other.curve_coefficient
            && self.family == other.family
            && self.noise_reduction == other.noise_reduction
            && self.rgba == other.rgba
    }
}

/// Aggregate rendering settings for a pixel set.
///
/// This is the unit of save, restore and comparison. The channel list always
/// has one binding per channel of the pixel set it was created for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderingDef {
    /// Optional display name given when the settings were saved.
    pub name: Option<String>,
    /// Color model name (see [`RGB_MODEL`], [`GREYSCALE_MODEL`]).
    pub color_model: String,
    /// Start of the codomain interval.
    pub cd_start: i32,
    /// End of the codomain interval.
    pub cd_end: i32,
    /// Quantization depth as the engine value (`2^bits - 1`).
    pub bit_resolution: i32,
    /// Default optical section.
    pub default_z: u32,
    /// Default timepoint.
    pub default_t: u32,
    /// Compression quality factor in `(0, 1]`.
    pub compression: f32,
    /// Whether the pixel type is signed.
    pub type_signed: bool,
    channels: Vec<ChannelBinding>,
}

impl RenderingDef {
    /// Settings with `size_c` default channel bindings.
    pub fn new(size_c: usize) -> Self {
        Self {
            name: None,
            color_model: GREYSCALE_MODEL.to_owned(),
            cd_start: 0,
            cd_end: 255,
            bit_resolution: BitResolution::DEPTH_8BIT.value(),
            default_z: 0,
            default_t: 0,
            compression: 1.0,
            type_signed: false,
            channels: vec![ChannelBinding::default(); size_c],
        }
    }

    /// Number of channel bindings.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Binding for channel `w`.
    pub fn channel(&self, w: usize) -> Option<&ChannelBinding> {
        self.channels.get(w)
    }

    /// Mutable binding for channel `w`.
    pub fn channel_mut(&mut self, w: usize) -> Option<&mut ChannelBinding> {
        self.channels.get_mut(w)
    }

    /// All bindings, indexed by channel.
    pub fn channels(&self) -> &[ChannelBinding] {
        &self.channels
    }

    /// Mutable bindings. A slice, so the channel count cannot change.
    pub fn channels_mut(&mut self) -> &mut [ChannelBinding] {
        &mut self.channels
    }

    /// Indices of the active channels, ascending.
    pub fn active_channels(&self) -> Vec<usize> {
        self.channels
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.active.then_some(i))
            .collect()
    }

    /// Structural comparison used to decide whether two settings render the
    /// same image.
    ///
    /// Inactive channels are ignored; active channels are matched by index.
    /// Default Z/T are only compared when `check_plane` is set.
    #[allow(clippy::float_cmp)]
    pub fn is_same_settings(&self, other: &RenderingDef, check_plane: bool) -> bool {
        if self.channels.len() != other.channels.len() {
            return false;
        }
        if check_plane && (self.default_z != other.default_z || self.default_t != other.default_t)
        {
            return false;
        }
        if self.bit_resolution != other.bit_resolution
            || self.cd_start != other.cd_start
            || self.cd_end != other.cd_end
            || self.color_model != other.color_model
            || self.compression != other.compression
        {
            return false;
        }
        self.channels
            .iter()
            .zip(&other.channels)
            .all(|(a, b)| match (a.active, b.active) {
                (false, false) => true,
                (true, true) => a.same_rendering(b),
                _ => false,
            })
    }
}
