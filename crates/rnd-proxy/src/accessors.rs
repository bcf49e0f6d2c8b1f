// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only views answered from local state, no engine round trip.

use std::collections::BTreeMap;

use rnd_model::{
    classify, ChannelBinding, ChannelMetadata, CompressionLevel, PixelsDescriptor, PrimaryColour,
    RenderingDef, Rgba, DEFAULT_SETTINGS_NAME,
};

use crate::RenderingControlProxy;

impl RenderingControlProxy {
    // ── Pixel set ──────────────────────────────────────────────────────

    /// The pixel set.
    pub fn pixels(&self) -> &PixelsDescriptor {
        &self.pixels
    }

    /// Id of the pixel set.
    pub fn pixels_id(&self) -> i64 {
        self.pixels.id()
    }

    /// Number of pixels along X.
    pub fn pixels_dimensions_x(&self) -> u32 {
        self.pixels.size_x()
    }

    /// Number of pixels along Y.
    pub fn pixels_dimensions_y(&self) -> u32 {
        self.pixels.size_y()
    }

    /// Number of optical sections.
    pub fn pixels_dimensions_z(&self) -> u32 {
        self.pixels.size_z()
    }

    /// Number of timepoints.
    pub fn pixels_dimensions_t(&self) -> u32 {
        self.pixels.size_t()
    }

    /// Number of channels.
    pub fn pixels_dimensions_c(&self) -> u32 {
        self.pixels.size_c()
    }

    /// Physical pixel width, 1 when unknown.
    pub fn pixels_physical_size_x(&self) -> f64 {
        self.pixels.physical_size_x()
    }

    /// Physical pixel height, 1 when unknown.
    pub fn pixels_physical_size_y(&self) -> f64 {
        self.pixels.physical_size_y()
    }

    /// Physical section thickness, 1 when unknown.
    pub fn pixels_physical_size_z(&self) -> f64 {
        self.pixels.physical_size_z()
    }

    /// Whether `other` has the same channel count, XY size and pixel type.
    pub fn validate_pixels(&self, other: &PixelsDescriptor) -> bool {
        self.pixels.validate_pixels(other)
    }

    /// Acquisition metadata of channel `w`.
    pub fn channel_data(&self, w: usize) -> Option<&ChannelMetadata> {
        self.metadata.get(w)
    }

    /// Metadata of every channel, by index.
    pub fn channel_metadata(&self) -> &[ChannelMetadata] {
        &self.metadata
    }

    // ── Enumerations and modes ─────────────────────────────────────────

    /// Quantization families the engine understands.
    pub fn families(&self) -> &[String] {
        &self.state.families
    }

    /// Color models the engine understands.
    pub fn models(&self) -> &[String] {
        &self.state.models
    }

    /// Current compression level.
    pub fn compression_level(&self) -> CompressionLevel {
        self.compression
    }

    /// Whether renders go through the compressed path.
    pub fn is_compressed(&self) -> bool {
        self.compression.is_compressed()
    }

    /// Whether a local change may not have reached the engine.
    pub fn has_drifted(&self) -> bool {
        self.state.drifted
    }

    /// Current cache budget in bytes.
    pub fn cache_size(&self) -> usize {
        self.cache.budget()
    }

    // ── Settings ───────────────────────────────────────────────────────

    /// Current color model name.
    pub fn model(&self) -> &str {
        &self.state.def.color_model
    }

    /// Default optical section.
    pub fn default_z(&self) -> u32 {
        self.state.def.default_z
    }

    /// Default timepoint.
    pub fn default_t(&self) -> u32 {
        self.state.def.default_t
    }

    /// Quantization depth as the engine value.
    pub fn bit_resolution(&self) -> i32 {
        self.state.def.bit_resolution
    }

    /// Start of the codomain interval.
    pub fn codomain_start(&self) -> i32 {
        self.state.def.cd_start
    }

    /// End of the codomain interval.
    pub fn codomain_end(&self) -> i32 {
        self.state.def.cd_end
    }

    /// Independent copy of the current settings.
    pub fn settings_copy(&self) -> RenderingDef {
        self.state.def.clone()
    }

    /// Whether `other` renders the same image as the current settings.
    pub fn is_same_settings(&self, other: &RenderingDef, check_plane: bool) -> bool {
        self.state.def.is_same_settings(other, check_plane)
    }

    fn binding(&self, w: usize) -> Option<&ChannelBinding> {
        self.state.def.channel(w)
    }

    // Out-of-range channels read as an inactive, black, empty binding.

    /// Whether channel `w` is active.
    pub fn is_active(&self, w: usize) -> bool {
        self.binding(w).is_some_and(|c| c.active)
    }

    /// Lower end of channel `w`'s window.
    pub fn channel_window_start(&self, w: usize) -> f64 {
        self.binding(w).map_or(0.0, |c| c.input_start)
    }

    /// Upper end of channel `w`'s window.
    pub fn channel_window_end(&self, w: usize) -> f64 {
        self.binding(w).map_or(0.0, |c| c.input_end)
    }

    /// Quantization family of channel `w`.
    pub fn channel_family(&self, w: usize) -> &str {
        self.binding(w).map_or("", |c| c.family.as_str())
    }

    /// Curve coefficient of channel `w`.
    pub fn channel_curve_coefficient(&self, w: usize) -> f64 {
        self.binding(w).map_or(1.0, |c| c.curve_coefficient)
    }

    /// Noise-reduction flag of channel `w`.
    pub fn channel_noise_reduction(&self, w: usize) -> bool {
        self.binding(w).is_some_and(|c| c.noise_reduction)
    }

    /// Color of channel `w`.
    pub fn rgba(&self, w: usize) -> Rgba {
        self.binding(w).map_or(Rgba::BLACK, |c| c.rgba)
    }

    /// Lowest value of channel `w`'s pixel type.
    pub fn pixels_type_lower_bound(&self, w: usize) -> f64 {
        self.binding(w).map_or(0.0, |c| c.lower_bound)
    }

    /// Highest value of channel `w`'s pixel type.
    pub fn pixels_type_upper_bound(&self, w: usize) -> f64 {
        self.binding(w).map_or(0.0, |c| c.upper_bound)
    }

    /// Indices of the active channels, ascending.
    pub fn active_channels(&self) -> Vec<usize> {
        self.state.def.active_channels()
    }

    // ── Colour ─────────────────────────────────────────────────────────

    fn channel_colour(&self, w: usize) -> PrimaryColour {
        self.binding(w)
            .map_or(PrimaryColour::Other, |c| classify(c.rgba))
    }

    fn any_active(&self, colour: PrimaryColour) -> bool {
        self.state
            .def
            .channels()
            .iter()
            .any(|c| c.active && classify(c.rgba) == colour)
    }

    /// Whether channel `w` is pure red.
    pub fn is_channel_red(&self, w: usize) -> bool {
        self.channel_colour(w) == PrimaryColour::Red
    }

    /// Whether channel `w` is pure green.
    pub fn is_channel_green(&self, w: usize) -> bool {
        self.channel_colour(w) == PrimaryColour::Green
    }

    /// Whether channel `w` is pure blue.
    pub fn is_channel_blue(&self, w: usize) -> bool {
        self.channel_colour(w) == PrimaryColour::Blue
    }

    /// Whether an active channel is pure red.
    pub fn has_active_channel_red(&self) -> bool {
        self.any_active(PrimaryColour::Red)
    }

    /// Whether an active channel is pure green.
    pub fn has_active_channel_green(&self) -> bool {
        self.any_active(PrimaryColour::Green)
    }

    /// Whether an active channel is pure blue.
    pub fn has_active_channel_blue(&self) -> bool {
        self.any_active(PrimaryColour::Blue)
    }

    /// Whether `channels` (the active ones when `None`) each map to a
    /// different primary colour. An empty list is not RGB.
    pub fn is_mapped_image_rgb(&self, channels: Option<&[usize]>) -> bool {
        let active;
        let channels = match channels {
            Some(channels) => channels,
            None => {
                active = self.active_channels();
                &active
            }
        };
        if channels.is_empty() {
            return false;
        }
        let mut seen = Vec::with_capacity(3);
        for &w in channels {
            let colour = self.channel_colour(w);
            if colour == PrimaryColour::Other || seen.contains(&colour) {
                return false;
            }
            seen.push(colour);
        }
        true
    }

    // ── Saved settings ─────────────────────────────────────────────────

    /// Saved settings other than the one adopted at construction.
    pub fn previous_rendering_settings(&self) -> &[RenderingDef] {
        self.history.get(1..).unwrap_or(&[])
    }

    /// Every saved definition grouped by display name, blank names under
    /// [`DEFAULT_SETTINGS_NAME`].
    pub fn rendering_settings(&self) -> BTreeMap<String, Vec<&RenderingDef>> {
        let mut groups: BTreeMap<String, Vec<&RenderingDef>> = BTreeMap::new();
        for def in &self.history {
            let name = def
                .name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(DEFAULT_SETTINGS_NAME);
            groups.entry(name.to_owned()).or_default().push(def);
        }
        groups
    }
}
