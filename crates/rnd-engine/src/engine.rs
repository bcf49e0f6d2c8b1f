// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The remote rendering engine port.

use rnd_model::{PlaneDef, ProjectionType, Rgba};

use crate::EngineResult;

/// Quantum definition reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantumDef {
    /// Quantization depth as the engine value (`2^bits - 1`).
    pub bit_resolution: i32,
    /// Start of the codomain interval.
    pub cd_start: i32,
    /// End of the codomain interval.
    pub cd_end: i32,
}

/// Live handle on a remote rendering engine bound to one pixel set.
///
/// Queries take `&self`; commands and renders take `&mut self`. Every method
/// is one blocking round trip; timeouts belong to the adapter.
pub trait RenderingEngine: Send {
    // ── Enumerations ───────────────────────────────────────────────────

    /// Quantization family names the engine understands.
    fn available_families(&self) -> EngineResult<Vec<String>>;
    /// Color model names the engine understands.
    fn available_models(&self) -> EngineResult<Vec<String>>;

    // ── Global queries ─────────────────────────────────────────────────

    /// Whether the pixel type is signed.
    fn is_pixels_type_signed(&self) -> EngineResult<bool>;
    /// Default optical section.
    fn default_z(&self) -> EngineResult<u32>;
    /// Default timepoint.
    fn default_t(&self) -> EngineResult<u32>;
    /// Quantization depth and codomain.
    fn quantum_def(&self) -> EngineResult<QuantumDef>;
    /// Current color model name.
    fn model(&self) -> EngineResult<String>;

    // ── Per-channel queries ────────────────────────────────────────────

    /// Whether channel `w` is active.
    fn is_active(&self, w: usize) -> EngineResult<bool>;
    /// Lower end of channel `w`'s input window.
    fn channel_window_start(&self, w: usize) -> EngineResult<f64>;
    /// Upper end of channel `w`'s input window.
    fn channel_window_end(&self, w: usize) -> EngineResult<f64>;
    /// Quantization family of channel `w`.
    fn channel_family(&self, w: usize) -> EngineResult<String>;
    /// Curve coefficient of channel `w`.
    fn channel_curve_coefficient(&self, w: usize) -> EngineResult<f64>;
    /// Noise-reduction flag of channel `w`.
    fn channel_noise_reduction(&self, w: usize) -> EngineResult<bool>;
    /// Color of channel `w`.
    fn rgba(&self, w: usize) -> EngineResult<Rgba>;
    /// Lowest value of the pixel type for channel `w`.
    fn pixels_type_lower_bound(&self, w: usize) -> EngineResult<f64>;
    /// Highest value of the pixel type for channel `w`.
    fn pixels_type_upper_bound(&self, w: usize) -> EngineResult<f64>;

    // ── Pyramid queries ────────────────────────────────────────────────

    /// Number of resolution levels.
    fn resolution_levels(&self) -> EngineResult<u32>;
    /// Currently selected resolution level.
    fn resolution_level(&self) -> EngineResult<u32>;
    /// Tile width and height.
    fn tile_size(&self) -> EngineResult<(u32, u32)>;
    /// Whether the pixel set must be served as a pyramid.
    fn requires_pixels_pyramid(&self) -> EngineResult<bool>;

    // ── Commands ───────────────────────────────────────────────────────

    /// Activate or deactivate channel `w`.
    fn set_active(&mut self, w: usize, active: bool) -> EngineResult<()>;
    /// Set channel `w`'s input window.
    fn set_channel_window(&mut self, w: usize, start: f64, end: f64) -> EngineResult<()>;
    /// Set channel `w`'s color.
    fn set_rgba(&mut self, w: usize, rgba: Rgba) -> EngineResult<()>;
    /// Set channel `w`'s quantization map.
    fn set_quantization_map(
        &mut self,
        w: usize,
        family: &str,
        coefficient: f64,
        noise_reduction: bool,
    ) -> EngineResult<()>;
    /// Select a color model by name.
    fn set_model(&mut self, model: &str) -> EngineResult<()>;
    /// Set the default optical section.
    fn set_default_z(&mut self, z: u32) -> EngineResult<()>;
    /// Set the default timepoint.
    fn set_default_t(&mut self, t: u32) -> EngineResult<()>;
    /// Set the quantization depth (engine value).
    fn set_quantum_strategy(&mut self, bit_resolution: i32) -> EngineResult<()>;
    /// Set the codomain interval.
    fn set_codomain_interval(&mut self, start: i32, end: i32) -> EngineResult<()>;
    /// Select a pyramid resolution level.
    fn set_resolution_level(&mut self, level: u32) -> EngineResult<()>;
    /// Set the compression quality factor.
    fn set_compression_level(&mut self, quality: f32) -> EngineResult<()>;

    // ── Rendering ──────────────────────────────────────────────────────

    /// Render a plane as packed `0xAARRGGBB` integers.
    fn render_as_packed_int(&mut self, plane: &PlaneDef) -> EngineResult<Vec<u32>>;
    /// Render a plane as a compressed (JPEG) byte stream.
    fn render_compressed(&mut self, plane: &PlaneDef) -> EngineResult<Vec<u8>>;
    /// Render a z-projection as packed integers.
    fn render_projected_as_packed_int(
        &mut self,
        projection: ProjectionType,
        t: u32,
        stepping: i32,
        start_z: i32,
        end_z: i32,
    ) -> EngineResult<Vec<u32>>;
    /// Render a z-projection as a compressed byte stream.
    fn render_projected_compressed(
        &mut self,
        projection: ProjectionType,
        t: u32,
        stepping: i32,
        start_z: i32,
        end_z: i32,
    ) -> EngineResult<Vec<u8>>;

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Persist the current settings on the server.
    fn save_current_settings(&mut self) -> EngineResult<()>;
    /// Recompute default settings without persisting them.
    fn reset_defaults_no_save(&mut self) -> EngineResult<()>;
    /// Release the server-side engine.
    fn close(&mut self) -> EngineResult<()>;
}
