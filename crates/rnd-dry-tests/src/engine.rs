// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scriptable in-memory rendering engine.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rnd_engine::{EngineError, EngineResult, QuantumDef, RenderingEngine};
use rnd_model::{
    PixelsDescriptor, PlaneDef, ProjectionType, RenderingDef, Rgba, GREYSCALE_MODEL, RGB_MODEL,
};

/// Quantization families the fake advertises.
pub const FAKE_FAMILIES: [&str; 4] = ["linear", "polynomial", "exponential", "logarithmic"];

/// Every engine entry point, used to count calls and script failures.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Call {
    AvailableFamilies,
    AvailableModels,
    IsPixelsTypeSigned,
    DefaultZ,
    DefaultT,
    QuantumDef,
    Model,
    IsActive,
    ChannelWindowStart,
    ChannelWindowEnd,
    ChannelFamily,
    ChannelCurveCoefficient,
    ChannelNoiseReduction,
    Rgba,
    PixelsTypeLowerBound,
    PixelsTypeUpperBound,
    ResolutionLevels,
    ResolutionLevel,
    TileSize,
    RequiresPixelsPyramid,
    SetActive,
    SetChannelWindow,
    SetRgba,
    SetQuantizationMap,
    SetModel,
    SetDefaultZ,
    SetDefaultT,
    SetQuantumStrategy,
    SetCodomainInterval,
    SetResolutionLevel,
    SetCompressionLevel,
    RenderAsPackedInt,
    RenderCompressed,
    RenderProjectedAsPackedInt,
    RenderProjectedCompressed,
    SaveCurrentSettings,
    ResetDefaultsNoSave,
    Close,
}

impl Call {
    /// Whether the call produces an image.
    pub fn is_render(self) -> bool {
        matches!(
            self,
            Self::RenderAsPackedInt
                | Self::RenderCompressed
                | Self::RenderProjectedAsPackedInt
                | Self::RenderProjectedCompressed
        )
    }
}

/// In-memory [`RenderingEngine`] holding the server-side settings of one
/// pixel set.
///
/// Clones share state, so a test keeps one handle for inspection and hands
/// a boxed clone to the proxy.
///
/// ```
/// use rnd_dry_tests::{fixtures, Call, FakeRenderingEngine};
/// use rnd_engine::RenderingEngine;
///
/// let fake = FakeRenderingEngine::new(&fixtures::pixels());
/// let mut boxed: Box<dyn RenderingEngine> = Box::new(fake.clone());
/// boxed.set_default_z(4).unwrap();
/// assert_eq!(fake.settings().default_z, 4);
/// assert_eq!(fake.calls(Call::SetDefaultZ), 1);
/// ```
#[derive(Clone)]
pub struct FakeRenderingEngine {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    size_x: u32,
    size_y: u32,
    size_z: u32,
    settings: RenderingDef,
    defaults: RenderingDef,
    families: Vec<String>,
    models: Vec<String>,
    bounds: (f64, f64),
    levels: u32,
    level: u32,
    tile: (u32, u32),
    pyramid: bool,
    quality: f32,
    payload_format: ImageFormat,
    corrupt_payloads: bool,
    failures: HashMap<Call, EngineError>,
    fail_all: Option<EngineError>,
    counts: HashMap<Call, usize>,
    log: Vec<Call>,
    renders: u32,
    saved: Vec<RenderingDef>,
    closed: bool,
}

impl FakeRenderingEngine {
    /// Engine for `pixels` with default settings: every channel active with a
    /// `[0, 255]` linear window, colours cycling red/green/blue, RGB model
    /// for multi-channel sets.
    pub fn new(pixels: &PixelsDescriptor) -> Self {
        let settings = default_settings(pixels);
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                size_x: pixels.size_x(),
                size_y: pixels.size_y(),
                size_z: pixels.size_z(),
                defaults: settings.clone(),
                settings,
                families: FAKE_FAMILIES.iter().map(|s| (*s).to_owned()).collect(),
                models: vec![GREYSCALE_MODEL.to_owned(), RGB_MODEL.to_owned()],
                bounds: (0.0, 255.0),
                levels: 1,
                level: 0,
                tile: (pixels.size_x(), pixels.size_y()),
                pyramid: false,
                quality: 1.0,
                payload_format: ImageFormat::Jpeg,
                corrupt_payloads: false,
                failures: HashMap::new(),
                fail_all: None,
                counts: HashMap::new(),
                log: Vec::new(),
                renders: 0,
                saved: Vec::new(),
                closed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the server-side settings (and what `reset_defaults_no_save`
    /// restores).
    pub fn with_settings(self, settings: RenderingDef) -> Self {
        {
            let mut s = self.lock();
            s.defaults = settings.clone();
            s.settings = settings;
        }
        self
    }

    /// Pixel-type bounds reported for every channel.
    pub fn with_bounds(self, lower: f64, upper: f64) -> Self {
        self.lock().bounds = (lower, upper);
        self
    }

    /// Report a resolution pyramid of `levels` levels and the given tile size.
    pub fn with_pyramid(self, levels: u32, tile: (u32, u32)) -> Self {
        {
            let mut s = self.lock();
            s.levels = levels;
            s.tile = tile;
        }
        self
    }

    /// Whether the pixel set must be served as a pyramid.
    pub fn with_big_image(self, big: bool) -> Self {
        self.lock().pyramid = big;
        self
    }

    /// Encode compressed payloads as PNG instead of JPEG.
    pub fn with_png_payloads(self) -> Self {
        self.lock().payload_format = ImageFormat::Png;
        self
    }

    /// Return undecodable bytes from compressed renders.
    pub fn set_corrupt_payloads(&self, corrupt: bool) {
        self.lock().corrupt_payloads = corrupt;
    }

    /// Make every subsequent `call` fail with `err`.
    pub fn fail_on(&self, call: Call, err: EngineError) {
        self.lock().failures.insert(call, err);
    }

    /// Make every subsequent call of any kind fail with `err`.
    pub fn fail_everything(&self, err: EngineError) {
        self.lock().fail_all = Some(err);
    }

    /// Drop every scripted failure.
    pub fn clear_failures(&self) {
        let mut s = self.lock();
        s.failures.clear();
        s.fail_all = None;
    }

    /// Number of times `call` was attempted.
    pub fn calls(&self, call: Call) -> usize {
        self.lock().counts.get(&call).copied().unwrap_or(0)
    }

    /// Total number of attempted calls.
    pub fn total_calls(&self) -> usize {
        self.lock().log.len()
    }

    /// Number of attempted render calls of any shape.
    pub fn render_calls(&self) -> usize {
        self.lock().log.iter().filter(|c| c.is_render()).count()
    }

    /// Every attempted call, oldest first.
    pub fn call_log(&self) -> Vec<Call> {
        self.lock().log.clone()
    }

    /// Forget the call history.
    pub fn reset_counts(&self) {
        let mut s = self.lock();
        s.counts.clear();
        s.log.clear();
    }

    /// Copy of the server-side settings.
    pub fn settings(&self) -> RenderingDef {
        self.lock().settings.clone()
    }

    /// Settings persisted by `save_current_settings`, oldest first.
    pub fn saved(&self) -> Vec<RenderingDef> {
        self.lock().saved.clone()
    }

    /// Last compression quality pushed.
    pub fn quality(&self) -> f32 {
        self.lock().quality
    }

    /// Last resolution level pushed.
    pub fn level(&self) -> u32 {
        self.lock().level
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // Counts the call, then applies scripted failures.
    fn enter(&self, call: Call) -> EngineResult<MutexGuard<'_, FakeState>> {
        let mut s = self.lock();
        *s.counts.entry(call).or_default() += 1;
        s.log.push(call);
        if let Some(err) = s.failures.get(&call).or(s.fail_all.as_ref()) {
            return Err(err.clone());
        }
        if s.closed && call != Call::Close {
            return Err(EngineError::service("engine closed"));
        }
        Ok(s)
    }
}

fn default_settings(pixels: &PixelsDescriptor) -> RenderingDef {
    const PRIMARIES: [Rgba; 3] = [
        Rgba::new(255, 0, 0, 255),
        Rgba::new(0, 255, 0, 255),
        Rgba::new(0, 0, 255, 255),
    ];
    let size_c = pixels.size_c() as usize;
    let mut def = RenderingDef::new(size_c);
    if size_c > 1 {
        def.color_model = RGB_MODEL.to_owned();
    }
    def.type_signed = pixels.is_signed();
    for w in 0..size_c {
        if let Some(c) = def.channel_mut(w) {
            c.active = true;
            c.input_start = 0.0;
            c.input_end = 255.0;
            c.family = FAKE_FAMILIES[0].to_owned();
            c.rgba = PRIMARIES[w % PRIMARIES.len()];
            c.upper_bound = 255.0;
        }
    }
    def
}

fn no_channel(w: usize) -> EngineError {
    EngineError::service(format!("no channel {w}"))
}

impl FakeState {
    fn plane_size(&self, plane: &PlaneDef) -> (u32, u32) {
        use rnd_model::Axis;
        match (plane.axis, plane.region) {
            (Axis::XY, Some(r)) => (r.width, r.height),
            (Axis::XY, None) => (self.size_x, self.size_y),
            (Axis::XZ, _) => (self.size_x, self.size_z),
            (Axis::ZY, _) => (self.size_z, self.size_y),
        }
    }

    // Each render gets its own fill so consecutive renders are told apart.
    fn next_fill(&mut self) -> u32 {
        self.renders += 1;
        0xFF00_0000 | (self.renders & 0x00FF_FFFF)
    }

    fn packed(&mut self, (w, h): (u32, u32)) -> Vec<u32> {
        let fill = self.next_fill();
        vec![fill; w as usize * h as usize]
    }

    fn compressed(&mut self, (w, h): (u32, u32)) -> EngineResult<Vec<u8>> {
        let fill = self.next_fill();
        if self.corrupt_payloads {
            return Ok(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        }
        let [_, r, g, b] = fill.to_be_bytes();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([r, g, b])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, self.payload_format)
            .map_err(|e| EngineError::service(format!("encode failed: {e}")))?;
        Ok(out.into_inner())
    }
}

impl RenderingEngine for FakeRenderingEngine {
    fn available_families(&self) -> EngineResult<Vec<String>> {
        Ok(self.enter(Call::AvailableFamilies)?.families.clone())
    }

    fn available_models(&self) -> EngineResult<Vec<String>> {
        Ok(self.enter(Call::AvailableModels)?.models.clone())
    }

    fn is_pixels_type_signed(&self) -> EngineResult<bool> {
        Ok(self.enter(Call::IsPixelsTypeSigned)?.settings.type_signed)
    }

    fn default_z(&self) -> EngineResult<u32> {
        Ok(self.enter(Call::DefaultZ)?.settings.default_z)
    }

    fn default_t(&self) -> EngineResult<u32> {
        Ok(self.enter(Call::DefaultT)?.settings.default_t)
    }

    fn quantum_def(&self) -> EngineResult<QuantumDef> {
        let s = self.enter(Call::QuantumDef)?;
        Ok(QuantumDef {
            bit_resolution: s.settings.bit_resolution,
            cd_start: s.settings.cd_start,
            cd_end: s.settings.cd_end,
        })
    }

    fn model(&self) -> EngineResult<String> {
        Ok(self.enter(Call::Model)?.settings.color_model.clone())
    }

    fn is_active(&self, w: usize) -> EngineResult<bool> {
        let s = self.enter(Call::IsActive)?;
        s.settings.channel(w).map(|c| c.active).ok_or_else(|| no_channel(w))
    }

    fn channel_window_start(&self, w: usize) -> EngineResult<f64> {
        let s = self.enter(Call::ChannelWindowStart)?;
        s.settings.channel(w).map(|c| c.input_start).ok_or_else(|| no_channel(w))
    }

    fn channel_window_end(&self, w: usize) -> EngineResult<f64> {
        let s = self.enter(Call::ChannelWindowEnd)?;
        s.settings.channel(w).map(|c| c.input_end).ok_or_else(|| no_channel(w))
    }

    fn channel_family(&self, w: usize) -> EngineResult<String> {
        let s = self.enter(Call::ChannelFamily)?;
        s.settings.channel(w).map(|c| c.family.clone()).ok_or_else(|| no_channel(w))
    }

    fn channel_curve_coefficient(&self, w: usize) -> EngineResult<f64> {
        let s = self.enter(Call::ChannelCurveCoefficient)?;
        s.settings
            .channel(w)
            .map(|c| c.curve_coefficient)
            .ok_or_else(|| no_channel(w))
    }

    fn channel_noise_reduction(&self, w: usize) -> EngineResult<bool> {
        let s = self.enter(Call::ChannelNoiseReduction)?;
        s.settings
            .channel(w)
            .map(|c| c.noise_reduction)
            .ok_or_else(|| no_channel(w))
    }

    fn rgba(&self, w: usize) -> EngineResult<Rgba> {
        let s = self.enter(Call::Rgba)?;
        s.settings.channel(w).map(|c| c.rgba).ok_or_else(|| no_channel(w))
    }

    fn pixels_type_lower_bound(&self, w: usize) -> EngineResult<f64> {
        let s = self.enter(Call::PixelsTypeLowerBound)?;
        s.settings.channel(w).map(|_| s.bounds.0).ok_or_else(|| no_channel(w))
    }

    fn pixels_type_upper_bound(&self, w: usize) -> EngineResult<f64> {
        let s = self.enter(Call::PixelsTypeUpperBound)?;
        s.settings.channel(w).map(|_| s.bounds.1).ok_or_else(|| no_channel(w))
    }

    fn resolution_levels(&self) -> EngineResult<u32> {
        Ok(self.enter(Call::ResolutionLevels)?.levels)
    }

    fn resolution_level(&self) -> EngineResult<u32> {
        Ok(self.enter(Call::ResolutionLevel)?.level)
    }

    fn tile_size(&self) -> EngineResult<(u32, u32)> {
        Ok(self.enter(Call::TileSize)?.tile)
    }

    fn requires_pixels_pyramid(&self) -> EngineResult<bool> {
        Ok(self.enter(Call::RequiresPixelsPyramid)?.pyramid)
    }

    fn set_active(&mut self, w: usize, active: bool) -> EngineResult<()> {
        let mut s = self.enter(Call::SetActive)?;
        s.settings.channel_mut(w).ok_or_else(|| no_channel(w))?.active = active;
        Ok(())
    }

    fn set_channel_window(&mut self, w: usize, start: f64, end: f64) -> EngineResult<()> {
        let mut s = self.enter(Call::SetChannelWindow)?;
        let c = s.settings.channel_mut(w).ok_or_else(|| no_channel(w))?;
        c.input_start = start;
        c.input_end = end;
        Ok(())
    }

    fn set_rgba(&mut self, w: usize, rgba: Rgba) -> EngineResult<()> {
        let mut s = self.enter(Call::SetRgba)?;
        s.settings.channel_mut(w).ok_or_else(|| no_channel(w))?.rgba = rgba;
        Ok(())
    }

    fn set_quantization_map(
        &mut self,
        w: usize,
        family: &str,
        coefficient: f64,
        noise_reduction: bool,
    ) -> EngineResult<()> {
        let mut s = self.enter(Call::SetQuantizationMap)?;
        if !s.families.iter().any(|f| f == family) {
            return Err(EngineError::service(format!("unknown family {family}")));
        }
        let c = s.settings.channel_mut(w).ok_or_else(|| no_channel(w))?;
        c.family = family.to_owned();
        c.curve_coefficient = coefficient;
        c.noise_reduction = noise_reduction;
        Ok(())
    }

    fn set_model(&mut self, model: &str) -> EngineResult<()> {
        let mut s = self.enter(Call::SetModel)?;
        if !s.models.iter().any(|m| m == model) {
            return Err(EngineError::service(format!("unknown model {model}")));
        }
        s.settings.color_model = model.to_owned();
        Ok(())
    }

    fn set_default_z(&mut self, z: u32) -> EngineResult<()> {
        self.enter(Call::SetDefaultZ)?.settings.default_z = z;
        Ok(())
    }

    fn set_default_t(&mut self, t: u32) -> EngineResult<()> {
        self.enter(Call::SetDefaultT)?.settings.default_t = t;
        Ok(())
    }

    fn set_quantum_strategy(&mut self, bit_resolution: i32) -> EngineResult<()> {
        self.enter(Call::SetQuantumStrategy)?.settings.bit_resolution = bit_resolution;
        Ok(())
    }

    fn set_codomain_interval(&mut self, start: i32, end: i32) -> EngineResult<()> {
        let mut s = self.enter(Call::SetCodomainInterval)?;
        s.settings.cd_start = start;
        s.settings.cd_end = end;
        Ok(())
    }

    fn set_resolution_level(&mut self, level: u32) -> EngineResult<()> {
        let mut s = self.enter(Call::SetResolutionLevel)?;
        if level >= s.levels {
            return Err(EngineError::service(format!("no resolution level {level}")));
        }
        s.level = level;
        Ok(())
    }

    fn set_compression_level(&mut self, quality: f32) -> EngineResult<()> {
        let mut s = self.enter(Call::SetCompressionLevel)?;
        s.quality = quality;
        s.settings.compression = quality;
        Ok(())
    }

    fn render_as_packed_int(&mut self, plane: &PlaneDef) -> EngineResult<Vec<u32>> {
        let mut s = self.enter(Call::RenderAsPackedInt)?;
        let size = s.plane_size(plane);
        Ok(s.packed(size))
    }

    fn render_compressed(&mut self, plane: &PlaneDef) -> EngineResult<Vec<u8>> {
        let mut s = self.enter(Call::RenderCompressed)?;
        let size = s.plane_size(plane);
        s.compressed(size)
    }

    fn render_projected_as_packed_int(
        &mut self,
        _projection: ProjectionType,
        _t: u32,
        _stepping: i32,
        _start_z: i32,
        _end_z: i32,
    ) -> EngineResult<Vec<u32>> {
        let mut s = self.enter(Call::RenderProjectedAsPackedInt)?;
        let size = (s.size_x, s.size_y);
        Ok(s.packed(size))
    }

    fn render_projected_compressed(
        &mut self,
        _projection: ProjectionType,
        _t: u32,
        _stepping: i32,
        _start_z: i32,
        _end_z: i32,
    ) -> EngineResult<Vec<u8>> {
        let mut s = self.enter(Call::RenderProjectedCompressed)?;
        let size = (s.size_x, s.size_y);
        s.compressed(size)
    }

    fn save_current_settings(&mut self) -> EngineResult<()> {
        let mut s = self.enter(Call::SaveCurrentSettings)?;
        let snapshot = s.settings.clone();
        s.saved.push(snapshot);
        Ok(())
    }

    fn reset_defaults_no_save(&mut self) -> EngineResult<()> {
        let mut s = self.enter(Call::ResetDefaultsNoSave)?;
        s.settings = s.defaults.clone();
        Ok(())
    }

    fn close(&mut self) -> EngineResult<()> {
        self.enter(Call::Close)?.closed = true;
        Ok(())
    }
}
