// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Local mirror of the engine's rendering settings.

use rnd_engine::{EngineResult, RenderingEngine};
use rnd_model::RenderingDef;

/// Settings mirror plus the enumerations it is validated against.
#[derive(Clone, Debug)]
pub(crate) struct RenderingState {
    pub(crate) def: RenderingDef,
    pub(crate) families: Vec<String>,
    pub(crate) models: Vec<String>,
    /// Set when a local change may not have reached the engine.
    pub(crate) drifted: bool,
}

impl RenderingState {
    /// Build a complete state from `engine` without touching anything else.
    ///
    /// With `saved`, the definition is adopted as-is except for the pixel-type
    /// bounds, which are always re-read.
    pub(crate) fn fetch(
        engine: &dyn RenderingEngine,
        size_c: usize,
        saved: Option<&RenderingDef>,
    ) -> EngineResult<Self> {
        let families = engine.available_families()?;
        let models = engine.available_models()?;
        let def = match saved {
            Some(saved) => {
                let mut def = saved.clone();
                refresh_bounds(engine, &mut def)?;
                def
            }
            None => read_definition(engine, size_c)?,
        };
        Ok(Self {
            def,
            families,
            models,
            drifted: false,
        })
    }

    pub(crate) fn knows_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub(crate) fn knows_family(&self, family: &str) -> bool {
        self.families.iter().any(|f| f == family)
    }
}

/// Pull every rendering parameter from the engine into a fresh definition.
pub(crate) fn read_definition(
    engine: &dyn RenderingEngine,
    size_c: usize,
) -> EngineResult<RenderingDef> {
    let mut def = RenderingDef::new(size_c);
    def.type_signed = engine.is_pixels_type_signed()?;
    def.default_z = engine.default_z()?;
    def.default_t = engine.default_t()?;
    let quantum = engine.quantum_def()?;
    def.bit_resolution = quantum.bit_resolution;
    def.cd_start = quantum.cd_start;
    def.cd_end = quantum.cd_end;
    def.color_model = engine.model()?;
    for (w, c) in def.channels_mut().iter_mut().enumerate() {
        c.active = engine.is_active(w)?;
        c.input_start = engine.channel_window_start(w)?;
        c.input_end = engine.channel_window_end(w)?;
        c.family = engine.channel_family(w)?;
        c.curve_coefficient = engine.channel_curve_coefficient(w)?;
        c.noise_reduction = engine.channel_noise_reduction(w)?;
        c.rgba = engine.rgba(w)?;
        c.lower_bound = engine.pixels_type_lower_bound(w)?;
        c.upper_bound = engine.pixels_type_upper_bound(w)?;
    }
    Ok(def)
}

/// Re-read the per-channel pixel-type bounds.
pub(crate) fn refresh_bounds(engine: &dyn RenderingEngine, def: &mut RenderingDef) -> EngineResult<()> {
    for (w, c) in def.channels_mut().iter_mut().enumerate() {
        c.lower_bound = engine.pixels_type_lower_bound(w)?;
        c.upper_bound = engine.pixels_type_upper_bound(w)?;
    }
    Ok(())
}

/// Push the whole definition onto a (fresh) engine.
pub(crate) fn push_definition(
    engine: &mut dyn RenderingEngine,
    def: &RenderingDef,
) -> EngineResult<()> {
    engine.set_default_z(def.default_z)?;
    engine.set_default_t(def.default_t)?;
    engine.set_quantum_strategy(def.bit_resolution)?;
    engine.set_model(&def.color_model)?;
    engine.set_codomain_interval(def.cd_start, def.cd_end)?;
    for (w, c) in def.channels().iter().enumerate() {
        engine.set_active(w, c.active)?;
        engine.set_channel_window(w, c.input_start, c.input_end)?;
        engine.set_quantization_map(w, &c.family, c.curve_coefficient, c.noise_reduction)?;
        engine.set_rgba(w, c.rgba)?;
    }
    engine.set_compression_level(def.compression)
}
