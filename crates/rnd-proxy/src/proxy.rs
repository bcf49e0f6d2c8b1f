// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The proxy itself: construction, settings setters and settings workflows.

use std::sync::Arc;

use rnd_config::ProxyConfig;
use rnd_engine::{EngineError, EngineResult, RenderingEngine, SessionProbe};
use rnd_model::{
    BitResolution, ChannelBinding, ChannelMetadata, CompressionLevel, PixelsDescriptor, RenderingDef, Rgba,
    RGB_MODEL,
};
use tracing::{info, warn};

use crate::error::{absorb, SESSION_DEAD};
use crate::plane_cache::{PlaneCache, SharedPlaneCache};
use crate::resolution::ResolutionState;
use crate::state::{read_definition, RenderingState};
use crate::{Mutation, ProxyError};

/// Everything a proxy needs besides its collaborators.
#[derive(Clone, Debug)]
pub struct ProxyInit {
    /// The pixel set being rendered.
    pub pixels: PixelsDescriptor,
    /// One entry per channel, in any order.
    pub channels: Vec<ChannelMetadata>,
    /// Starting compression; `None` takes the configured default.
    pub compression: Option<CompressionLevel>,
    /// Previously saved settings; the first one is adopted.
    pub saved: Vec<RenderingDef>,
    /// Tunables.
    pub config: ProxyConfig,
}

impl ProxyInit {
    /// Defaults for everything but the pixel set and its channels.
    pub fn new(pixels: PixelsDescriptor, channels: Vec<ChannelMetadata>) -> Self {
        Self {
            pixels,
            channels,
            compression: None,
            saved: Vec::new(),
            config: ProxyConfig::default(),
        }
    }

    /// Start with `level` instead of the configured default.
    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.compression = Some(level);
        self
    }

    /// Previously saved settings, most relevant first.
    pub fn with_saved(mut self, saved: Vec<RenderingDef>) -> Self {
        self.saved = saved;
        self
    }

    /// Use `config` instead of the defaults.
    pub fn with_config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }
}

/// Client-side mirror of a remote rendering engine bound to one pixel set.
///
/// The proxy answers settings queries locally, forwards every change to the
/// engine, and caches decoded XY planes in a slot of a shared
/// [`CacheService`](rnd_cache::CacheService).
///
/// # Optimistic Mirror
///
/// Setters update the local definition whatever the engine answers and
/// report what happened as a [`Mutation`]. Once a change failed to reach the
/// engine, [`has_drifted`](Self::has_drifted) stays true until the next full
/// re-synchronization ([`reset_defaults`](Self::reset_defaults),
/// [`reset_rendering_engine`](Self::reset_rendering_engine),
/// [`replace_engine`](Self::replace_engine)).
///
/// # Connection Loss
///
/// Connectivity failures, including calls skipped because the
/// [`SessionProbe`] reports the session dead, are logged and produce no
/// result and no error.
///
/// # Sequencing
///
/// Every method takes `&self` or `&mut self` and performs at most a few
/// blocking engine round trips. Callers wanting to share a proxy across
/// threads must sequence calls themselves.
pub struct RenderingControlProxy {
    pub(crate) engine: Box<dyn RenderingEngine>,
    pub(crate) session: Arc<dyn SessionProbe>,
    pub(crate) pixels: PixelsDescriptor,
    pub(crate) metadata: Vec<ChannelMetadata>,
    pub(crate) state: RenderingState,
    pub(crate) cache: PlaneCache,
    pub(crate) resolution: ResolutionState,
    pub(crate) compression: CompressionLevel,
    pub(crate) config: ProxyConfig,
    pub(crate) history: Vec<RenderingDef>,
}

const INIT_ERROR: &str = "cannot initialize the rendering proxy";

fn init_error(err: EngineError) -> ProxyError {
    match err {
        EngineError::Connectivity(kind) => ProxyError::Disconnected(kind.to_string()),
        EngineError::Service(message) => ProxyError::service(INIT_ERROR, message),
    }
}

/// Order metadata by channel index, requiring exactly one entry per channel.
fn index_metadata(
    channels: Vec<ChannelMetadata>,
    size_c: usize,
) -> Result<Vec<ChannelMetadata>, ProxyError> {
    let mut slots: Vec<Option<ChannelMetadata>> = vec![None; size_c];
    for m in channels {
        let index = m.index;
        match slots.get_mut(index) {
            Some(slot @ None) => *slot = Some(m),
            Some(Some(_)) => {
                return Err(ProxyError::invalid(format!(
                    "duplicate metadata for channel {index}"
                )))
            }
            None => {
                return Err(ProxyError::invalid(format!(
                    "metadata for channel {index} but the pixel set has {size_c}"
                )))
            }
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(w, m)| m.ok_or_else(|| ProxyError::invalid(format!("no metadata for channel {w}"))))
        .collect()
}

pub(crate) fn check_definition(def: &RenderingDef, size_c: usize) -> Result<(), ProxyError> {
    if def.num_channels() == size_c {
        Ok(())
    } else {
        Err(ProxyError::invalid(format!(
            "settings have {} channels, the pixel set has {size_c}",
            def.num_channels()
        )))
    }
}

impl RenderingControlProxy {
    /// Bind a proxy to `engine`.
    ///
    /// Reads the engine's families and models, then either adopts the first
    /// saved definition (refreshing its pixel-type bounds) or pulls the full
    /// definition from the engine. Finally pushes the starting compression
    /// quality.
    ///
    /// # Errors
    ///
    /// [`ProxyError::InvalidArgument`] for mismatched channel metadata or
    /// saved settings, [`ProxyError::Disconnected`] when the engine cannot
    /// be reached, [`ProxyError::Service`] when it answers with an error.
    pub fn new(
        mut engine: Box<dyn RenderingEngine>,
        cache: SharedPlaneCache,
        session: Arc<dyn SessionProbe>,
        init: ProxyInit,
    ) -> Result<Self, ProxyError> {
        let ProxyInit {
            pixels,
            channels,
            compression,
            saved,
            config,
        } = init;
        let size_c = pixels.size_c() as usize;
        let metadata = index_metadata(channels, size_c)?;
        if let Some(first) = saved.first() {
            check_definition(first, size_c)?;
        }
        if !session.is_alive() {
            return Err(init_error(SESSION_DEAD));
        }
        let compression = compression.unwrap_or(config.default_compression);
        let quality = config.quality_for(compression);
        let mut state =
            RenderingState::fetch(&*engine, size_c, saved.first()).map_err(init_error)?;
        engine.set_compression_level(quality).map_err(init_error)?;
        state.def.compression = quality;
        let cache = PlaneCache::new(cache, config.cache_budget_bytes, pixels.size_z());
        info!(pixels = pixels.id(), ?compression, saved = saved.len(), "rendering proxy ready");
        Ok(Self {
            engine,
            session,
            pixels,
            metadata,
            state,
            cache,
            resolution: ResolutionState::default(),
            compression,
            config,
            history: saved,
        })
    }

    /// Run `call` against the engine unless the session is known dead.
    pub(crate) fn remote<T>(
        &mut self,
        call: impl FnOnce(&mut dyn RenderingEngine) -> EngineResult<T>,
    ) -> EngineResult<T> {
        if !self.session.is_alive() {
            warn!(pixels = self.pixels.id(), "session expired, engine call skipped");
            return Err(SESSION_DEAD);
        }
        call(&mut *self.engine)
    }

    /// Finish a setter whose local change is already applied.
    fn settle(&mut self, remote: EngineResult<()>, context: &str, invalidates: bool) -> Mutation {
        if invalidates {
            self.cache.invalidate();
        }
        let outcome = Mutation::from_remote(remote, context);
        if outcome.drifted() {
            self.state.drifted = true;
        }
        outcome
    }

    /// Replace the mirror after a full re-synchronization.
    pub(crate) fn adopt(&mut self, mut def: RenderingDef) {
        def.compression = self.state.def.compression;
        self.state.def = def;
        self.state.drifted = false;
    }

    pub(crate) fn size_c(&self) -> usize {
        self.state.def.num_channels()
    }

    fn check_channel(&self, w: usize) -> Result<(), ProxyError> {
        if w < self.size_c() {
            Ok(())
        } else {
            Err(ProxyError::invalid(format!(
                "channel {w} out of range, the pixel set has {}",
                self.size_c()
            )))
        }
    }

    // ── Setters ────────────────────────────────────────────────────────

    /// Select the color model. Rejected unless the engine lists it.
    pub fn set_model(&mut self, model: &str) -> Mutation {
        if !self.state.knows_model(model) {
            return Mutation::Rejected(ProxyError::invalid(format!("unknown color model {model}")));
        }
        let remote = self.remote(|e| e.set_model(model));
        self.state.def.color_model = model.to_owned();
        self.settle(remote, "cannot set the color model", true)
    }

    /// Set the default optical section, clamped to the pixel set.
    ///
    /// Cached planes stay valid: they are keyed by their own z.
    pub fn set_default_z(&mut self, z: u32) -> Mutation {
        let z = z.min(self.pixels.size_z() - 1);
        let remote = self.remote(|e| e.set_default_z(z));
        self.state.def.default_z = z;
        self.settle(remote, "cannot set the default section", false)
    }

    /// Set the default timepoint, clamped to the pixel set.
    pub fn set_default_t(&mut self, t: u32) -> Mutation {
        let t = t.min(self.pixels.size_t() - 1);
        let remote = self.remote(|e| e.set_default_t(t));
        self.state.def.default_t = t;
        self.settle(remote, "cannot set the default timepoint", false)
    }

    /// Set the quantization depth from its engine value (`2^n - 1`, `n` in 1..=8).
    pub fn set_quantum_strategy(&mut self, bit_resolution: i32) -> Mutation {
        if let Err(e) = BitResolution::from_value(bit_resolution) {
            return Mutation::Rejected(ProxyError::invalid(e.to_string()));
        }
        let remote = self.remote(|e| e.set_quantum_strategy(bit_resolution));
        self.state.def.bit_resolution = bit_resolution;
        self.settle(remote, "cannot set the quantum strategy", true)
    }

    /// Set the codomain interval.
    pub fn set_codomain_interval(&mut self, start: i32, end: i32) -> Mutation {
        let remote = self.remote(|e| e.set_codomain_interval(start, end));
        self.state.def.cd_start = start;
        self.state.def.cd_end = end;
        self.settle(remote, "cannot set the codomain interval", true)
    }

    /// Set channel `w`'s input window.
    pub fn set_channel_window(&mut self, w: usize, start: f64, end: f64) -> Mutation {
        if let Err(e) = self.check_channel(w) {
            return Mutation::Rejected(e);
        }
        let remote = self.remote(|e| e.set_channel_window(w, start, end));
        if let Some(c) = self.state.def.channel_mut(w) {
            c.input_start = start;
            c.input_end = end;
        }
        self.settle(remote, "cannot set the channel window", true)
    }

    /// Set channel `w`'s color.
    pub fn set_rgba(&mut self, w: usize, rgba: Rgba) -> Mutation {
        if let Err(e) = self.check_channel(w) {
            return Mutation::Rejected(e);
        }
        let remote = self.remote(|e| e.set_rgba(w, rgba));
        if let Some(c) = self.state.def.channel_mut(w) {
            c.rgba = rgba;
        }
        self.settle(remote, "cannot set the channel color", true)
    }

    /// Activate or deactivate channel `w`.
    pub fn set_active(&mut self, w: usize, active: bool) -> Mutation {
        if let Err(e) = self.check_channel(w) {
            return Mutation::Rejected(e);
        }
        let remote = self.remote(|e| e.set_active(w, active));
        if let Some(c) = self.state.def.channel_mut(w) {
            c.active = active;
        }
        self.settle(remote, "cannot activate the channel", true)
    }

    /// Set channel `w`'s quantization map. Rejected unless the engine lists
    /// `family`.
    pub fn set_quantization_map(
        &mut self,
        w: usize,
        family: &str,
        coefficient: f64,
        noise_reduction: bool,
    ) -> Mutation {
        if let Err(e) = self.check_channel(w) {
            return Mutation::Rejected(e);
        }
        if !self.state.knows_family(family) {
            return Mutation::Rejected(ProxyError::invalid(format!("unknown family {family}")));
        }
        let remote = self.remote(|e| e.set_quantization_map(w, family, coefficient, noise_reduction));
        if let Some(c) = self.state.def.channel_mut(w) {
            c.family = family.to_owned();
            c.curve_coefficient = coefficient;
            c.noise_reduction = noise_reduction;
        }
        self.settle(remote, "cannot set the quantization map", true)
    }

    // ── Settings workflows ─────────────────────────────────────────────

    /// Ask the engine to persist the current settings.
    ///
    /// Returns a copy of what was saved, or `None` under connection loss.
    pub fn save_current_settings(&mut self) -> Result<Option<RenderingDef>, ProxyError> {
        let saved = self.remote(|e| e.save_current_settings());
        Ok(absorb(saved, "cannot save the current settings")?.map(|()| self.state.def.clone()))
    }

    /// Let the engine recompute its defaults, then re-read everything.
    pub fn reset_defaults(&mut self) -> Result<(), ProxyError> {
        let size_c = self.size_c();
        let fetched = self.remote(|e| {
            e.reset_defaults_no_save()?;
            read_definition(&*e, size_c)
        });
        self.cache.invalidate();
        if let Some(def) = absorb(fetched, "cannot reset the default settings")? {
            self.adopt(def);
        }
        Ok(())
    }

    /// Engine defaults with the RGB model for multi-channel sets, noise
    /// reduction off and every window spanning the channel's global range.
    pub fn set_original_rnd_settings(&mut self) -> Result<(), ProxyError> {
        let size_c = self.size_c();
        let plan: Vec<(Option<String>, f64, f64, f64)> = self
            .state
            .def
            .channels()
            .iter()
            .zip(&self.metadata)
            .map(|(c, m)| {
                let family = self.state.knows_family(&c.family).then(|| c.family.clone());
                (family, c.curve_coefficient, m.global_min, m.global_max)
            })
            .collect();
        let fetched = self.remote(|e| {
            e.reset_defaults_no_save()?;
            if size_c > 1 {
                e.set_model(RGB_MODEL)?;
            }
            for (w, (family, coefficient, min, max)) in plan.iter().enumerate() {
                if let Some(family) = family {
                    e.set_quantization_map(w, family, *coefficient, false)?;
                }
                e.set_channel_window(w, *min, *max)?;
            }
            read_definition(&*e, size_c)
        });
        self.cache.invalidate();
        if let Some(def) = absorb(fetched, "cannot restore the original settings")? {
            self.adopt(def);
        }
        Ok(())
    }

    /// Apply every field of `def` through the setters.
    ///
    /// Stops at the first setter that reports an error.
    pub fn reset_settings(&mut self, def: &RenderingDef) -> Result<(), ProxyError> {
        check_definition(def, self.size_c())?;
        self.set_default_t(def.default_t).into_result()?;
        self.set_default_z(def.default_z).into_result()?;
        self.set_model(&def.color_model).into_result()?;
        self.set_codomain_interval(def.cd_start, def.cd_end).into_result()?;
        self.set_quantum_strategy(def.bit_resolution).into_result()?;
        for (w, c) in def.channels().iter().enumerate() {
            self.apply_channel(w, c)?;
        }
        Ok(())
    }

    /// Copy `def`'s global settings, and for the k-th entry of `indexes`
    /// copy `def`'s channel `indexes[k]` onto local channel `k`.
    ///
    /// The default timepoint is only copied when it exists in this pixel set.
    pub fn copy_rendering_settings(
        &mut self,
        def: &RenderingDef,
        indexes: &[usize],
    ) -> Result<(), ProxyError> {
        self.set_model(&def.color_model).into_result()?;
        self.set_codomain_interval(def.cd_start, def.cd_end).into_result()?;
        self.set_quantum_strategy(def.bit_resolution).into_result()?;
        if def.default_t < self.pixels.size_t() {
            self.set_default_t(def.default_t).into_result()?;
        }
        for (k, &index) in indexes.iter().enumerate() {
            if let Some(c) = def.channel(index) {
                self.apply_channel(k, c)?;
            }
        }
        Ok(())
    }

    fn apply_channel(&mut self, w: usize, c: &ChannelBinding) -> Result<(), ProxyError> {
        self.set_rgba(w, c.rgba).into_result()?;
        self.set_channel_window(w, c.input_start, c.input_end).into_result()?;
        self.set_quantization_map(w, &c.family, c.curve_coefficient, c.noise_reduction)
            .into_result()?;
        self.set_active(w, c.active).into_result()
    }

    /// Change the cache's byte budget.
    pub fn set_cache_size(&mut self, budget_bytes: usize) {
        self.config.cache_budget_bytes = budget_bytes;
        self.cache.resize(budget_bytes);
    }
}
