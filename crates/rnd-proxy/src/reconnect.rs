// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Swapping the engine handle under a live proxy.

use rnd_engine::{EngineError, RenderingEngine};
use rnd_model::RenderingDef;
use tracing::{debug, info, instrument, warn};

use crate::error::absorb;
use crate::proxy::check_definition;
use crate::state::{push_definition, RenderingState};
use crate::{ProxyError, RenderingControlProxy};

impl RenderingControlProxy {
    /// Rebind to `engine`, re-reading settings from it or adopting `saved`.
    ///
    /// The next state is computed from the new engine first, and the current
    /// compression quality is pushed to it. Only when both succeed is the old
    /// engine closed (close errors are ignored), the cache slot dropped and
    /// the new engine and state installed; otherwise the proxy is left
    /// untouched and the new engine dropped.
    #[instrument(skip_all, fields(pixels = self.pixels.id(), saved = saved.is_some()))]
    pub fn reset_rendering_engine(
        &mut self,
        engine: Box<dyn RenderingEngine>,
        saved: Option<RenderingDef>,
    ) -> Result<(), ProxyError> {
        let size_c = self.size_c();
        if let Some(def) = &saved {
            check_definition(def, size_c)?;
        }
        if !self.session.is_alive() {
            warn!("session expired, engine not replaced");
            return Ok(());
        }
        let mut engine = engine;
        let quality = self.state.def.compression;
        let prepared = RenderingState::fetch(&*engine, size_c, saved.as_ref())
            .and_then(|next| engine.set_compression_level(quality).map(|()| next));
        let mut next = match prepared {
            Ok(next) => next,
            Err(EngineError::Connectivity(kind)) => {
                warn!(%kind, "new engine unreachable, keeping the current one");
                return Ok(());
            }
            Err(EngineError::Service(message)) => {
                return Err(ProxyError::service("cannot reset the rendering engine", message));
            }
        };
        next.def.compression = quality;

        let mut old = std::mem::replace(&mut self.engine, engine);
        if let Err(err) = old.close() {
            debug!(%err, "closing the previous engine failed");
        }
        self.cache.dispose();
        self.state = next;
        self.resolution.selected = None;
        info!("rendering engine reset");
        Ok(())
    }

    /// Install `engine` and push the whole local state onto it.
    ///
    /// Used when the server-side engine is new and stateless. Clears the
    /// drift flag once every value reached the engine.
    #[instrument(skip_all, fields(pixels = self.pixels.id()))]
    pub fn replace_engine(&mut self, engine: Box<dyn RenderingEngine>) -> Result<(), ProxyError> {
        // The previous handle belongs to a lost session; it is dropped, not closed.
        self.engine = engine;
        let def = self.state.def.clone();
        let level = self.resolution.selected;
        let pushed = self.remote(|e| {
            push_definition(e, &def)?;
            match level {
                Some(level) => e.set_resolution_level(level),
                None => Ok(()),
            }
        });
        // A partial push leaves the new engine behind the mirror.
        match absorb(pushed, "cannot restore the rendering settings") {
            Ok(Some(())) => {
                self.state.drifted = false;
                info!("rendering engine replaced");
                Ok(())
            }
            Ok(None) => {
                self.state.drifted = true;
                Ok(())
            }
            Err(err) => {
                self.state.drifted = true;
                Err(err)
            }
        }
    }

    /// Close the engine and release the cache slot.
    #[instrument(skip_all, fields(pixels = self.pixels.id()))]
    pub fn shut_down(&mut self) {
        if let Err(err) = self.engine.close() {
            debug!(%err, "closing the engine failed");
        }
        self.cache.dispose();
        info!("rendering proxy shut down");
    }
}
