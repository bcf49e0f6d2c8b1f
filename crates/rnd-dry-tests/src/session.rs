// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session probe whose liveness the test controls.

use rnd_engine::SessionProbe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// [`SessionProbe`] backed by a shared flag.
#[derive(Clone, Debug)]
pub struct ScriptedSession {
    alive: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
}

impl ScriptedSession {
    /// A live session.
    pub fn alive() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Flip liveness for every clone.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    /// How many times `is_alive` was asked.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl SessionProbe for ScriptedSession {
    fn is_alive(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.alive.load(Ordering::SeqCst)
    }
}
