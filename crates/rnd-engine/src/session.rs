// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session liveness probe.

/// Cooperative pre-flight check against the session registry.
///
/// A `false` answer lets the proxy skip calls on a connection already known
/// to be dead. A `true` answer guarantees nothing.
pub trait SessionProbe: Send + Sync {
    /// Whether the session backing the engine is believed alive.
    fn is_alive(&self) -> bool;
}

/// Probe for callers without a session registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAlive;

impl SessionProbe for AlwaysAlive {
    fn is_alive(&self) -> bool {
        true
    }
}
