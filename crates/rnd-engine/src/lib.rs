// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port contract between the rendering proxy and a remote rendering engine.
//!
//! The engine itself lives on the server; this crate only names what the
//! proxy may ask of it. Adapters (network stubs, the test fake in
//! `rnd-dry-tests`) implement [`RenderingEngine`].
//!
//! # Error Classes
//!
//! Every call returns [`EngineResult`]. [`EngineError`] is a closed set:
//! connectivity failures (the engine could not be reached) and service
//! failures (the engine answered with an error). The proxy treats the two
//! very differently, so adapters must classify faithfully.
#![forbid(unsafe_code)]

mod engine;
mod session;

pub use engine::{QuantumDef, RenderingEngine};
pub use session::{AlwaysAlive, SessionProbe};

/// Why the engine could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityKind {
    /// The server refused the connection.
    Refused,
    /// The call timed out.
    TimedOut,
    /// An established connection dropped.
    Lost,
    /// The session registry reports the session as dead; no call was made.
    SessionExpired,
}

impl std::fmt::Display for ConnectivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Refused => "connection refused",
            Self::TimedOut => "connection timed out",
            Self::Lost => "connection lost",
            Self::SessionExpired => "session expired",
        };
        f.write_str(s)
    }
}

/// Failure of a remote engine call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine was unreachable.
    #[error("engine unreachable: {0}")]
    Connectivity(ConnectivityKind),
    /// The engine rejected or failed the request.
    #[error("engine error: {0}")]
    Service(String),
}

impl EngineError {
    /// Shorthand for a service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    /// Returns `true` for connectivity-class failures.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Result of a remote engine call.
pub type EngineResult<T> = Result<T, EngineError>;
