// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Proxy errors and setter outcomes.

use rnd_engine::{ConnectivityKind, EngineError};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by [`RenderingControlProxy`](crate::RenderingControlProxy).
///
/// Connectivity failures never show up here once the proxy exists: they are
/// logged and turned into an absent result (see [`Mutation::AppliedLocally`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The engine answered with an error.
    #[error("{context}: {message}")]
    Service {
        /// Operation that failed.
        context: String,
        /// Engine-provided detail.
        message: String,
    },
    /// Local validation failed before any engine call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A compressed payload could not be decoded.
    #[error("{context}: {message}")]
    Decode {
        /// Operation that failed.
        context: String,
        /// Decoder detail.
        message: String,
    },
    /// The engine could not be reached while building the proxy.
    #[error("rendering engine unreachable: {0}")]
    Disconnected(String),
}

impl ProxyError {
    pub(crate) fn service(context: &str, message: impl Into<String>) -> Self {
        Self::Service {
            context: context.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Outcome of a settings setter.
///
/// The local mirror advances for every variant except [`Mutation::Rejected`],
/// whatever the engine answered.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Engine and mirror agree.
    Applied,
    /// Engine unreachable; mirror advanced, nothing to report.
    AppliedLocally,
    /// Engine rejected the call; mirror advanced anyway.
    AppliedWithRemoteError(ProxyError),
    /// Local validation failed; nothing changed.
    Rejected(ProxyError),
}

impl Mutation {
    /// Whether the mirror took the new value.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Whether the mirror may now disagree with the engine.
    pub fn drifted(&self) -> bool {
        matches!(self, Self::AppliedLocally | Self::AppliedWithRemoteError(_))
    }

    /// Surface the error, if any. `AppliedLocally` is not an error.
    pub fn into_result(self) -> Result<(), ProxyError> {
        match self {
            Self::Applied | Self::AppliedLocally => Ok(()),
            Self::AppliedWithRemoteError(err) | Self::Rejected(err) => Err(err),
        }
    }

    /// Classify an engine answer for an already-applied local change.
    pub(crate) fn from_remote(result: Result<(), EngineError>, context: &str) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(EngineError::Connectivity(kind)) => {
                warn!(%kind, context, "engine unreachable, keeping local change");
                Self::AppliedLocally
            }
            Err(EngineError::Service(message)) => {
                Self::AppliedWithRemoteError(ProxyError::service(context, message))
            }
        }
    }
}

/// Map an engine failure to `Ok(None)` for connectivity and an error otherwise.
pub(crate) fn absorb<T>(
    result: Result<T, EngineError>,
    context: &str,
) -> Result<Option<T>, ProxyError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(EngineError::Connectivity(kind)) => {
            warn!(%kind, context, "engine unreachable, no result");
            Ok(None)
        }
        Err(EngineError::Service(message)) => Err(ProxyError::service(context, message)),
    }
}

/// Error reported for calls skipped because the session is known dead.
pub(crate) const SESSION_DEAD: EngineError = EngineError::Connectivity(ConnectivityKind::SessionExpired);
