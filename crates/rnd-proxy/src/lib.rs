// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client-side rendering control proxy.
//!
//! [`RenderingControlProxy`] keeps a local copy of the rendering settings of
//! one pixel set in step with a remote [`RenderingEngine`](rnd_engine::RenderingEngine),
//! renders planes through it and caches the decoded XY planes in a slot of a
//! shared [`CacheService`](rnd_cache::CacheService).
//!
//! # Cache Validity
//!
//! A cached plane is keyed by `z + sizeZ * t` and stays valid until the
//! settings it was rendered with change. Every settings setter except the
//! default Z/T ones clears the slot; switching compression or engine drops
//! it. Non-XY planes and pyramidal ("big") images are never cached.
//!
//! # Errors
//!
//! Engine service errors surface as [`ProxyError::Service`] with the failing
//! operation as context. Connectivity failures are logged with `tracing`
//! and turn into `Ok(None)` or [`Mutation::AppliedLocally`].
#![forbid(unsafe_code)]

mod accessors;
mod decode;
mod error;
mod pipeline;
mod plane_cache;
mod projection;
mod proxy;
mod reconnect;
mod resolution;
mod state;

pub use error::{Mutation, ProxyError};
pub use plane_cache::SharedPlaneCache;
pub use projection::ProjectionRange;
pub use proxy::{ProxyInit, RenderingControlProxy};
