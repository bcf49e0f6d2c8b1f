// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for the rendering proxy crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`engine`] - Scriptable fake of the remote rendering engine
//! - [`config`] - In-memory config store fake
//! - [`session`] - Session probe with a test-controlled liveness flag
//! - [`fixtures`] - Pixel sets and channel metadata

pub mod config;
pub mod engine;
pub mod fixtures;
pub mod session;

pub use config::{InMemoryConfigStore, StoreFault};
pub use engine::{Call, FakeRenderingEngine, FAKE_FAMILIES};
pub use session::ScriptedSession;
