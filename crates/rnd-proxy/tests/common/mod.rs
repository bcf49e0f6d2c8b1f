// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use rnd_cache::MemoryCacheService;
use rnd_dry_tests::{fixtures, FakeRenderingEngine, ScriptedSession};
use rnd_model::{CompressionLevel, PixelsDescriptor, PlaneImage};
use rnd_proxy::{ProxyInit, RenderingControlProxy};
use tracing_subscriber::EnvFilter;

/// A proxy wired to a fake engine, a private cache service and a scripted
/// session, with handles kept for inspection.
pub struct Harness {
    pub fake: FakeRenderingEngine,
    pub cache: Arc<MemoryCacheService<Arc<PlaneImage>>>,
    pub session: ScriptedSession,
    pub proxy: RenderingControlProxy,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn init_for(pixels: &PixelsDescriptor) -> ProxyInit {
    ProxyInit::new(pixels.clone(), fixtures::channel_metadata(pixels))
}

impl Harness {
    pub fn new(pixels: &PixelsDescriptor, level: CompressionLevel) -> Self {
        Self::with_engine(
            FakeRenderingEngine::new(pixels),
            init_for(pixels).with_compression(level),
        )
    }

    /// The 512×256×10×5×3 pixel set, uncompressed.
    pub fn uncompressed() -> Self {
        Self::new(&fixtures::pixels(), CompressionLevel::Uncompressed)
    }

    pub fn with_engine(fake: FakeRenderingEngine, init: ProxyInit) -> Self {
        init_tracing();
        let cache = Arc::new(MemoryCacheService::new());
        let session = ScriptedSession::alive();
        let proxy = RenderingControlProxy::new(
            Box::new(fake.clone()),
            cache.clone(),
            Arc::new(session.clone()),
            init,
        )
        .unwrap();
        Self {
            fake,
            cache,
            session,
            proxy,
        }
    }
}
