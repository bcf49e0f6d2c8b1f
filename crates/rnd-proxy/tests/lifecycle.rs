// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::float_cmp)]
//! Construction, engine replacement, shut-down and configuration.

mod common;

use std::sync::Arc;

use common::{init_for, init_tracing, Harness};
use rnd_cache::MemoryCacheService;
use rnd_config::{ConfigService, ProxyConfig};
use rnd_dry_tests::{fixtures, Call, FakeRenderingEngine, InMemoryConfigStore, ScriptedSession};
use rnd_engine::{ConnectivityKind, EngineError};
use rnd_model::{
    ChannelMetadata, CompressionLevel, PixelsDescriptor, PlaneDef, RenderingDef, Rgba,
    GREYSCALE_MODEL,
};
use rnd_proxy::{ProxyError, ProxyInit, RenderingControlProxy};

const YELLOW: Rgba = Rgba::new(255, 255, 0, 255);

fn lost() -> EngineError {
    EngineError::Connectivity(ConnectivityKind::Lost)
}

fn build(
    fake: &FakeRenderingEngine,
    session: &ScriptedSession,
    init: ProxyInit,
) -> Result<RenderingControlProxy, ProxyError> {
    init_tracing();
    RenderingControlProxy::new(
        Box::new(fake.clone()),
        Arc::new(MemoryCacheService::new()),
        Arc::new(session.clone()),
        init,
    )
}

fn named(size_c: usize, name: Option<&str>) -> RenderingDef {
    let mut def = RenderingDef::new(size_c);
    def.name = name.map(str::to_owned);
    def
}

// ── Construction ───────────────────────────────────────────────────────

#[test]
fn construction_pushes_compression_quality() {
    let pixels = fixtures::pixels();
    let h = Harness::new(&pixels, CompressionLevel::Low);
    assert_eq!(h.fake.quality(), 0.5);
    assert_eq!(h.proxy.compression_level(), CompressionLevel::Low);
    assert_eq!(h.proxy.settings_copy().compression, 0.5);
}

#[test]
fn unreachable_engine_fails_construction() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels);
    fake.fail_everything(EngineError::Connectivity(ConnectivityKind::Refused));
    let err = build(&fake, &ScriptedSession::alive(), init_for(&pixels)).err();
    assert!(matches!(err, Some(ProxyError::Disconnected(_))));
}

#[test]
fn dead_session_fails_construction() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels);
    let session = ScriptedSession::alive();
    session.set_alive(false);
    let err = build(&fake, &session, init_for(&pixels)).err();
    assert!(matches!(err, Some(ProxyError::Disconnected(_))));
    assert_eq!(fake.total_calls(), 0);
}

#[test]
fn engine_error_fails_construction() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels);
    fake.fail_on(Call::AvailableModels, EngineError::service("denied"));
    let err = build(&fake, &ScriptedSession::alive(), init_for(&pixels)).err();
    assert!(matches!(err, Some(ProxyError::Service { .. })));
}

#[test]
fn mismatched_metadata_fails_construction() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels);
    let session = ScriptedSession::alive();

    let missing = vec![ChannelMetadata::new(0, 0.0, 1.0), ChannelMetadata::new(1, 0.0, 1.0)];
    let err = build(&fake, &session, ProxyInit::new(pixels.clone(), missing)).err();
    assert!(matches!(err, Some(ProxyError::InvalidArgument(_))));

    let duplicated = vec![
        ChannelMetadata::new(0, 0.0, 1.0),
        ChannelMetadata::new(0, 0.0, 1.0),
        ChannelMetadata::new(2, 0.0, 1.0),
    ];
    let err = build(&fake, &session, ProxyInit::new(pixels, duplicated)).err();
    assert!(matches!(err, Some(ProxyError::InvalidArgument(_))));
    assert_eq!(fake.total_calls(), 0);
}

#[test]
fn saved_settings_must_match_channel_count() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels);
    let init = init_for(&pixels).with_saved(vec![RenderingDef::new(1)]);
    let err = build(&fake, &ScriptedSession::alive(), init).err();
    assert!(matches!(err, Some(ProxyError::InvalidArgument(_))));
}

#[test]
fn first_saved_settings_are_adopted() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels).with_bounds(-5.0, 300.0);
    let mut saved = named(3, Some("bright"));
    saved.color_model = GREYSCALE_MODEL.to_owned();
    if let Some(c) = saved.channel_mut(0) {
        c.active = true;
        c.rgba = YELLOW;
    }
    let h = Harness::with_engine(fake, init_for(&pixels).with_saved(vec![saved]));

    assert_eq!(h.proxy.model(), GREYSCALE_MODEL);
    assert_eq!(h.proxy.rgba(0), YELLOW);
    assert_eq!(h.proxy.active_channels(), vec![0]);
    assert_eq!(h.proxy.pixels_type_lower_bound(2), -5.0);
    assert_eq!(h.proxy.pixels_type_upper_bound(2), 300.0);
}

#[test]
fn saved_history_is_grouped_by_name() {
    let pixels = fixtures::pixels();
    let saved = vec![
        named(3, None),
        named(3, Some("bright")),
        named(3, Some("  ")),
        named(3, Some("bright")),
    ];
    let h = Harness::with_engine(
        FakeRenderingEngine::new(&pixels),
        init_for(&pixels).with_saved(saved),
    );

    assert_eq!(h.proxy.previous_rendering_settings().len(), 3);
    let groups = h.proxy.rendering_settings();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["Default"].len(), 2);
    assert_eq!(groups["bright"].len(), 2);
}

// ── Local answers ──────────────────────────────────────────────────────

#[test]
fn pixel_queries_never_reach_the_engine() {
    let pixels = fixtures::pixels().with_physical_size(Some(0.25), None, Some(2.0));
    let h = Harness::new(&pixels, CompressionLevel::Uncompressed);
    h.fake.reset_counts();

    assert_eq!(h.proxy.pixels_id(), 1);
    assert_eq!(
        (
            h.proxy.pixels_dimensions_x(),
            h.proxy.pixels_dimensions_y(),
            h.proxy.pixels_dimensions_z(),
            h.proxy.pixels_dimensions_t(),
            h.proxy.pixels_dimensions_c(),
        ),
        (512, 256, 10, 5, 3)
    );
    assert_eq!(h.proxy.pixels_physical_size_x(), 0.25);
    assert_eq!(h.proxy.pixels_physical_size_y(), 1.0);
    assert_eq!(h.proxy.pixels_physical_size_z(), 2.0);
    assert_eq!(h.proxy.channel_data(1).unwrap().global_max, 200.0);
    assert!(h.proxy.channel_data(3).is_none());
    assert_eq!(h.proxy.families().len(), 4);
    assert_eq!(h.proxy.models().len(), 2);
    let _ = h.proxy.settings_copy();
    assert_eq!(h.fake.total_calls(), 0);
}

#[test]
fn validate_pixels_compares_shape_and_type() {
    let h = Harness::uncompressed();
    let same_shape = PixelsDescriptor::new(99, [512, 256, 1, 1, 3], "uint8", false).unwrap();
    let other_type = PixelsDescriptor::new(99, [512, 256, 10, 5, 3], "uint16", false).unwrap();
    let other_c = PixelsDescriptor::new(99, [512, 256, 10, 5, 2], "uint8", false).unwrap();

    assert!(h.proxy.validate_pixels(&same_shape));
    assert!(!h.proxy.validate_pixels(&other_type));
    assert!(!h.proxy.validate_pixels(&other_c));
}

// ── Engine replacement ─────────────────────────────────────────────────

#[test]
fn reset_engine_rereads_settings() {
    let pixels = fixtures::pixels();
    let mut h = Harness::new(&pixels, CompressionLevel::Uncompressed);
    h.proxy.render(&PlaneDef::xy(0, 0)).unwrap();
    assert!(h.proxy.set_rgba(0, YELLOW).is_applied());

    let mut other = RenderingDef::new(3);
    other.cd_end = 77;
    let next = FakeRenderingEngine::new(&pixels).with_settings(other);
    h.proxy
        .reset_rendering_engine(Box::new(next.clone()), None)
        .unwrap();

    assert!(h.fake.is_closed());
    assert_eq!(h.cache.slot_count(), 0);
    assert_eq!(h.proxy.codomain_end(), 77);
    assert_eq!(h.proxy.rgba(0), Rgba::BLACK);
    assert_eq!(h.proxy.settings_copy().compression, 1.0);
    assert!(!h.proxy.has_drifted());

    h.proxy.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(next.render_calls(), 1);
}

#[test]
fn reset_engine_adopts_saved_settings() {
    let pixels = fixtures::pixels();
    let mut h = Harness::uncompressed();
    let mut saved = named(3, Some("restored"));
    saved.default_z = 4;
    let next = FakeRenderingEngine::new(&pixels).with_bounds(0.0, 4095.0);
    h.proxy
        .reset_rendering_engine(Box::new(next), Some(saved.clone()))
        .unwrap();

    assert!(h.proxy.is_same_settings(&saved, true));
    assert_eq!(h.proxy.pixels_type_upper_bound(1), 4095.0);
}

#[test]
fn unreachable_replacement_keeps_the_current_engine() {
    let pixels = fixtures::pixels();
    let mut h = Harness::uncompressed();
    h.proxy.render(&PlaneDef::xy(0, 0)).unwrap();
    let before = h.proxy.settings_copy();

    let next = FakeRenderingEngine::new(&pixels);
    next.fail_everything(lost());
    h.proxy
        .reset_rendering_engine(Box::new(next), None)
        .unwrap();

    assert!(!h.fake.is_closed());
    assert_eq!(h.cache.slot_count(), 1);
    assert_eq!(h.proxy.settings_copy(), before);

    h.proxy.render(&PlaneDef::xy(1, 0)).unwrap();
    assert_eq!(h.fake.render_calls(), 2);
}

#[test]
fn failing_replacement_reports_and_keeps_state() {
    let pixels = fixtures::pixels();
    let mut h = Harness::uncompressed();
    let next = FakeRenderingEngine::new(&pixels);
    next.fail_on(Call::Model, EngineError::service("corrupt"));

    let err = h
        .proxy
        .reset_rendering_engine(Box::new(next), None)
        .unwrap_err();
    assert!(matches!(err, ProxyError::Service { .. }));
    assert!(!h.fake.is_closed());
}

#[test]
fn reset_engine_pushes_compression_quality() {
    let pixels = fixtures::pixels();
    let mut h = Harness::new(&pixels, CompressionLevel::Low);
    let fresh = FakeRenderingEngine::new(&pixels);
    h.proxy
        .reset_rendering_engine(Box::new(fresh.clone()), None)
        .unwrap();

    assert_eq!(fresh.quality(), 0.5);
    assert_eq!(h.proxy.compression_level(), CompressionLevel::Low);
    assert_eq!(h.proxy.settings_copy().compression, 0.5);
    assert!(h.fake.is_closed());
}

#[test]
fn rejected_quality_keeps_the_current_engine() {
    let pixels = fixtures::pixels();
    let mut h = Harness::new(&pixels, CompressionLevel::Low);
    h.proxy.render(&PlaneDef::xy(0, 0)).unwrap();
    let fresh = FakeRenderingEngine::new(&pixels);
    fresh.fail_on(Call::SetCompressionLevel, EngineError::service("denied"));

    let err = h
        .proxy
        .reset_rendering_engine(Box::new(fresh.clone()), None)
        .unwrap_err();
    assert!(matches!(err, ProxyError::Service { .. }));
    assert!(!h.fake.is_closed());
    assert_eq!(h.cache.slot_count(), 1);

    fresh.clear_failures();
    fresh.fail_on(Call::SetCompressionLevel, lost());
    h.proxy
        .reset_rendering_engine(Box::new(fresh.clone()), None)
        .unwrap();
    assert!(!h.fake.is_closed());
    h.proxy.render(&PlaneDef::xy(1, 0)).unwrap();
    assert_eq!(fresh.render_calls(), 0);
}

#[test]
fn reset_engine_checks_saved_channel_count() {
    let pixels = fixtures::pixels();
    let mut h = Harness::uncompressed();
    let err = h
        .proxy
        .reset_rendering_engine(
            Box::new(FakeRenderingEngine::new(&pixels)),
            Some(RenderingDef::new(4)),
        )
        .unwrap_err();
    assert!(matches!(err, ProxyError::InvalidArgument(_)));
    assert!(!h.fake.is_closed());
}

#[test]
fn replace_engine_pushes_local_state() {
    let pixels = fixtures::pixels();
    let fake = FakeRenderingEngine::new(&pixels).with_pyramid(3, (128, 128));
    let mut h = Harness::with_engine(
        fake,
        init_for(&pixels).with_compression(CompressionLevel::Medium),
    );
    assert!(h.proxy.set_rgba(2, YELLOW).is_applied());
    assert!(h.proxy.set_active(1, false).is_applied());
    assert!(h.proxy.set_default_z(6).is_applied());
    h.proxy.set_selected_resolution_level(2).unwrap();
    h.fake.fail_on(Call::SetModel, lost());
    assert!(h.proxy.set_model(GREYSCALE_MODEL).drifted());
    assert!(h.proxy.has_drifted());

    let fresh = FakeRenderingEngine::new(&pixels).with_pyramid(3, (128, 128));
    h.proxy.replace_engine(Box::new(fresh.clone())).unwrap();

    assert!(!h.fake.is_closed());
    assert!(!h.proxy.has_drifted());
    let pushed = fresh.settings();
    assert!(pushed.is_same_settings(&h.proxy.settings_copy(), true));
    assert_eq!(pushed.color_model, GREYSCALE_MODEL);
    assert_eq!(fresh.quality(), 0.85);
    assert_eq!(fresh.level(), 2);
}

#[test]
fn partial_replacement_marks_drift() {
    let pixels = fixtures::pixels();
    let mut h = Harness::uncompressed();
    let fresh = FakeRenderingEngine::new(&pixels);
    fresh.fail_on(Call::SetRgba, EngineError::service("denied"));

    assert!(h.proxy.replace_engine(Box::new(fresh.clone())).is_err());
    assert!(h.proxy.has_drifted());

    let unreachable = FakeRenderingEngine::new(&pixels);
    unreachable.fail_everything(lost());
    h.proxy.replace_engine(Box::new(unreachable)).unwrap();
    assert!(h.proxy.has_drifted());
    assert!(!fresh.is_closed());
}

#[test]
fn shut_down_closes_and_releases() {
    let mut h = Harness::uncompressed();
    h.proxy.render(&PlaneDef::xy(0, 0)).unwrap();
    h.proxy.shut_down();
    assert!(h.fake.is_closed());
    assert_eq!(h.cache.slot_count(), 0);
}

// ── Configuration ──────────────────────────────────────────────────────

#[test]
fn stored_config_drives_compression_and_budget() {
    let stored = ProxyConfig {
        cache_budget_bytes: 1024,
        default_compression: CompressionLevel::Low,
        low_quality: 0.3,
        ..ProxyConfig::default()
    };
    let store = InMemoryConfigStore::with_proxy_config(&stored).unwrap();
    let config = ConfigService::new(store).load_proxy_config().unwrap();

    let pixels = fixtures::pixels();
    let h = Harness::with_engine(
        FakeRenderingEngine::new(&pixels),
        init_for(&pixels).with_config(config),
    );
    assert_eq!(h.proxy.compression_level(), CompressionLevel::Low);
    assert_eq!(h.fake.quality(), 0.3);
    assert_eq!(h.proxy.cache_size(), 1024);
}

#[test]
fn explicit_compression_overrides_config() {
    let pixels = fixtures::pixels();
    let config = ProxyConfig {
        default_compression: CompressionLevel::Low,
        ..ProxyConfig::default()
    };
    let h = Harness::with_engine(
        FakeRenderingEngine::new(&pixels),
        init_for(&pixels)
            .with_config(config)
            .with_compression(CompressionLevel::Uncompressed),
    );
    assert!(!h.proxy.is_compressed());
    assert_eq!(h.fake.quality(), 1.0);
}

#[test]
fn unreadable_config_is_reported() {
    let store = InMemoryConfigStore::with_raw_proxy_config(b"not json");
    let service = ConfigService::new(store);
    assert!(matches!(
        service.load_proxy_config(),
        Err(rnd_config::ConfigError::Serde(_))
    ));
}

#[test]
fn missing_config_uses_defaults() {
    let service = ConfigService::new(InMemoryConfigStore::new());
    assert_eq!(service.load_proxy_config().unwrap(), ProxyConfig::default());
}
