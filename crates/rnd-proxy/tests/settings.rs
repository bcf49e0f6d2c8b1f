// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::float_cmp)]
//! Setter outcomes, drift tracking and the settings workflows.

mod common;

use common::Harness;
use proptest::prelude::*;
use rnd_dry_tests::{fixtures, Call};
use rnd_engine::{ConnectivityKind, EngineError};
use rnd_model::{RenderingDef, Rgba, GREYSCALE_MODEL, RGB_MODEL};
use rnd_proxy::{Mutation, ProxyError};

const YELLOW: Rgba = Rgba::new(255, 255, 0, 255);
const RED: Rgba = Rgba::new(255, 0, 0, 255);

fn lost() -> EngineError {
    EngineError::Connectivity(ConnectivityKind::Lost)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn active_flag_round_trips(w in 0usize..3, active in any::<bool>()) {
        let mut h = Harness::uncompressed();
        prop_assert_eq!(h.proxy.set_active(w, active), Mutation::Applied);
        prop_assert_eq!(h.proxy.is_active(w), active);
        prop_assert_eq!(h.fake.settings().channel(w).unwrap().active, active);
    }

    #[test]
    fn default_z_is_clamped(z in 0u32..64) {
        let mut h = Harness::uncompressed();
        prop_assert!(h.proxy.set_default_z(z).is_applied());
        let expected = z.min(9);
        prop_assert_eq!(h.proxy.default_z(), expected);
        prop_assert_eq!(h.fake.settings().default_z, expected);
    }
}

#[test]
fn construction_mirrors_engine_settings() {
    let h = Harness::uncompressed();
    assert!(h.proxy.is_same_settings(&h.fake.settings(), true));
    assert_eq!(h.proxy.model(), RGB_MODEL);
    assert_eq!(h.proxy.active_channels(), vec![0, 1, 2]);
    assert_eq!(h.proxy.pixels_type_upper_bound(0), 255.0);
    assert!(!h.proxy.has_drifted());
}

#[test]
fn setters_push_to_engine() {
    let mut h = Harness::uncompressed();
    assert_eq!(h.proxy.set_model(GREYSCALE_MODEL), Mutation::Applied);
    assert_eq!(h.proxy.set_codomain_interval(5, 250), Mutation::Applied);
    assert_eq!(h.proxy.set_channel_window(1, 20.0, 180.0), Mutation::Applied);
    assert_eq!(h.proxy.set_rgba(2, YELLOW), Mutation::Applied);
    assert_eq!(
        h.proxy.set_quantization_map(0, "exponential", 1.8, true),
        Mutation::Applied
    );
    assert_eq!(h.proxy.set_default_t(3), Mutation::Applied);

    let engine = h.fake.settings();
    assert_eq!(engine.color_model, GREYSCALE_MODEL);
    assert_eq!((engine.cd_start, engine.cd_end), (5, 250));
    assert_eq!(engine.channel(1).unwrap().window(), (20.0, 180.0));
    assert_eq!(engine.channel(2).unwrap().rgba, YELLOW);
    assert_eq!(engine.channel(0).unwrap().family, "exponential");
    assert!(engine.channel(0).unwrap().noise_reduction);
    assert!(h.proxy.is_same_settings(&engine, true));
    assert_eq!(h.proxy.channel_curve_coefficient(0), 1.8);
}

#[test]
fn invalid_values_are_rejected_without_engine_calls() {
    let mut h = Harness::uncompressed();
    h.fake.reset_counts();

    assert!(matches!(
        h.proxy.set_quantum_strategy(8),
        Mutation::Rejected(ProxyError::InvalidArgument(_))
    ));
    assert!(matches!(h.proxy.set_model("hsv"), Mutation::Rejected(_)));
    assert!(matches!(
        h.proxy.set_quantization_map(0, "cubic", 1.0, false),
        Mutation::Rejected(_)
    ));
    assert!(matches!(h.proxy.set_rgba(3, YELLOW), Mutation::Rejected(_)));
    assert!(matches!(h.proxy.set_active(7, true), Mutation::Rejected(_)));
    assert!(matches!(
        h.proxy.set_channel_window(9, 0.0, 1.0),
        Mutation::Rejected(_)
    ));

    assert_eq!(h.fake.total_calls(), 0);
    assert_eq!(h.proxy.bit_resolution(), 255);
    assert_eq!(h.proxy.model(), RGB_MODEL);
    assert!(!h.proxy.has_drifted());
}

#[test]
fn quantum_strategy_accepts_engine_values() {
    let mut h = Harness::uncompressed();
    assert_eq!(h.proxy.set_quantum_strategy(127), Mutation::Applied);
    assert_eq!(h.proxy.bit_resolution(), 127);
    assert_eq!(h.fake.settings().bit_resolution, 127);
}

#[test]
fn remote_error_still_advances_the_mirror() {
    let mut h = Harness::uncompressed();
    h.fake.fail_on(Call::SetRgba, EngineError::service("denied"));

    let outcome = h.proxy.set_rgba(0, YELLOW);
    assert!(outcome.drifted());
    assert_eq!(
        outcome.into_result(),
        Err(ProxyError::Service {
            context: "cannot set the channel color".into(),
            message: "denied".into(),
        })
    );
    assert_eq!(h.proxy.rgba(0), YELLOW);
    assert_eq!(h.fake.settings().channel(0).unwrap().rgba, RED);
    assert!(h.proxy.has_drifted());

    h.fake.clear_failures();
    h.proxy.reset_defaults().unwrap();
    assert!(!h.proxy.has_drifted());
    assert_eq!(h.proxy.rgba(0), RED);
}

#[test]
fn connection_loss_applies_locally() {
    let mut h = Harness::uncompressed();
    h.fake.fail_everything(lost());

    assert_eq!(h.proxy.set_active(1, false), Mutation::AppliedLocally);
    assert!(!h.proxy.is_active(1));
    assert!(h.fake.settings().channel(1).unwrap().active);
    assert!(h.proxy.has_drifted());
}

#[test]
fn dead_session_skips_the_engine() {
    let mut h = Harness::uncompressed();
    h.session.set_alive(false);
    h.fake.reset_counts();

    assert_eq!(h.proxy.set_codomain_interval(1, 2), Mutation::AppliedLocally);
    assert_eq!(h.proxy.codomain_start(), 1);
    assert_eq!(h.fake.total_calls(), 0);
    assert!(h.proxy.has_drifted());
}

#[test]
fn default_plane_is_clamped() {
    let mut h = Harness::uncompressed();
    assert!(h.proxy.set_default_t(40).is_applied());
    assert_eq!(h.proxy.default_t(), 4);
    assert_eq!(h.fake.settings().default_t, 4);
}

#[test]
fn reset_settings_applies_every_field() {
    let mut h = Harness::uncompressed();
    let mut def = h.proxy.settings_copy();
    def.color_model = GREYSCALE_MODEL.to_owned();
    def.default_z = 6;
    def.default_t = 2;
    def.cd_start = 10;
    def.bit_resolution = 63;
    if let Some(c) = def.channel_mut(1) {
        c.rgba = YELLOW;
        c.input_start = 42.0;
        c.active = false;
        c.family = "logarithmic".into();
    }

    h.proxy.reset_settings(&def).unwrap();
    assert!(h.proxy.is_same_settings(&def, true));
    assert!(h.fake.settings().is_same_settings(&def, true));
    assert!(!h.proxy.is_active(1));
    assert_eq!(h.proxy.rgba(1), YELLOW);
}

#[test]
fn reset_settings_checks_channel_count() {
    let mut h = Harness::uncompressed();
    h.fake.reset_counts();
    let err = h.proxy.reset_settings(&RenderingDef::new(2)).unwrap_err();
    assert!(matches!(err, ProxyError::InvalidArgument(_)));
    assert_eq!(h.fake.total_calls(), 0);
}

#[test]
fn reset_settings_stops_at_first_error() {
    let mut h = Harness::uncompressed();
    h.fake.fail_on(Call::SetModel, EngineError::service("nope"));
    let mut def = h.proxy.settings_copy();
    def.color_model = GREYSCALE_MODEL.to_owned();
    def.cd_end = 100;

    assert!(matches!(
        h.proxy.reset_settings(&def),
        Err(ProxyError::Service { .. })
    ));
    assert_eq!(h.fake.calls(Call::SetCodomainInterval), 0);
}

#[test]
fn copy_rendering_settings_maps_channels() {
    let mut h = Harness::uncompressed();
    let mut source = h.proxy.settings_copy();
    source.default_t = 4;
    source.cd_end = 128;
    if let Some(c) = source.channel_mut(2) {
        c.rgba = YELLOW;
        c.input_end = 99.0;
    }

    h.proxy.copy_rendering_settings(&source, &[2, 0]).unwrap();
    assert_eq!(h.proxy.rgba(0), YELLOW);
    assert_eq!(h.proxy.channel_window_end(0), 99.0);
    assert_eq!(h.proxy.rgba(1), RED);
    assert_eq!(h.proxy.rgba(2), Rgba::new(0, 0, 255, 255));
    assert_eq!(h.proxy.default_t(), 4);
    assert_eq!(h.proxy.codomain_end(), 128);
}

#[test]
fn copy_rendering_settings_skips_missing_timepoint() {
    let mut h = Harness::uncompressed();
    let mut source = h.proxy.settings_copy();
    source.default_t = 7;
    h.fake.reset_counts();

    h.proxy.copy_rendering_settings(&source, &[]).unwrap();
    assert_eq!(h.proxy.default_t(), 0);
    assert_eq!(h.fake.calls(Call::SetDefaultT), 0);
}

#[test]
fn original_settings_span_global_range() {
    let mut h = Harness::uncompressed();
    assert!(h.proxy.set_model(GREYSCALE_MODEL).is_applied());
    assert!(h
        .proxy
        .set_quantization_map(0, "polynomial", 2.0, true)
        .is_applied());
    assert!(h.proxy.set_channel_window(2, 1.0, 2.0).is_applied());

    h.proxy.set_original_rnd_settings().unwrap();
    assert_eq!(h.proxy.model(), RGB_MODEL);
    for w in 0..3 {
        assert_eq!(h.proxy.channel_window_start(w), 10.0);
        assert_eq!(h.proxy.channel_window_end(w), 200.0);
        assert!(!h.proxy.channel_noise_reduction(w));
    }
    assert!(h.proxy.is_same_settings(&h.fake.settings(), true));
}

#[test]
fn original_settings_keep_single_channel_model() {
    let pixels = fixtures::single_channel_pixels();
    let mut h = Harness::new(&pixels, rnd_model::CompressionLevel::Uncompressed);
    h.proxy.set_original_rnd_settings().unwrap();
    assert_eq!(h.proxy.model(), GREYSCALE_MODEL);
    assert_eq!(h.fake.calls(Call::SetModel), 0);
}

#[test]
fn save_returns_a_copy() {
    let mut h = Harness::uncompressed();
    assert!(h.proxy.set_rgba(1, YELLOW).is_applied());
    let saved = h.proxy.save_current_settings().unwrap().unwrap();
    assert!(h.proxy.is_same_settings(&saved, true));
    assert_eq!(h.fake.saved().len(), 1);
    assert!(h.proxy.previous_rendering_settings().is_empty());

    h.fake.fail_on(Call::SaveCurrentSettings, lost());
    assert_eq!(h.proxy.save_current_settings(), Ok(None));
}

#[test]
fn colour_queries() {
    let mut h = Harness::uncompressed();
    assert!(h.proxy.is_channel_red(0));
    assert!(h.proxy.is_channel_green(1));
    assert!(h.proxy.is_channel_blue(2));
    assert!(!h.proxy.is_channel_red(9));
    assert!(h.proxy.is_mapped_image_rgb(None));

    assert!(h.proxy.set_active(2, false).is_applied());
    assert!(!h.proxy.has_active_channel_blue());
    assert!(h.proxy.has_active_channel_red());

    assert!(h.proxy.set_rgba(1, RED).is_applied());
    assert!(!h.proxy.is_mapped_image_rgb(None));
    assert!(h.proxy.is_mapped_image_rgb(Some(&[0, 2])));
    assert!(!h.proxy.is_mapped_image_rgb(Some(&[])));
}

#[test]
fn out_of_range_channels_read_as_neutral() {
    let h = Harness::uncompressed();
    assert!(!h.proxy.is_active(5));
    assert_eq!(h.proxy.rgba(5), Rgba::BLACK);
    assert_eq!(h.proxy.channel_family(5), "");
    assert_eq!(h.proxy.channel_curve_coefficient(5), 1.0);
}
