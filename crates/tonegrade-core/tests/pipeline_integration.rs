//! End-to-end tests through the public API: control events in, display pixels out.
//!
//! Run with: `cargo test -p tonegrade-core`

use tonegrade_core::grading::cdl::luma;
use tonegrade_core::{
    AdjustmentMode, CdlField, ControlEvent, GradeError, GradingImage, GradingPipeline,
    PipelineConfig, SharedPipeline, StageId, ToneMapOperator, evaluate_pixel, evaluate_transform,
    process_image,
};

const EPSILON: f32 = 1e-4;

fn pipeline(mode: AdjustmentMode) -> GradingPipeline {
    GradingPipeline::new(PipelineConfig {
        adjustment_mode: mode,
        ..PipelineConfig::default()
    })
    .unwrap()
}

/// Small gradient spanning shadows to highlights.
fn create_test_gradient(width: u32, height: u32) -> GradingImage {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = 4.0 * x as f32 / (width - 1) as f32;
            let g = y as f32 / (height - 1) as f32;
            pixels.push([r, g, 0.18, 1.0]);
        }
    }
    GradingImage::new(width, height, pixels).unwrap()
}

fn assert_close(actual: [f32; 3], expected: [f32; 3], what: &str) {
    for i in 0..3 {
        assert!(
            (actual[i] - expected[i]).abs() < EPSILON,
            "{what} channel {i}: {} vs {}",
            actual[i],
            expected[i]
        );
    }
}

#[test]
fn test_default_pipeline_agx_mid_gray() {
    let p = pipeline(AdjustmentMode::Nudge);
    let out = evaluate_transform([0.5; 3], &p.snapshot());
    assert_close(out, [0.683751, 0.683696, 0.683683], "agx mid gray");
}

#[test]
fn test_base_contrast_preset_is_noop() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    let before = p.snapshot();
    for stage in StageId::all() {
        p.apply_preset("Base Contrast", *stage).unwrap();
    }
    let after = p.snapshot();
    for rgb in [[0.0, 0.0, 0.0], [0.18, 0.18, 0.18], [2.0, 0.5, 0.1]] {
        assert_eq!(
            evaluate_transform(rgb, &before),
            evaluate_transform(rgb, &after),
            "input {rgb:?}"
        );
    }
}

#[test]
fn test_unknown_preset_leaves_state_unchanged() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    p.set_saturation(StageId::PostCdl, 0.5).unwrap();
    let before = p.snapshot();
    let err = p
        .handle(&ControlEvent::ApplyPreset {
            name: "Does Not Exist".into(),
            stage: None,
        })
        .unwrap_err();
    assert!(matches!(err, GradeError::UnknownPreset(_)));
    assert_eq!(p.snapshot(), before);
}

#[test]
fn test_wheel_commit_matches_preview() {
    for mode in [
        AdjustmentMode::Nudge,
        AdjustmentMode::MasterMultiply,
        AdjustmentMode::MasterAdd,
    ] {
        let mut p = pipeline(mode);
        p.set_channel(StageId::PreCdl, CdlField::Slope, [1.2, 0.9, 1.1])
            .unwrap();
        p.set_wheel(StageId::PreCdl, CdlField::Slope, 1.5).unwrap();
        let preview = p.snapshot();
        p.commit(StageId::PreCdl, CdlField::Slope).unwrap();
        let committed = p.snapshot();

        assert_close(
            committed.pre_cdl.slope,
            preview.pre_cdl.slope,
            &format!("{mode} slope"),
        );
        let control = p.cdl(StageId::PreCdl).slope;
        assert!(!control.has_pending_wheel(), "{mode}");
    }
}

#[test]
fn test_master_multiply_commit_folds_into_base() {
    let mut p = pipeline(AdjustmentMode::MasterMultiply);
    p.set_channel(StageId::PostCdl, CdlField::Slope, [1.0, 0.8, 0.6])
        .unwrap();
    let base_old = p.cdl(StageId::PostCdl).slope.base();
    p.set_wheel(StageId::PostCdl, CdlField::Slope, 1.25).unwrap();
    p.commit(StageId::PostCdl, CdlField::Slope).unwrap();
    let base_new = p.cdl(StageId::PostCdl).slope.base();
    assert_close(base_new, base_old.map(|v| v * 1.25), "folded base");
}

#[test]
fn test_offset_wheel_moves_offset_in_every_mode() {
    for mode in [
        AdjustmentMode::Nudge,
        AdjustmentMode::MasterMultiply,
        AdjustmentMode::MasterAdd,
    ] {
        let mut p = pipeline(mode);
        p.set_wheel(StageId::PostCdl, CdlField::Offset, 0.1).unwrap();
        p.commit(StageId::PostCdl, CdlField::Offset).unwrap();
        assert_close(p.snapshot().post_cdl.offset, [0.1; 3], &format!("{mode} offset"));
    }
}

#[test]
fn test_inverted_config_range_is_an_error() {
    let json = r#"{ "offset_range": { "min": 1.0, "max": -1.0 } }"#;
    assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    assert!(matches!(
        PipelineConfig::from_json(json),
        Err(GradeError::Config(_))
    ));
}

#[test]
fn test_every_operator_bounded() {
    let image = create_test_gradient(8, 8);
    for &operator in ToneMapOperator::all() {
        let mut p = pipeline(AdjustmentMode::Nudge);
        p.set_operator(operator);
        p.set_exposure(2.0).unwrap();
        let out = process_image(&image, &p.snapshot());
        for px in &out.pixels {
            for (i, v) in px.iter().enumerate() {
                assert!(
                    (-EPSILON..=1.0 + EPSILON).contains(v),
                    "{operator} channel {i} out of range: {v}"
                );
            }
        }
    }
}

#[test]
fn test_post_saturation_zero_is_gray() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    p.set_operator(ToneMapOperator::Linear);
    p.set_saturation(StageId::PostCdl, 0.0).unwrap();
    let snap = p.snapshot();

    let rgb = [0.6, 0.3, 0.1];
    let out = evaluate_transform(rgb, &snap);
    assert!((out[0] - out[1]).abs() < EPSILON && (out[1] - out[2]).abs() < EPSILON);

    // With every other stage identity, the gray level is the input luma.
    let linear = tonegrade_core::transform::evaluate::evaluate_linear(rgb, &snap);
    assert!((linear[0] - luma(rgb)).abs() < EPSILON, "{linear:?}");
}

#[test]
fn test_operator_switch_keeps_look() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    p.apply_preset("Golden", StageId::ToneMapLook).unwrap();
    let look = p.snapshot().look_cdl;
    p.set_operator(ToneMapOperator::Reinhard);
    p.set_operator(ToneMapOperator::AgX);
    assert_eq!(p.snapshot().look_cdl, look);
}

#[test]
fn test_control_events_from_json() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    let events = r#"[
        { "type": "SetOperator", "data": { "operator": "Neutral" } },
        { "type": "SetExposure", "data": { "stops": 1.0 } },
        { "type": "SetChannel", "data": { "stage": "pre-cdl", "field": "offset", "rgb": [0.01, 0.0, -0.01] } },
        { "type": "ApplyPreset", "data": { "name": "Punchy" } },
        { "type": "SetWheel", "data": { "stage": "post-cdl", "field": "power", "value": 0.2 } },
        { "type": "Commit", "data": { "stage": "post-cdl", "field": "power" } }
    ]"#;
    let events: Vec<ControlEvent> = serde_json::from_str(events).unwrap();
    for event in &events {
        p.handle(event).unwrap();
    }

    let snap = p.snapshot();
    assert_eq!(snap.tone_map.operator, ToneMapOperator::Neutral);
    assert_eq!(snap.tone_map.exposure, 1.0);
    assert_eq!(snap.pre_cdl.offset, [0.01, 0.0, -0.01]);
    // Presets without an explicit stage land on the look CDL.
    assert_eq!(snap.look_cdl.saturation, 1.4);
    assert_close(snap.post_cdl.power, [1.2; 3], "post power");
}

#[test]
fn test_reset_all_restores_default_output() {
    let mut p = pipeline(AdjustmentMode::Nudge);
    let reference = evaluate_transform([0.3, 0.2, 0.1], &p.snapshot());
    p.handle(&ControlEvent::SetOperator {
        operator: ToneMapOperator::Cineon,
    })
    .unwrap();
    p.apply_preset("Very High Contrast", StageId::PostCdl).unwrap();
    p.handle(&ControlEvent::ResetAll).unwrap();
    assert_eq!(evaluate_transform([0.3, 0.2, 0.1], &p.snapshot()), reference);
}

#[test]
fn test_shared_pipeline_frames_are_consistent() {
    let shared = SharedPipeline::default();
    let image = create_test_gradient(16, 4);

    std::thread::scope(|s| {
        let writer = shared.clone();
        s.spawn(move || {
            for i in 0..100 {
                let event = if i % 2 == 0 {
                    ControlEvent::SetSaturation {
                        stage: StageId::PostCdl,
                        value: (i % 7) as f32 * 0.3,
                    }
                } else {
                    ControlEvent::SetOperator {
                        operator: ToneMapOperator::all()[i % ToneMapOperator::all().len()],
                    }
                };
                writer.apply(&event).unwrap();
            }
        });

        for _ in 0..20 {
            let (frame, out) = shared.render_frame(&image);
            for (src, dst) in image.pixels.iter().zip(&out.pixels) {
                assert_eq!(*dst, evaluate_pixel(*src, &frame.params));
            }
        }
    });
    assert_eq!(shared.generation(), 100);
}

#[test]
fn test_display_output_quantizes() {
    let p = pipeline(AdjustmentMode::Nudge);
    let image = GradingImage::filled(2, 2, [0.5, 0.5, 0.5, 1.0]);
    let out = process_image(&image, &p.snapshot()).to_rgba8();
    // 0.68375 * 255 = 174.36
    assert_eq!(out.get_pixel(1, 1).0, [174, 174, 174, 255]);
}
