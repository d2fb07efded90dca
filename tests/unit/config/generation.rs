use super::*;

fn def() -> GenerationConfigDef {
    GenerationConfigDef::default()
}

#[test]
fn defaults_derive_expected_counts() {
    let cfg = GenerationConfig::new(def()).unwrap();
    assert_eq!(cfg.total_frames(), 810);
    assert_eq!(cfg.base_frames(), 90);
    assert_eq!(cfg.tiles_needed(), 9);
    assert_eq!(cfg.caption_frames(), 75);
    assert_eq!(cfg, GenerationConfig::default());
}

#[test]
fn derived_counts_round_and_ceil() {
    for (target, base, fps) in [(1.0, 0.3, 10u32), (2.05, 0.7, 24), (5.0, 5.0, 30), (1.0, 0.5, 7)] {
        let cfg = GenerationConfig::new(GenerationConfigDef {
            target_duration: target,
            base_clip_duration: base,
            fps,
            ..def()
        })
        .unwrap();
        let total = (target * f64::from(fps)).round() as u64;
        let base_frames = (base * f64::from(fps)).round() as u64;
        assert_eq!(cfg.total_frames(), total);
        assert_eq!(cfg.base_frames(), base_frames);
        assert_eq!(
            cfg.tiles_needed(),
            (total as f64 / base_frames as f64).ceil() as u64
        );
    }
}

#[test]
fn rejects_non_positive_fields() {
    let bad = [
        GenerationConfigDef {
            fps: 0,
            ..def()
        },
        GenerationConfigDef {
            target_duration: 0.0,
            ..def()
        },
        GenerationConfigDef {
            base_clip_duration: -1.0,
            ..def()
        },
        GenerationConfigDef {
            caption_duration: f64::NAN,
            ..def()
        },
        GenerationConfigDef {
            minor_break_interval: 0,
            ..def()
        },
        GenerationConfigDef {
            major_break_interval: 0,
            ..def()
        },
        GenerationConfigDef {
            output_resolution: Canvas {
                width: 0,
                height: 10,
            },
            ..def()
        },
        GenerationConfigDef {
            neon_colors: Vec::new(),
            ..def()
        },
    ];
    for d in bad {
        assert!(
            matches!(GenerationConfig::new(d.clone()), Err(ReelError::Config(_))),
            "expected config error for {d:?}"
        );
    }
}

#[test]
fn rejects_base_clip_longer_than_target() {
    let err = GenerationConfig::new(GenerationConfigDef {
        target_duration: 2.0,
        base_clip_duration: 3.0,
        ..def()
    })
    .unwrap_err();
    assert!(err.to_string().contains("base_clip_duration"));
}

#[test]
fn rejects_durations_shorter_than_a_frame() {
    let err = GenerationConfig::new(GenerationConfigDef {
        fps: 10,
        target_duration: 1.0,
        base_clip_duration: 0.01,
        ..def()
    })
    .unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn rejects_tone_curve_that_would_not_darken() {
    assert!(
        GenerationConfig::new(GenerationConfigDef {
            dark_base_gamma: 1.0,
            ..def()
        })
        .is_err()
    );
    assert!(
        GenerationConfig::new(GenerationConfigDef {
            dark_base_ceiling: 1.0,
            ..def()
        })
        .is_err()
    );
}

#[test]
fn neon_color_cycles_by_index() {
    let cfg = GenerationConfig::default();
    let n = cfg.neon_colors().len() as u64;
    assert_eq!(cfg.neon_color_for(0), cfg.neon_colors()[0]);
    assert_eq!(cfg.neon_color_for(n + 1), cfg.neon_colors()[1]);
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let json = r#"{ "fps": 10, "target_duration": 1.0, "base_clip_duration": 0.5 }"#;
    let cfg = GenerationConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.fps(), 10);
    assert_eq!(cfg.total_frames(), 10);
    assert_eq!(cfg.base_frames(), 5);
    assert_eq!(cfg.seed(), 42);
    assert_eq!(
        cfg.canvas(),
        Canvas {
            width: 1080,
            height: 1920
        }
    );
}

#[test]
fn json_rejects_unknown_fields() {
    let err = GenerationConfig::from_reader(r#"{ "fsp": 10 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn from_path_reports_missing_file() {
    let err = GenerationConfig::from_path("does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("does/not/exist.json"));
}

#[test]
fn caption_font_settings_pass_through() {
    let cfg = GenerationConfig::default();
    assert_eq!(cfg.caption_font(), None);
    assert!((cfg.caption_font_px() - cfg.canvas().width as f32 / 18.0).abs() < 1e-3);

    let cfg = GenerationConfig::new(GenerationConfigDef {
        caption_font: Some(PathBuf::from("fonts/caption.ttf")),
        caption_font_px: Some(31.5),
        ..def()
    })
    .unwrap();
    assert_eq!(cfg.caption_font(), Some(Path::new("fonts/caption.ttf")));
    assert_eq!(cfg.caption_font_px(), 31.5);

    for px in [0.0, -4.0, f32::NAN] {
        let err = GenerationConfig::new(GenerationConfigDef {
            caption_font_px: Some(px),
            ..def()
        })
        .unwrap_err();
        assert!(err.to_string().contains("caption_font_px"), "{err}");
    }
}
