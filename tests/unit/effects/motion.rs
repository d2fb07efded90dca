use super::*;
use crate::config::model::GenerationConfigDef;
use crate::effects::composite::mean_abs_diff;
use crate::foundation::core::Canvas;

fn config_with(f: impl FnOnce(&mut GenerationConfigDef)) -> Arc<GenerationConfig> {
    let mut def = GenerationConfigDef {
        output_resolution: Canvas {
            width: 48,
            height: 36,
        },
        ..GenerationConfigDef::default()
    };
    f(&mut def);
    Arc::new(GenerationConfig::new(def).unwrap())
}

fn gradient() -> Frame {
    let mut f = Frame::filled(
        Canvas {
            width: 48,
            height: 36,
        },
        [0, 0, 0],
    );
    for y in 0..36 {
        for x in 0..48 {
            f.put_pixel(x, y, [(x * 5) as u8, (y * 7) as u8, ((x + y) * 3) as u8]);
        }
    }
    f
}

#[test]
fn micro_movement_is_deterministic() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    let f = gradient();
    for i in [0u64, 1, 17, 79, 80] {
        let a = motion.apply_micro_movement(&f, i);
        let b = motion.apply_micro_movement(&f, i);
        assert_eq!(a, b);
        assert_eq!(a.shape(), f.shape());
    }
}

#[test]
fn micro_movement_depends_on_seed() {
    let a = MotionEffects::new(config_with(|d| d.seed = 1)).unwrap();
    let b = MotionEffects::new(config_with(|d| d.seed = 2)).unwrap();
    let f = gradient();
    assert_ne!(a.apply_micro_movement(&f, 3), b.apply_micro_movement(&f, 3));
}

#[test]
fn movement_changes_every_frame() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    for i in 0..30u64 {
        assert_ne!(motion.movement_at(i), motion.movement_at(i + 1));
    }
}

#[test]
fn movement_stays_within_amplitude() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    for i in 0..200u64 {
        let (offset, zoom) = motion.movement_at(i);
        assert!(offset.x.abs() <= 2.5 + 1e-9);
        assert!(offset.y.abs() <= 2.5 + 1e-9);
        assert!((1.0..=1.015 + 1e-9).contains(&zoom));
    }
}

#[test]
fn zero_amplitude_is_identity() {
    let motion = MotionEffects::new(config_with(|d| {
        d.jitter_amplitude_px = 0.0;
        d.zoom_amplitude = 0.0;
    }))
    .unwrap();
    let f = gradient();
    assert_eq!(motion.apply_micro_movement(&f, 12), f);
}

#[test]
fn pattern_break_schedule() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    assert_eq!(motion.should_apply_pattern_break(0), None);
    assert_eq!(motion.should_apply_pattern_break(1), None);
    assert_eq!(motion.should_apply_pattern_break(39), None);
    assert_eq!(motion.should_apply_pattern_break(40), Some(BreakKind::Minor));
    assert_eq!(motion.should_apply_pattern_break(80), Some(BreakKind::Major));
    assert_eq!(motion.should_apply_pattern_break(120), Some(BreakKind::Minor));
    assert_eq!(motion.should_apply_pattern_break(160), Some(BreakKind::Major));
}

#[test]
fn major_wins_when_intervals_coincide() {
    let motion = MotionEffects::new(config_with(|d| {
        d.minor_break_interval = 30;
        d.major_break_interval = 45;
    }))
    .unwrap();
    assert_eq!(motion.should_apply_pattern_break(30), Some(BreakKind::Minor));
    assert_eq!(motion.should_apply_pattern_break(45), Some(BreakKind::Major));
    assert_eq!(motion.should_apply_pattern_break(90), Some(BreakKind::Major));
}

#[test]
fn major_break_is_more_disruptive_than_minor() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    for base in [
        gradient(),
        Frame::filled(
            Canvas {
                width: 48,
                height: 36,
            },
            [90, 90, 90],
        ),
    ] {
        let mut minor = base.clone();
        motion.apply_pattern_break(&mut minor, BreakKind::Minor, 40);
        let mut major = base.clone();
        motion.apply_pattern_break(&mut major, BreakKind::Major, 80);

        let d_minor = mean_abs_diff(&base, &minor).unwrap();
        let d_major = mean_abs_diff(&base, &major).unwrap();
        assert!(d_minor > 0.0);
        assert!(d_major > d_minor, "major {d_major} <= minor {d_minor}");
        assert_eq!(major.shape(), base.shape());
    }
}

#[test]
fn glitch_moves_pixels_within_rows() {
    let motion = MotionEffects::new(config_with(|_| {})).unwrap();
    let base = gradient();
    let mut f = base.clone();
    motion.glitch_slices(&mut f, 80);
    assert_ne!(f, base);
    // Row 3 sits in the first displaced band.
    let row = 3 * 48 * 3..4 * 48 * 3;
    assert_ne!(base.data[row.clone()], f.data[row.clone()]);
    let mut row_a: Vec<u8> = base.data[row.clone()].to_vec();
    let mut row_b: Vec<u8> = f.data[row].to_vec();
    row_a.sort_unstable();
    row_b.sort_unstable();
    assert_eq!(row_a, row_b);
}
