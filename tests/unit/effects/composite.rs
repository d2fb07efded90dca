use super::*;
use crate::foundation::core::Canvas;

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

#[test]
fn fill_rect_is_clipped_to_frame() {
    let mut f = Frame::filled(canvas(4, 4), [0, 0, 0]);
    fill_rect(&mut f, Rect::new(2.0, 2.0, 10.0, 10.0), [255, 0, 0], 255);
    assert_eq!(f.pixel(1, 1), [0, 0, 0]);
    assert_eq!(f.pixel(2, 2), [255, 0, 0]);
    assert_eq!(f.pixel(3, 3), [255, 0, 0]);
}

#[test]
fn fill_rect_outside_frame_is_noop() {
    let mut f = Frame::filled(canvas(4, 4), [5, 5, 5]);
    let before = f.clone();
    fill_rect(&mut f, Rect::new(-10.0, -10.0, -1.0, -1.0), [255, 0, 0], 255);
    assert_eq!(f, before);
}

#[test]
fn lerp_toward_scales_with_t() {
    let base = Frame::filled(canvas(2, 2), [100, 100, 100]);
    let mut a = base.clone();
    let mut b = base.clone();
    lerp_toward_in_place(&mut a, [255, 255, 255], 0.25);
    lerp_toward_in_place(&mut b, [255, 255, 255], 0.75);
    assert!(mean_abs_diff(&base, &a).unwrap() < mean_abs_diff(&base, &b).unwrap());

    let mut c = base.clone();
    lerp_toward_in_place(&mut c, [255, 255, 255], 0.0);
    assert_eq!(c, base);
}

#[test]
fn mean_abs_diff_rejects_mismatched_frames() {
    let a = Frame::filled(canvas(2, 2), [0, 0, 0]);
    let b = Frame::filled(canvas(2, 3), [0, 0, 0]);
    assert!(matches!(mean_abs_diff(&a, &b), Err(ReelError::Shape(_))));
}

#[test]
fn ink_sums_channels() {
    let f = Frame::filled(canvas(2, 1), [1, 2, 3]);
    assert_eq!(ink(&f), 12);
}

#[test]
fn lighten_rect_only_raises_channels() {
    let mut f = Frame::filled(canvas(3, 1), [100, 10, 200]);
    lighten_rect(&mut f, Rect::new(1.0, 0.0, 3.0, 1.0), [50, 120, 255]);
    assert_eq!(f.pixel(0, 0), [100, 10, 200]);
    assert_eq!(f.pixel(1, 0), [100, 120, 255]);
    assert_eq!(f.pixel(2, 0), [100, 120, 255]);
}
