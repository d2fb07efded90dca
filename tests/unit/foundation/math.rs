use super::*;

#[test]
fn rng_is_deterministic_per_seed() {
    let mut a = Rng64::new(42);
    let mut b = Rng64::new(42);
    let mut c = Rng64::new(43);
    let va: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
    let vb: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
    let vc: Vec<u64> = (0..4).map(|_| c.next_u64()).collect();
    assert_eq!(va, vb);
    assert_ne!(va, vc);
}

#[test]
fn value_noise_is_bounded_and_continuous() {
    let mut prev = value_noise(7, 0.0);
    for i in 1..200 {
        let x = i as f64 * 0.05;
        let v = value_noise(7, x);
        assert!((-1.0..=1.0).contains(&v));
        assert!((v - prev).abs() < 0.5);
        prev = v;
    }
}

#[test]
fn value_noise_hits_lattice_values() {
    let v = value_noise(3, 5.0);
    assert_eq!(v, noise01(3, 5) * 2.0 - 1.0);
}

#[test]
fn blend_extremes() {
    assert_eq!(blend_u8(10, 200, 0), 10);
    assert_eq!(blend_u8(10, 200, 255), 200);
    let mid = blend_u8(0, 255, 128);
    assert!((127..=129).contains(&mid));
}

#[test]
fn luma_of_primaries() {
    assert_eq!(luma601([0, 0, 0]), 0);
    assert_eq!(luma601([255, 255, 255]), 255);
    assert!(luma601([0, 255, 0]) > luma601([255, 0, 0]));
}
