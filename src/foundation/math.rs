/// Deterministic SplitMix64 generator.
///
/// Every stochastic value in a run derives from one of these, seeded from the configured seed
/// and a per-use salt, so a fixed seed always reproduces the same frames.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f64_01(&mut self) -> f64 {
        // 53 bits of precision.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

/// Hash-style lattice noise in `[0, 1)`.
pub(crate) fn noise01(seed: u64, x: u64) -> f64 {
    let mut rng = Rng64::new(seed ^ x.wrapping_mul(0xD6E8_FEB8_6659_FD93));
    rng.next_f64_01()
}

/// Smoothly interpolated value noise in `[-1, 1]`.
pub(crate) fn value_noise(seed: u64, x: f64) -> f64 {
    let x = x.max(0.0);
    let i0 = x.floor();
    let t = x - i0;
    let i0u = i0 as u64;

    let a = noise01(seed, i0u) * 2.0 - 1.0;
    let b = noise01(seed, i0u + 1) * 2.0 - 1.0;
    let s = t * t * (3.0 - 2.0 * t);
    a + (b - a) * s
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Blend `src` over `dst` with an 8-bit coverage value.
pub(crate) fn blend_u8(dst: u8, src: u8, coverage: u8) -> u8 {
    let a = u16::from(coverage);
    let inv = 255 - a;
    let v = mul_div255_u16(u16::from(src), a) + mul_div255_u16(u16::from(dst), inv);
    v.min(255) as u8
}

/// Rec.601 luma in `[0, 255]` using integer weights.
pub(crate) fn luma601(px: [u8; 3]) -> i32 {
    (299 * i32::from(px[0]) + 587 * i32::from(px[1]) + 114 * i32::from(px[2]) + 500) / 1000
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
