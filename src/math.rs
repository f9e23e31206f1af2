//! Scalar interpolation helpers shared by the track and marker code.

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `v` between `a` and `b`, clamped to `[0, 1]`.
/// A degenerate range (`a == b`) yields 0.
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

/// Remaps `values` from their own min/max range into `[out_min, out_max]`.
///
/// When every value is equal the input range is degenerate and each output is
/// `degenerate` instead.
pub fn remap(values: &[f32], out_min: f32, out_max: f32, degenerate: f32) -> Vec<f32> {
    let in_min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let in_max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if !(in_max > in_min) {
        return vec![degenerate; values.len()];
    }

    values
        .iter()
        .map(|&v| lerp(out_min, out_max, inverse_lerp(in_min, in_max, v)))
        .collect()
}
