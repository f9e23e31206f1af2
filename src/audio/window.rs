//! Per-window-size lookup tables: analysis window, bit-reversal permutation
//! and FFT twiddle factors. All of them depend only on the window size, so
//! they are built once and shared read-only by every window and thread.

use serde::{Deserialize, Serialize};
use num_complex::Complex;
use std::f32::consts::PI;

use crate::error::{AnalysisError, Result};

/// Analysis window applied to each block before the FFT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    #[default]
    BlackmanHarris,
    /// All ones, i.e. no windowing.
    Rectangular,
}

impl WindowFunction {
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        match self {
            WindowFunction::BlackmanHarris => blackman_harris(size),
            WindowFunction::Rectangular => vec![1.0; size],
        }
    }
}

/// Reverses the `log2(size)` low bits of every index in `[0, size)`.
///
/// `size` must be a power of two.
pub fn bit_reversal_permutation(size: usize) -> Vec<usize> {
    let bits = size.trailing_zeros();
    (0..size)
        .map(|i| {
            let mut reversed = 0;
            for j in 0..bits {
                reversed = (reversed << 1) | ((i >> j) & 1);
            }
            reversed
        })
        .collect()
}

/// Three-term Blackman-Harris window.
pub fn blackman_harris(size: usize) -> Vec<f32> {
    if size == 1 {
        return vec![1.0];
    }
    let denom = (size - 1) as f32;
    (0..size)
        .map(|n| {
            let n = n as f32;
            0.35875 - 0.48829 * (2.0 * PI * n / denom).cos() + 0.14128 * (4.0 * PI * n / denom).cos()
        })
        .collect()
}

/// `w_N^k = e^(-2πik/N)` for `k` in `[0, N/2)`.
fn twiddle_factors(size: usize) -> Vec<Complex<f32>> {
    (0..size / 2)
        .map(|k| {
            let angle = -2.0 * std::f64::consts::PI * k as f64 / size as f64;
            Complex::new(angle.cos() as f32, angle.sin() as f32)
        })
        .collect()
}

/// Precomputed tables for one window size.
#[derive(Clone, Debug)]
pub struct WindowTables {
    size: usize,
    function: WindowFunction,
    window: Vec<f32>,
    permutation: Vec<usize>,
    twiddles: Vec<Complex<f32>>,
}

impl WindowTables {
    pub fn new(size: usize, function: WindowFunction) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(AnalysisError::NotPowerOfTwo(size));
        }

        Ok(Self {
            size,
            function,
            window: function.coefficients(size),
            permutation: bit_reversal_permutation(size),
            twiddles: twiddle_factors(size),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn function(&self) -> WindowFunction {
        self.function
    }

    pub fn window(&self) -> &[f32] {
        &self.window
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    pub fn twiddles(&self) -> &[Complex<f32>] {
        &self.twiddles
    }
}
