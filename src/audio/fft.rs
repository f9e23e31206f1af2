//! Radix-2 Cooley-Tukey FFT over one real-valued window.

use num_complex::Complex;

use super::window::WindowTables;
use crate::error::{AnalysisError, Result};

/// FFT bound to the tables of one window size. Cheap to create and `Sync`,
/// so a single kernel can serve every worker thread.
#[derive(Clone, Copy, Debug)]
pub struct FftKernel<'a> {
    tables: &'a WindowTables,
}

impl<'a> FftKernel<'a> {
    pub fn new(tables: &'a WindowTables) -> Self {
        Self { tables }
    }

    pub fn size(&self) -> usize {
        self.tables.size()
    }

    /// Windows `samples` in place and returns the complex spectrum.
    pub fn transform(&self, samples: &mut [f32]) -> Result<Vec<Complex<f32>>> {
        let n = self.tables.size();
        if samples.len() != n {
            return Err(AnalysisError::LengthMismatch {
                expected: n,
                actual: samples.len(),
            });
        }

        for (s, w) in samples.iter_mut().zip(self.tables.window()) {
            *s *= w;
        }

        let mut spectrum: Vec<Complex<f32>> = self
            .tables
            .permutation()
            .iter()
            .map(|&src| Complex::new(samples[src], 0.0))
            .collect();

        // Stages must run in increasing size order
        let twiddles = self.tables.twiddles();
        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;
            for j in (0..n).step_by(size) {
                for k in 0..half {
                    let w = twiddles[k * stride];
                    let t = w * spectrum[j + k + half];
                    let u = spectrum[j + k];
                    spectrum[j + k] = u + t;
                    spectrum[j + k + half] = u - t;
                }
            }
            size *= 2;
        }

        Ok(spectrum)
    }

    /// Windows `samples` in place and writes one magnitude per bin to `out`.
    pub fn magnitudes(&self, samples: &mut [f32], out: &mut [f32]) -> Result<()> {
        if out.len() != self.tables.size() {
            return Err(AnalysisError::LengthMismatch {
                expected: self.tables.size(),
                actual: out.len(),
            });
        }

        let spectrum = self.transform(samples)?;
        for (o, c) in out.iter_mut().zip(spectrum) {
            *o = c.norm();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::window::WindowFunction;
    use std::f32::consts::PI;

    fn magnitudes(samples: &[f32], function: WindowFunction) -> Vec<f32> {
        let tables = WindowTables::new(samples.len(), function).unwrap();
        let kernel = FftKernel::new(&tables);
        let mut buf = samples.to_vec();
        let mut out = vec![0.0; samples.len()];
        kernel.magnitudes(&mut buf, &mut out).unwrap();
        out
    }

    #[test]
    fn constant_block_concentrates_in_dc() {
        let out = magnitudes(&[1.0; 8], WindowFunction::Rectangular);
        assert!((out[0] - 8.0).abs() < 1e-5);
        for &m in &out[1..] {
            assert!(m.abs() < 1e-5);
        }
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        for function in [WindowFunction::Rectangular, WindowFunction::BlackmanHarris] {
            let mut impulse = vec![0.0; 256];
            impulse[0] = 1.0;
            let out = magnitudes(&impulse, function);
            for &m in &out {
                assert!((m - out[0]).abs() < 1e-5, "{:?}", function);
            }
        }
    }

    #[test]
    fn sinusoid_peaks_at_its_bin() {
        let n = 1024;
        let k = 37;
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        let out = magnitudes(&signal, WindowFunction::Rectangular);

        assert!((out[k] - n as f32 / 2.0).abs() < 0.1);
        assert!((out[n - k] - n as f32 / 2.0).abs() < 0.1);
        for (bin, &m) in out.iter().enumerate() {
            if bin != k && bin != n - k {
                assert!(m < 0.1, "bin {} leaked {}", bin, m);
            }
        }
    }

    #[test]
    fn matches_rustfft() {
        use rustfft::FftPlanner;

        let n = 4096;
        let signal: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f32 / 44100.0;
                (2.0 * PI * 440.0 * t).sin() * 0.6 + (2.0 * PI * 3100.0 * t).cos() * 0.3
            })
            .collect();

        let tables = WindowTables::new(n, WindowFunction::BlackmanHarris).unwrap();
        let mut windowed = signal.clone();
        let ours = FftKernel::new(&tables).transform(&mut windowed).unwrap();

        // rustfft shares the num-complex type, so results compare directly
        let mut reference: Vec<Complex<f32>> = windowed.iter().map(|&s| Complex::new(s, 0.0)).collect();
        FftPlanner::<f32>::new().plan_fft_forward(n).process(&mut reference);

        let tolerance = 1e-4 * n as f32;
        for (a, b) in ours.iter().zip(&reference) {
            assert!((a - b).norm() < tolerance, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let tables = WindowTables::new(8, WindowFunction::Rectangular).unwrap();
        let kernel = FftKernel::new(&tables);
        let mut out = vec![0.0; 8];
        assert_eq!(
            kernel.magnitudes(&mut [0.0; 4], &mut out).unwrap_err(),
            AnalysisError::LengthMismatch {
                expected: 8,
                actual: 4
            }
        );
    }
}
