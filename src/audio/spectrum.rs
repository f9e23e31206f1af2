use rayon::prelude::*;
use serde::Serialize;

use super::decode::Waveform;
use super::fft::FftKernel;
use super::window::{WindowFunction, WindowTables};
use super::window_count;
use crate::error::{AnalysisError, Result};

/// Magnitude spectra of consecutive, non-overlapping windows.
/// `rows[w][k]` is the magnitude of bin `k` in window `w`.
#[derive(Clone, Debug, Serialize)]
pub struct SpectrumMatrix {
    window_size: usize,
    rows: Vec<Vec<f32>>,
}

impl SpectrumMatrix {
    /// Builds a matrix from precomputed rows, which must all have the same
    /// power-of-two length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let window_size = rows.first().map(Vec::len).ok_or(AnalysisError::EmptyWaveform)?;
        if window_size == 0 || !window_size.is_power_of_two() {
            return Err(AnalysisError::NotPowerOfTwo(window_size));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != window_size) {
            return Err(AnalysisError::LengthMismatch {
                expected: window_size,
                actual: bad.len(),
            });
        }
        Ok(Self { window_size, rows })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Magnitude of `bin` in every window, in window order.
    pub fn bin_track(&self, bin: usize) -> impl Iterator<Item = f32> + '_ {
        self.rows.iter().map(move |row| row[bin])
    }
}

/// Blackman-Harris windowed magnitude spectrum of every whole window.
pub fn compute_spectrum(waveform: &Waveform, window_size: usize) -> Result<SpectrumMatrix> {
    let tables = WindowTables::new(window_size, WindowFunction::BlackmanHarris)?;
    compute_spectrum_with(waveform, &tables)
}

/// Same as [`compute_spectrum`] with caller-provided (cached) tables.
pub fn compute_spectrum_with(waveform: &Waveform, tables: &WindowTables) -> Result<SpectrumMatrix> {
    let window_size = tables.size();
    let samples = waveform.samples();
    let windows = window_count(samples.len(), window_size)?;
    let kernel = FftKernel::new(tables);

    log::debug!(
        "FFT over {} windows of {} samples ({:?})",
        windows,
        window_size,
        tables.function()
    );

    // Each window owns its scratch and output row
    let rows = samples[..windows * window_size]
        .par_chunks_exact(window_size)
        .map(|chunk| {
            let mut block = chunk.to_vec();
            let mut row = vec![0.0f32; window_size];
            kernel.magnitudes(&mut block, &mut row)?;
            Ok(row)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SpectrumMatrix { window_size, rows })
}

/// Mean absolute amplitude of the raw samples of every whole window.
pub fn compute_intensities(waveform: &Waveform, window_size: usize) -> Result<Vec<f32>> {
    let samples = waveform.samples();
    let windows = window_count(samples.len(), window_size)?;

    Ok(samples[..windows * window_size]
        .par_chunks_exact(window_size)
        .map(|chunk| chunk.iter().map(|s| s.abs()).sum::<f32>() / window_size as f32)
        .collect())
}
