//! Rising-edge beat detection on a single spectrum bin.

use serde::{Deserialize, Serialize};

use super::spectrum::SpectrumMatrix;
use super::{MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
use crate::error::{AnalysisError, Result};

/// Detection settings for one frequency band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatBand {
    /// Monitored frequency, 20-20000 Hz.
    pub frequency_hz: f32,
    /// Minimum rise of the normalized magnitude between two windows.
    pub threshold: f32,
    /// Refractory time after a detection.
    #[serde(default)]
    pub skip_seconds: f32,
}

impl BeatBand {
    pub fn new(frequency_hz: f32, threshold: f32, skip_seconds: f32) -> Self {
        Self {
            frequency_hz,
            threshold,
            skip_seconds,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(AnalysisError::InvalidFrequency(self.frequency_hz));
        }
        if !self.threshold.is_finite() {
            return Err(AnalysisError::InvalidParameter {
                name: "threshold",
                value: self.threshold,
            });
        }
        if !self.skip_seconds.is_finite() || self.skip_seconds < 0.0 {
            return Err(AnalysisError::InvalidParameter {
                name: "skip_seconds",
                value: self.skip_seconds,
            });
        }
        Ok(())
    }
}

/// Spectrum bin monitored for `frequency_hz`, clamped to the last bin.
pub fn frequency_bin(window_size: usize, frequency_hz: f32) -> usize {
    let bin = (window_size as f32 / (MAX_FREQUENCY_HZ - MIN_FREQUENCY_HZ) * frequency_hz).round();
    (bin as usize).min(window_size.saturating_sub(1))
}

/// Number of windows skipped after a detection.
pub fn skip_windows(sample_rate: u32, channels: u16, skip_seconds: f32, window_size: usize) -> usize {
    (sample_rate as f32 * channels as f32 * skip_seconds / window_size as f32) as usize
}

/// Window indices where the band's normalized magnitude rises by at least
/// `band.threshold` into the next window. Indices are ascending and at least
/// `skip_windows` apart.
pub fn detect_beats(
    spectrum: &SpectrumMatrix,
    sample_rate: u32,
    channels: u16,
    band: &BeatBand,
) -> Result<Vec<usize>> {
    band.validate()?;

    let window_size = spectrum.window_size();
    let bin = frequency_bin(window_size, band.frequency_hz);

    let max = spectrum.bin_track(bin).fold(f32::NEG_INFINITY, f32::max);
    if !(max > 0.0) {
        log::debug!("Band {} Hz (bin {}) is silent, no beats", band.frequency_hz, bin);
        return Ok(Vec::new());
    }

    let rows = spectrum.rows();
    // Beyond the last window any skip behaves the same
    let skip = skip_windows(sample_rate, channels, band.skip_seconds, window_size).clamp(1, rows.len().max(1));
    let mut beats = Vec::new();
    let mut i = 0;
    while i + 1 < rows.len() {
        let curr = rows[i][bin] / max;
        let next = rows[i + 1][bin] / max;
        if next - curr >= band.threshold {
            beats.push(i);
            i += skip;
        } else {
            i += 1;
        }
    }

    log::debug!(
        "Band {} Hz (bin {}): {} beats, skip {} windows",
        band.frequency_hz,
        bin,
        beats.len(),
        skip
    );

    Ok(beats)
}

/// Removes every `additive` beat lying within `range` windows of a `base`
/// beat. `base` is left untouched.
pub fn remove_near_beats(base: &[usize], additive: &mut Vec<usize>, range: usize) {
    additive.retain(|&beat| !base.iter().any(|&b| beat.abs_diff(b) <= range));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f32>>) -> SpectrumMatrix {
        SpectrumMatrix::from_rows(rows).unwrap()
    }

    /// Single-bin spectrum (window size 2) whose bin 1 follows `values`.
    fn bin_one(values: &[f32]) -> SpectrumMatrix {
        matrix(values.iter().map(|&v| vec![0.0, v]).collect())
    }

    #[test]
    fn rising_edge_in_two_windows() {
        let spectrum = matrix(vec![vec![0.0, 0.0], vec![0.0, 10.0]]);
        let band = BeatBand::new(10000.0, 0.5, 0.0);
        assert_eq!(detect_beats(&spectrum, 44100, 1, &band).unwrap(), vec![0]);
    }

    #[test]
    fn bin_mapping() {
        assert_eq!(frequency_bin(4096, 20.0), 4);
        assert_eq!(frequency_bin(4096, 7500.0), 1538);
        assert_eq!(frequency_bin(2, 20000.0), 1);
        assert_eq!(frequency_bin(8, 20.0), 0);
    }

    #[test]
    fn silent_band_reports_nothing() {
        let spectrum = bin_one(&[0.0; 6]);
        let band = BeatBand::new(10000.0, -1.0, 0.0);
        assert!(detect_beats(&spectrum, 44100, 1, &band).unwrap().is_empty());
    }

    #[test]
    fn skip_spaces_detections() {
        // Saw-tooth: every window rises sharply from the previous one
        let values: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let spectrum = bin_one(&values);

        // 8 windows per second at sample rate 16 with window size 2
        for skip_seconds in [0.0, 0.1, 0.25, 0.5, 1.0, 2.3] {
            let band = BeatBand::new(10000.0, 0.5, skip_seconds);
            let beats = detect_beats(&spectrum, 16, 1, &band).unwrap();
            let skip = skip_windows(16, 1, skip_seconds, 2).max(1);
            assert!(!beats.is_empty());
            for pair in beats.windows(2) {
                assert!(pair[1] > pair[0]);
                assert!(pair[1] - pair[0] >= skip, "{:?} skip {}", beats, skip);
            }
        }
    }

    #[test]
    fn huge_skip_stops_after_first_beat() {
        // 1e30 seconds saturates the window count to usize::MAX
        let spectrum = matrix(vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 10.0], vec![0.0, 0.0]]);
        let band = BeatBand::new(10000.0, 0.5, 1e30);
        assert_eq!(skip_windows(44100, 1, 1e30, 2), usize::MAX);
        assert_eq!(detect_beats(&spectrum, 44100, 1, &band).unwrap(), vec![1]);
    }

    #[test]
    fn skip_counts_channels() {
        assert_eq!(skip_windows(44100, 2, 0.5, 4096), 10);
        assert_eq!(skip_windows(44100, 1, 0.5, 4096), 5);
        assert_eq!(skip_windows(44100, 1, 0.0, 4096), 0);
    }

    #[test]
    fn rejects_out_of_range_frequency() {
        let spectrum = bin_one(&[0.0, 1.0]);
        assert_eq!(
            detect_beats(&spectrum, 44100, 1, &BeatBand::new(5.0, 0.1, 0.0)).unwrap_err(),
            AnalysisError::InvalidFrequency(5.0)
        );
        assert!(detect_beats(&spectrum, 44100, 1, &BeatBand::new(100.0, 0.1, -1.0)).is_err());
    }

    #[test]
    fn near_beats_are_removed_from_additive_only() {
        let base = vec![10, 50];
        let mut additive = vec![3, 5, 15, 16, 44, 56, 80];
        remove_near_beats(&base, &mut additive, 5);
        assert_eq!(base, vec![10, 50]);
        assert_eq!(additive, vec![3, 16, 44, 56, 80]);
    }

    #[test]
    fn identical_lists_cancel() {
        let base = vec![2, 9, 40, 41];
        let mut additive = base.clone();
        remove_near_beats(&base, &mut additive, 5);
        assert!(additive.is_empty());
    }
}
