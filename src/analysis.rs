//! Full pipeline from a decoded waveform to a playable track.

use serde::Serialize;

use crate::audio::beat::{detect_beats, BeatBand};
use crate::audio::spectrum::compute_spectrum_with;
use crate::audio::window::WindowTables;
use crate::audio::Waveform;
use crate::config::Config;
use crate::error::Result;
use crate::markers::{place_markers, Marker};
use crate::session::{PulseBeats, TrackSession};
use crate::track::{generate_track, TrackData};

#[derive(Clone, Debug, Serialize)]
pub struct Analysis {
    pub sample_rate: u32,
    pub channels: u16,
    /// Song length in seconds.
    pub duration: f32,
    pub window_size: usize,
    pub track: TrackData,
    pub low_beats: Vec<usize>,
    /// High-band beats as detected, before removing those near low beats.
    pub high_beats: Vec<usize>,
    pub pulses: PulseBeats,
    pub markers: Vec<Marker>,
}

impl Analysis {
    pub fn session(&self) -> TrackSession<'_> {
        TrackSession::new(&self.track.spline, &self.markers, &self.pulses, self.duration)
    }
}

pub fn analyze(waveform: &Waveform, config: &Config) -> Result<Analysis> {
    let window_size = config.analysis.window_size;
    let tables = WindowTables::new(window_size, config.analysis.window_function)?;

    log::info!("Pass 1: Spectrum and track ({}-sample windows)...", window_size);
    let (spectrum, track) = rayon::join(
        || compute_spectrum_with(waveform, &tables),
        || generate_track(waveform, window_size, &config.track),
    );
    let spectrum = spectrum?;
    let track = track?;
    log::info!(
        "Track: {} windows, slope intensity {:.3}",
        track.control_points.len(),
        track.slope_intensity
    );

    log::info!("Pass 2: Beat detection...");
    let band = |b: &BeatBand| detect_beats(&spectrum, waveform.sample_rate(), waveform.channels(), b);
    let low_beats = band(&config.markers.low)?;
    let high_beats = band(&config.markers.high)?;
    let pulses = PulseBeats {
        low: band(&config.pulse.low)?,
        high: band(&config.pulse.high)?,
    };
    log::info!(
        "Beats: low={}, high={}, pulses={}/{}",
        low_beats.len(),
        high_beats.len(),
        pulses.low.len(),
        pulses.high.len()
    );

    log::info!("Pass 3: Marker placement...");
    let markers = place_markers(&low_beats, &high_beats, &track.spline, &config.markers);
    log::info!("Markers: {}", markers.len());

    Ok(Analysis {
        sample_rate: waveform.sample_rate(),
        channels: waveform.channels(),
        duration: waveform.duration(),
        window_size,
        track,
        low_beats,
        high_beats,
        pulses,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    const WINDOW: usize = 1024;

    /// 32 windows, DC bursts in windows 4, 12, 20 and 28.
    fn bursts() -> Waveform {
        let samples = (0..32 * WINDOW)
            .map(|i| if (i / WINDOW) % 8 == 4 { 0.5 } else { 0.0 })
            .collect();
        Waveform::new(samples, 44100, 1).unwrap()
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.analysis.window_size = WINDOW;
        config.markers.low = BeatBand::new(20.0, 0.1, 0.0);
        config.markers.high = BeatBand::new(7500.0, 0.025, 0.0);
        config
    }

    #[test]
    fn finds_bursts_and_places_markers() {
        let analysis = analyze(&bursts(), &config()).unwrap();
        assert_eq!(analysis.track.control_points.len(), 32);
        assert_eq!(analysis.low_beats, vec![3, 11, 19, 27]);
        assert_eq!(analysis.pulses.low, vec![3, 11, 19, 27]);

        // Any high-band echo of the bursts sits on a low beat and is dropped
        let beats: Vec<usize> = analysis.markers.iter().map(|m| m.beat_index).collect();
        assert_eq!(beats, vec![3, 11, 19, 27]);
        assert!(analysis.markers.iter().all(|m| m.end_parameter > 0.0 && m.end_parameter <= 1.0));
    }

    #[test]
    fn session_covers_all_markers() {
        let analysis = analyze(&bursts(), &config()).unwrap();
        let session = analysis.session();
        let frame = session.frame(0.5);
        assert_eq!(frame.markers.len(), analysis.markers.len());
        assert!((session.duration() - 32.0 * WINDOW as f32 / 44100.0).abs() < 1e-4);
        assert_eq!(session.scoreboard().total(), 1 + 5 + 9 + 13);
    }

    #[test]
    fn rejects_bad_window_size() {
        let mut config = config();
        config.analysis.window_size = 1000;
        assert_eq!(
            analyze(&bursts(), &config).unwrap_err(),
            AnalysisError::NotPowerOfTwo(1000)
        );
    }

    #[test]
    fn rejects_out_of_range_band() {
        let mut config = config();
        config.markers.high.frequency_hz = 25000.0;
        assert_eq!(
            analyze(&bursts(), &config).unwrap_err(),
            AnalysisError::InvalidFrequency(25000.0)
        );
    }
}
