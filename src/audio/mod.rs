pub mod beat;
pub mod decode;
pub mod fft;
pub mod spectrum;
pub mod window;

pub use decode::Waveform;
pub use spectrum::SpectrumMatrix;

/// Upper and lower bounds of the analysed frequency range, in Hz.
pub const MIN_FREQUENCY_HZ: f32 = 20.0;
pub const MAX_FREQUENCY_HZ: f32 = 20000.0;

/// Number of whole windows of `window_size` samples that fit in `len` samples,
/// after validating the window size against the waveform.
pub(crate) fn window_count(len: usize, window_size: usize) -> crate::error::Result<usize> {
    use crate::error::AnalysisError;

    if window_size == 0 || !window_size.is_power_of_two() {
        return Err(AnalysisError::NotPowerOfTwo(window_size));
    }
    if len == 0 {
        return Err(AnalysisError::EmptyWaveform);
    }
    if window_size > len {
        return Err(AnalysisError::WindowTooLarge {
            window_size,
            samples: len,
        });
    }

    let count = len / window_size;
    let dropped = len % window_size;
    if dropped > 0 {
        log::debug!(
            "Dropping {} trailing samples that do not fill a {}-sample window",
            dropped,
            window_size
        );
    }
    Ok(count)
}
