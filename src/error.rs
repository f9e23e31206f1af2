use thiserror::Error;

/// Precondition failures of the analysis and track pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("waveform contains no samples")]
    EmptyWaveform,

    #[error("waveform must have at least one channel")]
    ZeroChannels,

    #[error("window size {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("window size {window_size} is larger than the waveform ({samples} samples)")]
    WindowTooLarge { window_size: usize, samples: usize },

    #[error("buffer holds {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("frequency {0} Hz is outside the 20-20000 Hz analysis range")]
    InvalidFrequency(f32),

    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("curve needs at least one control point")]
    EmptyCurve,

    #[error("{colors} colors given for {points} control points")]
    ColorCountMismatch { points: usize, colors: usize },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
