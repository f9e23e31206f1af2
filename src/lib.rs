pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod markers;
pub mod math;
pub mod score;
pub mod session;
pub mod track;

pub use error::AnalysisError;
