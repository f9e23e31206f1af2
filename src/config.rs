use serde::Deserialize;
use std::path::PathBuf;

use crate::audio::window::WindowFunction;
use crate::markers::MarkerParams;
use crate::session::PulseParams;
use crate::track::TrackParams;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub track: TrackParams,
    #[serde(default)]
    pub markers: MarkerParams,
    #[serde(default)]
    pub pulse: PulseParams,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Samples per analysis window; must be a power of two.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default)]
    pub window_function: WindowFunction,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            window_function: WindowFunction::default(),
        }
    }
}

pub fn default_window_size() -> usize { 4096 }

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
