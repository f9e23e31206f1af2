//! Markers ("blocks") placed on the track at detected beats.

pub mod placement;
pub mod update;

use serde::{Deserialize, Serialize};

use crate::audio::beat::BeatBand;

pub use placement::{assign_lanes, marker_parameter, place_markers};
pub use update::{render_parameter, update_marker_transforms, update_marker_transforms_into, MarkerTransform};

/// Lateral slot of a marker across the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Left,
    Center,
    Right,
}

impl Lane {
    /// `-1` (right), `0` (center) or `1` (left).
    pub fn from_offset(offset: i64) -> Self {
        match offset.signum() {
            1 => Lane::Left,
            -1 => Lane::Right,
            _ => Lane::Center,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Lane::Left => 1.0,
            Lane::Center => 0.0,
            Lane::Right => -1.0,
        }
    }
}

/// A marker bound to the curve parameter at which the player reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Marker {
    /// Window index of the beat that spawned the marker.
    pub beat_index: usize,
    pub end_parameter: f32,
    /// Offset along the world forward (+Z) axis.
    pub z_position: f32,
    pub lane: Lane,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerParams {
    #[serde(default = "default_max_distance_from_center")]
    pub max_distance_from_center: f32,
    #[serde(default = "default_low_band")]
    pub low: BeatBand,
    #[serde(default = "default_high_band")]
    pub high: BeatBand,
    /// High-band beats within this many windows of a low-band beat are dropped.
    #[serde(default = "default_dedup_range")]
    pub dedup_range: usize,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            max_distance_from_center: default_max_distance_from_center(),
            low: default_low_band(),
            high: default_high_band(),
            dedup_range: default_dedup_range(),
        }
    }
}

fn default_max_distance_from_center() -> f32 { 2.2 }
fn default_low_band() -> BeatBand { BeatBand::new(20.0, 0.1, 0.5) }
fn default_high_band() -> BeatBand { BeatBand::new(7500.0, 0.025, 0.5) }
fn default_dedup_range() -> usize { 5 }
