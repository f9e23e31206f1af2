//! Playback of an analyzed song: everything a frame needs at a given global
//! parameter (song time divided by song length).

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::audio::beat::BeatBand;
use crate::markers::{update_marker_transforms_into, Marker, MarkerTransform};
use crate::math::inverse_lerp;
use crate::score::Scoreboard;
use crate::track::{BSpline, Color};

/// Hue of the steepest climb; the player is slowest there.
const SLOWEST_HUE: f32 = 0.83;

/// Bands for the beat pulses that drive per-frame effects. They are
/// detected without skipping so every loud window pulses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulseParams {
    #[serde(default = "default_low_pulse")]
    pub low: BeatBand,
    #[serde(default = "default_high_pulse")]
    pub high: BeatBand,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            low: default_low_pulse(),
            high: default_high_pulse(),
        }
    }
}

fn default_low_pulse() -> BeatBand { BeatBand::new(20.0, 0.1, 0.0) }
fn default_high_pulse() -> BeatBand { BeatBand::new(7500.0, 0.01, 0.0) }

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PulseBeats {
    pub low: Vec<usize>,
    pub high: Vec<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pulse {
    #[default]
    None,
    Low,
    High,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameState {
    pub global: f32,
    pub elapsed_seconds: f32,
    pub color: Color,
    pub player_position: Vec3,
    pub player_direction: Vec3,
    /// 0 on the steepest climbs, 1 on the fastest descents.
    pub speed_factor: f32,
    pub pulse: Pulse,
    pub markers: Vec<MarkerTransform>,
}

pub struct TrackSession<'a> {
    spline: &'a BSpline,
    markers: &'a [Marker],
    low_pulses: HashSet<usize>,
    high_pulses: HashSet<usize>,
    duration: f32,
    scoreboard: Scoreboard,
}

impl<'a> TrackSession<'a> {
    pub fn new(spline: &'a BSpline, markers: &'a [Marker], pulses: &PulseBeats, duration: f32) -> Self {
        Self {
            spline,
            markers,
            low_pulses: pulses.low.iter().copied().collect(),
            high_pulses: pulses.high.iter().copied().collect(),
            duration: duration.max(0.0),
            scoreboard: Scoreboard::for_markers(markers.len()),
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn scoreboard_mut(&mut self) -> &mut Scoreboard {
        &mut self.scoreboard
    }

    pub fn restart(&mut self) {
        self.scoreboard.reset();
    }

    /// Global parameter for a playback position in seconds.
    pub fn global_at(&self, seconds: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (seconds / self.duration).clamp(0.0, 1.0)
    }

    fn pulse_at(&self, global: f32) -> Pulse {
        let index = self.spline.indexes_at(global).first;
        if self.low_pulses.contains(&index) {
            Pulse::Low
        } else if self.high_pulses.contains(&index) {
            Pulse::High
        } else {
            Pulse::None
        }
    }

    pub fn frame(&self, global: f32) -> FrameState {
        let mut state = FrameState::default();
        self.frame_into(global, &mut state);
        state
    }

    /// Fills `state` for `global`, reusing its marker buffer.
    pub fn frame_into(&self, global: f32, state: &mut FrameState) {
        let global = if global.is_nan() { 0.0 } else { global.clamp(0.0, 1.0) };
        let color = self.spline.color_at(global);

        state.global = global;
        state.elapsed_seconds = global * self.duration;
        state.color = color;
        state.player_position = self.spline.point_at(global);
        state.player_direction = self.spline.direction_at(global);
        state.speed_factor = inverse_lerp(SLOWEST_HUE, 0.0, color.hue());
        state.pulse = self.pulse_at(global);

        state.markers.resize(self.markers.len(), MarkerTransform::default());
        update_marker_transforms_into(self.markers, self.spline, global, &mut state.markers);
    }
}

/// `m:ss / m:ss` for an elapsed and a total duration in seconds.
pub fn format_song_time(elapsed: f32, total: f32) -> String {
    let clock = |seconds: f32| {
        let whole = seconds.max(0.0) as u64;
        format!("{}:{:02}", whole / 60, whole % 60)
    };
    format!("{} / {}", clock(elapsed), clock(total))
}
