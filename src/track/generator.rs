//! Turns the loudness envelope of a song into a track curve.
//!
//! Loud passages make the track fast and flat (or descending), quiet passages
//! slow and climbing. Colors follow the slope: steep climbs are purple/blue,
//! descents red/yellow.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::mesh::RibbonMesh;
use super::spline::BSpline;
use crate::audio::spectrum::compute_intensities;
use crate::audio::Waveform;
use crate::error::{AnalysisError, Result};
use crate::math::{inverse_lerp, lerp, remap};

/// Hue range the slope is mapped onto, clamped to `[0, 1]` afterwards.
const HUE_RANGE: (f32, f32) = (-0.2, 0.83);
const TRACK_SATURATION: f32 = 1.0;
const TRACK_VALUE: f32 = 0.8;
/// Raw intensity above which a window counts as "agitated".
const AGITATION_LEVEL: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackParams {
    /// Exponential smoothing of the slope, in `(0, 1)`. Higher is smoother.
    #[serde(default = "default_slope_smoothness")]
    pub slope_smoothness: f32,
    #[serde(default = "default_min_slope_intensity")]
    pub min_slope_intensity: f32,
    #[serde(default = "default_max_slope_intensity")]
    pub max_slope_intensity: f32,
    /// Horizontal advance per window for the quietest window.
    #[serde(default = "default_min_speed")]
    pub min_speed: f32,
    /// Horizontal advance per window for the loudest window.
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    #[serde(default = "default_mesh_resolution")]
    pub mesh_resolution: usize,
    #[serde(default = "default_mesh_half_thickness")]
    pub mesh_half_thickness: f32,
    #[serde(default = "default_mesh_bitangent")]
    pub mesh_bitangent: Vec3,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            slope_smoothness: default_slope_smoothness(),
            min_slope_intensity: default_min_slope_intensity(),
            max_slope_intensity: default_max_slope_intensity(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            mesh_resolution: default_mesh_resolution(),
            mesh_half_thickness: default_mesh_half_thickness(),
            mesh_bitangent: default_mesh_bitangent(),
        }
    }
}

fn default_slope_smoothness() -> f32 { 0.925 }
fn default_min_slope_intensity() -> f32 { 0.6 }
fn default_max_slope_intensity() -> f32 { 1.2 }
fn default_min_speed() -> f32 { 0.3 }
fn default_max_speed() -> f32 { 3.0 }
fn default_mesh_resolution() -> usize { 256 }
fn default_mesh_half_thickness() -> f32 { 5.0 }
fn default_mesh_bitangent() -> Vec3 { Vec3::Z }

impl TrackParams {
    fn validate(&self) -> Result<()> {
        let a = self.slope_smoothness;
        if !(a > 0.0 && a < 1.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "slope_smoothness",
                value: a,
            });
        }
        for (name, value) in [
            ("min_slope_intensity", self.min_slope_intensity),
            ("max_slope_intensity", self.max_slope_intensity),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("mesh_half_thickness", self.mesh_half_thickness),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Everything derived from one song's loudness envelope.
#[derive(Clone, Debug, Serialize)]
pub struct TrackData {
    pub spline: BSpline,
    /// Unpadded control points, one per analysis window.
    pub control_points: Vec<Vec3>,
    pub raw_intensities: Vec<f32>,
    pub normalized_intensities: Vec<f32>,
    pub slopes: Vec<f32>,
    pub colors: Vec<Color>,
    pub slope_intensity: f32,
    #[serde(skip)]
    pub mesh: RibbonMesh,
}

/// Computes the window intensities of `waveform` and builds the track.
pub fn generate_track(waveform: &Waveform, window_size: usize, params: &TrackParams) -> Result<TrackData> {
    let intensities = compute_intensities(waveform, window_size)?;
    generate_from_intensities(intensities, params)
}

pub fn generate_from_intensities(raw_intensities: Vec<f32>, params: &TrackParams) -> Result<TrackData> {
    params.validate()?;
    if raw_intensities.is_empty() {
        return Err(AnalysisError::EmptyWaveform);
    }

    // Flat audio normalizes to silence
    let normalized_intensities = remap(&raw_intensities, 0.0, 1.0, 0.0);

    let slope_intensity = slope_intensity(&raw_intensities, params);
    let smoothed = smooth(&normalized_intensities, params.slope_smoothness);
    let slopes = remap(&smoothed, slope_intensity, -slope_intensity, 0.0);
    let colors = slope_colors(&slopes, slope_intensity);
    let control_points = control_points(&normalized_intensities, &slopes, params);

    let spline = BSpline::new(&control_points, &colors)?;
    let mesh = RibbonMesh::build(
        &spline,
        params.mesh_resolution,
        params.mesh_half_thickness,
        params.mesh_bitangent,
    );

    log::debug!(
        "Track: {} control points, slope intensity {:.3}, {} mesh triangles",
        control_points.len(),
        slope_intensity,
        mesh.triangle_count()
    );

    Ok(TrackData {
        spline,
        control_points,
        raw_intensities,
        normalized_intensities,
        slopes,
        colors,
        slope_intensity,
        mesh,
    })
}

/// Maximum slope for the song: higher when more windows are loud.
fn slope_intensity(raw_intensities: &[f32], params: &TrackParams) -> f32 {
    let loud = raw_intensities.iter().filter(|&&i| i > AGITATION_LEVEL).count();
    let agitation = loud as f32 / raw_intensities.len() as f32;
    lerp(params.min_slope_intensity, params.max_slope_intensity, agitation)
}

fn smooth(normalized: &[f32], smoothness: f32) -> Vec<f32> {
    let mut smoothed = vec![0.0; normalized.len()];
    for i in 1..normalized.len() {
        smoothed[i] = lerp(smoothed[i - 1], normalized[i], 1.0 - smoothness);
    }
    smoothed
}

fn slope_colors(slopes: &[f32], slope_intensity: f32) -> Vec<Color> {
    slopes
        .iter()
        .map(|&slope| {
            let position = inverse_lerp(-slope_intensity, slope_intensity, slope);
            let hue = lerp(HUE_RANGE.0, HUE_RANGE.1, position).clamp(0.0, 1.0);
            Color::from_hsv(hue, TRACK_SATURATION, TRACK_VALUE)
        })
        .collect()
}

fn control_points(normalized: &[f32], slopes: &[f32], params: &TrackParams) -> Vec<Vec3> {
    let mut x = 0.0;
    let mut y = 0.0;
    normalized
        .iter()
        .zip(slopes)
        .map(|(&intensity, &slope)| {
            let speed = lerp(params.min_speed, params.max_speed, intensity);
            x += speed;
            y += slope * speed;
            Vec3::new(x, y, 0.0)
        })
        .collect()
}
