use glam::{Mat3, Quat, Vec3};
use rayon::prelude::*;
use serde::Serialize;

use super::Marker;
use crate::math::{inverse_lerp, lerp};
use crate::track::spline::BSpline;

/// Global-parameter distance over which a marker slides into place.
pub const APPROACH_WINDOW: f32 = 0.5;
/// How far behind its end parameter a marker starts sliding.
pub const APPROACH_TRAVEL: f32 = 0.075;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MarkerTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for MarkerTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Curve parameter a marker with end parameter `end` is drawn at when the
/// player is at `global`.
pub fn render_parameter(end: f32, global: f32) -> f32 {
    let approach = inverse_lerp(end - APPROACH_WINDOW, end, global);
    lerp(end - APPROACH_TRAVEL, end, approach)
}

/// Rotation taking +Z onto `forward` with +Y kept as close to `up` as
/// possible.
fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = up.cross(forward);
    if right.length_squared() < 1e-12 {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

fn marker_transform(marker: &Marker, spline: &BSpline, global: f32) -> MarkerTransform {
    let t = render_parameter(marker.end_parameter, global);
    MarkerTransform {
        position: spline.point_at(t) + Vec3::Z * marker.z_position,
        rotation: look_rotation(spline.direction_at(t), Vec3::Y),
    }
}

/// Per-frame marker transforms at global parameter `global`. Markers are
/// independent, so they are evaluated in parallel.
pub fn update_marker_transforms(markers: &[Marker], spline: &BSpline, global: f32) -> Vec<MarkerTransform> {
    markers
        .par_iter()
        .map(|marker| marker_transform(marker, spline, global))
        .collect()
}

/// Same as [`update_marker_transforms`], writing into a caller-owned buffer.
/// Extra entries on either side are left untouched.
pub fn update_marker_transforms_into(markers: &[Marker], spline: &BSpline, global: f32, out: &mut [MarkerTransform]) {
    out.par_iter_mut()
        .zip(markers.par_iter())
        .for_each(|(slot, marker)| *slot = marker_transform(marker, spline, global));
}
