//! Uniform cubic B-spline over a padded control polygon.
//!
//! The first and last control points are stored three times each, which pins
//! the curve to them at `t = 0` and `t = 1`. Colors are padded the same way but
//! only blended linearly between neighbouring entries.

use glam::Vec3;
use serde::Serialize;

use super::color::Color;
use crate::error::{AnalysisError, Result};

/// Extra copies of each end point.
pub const END_PADDING: usize = 2;

/// Uniform cubic B-spline basis, applied as `[1 s s² s³] · M · P / 6`.
const BASIS: [[f32; 4]; 4] = [
    [1.0, 4.0, 1.0, 0.0],
    [-3.0, 0.0, 3.0, 0.0],
    [3.0, -6.0, 3.0, 0.0],
    [-1.0, 3.0, -3.0, 1.0],
];

const BASIS_SCALE: f32 = 1.0 / 6.0;

/// Sub-spline selected by a curve parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SegmentIndex {
    /// Index of the first of the four control points.
    pub first: usize,
    /// Local parameter inside the segment, in `[0, 1]`.
    pub inter: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct BSpline {
    points: Vec<Vec3>,
    colors: Vec<Color>,
}

fn pad_ends<T: Copy>(items: &[T]) -> Vec<T> {
    let first = items[0];
    let last = items[items.len() - 1];
    let mut padded = Vec::with_capacity(items.len() + 2 * END_PADDING);
    padded.extend(std::iter::repeat(first).take(END_PADDING));
    padded.extend_from_slice(items);
    padded.extend(std::iter::repeat(last).take(END_PADDING));
    padded
}

impl BSpline {
    /// Builds the curve from unpadded points and one color per point.
    pub fn new(points: &[Vec3], colors: &[Color]) -> Result<Self> {
        if points.is_empty() {
            return Err(AnalysisError::EmptyCurve);
        }
        if points.len() != colors.len() {
            return Err(AnalysisError::ColorCountMismatch {
                points: points.len(),
                colors: colors.len(),
            });
        }
        Ok(Self {
            points: pad_ends(points),
            colors: pad_ends(colors),
        })
    }

    /// Padded control points.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Padded colors, parallel to [`Self::points`].
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Length of the padded control polygon.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The control points as given to [`Self::new`].
    pub fn true_points(&self) -> &[Vec3] {
        &self.points[END_PADDING..self.points.len() - END_PADDING]
    }

    /// Maps `t` (clamped to `[0, 1]`) onto a segment. The last segment is
    /// closed, so `t = 1` yields `inter = 1` rather than a segment past the end.
    pub fn indexes_at(&self, t: f32) -> SegmentIndex {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.points.len() - 4;

        let x = t * (last + 1) as f32;
        let first = x.floor() as usize;
        if first > last {
            return SegmentIndex { first: last, inter: 1.0 };
        }
        SegmentIndex {
            first,
            inter: x - first as f32,
        }
    }

    fn evaluate(&self, row: [f32; 4], first: usize) -> Vec3 {
        let mut result = Vec3::ZERO;
        for (j, point) in self.points[first..first + 4].iter().enumerate() {
            let weight: f32 = (0..4).map(|i| row[i] * BASIS[i][j]).sum();
            result += *point * weight;
        }
        result * BASIS_SCALE
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let SegmentIndex { first, inter: s } = self.indexes_at(t);
        self.evaluate([1.0, s, s * s, s * s * s], first)
    }

    /// First derivative with respect to the local segment parameter. Vanishes
    /// at both ends because of the tripled end points.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let SegmentIndex { first, inter: s } = self.indexes_at(t);
        self.evaluate([0.0, 1.0, 2.0 * s, 3.0 * s * s], first)
    }

    /// Unit travel direction at `t`. Falls back to a finite difference where
    /// the derivative vanishes, and to +X for a fully degenerate curve.
    pub fn direction_at(&self, t: f32) -> Vec3 {
        let tangent = self.tangent_at(t);
        if tangent.length_squared() > 1e-12 {
            return tangent.normalize();
        }

        const H: f32 = 1e-3;
        let t = t.clamp(0.0, 1.0);
        let ahead = self.point_at((t + H).min(1.0));
        let behind = self.point_at((t - H).max(0.0));
        let chord = ahead - behind;
        if chord.length_squared() > 1e-12 {
            chord.normalize()
        } else {
            Vec3::X
        }
    }

    pub fn color_at(&self, t: f32) -> Color {
        let SegmentIndex { first, inter } = self.indexes_at(t);
        self.colors[first].lerp(self.colors[first + 1], inter)
    }

    /// Unit vector closest to `desired` that is perpendicular to the tangent
    /// at `t`.
    pub fn bitangent_perpendicular_to(&self, t: f32, desired: Vec3) -> Vec3 {
        let desired = desired.normalize_or_zero();
        let tangent = self.tangent_at(t).normalize_or_zero();
        let rejection = desired - tangent * desired.dot(tangent);
        rejection.try_normalize().unwrap_or(desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn wavy() -> BSpline {
        let points: Vec<Vec3> = (0..12)
            .map(|i| Vec3::new(i as f32 * 1.5, (i as f32 * 0.7).sin() * 3.0, 0.0))
            .collect();
        let colors: Vec<Color> = (0..12)
            .map(|i| Color::from_hsv(i as f32 / 12.0, 1.0, 0.8))
            .collect();
        BSpline::new(&points, &colors).unwrap()
    }

    #[test]
    fn pads_both_ends_twice() {
        let spline = wavy();
        assert_eq!(spline.len(), 16);
        assert_eq!(spline.colors().len(), 16);
        assert_eq!(spline.points()[0], spline.points()[2]);
        assert_eq!(spline.points()[1], spline.points()[2]);
        assert_eq!(spline.points()[15], spline.points()[13]);
        assert_eq!(spline.true_points().len(), 12);
    }

    #[test]
    fn interpolates_end_points() {
        let spline = wavy();
        let first = spline.true_points()[0];
        let last = *spline.true_points().last().unwrap();

        assert!(close(spline.point_at(0.0), first));
        assert!(close(spline.point_at(1.0), last));
        let end = spline.color_at(1.0);
        let expected = spline.colors()[13];
        assert_eq!(spline.color_at(0.0), spline.colors()[2]);
        assert!((end.r - expected.r).abs() < 1e-6);
        assert!((end.g - expected.g).abs() < 1e-6);
        assert!((end.b - expected.b).abs() < 1e-6);
    }

    #[test]
    fn segment_index_stays_in_range() {
        let spline = wavy();
        for i in 0..=1000 {
            let idx = spline.indexes_at(i as f32 / 1000.0);
            assert!(idx.first + 3 < spline.len());
            assert!((0.0..=1.0).contains(&idx.inter));
        }
        assert_eq!(spline.indexes_at(1.0), SegmentIndex { first: 12, inter: 1.0 });
        assert_eq!(spline.indexes_at(-0.5), SegmentIndex { first: 0, inter: 0.0 });
        assert_eq!(spline.indexes_at(7.0), spline.indexes_at(1.0));
        assert_eq!(spline.indexes_at(0.5).first, 6);
    }

    #[test]
    fn curve_is_continuous_across_segments() {
        let spline = wavy();
        let segments = (spline.len() - 3) as f32;
        for seg in 1..(spline.len() - 3) {
            let t = seg as f32 / segments;
            let before = spline.point_at(t - 1e-5);
            let after = spline.point_at(t + 1e-5);
            assert!((before - after).length() < 1e-2, "gap at segment {}", seg);
        }
    }

    #[test]
    fn straight_line_stays_straight() {
        let points: Vec<Vec3> = (0..6).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let spline = BSpline::new(&points, &[Color::WHITE; 6]).unwrap();
        for i in 0..=50 {
            let t = i as f32 / 50.0;
            let p = spline.point_at(t);
            assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
            assert!(close(spline.direction_at(t), Vec3::X));
        }
    }

    #[test]
    fn tangent_matches_finite_difference() {
        let spline = wavy();
        let segments = (spline.len() - 3) as f32;
        let t = 0.37;
        let h = 1e-3;
        // d/dt = d/ds * segments
        let numeric = (spline.point_at(t + h) - spline.point_at(t - h)) / (2.0 * h);
        let analytic = spline.tangent_at(t) * segments;
        assert!((numeric - analytic).length() < 1e-1 * analytic.length().max(1.0));
    }

    #[test]
    fn tangent_vanishes_at_ends_but_direction_does_not() {
        let spline = wavy();
        assert!(spline.tangent_at(0.0).length() < 1e-5);
        assert!(spline.tangent_at(1.0).length() < 1e-5);
        assert!((spline.direction_at(0.0).length() - 1.0).abs() < 1e-5);
        assert!(spline.direction_at(1.0).x > 0.0);
    }

    #[test]
    fn bitangent_is_perpendicular_to_tangent() {
        let spline = wavy();
        for i in 1..20 {
            let t = i as f32 / 20.0;
            let desired = Vec3::new(0.0, 1.0, 1.0);
            let b = spline.bitangent_perpendicular_to(t, desired);
            let tangent = spline.tangent_at(t).normalize();
            assert!(b.dot(tangent).abs() < 1e-4);
            assert!((b.length() - 1.0).abs() < 1e-4);
            assert!(b.dot(desired) > 0.0);
        }
        // Degenerate tangent falls back to the desired direction
        assert!(close(spline.bitangent_perpendicular_to(0.0, Vec3::Z * 3.0), Vec3::Z));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(BSpline::new(&[], &[]).unwrap_err(), AnalysisError::EmptyCurve);
        assert_eq!(
            BSpline::new(&[Vec3::ZERO; 3], &[Color::WHITE; 2]).unwrap_err(),
            AnalysisError::ColorCountMismatch { points: 3, colors: 2 }
        );
    }

    #[test]
    fn single_point_curve_is_a_point() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let spline = BSpline::new(&[p], &[Color::WHITE]).unwrap();
        assert!(close(spline.point_at(0.0), p));
        assert!(close(spline.point_at(0.6), p));
        assert_eq!(spline.direction_at(0.5), Vec3::X);
    }
}
