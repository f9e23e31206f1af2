//! Ribbon mesh swept along a [`BSpline`].

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

use super::color::Color;
use super::spline::BSpline;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RibbonMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl RibbonMesh {
    /// Sweeps a strip of width `2 * half_thickness` along the curve in
    /// `resolution` quads. Each step emits an upper (`uv.y = 1`) and a lower
    /// (`uv.y = 0`) vertex offset along the bitangent closest to `bitangent`.
    /// `uv.x` is the vertex x divided by the x of the final vertex on the same
    /// side, a horizontal-distance approximation of arc length; the first pair
    /// is pinned to `uv.x = 0`.
    pub fn build(spline: &BSpline, resolution: usize, half_thickness: f32, bitangent: Vec3) -> Self {
        let resolution = resolution.max(1);
        let step = 1.0 / resolution as f32;

        let edge = |t: f32| -> (Vec3, Vec3) {
            let point = spline.point_at(t);
            let offset = spline.bitangent_perpendicular_to(t, bitangent) * half_thickness;
            (point + offset, point - offset)
        };

        let (last_upper, last_lower) = edge(1.0);
        let uv_x = |i: usize, x: f32, last: f32| {
            if i == 0 || last.abs() <= f32::EPSILON {
                0.0
            } else {
                x / last
            }
        };

        let mut vertices = Vec::with_capacity(2 * (resolution + 1));
        let mut indices = Vec::with_capacity(6 * resolution);

        for i in 0..=resolution {
            let t = if i == resolution { 1.0 } else { step * i as f32 };
            let (upper, lower) = edge(t);
            let color = vertex_color(spline.color_at(t));

            vertices.push(Vertex {
                position: upper.to_array(),
                uv: [uv_x(i, upper.x, last_upper.x), 1.0],
                color,
            });
            vertices.push(Vertex {
                position: lower.to_array(),
                uv: [uv_x(i, lower.x, last_lower.x), 0.0],
                color,
            });

            if i > 0 {
                let o = 2 * i as u32;
                indices.extend_from_slice(&[o, o - 1, o - 2, o - 1, o, o + 1]);
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

fn vertex_color(c: Color) -> [f32; 4] {
    [c.r, c.g, c.b, c.a]
}
