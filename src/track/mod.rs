pub mod color;
pub mod generator;
pub mod mesh;
pub mod spline;

pub use color::Color;
pub use generator::{generate_from_intensities, generate_track, TrackData, TrackParams};
pub use mesh::{RibbonMesh, Vertex};
pub use spline::{BSpline, SegmentIndex};
