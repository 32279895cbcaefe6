//! Mathematical structs and functions.

use cgmath::{Point3, Vector3};
pub use heading::{heading_between, lerp_heading, normalize_heading, shortest_turn};
pub use polyline::Polyline;
pub use util::*;

mod heading;
mod polyline;
mod util;

/// A 3D point
pub type Point3d = Point3<f64>;

/// A 3D vector
pub type Vector3d = Vector3<f64>;
