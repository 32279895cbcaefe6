//! Compass headings in degrees.
//!
//! 0° points north (towards negative z), 90° east (positive x).

use super::Point3d;

/// Normalises an angle in degrees to the range [0, 360).
/// Non-finite angles map to 0.
pub fn normalize_heading(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let heading = deg.rem_euclid(360.0);
    // `rem_euclid` rounds up to exactly 360 for tiny negative inputs
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}

/// Computes the heading of travel from one point to another.
/// Coincident points (in the ground plane) have a heading of 0.
pub fn heading_between(from: Point3d, to: Point3d) -> f64 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx == 0.0 && dz == 0.0 {
        return 0.0;
    }
    normalize_heading(f64::atan2(dx, -dz).to_degrees())
}

/// The signed turn in degrees, in [-180, 180], that takes `from` to `to`
/// the short way round.
pub fn shortest_turn(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Interpolates between two headings along the shortest arc.
///
/// # Parameters
/// * `start` - The heading when `t` is zero
/// * `end` - The heading when `t` is one
/// * `t` - The interpolation factor, normally in [0, 1]
pub fn lerp_heading(start: f64, end: f64, t: f64) -> f64 {
    normalize_heading(start + t * shortest_turn(start, end))
}
