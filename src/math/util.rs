use super::{Point3d, Vector3d};
use cgmath::prelude::*;

/// Computes the distance between two points in the ground (XZ) plane, ignoring elevation.
pub fn horizontal_distance(a: Point3d, b: Point3d) -> f64 {
    let delta = b - a;
    Vector3d::new(delta.x, 0.0, delta.z).magnitude()
}

/// Linearly interpolates between two points.
///
/// # Parameters
/// * `a` - The point returned when `t` is zero
/// * `b` - The point returned when `t` is one
/// * `t` - The interpolation factor
pub fn lerp_point(a: Point3d, b: Point3d, t: f64) -> Point3d {
    a + (b - a) * t
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn elevation_is_ignored() {
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(3.0, 50.0, 4.0);
        assert_approx_eq!(horizontal_distance(a, b), 5.0);
    }

    #[test]
    fn lerp_midpoint() {
        let a = Point3d::new(0.0, 2.0, 10.0);
        let b = Point3d::new(10.0, 4.0, 0.0);
        let mid = lerp_point(a, b, 0.5);
        assert_eq!(mid, Point3d::new(5.0, 3.0, 5.0));
    }
}
