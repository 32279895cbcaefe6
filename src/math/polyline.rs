use super::{heading_between, horizontal_distance, lerp_point, Point3d};
use itertools::Itertools;

/// An ordered sequence of points, parameterised by horizontal arc length.
#[derive(Clone, Debug, Default)]
pub struct Polyline {
    points: Vec<Point3d>,
    /// Arc length from the first point to each point, in m.
    dists: Vec<f64>,
}

impl Polyline {
    /// Creates a new polyline from its vertices.
    pub fn new(points: Vec<Point3d>) -> Self {
        let dists = std::iter::once(0.0)
            .chain(
                points
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| horizontal_distance(*a, *b))
                    .scan(0.0, |acc, len| {
                        *acc += len;
                        Some(*acc)
                    }),
            )
            .take(points.len())
            .collect();
        Self { points, dists }
    }

    /// The length of the polyline in m.
    pub fn length(&self) -> f64 {
        self.dists.last().copied().unwrap_or(0.0)
    }

    /// The heading of the first leg, if there is one.
    pub fn start_heading(&self) -> Option<f64> {
        match self.points.as_slice() {
            [a, b, ..] => Some(heading_between(*a, *b)),
            _ => None,
        }
    }

    /// The heading of the last leg, if there is one.
    pub fn end_heading(&self) -> Option<f64> {
        match self.points.as_slice() {
            [.., a, b] => Some(heading_between(*a, *b)),
            _ => None,
        }
    }

    /// Samples the point at the given fraction of the polyline's length.
    ///
    /// # Parameters
    /// * `fraction` - The fraction of the length, clamped to [0, 1]
    pub fn sample(&self, fraction: f64) -> Point3d {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Point3d::new(0.0, 0.0, 0.0),
        };
        let length = self.length();
        if length <= 0.0 || !fraction.is_finite() {
            return first;
        }

        let target = fraction.clamp(0.0, 1.0) * length;
        let end = self.dists.partition_point(|d| *d <= target);
        if end >= self.points.len() {
            return last;
        }
        let start = end.saturating_sub(1);
        let leg = self.dists[end] - self.dists[start];
        let t = if leg > 0.0 {
            (target - self.dists[start]) / leg
        } else {
            0.0
        };
        lerp_point(self.points[start], self.points[end], t)
    }
}
