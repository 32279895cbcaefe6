use crate::config::{MIN_SPEED_RATIO, MPH_TO_MPS};
use crate::math::{lerp_heading, normalize_heading, Point3d, Polyline};
use crate::SegmentId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The class of road a segment belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RoadType {
    Highway,
    Avenue,
    Street,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Other,
}

/// The attributes of a road segment, as produced by the map data pipeline.
#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SegmentAttributes {
    /// The segment ID.
    pub id: SegmentId,
    /// The road class.
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub road_type: RoadType,
    /// The centre line, as `[x, y, z]` triples in m.
    pub points: Vec<[f64; 3]>,
    /// The average observed speed in mph.
    pub avg_speed_mph: f64,
    /// The free-flow speed in mph.
    pub free_flow_speed_mph: f64,
    /// The expected number of trips starting here in each time slice.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spawn_rates: Vec<f64>,
    /// The length in m; derived from `points` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_meters: Option<f64>,
    /// The heading at the start in degrees; derived from `points` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_heading_deg: Option<f64>,
    /// The heading at the end in degrees; derived from `points` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub end_heading_deg: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_major: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_entry: bool,
    /// Segments that may be entered from the end of this one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub successors: Vec<SegmentId>,
    /// Segments whose end leads onto this one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub predecessors: Vec<SegmentId>,
}

/// A directed piece of road between two intersections.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    /// The segment ID.
    id: SegmentId,
    /// The road class.
    road_type: RoadType,
    /// The geometry of the segment.
    polyline: Polyline,
    /// Length in m.
    length: f64,
    /// Average speed in m/s.
    avg_speed: f64,
    /// Free-flow speed in m/s.
    free_flow_speed: f64,
    /// Average speed over free-flow speed, in (0, 1].
    speed_ratio: f64,
    /// Heading at the start, in degrees.
    start_heading: f64,
    /// Heading at the end, in degrees.
    end_heading: f64,
    is_major: bool,
    is_entry: bool,
    /// The segments that succeed this one.
    successors: SmallVec<[SegmentId; 4]>,
    /// The segments that precede this one.
    predecessors: SmallVec<[SegmentId; 4]>,
    /// Expected trip starts per time slice.
    spawn_rates: Vec<f64>,
}

impl RoadSegment {
    /// Creates a new road segment, deriving whatever the attributes leave out.
    pub fn new(attribs: &SegmentAttributes) -> Self {
        let polyline = Polyline::new(attribs.points.iter().copied().map(Point3d::from).collect());
        let avg_speed = f64::max(attribs.avg_speed_mph, 0.0) * MPH_TO_MPS;
        let free_flow_speed = f64::max(attribs.free_flow_speed_mph, 0.0) * MPH_TO_MPS;
        let speed_ratio = if free_flow_speed > 0.0 {
            (avg_speed / free_flow_speed).clamp(MIN_SPEED_RATIO, 1.0)
        } else {
            1.0
        };
        let length = attribs
            .length_meters
            .filter(|len| len.is_finite() && *len >= 0.0)
            .unwrap_or_else(|| polyline.length());
        let start_heading = attribs
            .start_heading_deg
            .or_else(|| polyline.start_heading())
            .map_or(0.0, normalize_heading);
        let end_heading = attribs
            .end_heading_deg
            .or_else(|| polyline.end_heading())
            .map_or(start_heading, normalize_heading);

        Self {
            id: attribs.id.clone(),
            road_type: attribs.road_type,
            polyline,
            length,
            avg_speed,
            free_flow_speed,
            speed_ratio,
            start_heading,
            end_heading,
            is_major: attribs.is_major,
            is_entry: attribs.is_entry,
            successors: attribs.successors.iter().cloned().collect(),
            predecessors: attribs.predecessors.iter().cloned().collect(),
            spawn_rates: attribs.spawn_rates.clone(),
        }
    }

    /// Gets the segment ID.
    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn road_type(&self) -> RoadType {
        self.road_type
    }

    /// The geometry of the segment.
    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    /// Gets the length of the segment in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The average speed in m/s.
    pub fn avg_speed(&self) -> f64 {
        self.avg_speed
    }

    /// The free-flow speed in m/s.
    pub fn free_flow_speed(&self) -> f64 {
        self.free_flow_speed
    }

    /// The average speed as a fraction of the free-flow speed, in (0, 1].
    pub fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    /// The heading at the start of the segment, in degrees [0, 360).
    pub fn start_heading(&self) -> f64 {
        self.start_heading
    }

    /// The heading at the end of the segment, in degrees [0, 360).
    pub fn end_heading(&self) -> f64 {
        self.end_heading
    }

    pub fn is_major(&self) -> bool {
        self.is_major
    }

    /// Whether trips may originate on this segment.
    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    /// Gets the successor segments.
    pub fn successors(&self) -> &[SegmentId] {
        &self.successors
    }

    /// Gets the predecessor segments.
    pub fn predecessors(&self) -> &[SegmentId] {
        &self.predecessors
    }

    /// The expected number of trip starts in the given time slice.
    /// Slices beyond the end of the rate table have no spawns.
    pub fn spawn_rate(&self, slice: usize) -> f64 {
        self.spawn_rates.get(slice).copied().unwrap_or(0.0)
    }

    /// Samples the position and heading at a fraction of the way along the segment.
    pub fn sample(&self, progress: f64) -> (Point3d, f64) {
        let pos = self.polyline.sample(progress);
        let heading = lerp_heading(self.start_heading, self.end_heading, progress.clamp(0.0, 1.0));
        (pos, heading)
    }
}
