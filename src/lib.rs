pub use cgmath;
pub use config::{SimulationConfig, MIN_VEHICLE_SPEED, MPH_TO_MPS, SLICES_PER_SESSION};
pub use error::{TrafficError, TrafficResult};
pub use fleet::Fleet;
pub use network::{NetworkReport, RoadNetwork};
pub use route::{EnumerateOptions, RouteCatalog, RouteSelector, RouteTemplate};
pub use segment::{RoadSegment, RoadType, SegmentAttributes};
pub use simulation::{FrameStats, Simulation};
pub use spawn::SpawnScheduler;
pub use util::Interval;
pub use vehicle::{DespawnReason, Vehicle, VehicleSnapshot};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

mod config;
mod error;
mod fleet;
#[cfg(feature = "serde")]
pub mod io;
pub mod math;
mod network;
mod route;
mod segment;
mod simulation;
mod spawn;
mod util;
mod vehicle;

/// Unique ID of a [RoadSegment], as assigned by the map data.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct SegmentId(String);

/// Unique ID of a [Vehicle] within a single [Simulation].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VehicleId(pub u64);

impl SegmentId {
    /// Creates a segment ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gets the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SegmentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SegmentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SegmentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
