use crate::config::MIN_VEHICLE_SPEED;
use crate::math::Point3d;
use crate::network::RoadNetwork;
use crate::route::RouteTemplate;
use crate::segment::RoadSegment;
use crate::{SegmentId, VehicleId};
#[cfg(feature = "serde")]
use serde::Serialize;
use std::rc::Rc;

/// Slack allowed when deciding whether a trip has reached its target length.
const COMPLETION_TOLERANCE: f64 = 1e-6; // m

/// A simulated vehicle, following a route template for one trip.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID.
    id: VehicleId,
    /// The route being followed.
    route: Rc<RouteTemplate>,
    /// The index of the current segment within the route.
    route_idx: usize,
    /// The fraction of the current segment travelled, in [0, 1].
    progress: f64,
    /// The speed in m/s.
    speed: f64,
    /// The speed ratio of the current segment.
    speed_ratio: f64,
    /// Distance travelled since spawning, in m.
    traveled: f64,
    /// The distance after which the trip is complete, in m.
    target: f64,
    /// The world space coordinates of the vehicle.
    position: Point3d,
    /// The heading in degrees.
    heading: f64,
    /// Set once the vehicle should be removed from the simulation.
    despawn: Option<DespawnReason>,
}

/// Why a vehicle left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DespawnReason {
    /// The vehicle travelled its target distance.
    Completed,
    /// The vehicle reached the end of its route before its target distance.
    EndOfRoute,
    /// The vehicle's segment is missing from the road network.
    MissingSegment,
}

/// The result of a [Vehicle::advance] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AdvanceOutcome {
    /// The number of segment boundaries crossed.
    pub transitions: usize,
    /// Whether the transition limit was reached.
    pub capped: bool,
    /// The distance left untravelled because the transition limit was reached, in m.
    pub discarded: f64,
}

/// An independent copy of a vehicle's externally visible state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "camelCase"))]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    /// The segment the vehicle is on.
    pub segment_id: SegmentId,
    /// The world space coordinates of the vehicle.
    pub position: Point3d,
    /// Fraction of the trip completed, in [0, 1].
    pub route_progress: f64,
    /// The speed ratio of the current segment, in (0, 1].
    pub speed_ratio: f64,
    /// The speed in m/s.
    pub speed: f64,
    /// Distance travelled since spawning, in m.
    pub traveled_meters: f64,
    /// The heading in degrees, in [0, 360).
    pub heading: f64,
}

impl Vehicle {
    /// Creates a new vehicle at the start of its route.
    ///
    /// # Parameters
    /// * `id` - The vehicle's ID
    /// * `route` - The route to follow
    /// * `target` - The trip length in m, clamped to the length of the route
    /// * `segment` - The first segment of the route
    pub(crate) fn new(
        id: VehicleId,
        route: Rc<RouteTemplate>,
        target: f64,
        segment: &RoadSegment,
    ) -> Self {
        let target = f64::min(target.max(0.0), route.total_length());
        let mut vehicle = Self {
            id,
            route,
            route_idx: 0,
            progress: 0.0,
            speed: 0.0,
            speed_ratio: 1.0,
            traveled: 0.0,
            target,
            position: Point3d::new(0.0, 0.0, 0.0),
            heading: 0.0,
            despawn: None,
        };
        vehicle.adopt_segment(segment);
        vehicle.update_coords_on(segment);
        vehicle
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The route the vehicle is following.
    pub fn route(&self) -> &Rc<RouteTemplate> {
        &self.route
    }

    /// The index of the current segment within the route.
    pub fn route_idx(&self) -> usize {
        self.route_idx
    }

    /// The ID of the segment the vehicle is currently travelling on.
    pub fn segment_id(&self) -> &SegmentId {
        // The route index never moves past the last segment
        &self.route.segments()[self.route_idx]
    }

    /// The fraction of the current segment travelled, in [0, 1].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// The vehicle's speed in m/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    /// Distance travelled since spawning, in m.
    pub fn traveled(&self) -> f64 {
        self.traveled
    }

    /// The trip length in m.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// The coordinates in world space of the vehicle.
    pub fn position(&self) -> Point3d {
        self.position
    }

    /// The heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Why the vehicle is due to be removed, if it is.
    pub fn despawn_reason(&self) -> Option<DespawnReason> {
        self.despawn
    }

    /// Whether the vehicle is due to be removed.
    pub fn is_marked(&self) -> bool {
        self.despawn.is_some()
    }

    /// Fraction of the trip completed, in [0, 1].
    pub fn route_progress(&self) -> f64 {
        if self.target > 0.0 {
            (self.traveled / self.target).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Takes a snapshot of the vehicle's state.
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            segment_id: self.segment_id().clone(),
            position: self.position,
            route_progress: self.route_progress(),
            speed_ratio: self.speed_ratio,
            speed: self.speed,
            traveled_meters: self.traveled,
            heading: self.heading,
        }
    }

    /// Marks the vehicle for removal.
    pub(crate) fn mark(&mut self, reason: DespawnReason) {
        self.despawn.get_or_insert(reason);
    }

    /// Moves the vehicle along its route by its speed times `dt`,
    /// crossing at most `max_transitions` segment boundaries.
    ///
    /// Any distance remaining when the transition limit is reached is dropped.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds; must be finite and non-negative
    /// * `network` - The road network
    /// * `max_transitions` - The maximum number of segment boundaries to cross
    pub(crate) fn advance(
        &mut self,
        dt: f64,
        network: &RoadNetwork,
        max_transitions: usize,
    ) -> AdvanceOutcome {
        let mut outcome = AdvanceOutcome::default();
        if self.is_marked() {
            return outcome;
        }

        let mut remaining = self.speed * dt;
        loop {
            let length = match network.get(self.segment_id().as_str()) {
                Some(segment) => segment.length(),
                None => {
                    self.mark(DespawnReason::MissingSegment);
                    break;
                }
            };

            let to_end = (1.0 - self.progress) * length;
            if remaining < to_end {
                self.progress += remaining / length;
                self.traveled += remaining;
                break;
            }

            remaining -= to_end;
            self.traveled += to_end;
            self.progress = 1.0;

            if self.traveled + COMPLETION_TOLERANCE >= self.target {
                self.mark(DespawnReason::Completed);
                break;
            }
            if outcome.transitions >= max_transitions {
                outcome.capped = true;
                outcome.discarded = remaining;
                break;
            }
            if !self.enter_next_segment(network) {
                break;
            }
            outcome.transitions += 1;
        }

        self.progress = self.progress.clamp(0.0, 1.0);
        outcome
    }

    /// Moves the vehicle onto the next segment of its route.
    /// Returns `false` and marks the vehicle if that isn't possible.
    fn enter_next_segment(&mut self, network: &RoadNetwork) -> bool {
        let next_idx = self.route_idx + 1;
        let next = match self.route.segment(next_idx) {
            Some(id) => id,
            None => {
                self.mark(DespawnReason::EndOfRoute);
                return false;
            }
        };
        match network.get(next.as_str()) {
            Some(segment) => {
                self.route_idx = next_idx;
                self.progress = 0.0;
                self.adopt_segment(segment);
                true
            }
            None => {
                self.mark(DespawnReason::MissingSegment);
                false
            }
        }
    }

    /// Takes on the speed of the given segment.
    fn adopt_segment(&mut self, segment: &RoadSegment) {
        self.speed = f64::max(segment.avg_speed(), MIN_VEHICLE_SPEED);
        self.speed_ratio = segment.speed_ratio();
    }

    /// Updates the vehicle's world coordinates.
    pub(crate) fn update_coords(&mut self, network: &RoadNetwork) {
        if self.is_marked() {
            return;
        }
        match network.get(self.segment_id().as_str()) {
            Some(segment) => self.update_coords_on(segment),
            None => self.mark(DespawnReason::MissingSegment),
        }
    }

    fn update_coords_on(&mut self, segment: &RoadSegment) {
        let (position, heading) = segment.sample(self.progress);
        self.position = position;
        self.heading = heading;
    }
}
