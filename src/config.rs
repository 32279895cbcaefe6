use crate::error::{TrafficError, TrafficResult};
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The number of spawn-rate time slices in one simulation session.
pub const SLICES_PER_SESSION: usize = 60;

/// Conversion factor from miles per hour to metres per second.
pub const MPH_TO_MPS: f64 = 0.44704;

/// The lowest speed ratio a segment may report.
pub const MIN_SPEED_RATIO: f64 = 0.01;

/// Vehicles never travel slower than this, even on segments reporting no flow.
pub const MIN_VEHICLE_SPEED: f64 = 0.5; // m/s

/// The tunable parameters of a [Simulation](crate::Simulation).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SimulationConfig {
    /// The maximum number of live vehicles.
    pub max_vehicles: usize,
    /// The soft (`min`) and hard (`max`) load caps, as fractions of `max_vehicles`.
    /// Spawning is throttled linearly between the two and suppressed above the hard cap.
    pub load_caps: Interval<f64>,
    /// Multiplier applied to every segment spawn rate.
    pub spawn_amplification: f64,
    /// Bounds on the sampled trip length, in m.
    pub trip_length: Interval<f64>,
    /// The mean of the log-normal trip length distribution, in m.
    pub trip_length_mean: f64,
    /// The shape parameter of the log-normal trip length distribution.
    pub trip_length_sigma: f64,
    /// A route is viable if its length is at least this fraction of the target trip length.
    pub route_viability: f64,
    /// The number of shortest viable routes to choose among.
    pub route_candidates: usize,
    /// The maximum segment transitions a vehicle may make in one frame.
    pub max_transitions_per_frame: usize,
    /// Seed for the random number generator; `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_vehicles: 5000,
            load_caps: Interval::new(0.7, 0.95),
            spawn_amplification: 2.0,
            trip_length: Interval::new(200.0, 2500.0),
            trip_length_mean: 800.0,
            trip_length_sigma: 0.5,
            route_viability: 0.8,
            route_candidates: 5,
            max_transitions_per_frame: 5,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Checks that the parameters are usable.
    pub fn validate(&self) -> TrafficResult<()> {
        let fail = |msg: &str| Err(TrafficError::Config(msg.to_owned()));
        let caps = self.load_caps;
        if self.max_vehicles == 0 {
            return fail("max_vehicles must be positive");
        }
        if !(caps.min > 0.0 && caps.min < caps.max && caps.max <= 1.0) {
            return fail("load caps must satisfy 0 < soft < hard <= 1");
        }
        if !(self.spawn_amplification > 0.0 && self.spawn_amplification.is_finite()) {
            return fail("spawn_amplification must be positive");
        }
        if !(self.trip_length.min > 0.0 && self.trip_length.is_valid()) {
            return fail("trip_length must be a non-empty positive interval");
        }
        if !(self.trip_length_mean > 0.0 && self.trip_length_sigma > 0.0) {
            return fail("trip length distribution parameters must be positive");
        }
        if self.route_candidates == 0 {
            return fail("route_candidates must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad = [
            SimulationConfig {
                max_vehicles: 0,
                ..Default::default()
            },
            SimulationConfig {
                load_caps: Interval::new(0.95, 0.7),
                ..Default::default()
            },
            SimulationConfig {
                trip_length: Interval::new(500.0, 100.0),
                ..Default::default()
            },
            SimulationConfig {
                trip_length_sigma: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                spawn_amplification: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(TrafficError::Config(_))));
        }
    }
}
