use crate::config::{SimulationConfig, SLICES_PER_SESSION};
use crate::error::TrafficResult;
use crate::fleet::Fleet;
use crate::network::RoadNetwork;
use crate::route::{RouteCatalog, RouteSelector, RouteTemplate};
use crate::spawn::SpawnScheduler;
use crate::vehicle::{DespawnReason, Vehicle, VehicleSnapshot};
use crate::{SegmentId, VehicleId};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

/// A trip-based traffic simulation.
///
/// Vehicles are spawned on entry segments at the start of each time slice, follow one
/// precomputed route for a randomly chosen distance, and are then removed.
pub struct Simulation<R: Rng = StdRng> {
    /// The road network.
    network: Rc<RoadNetwork>,
    /// The routes vehicles may follow.
    routes: Rc<RouteCatalog>,
    /// The simulation parameters.
    config: SimulationConfig,
    /// The segments vehicles are spawned on, in sorted order.
    entries: Rc<[SegmentId]>,
    /// Decides how many vehicles to spawn.
    scheduler: SpawnScheduler,
    /// Decides which route each new vehicle follows.
    selector: RouteSelector,
    /// The vehicles being simulated.
    fleet: Fleet,
    /// The random number source.
    rng: R,
    /// The time slice of the previous update, if there has been one.
    slice: Option<usize>,
    /// The ID of the next vehicle to be spawned.
    next_id: u64,
    /// The current frame of simulation.
    frame: usize,
    /// Statistics about the previous update.
    stats: FrameStats,
}

/// Counters describing what happened during one call to [Simulation::update].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// The number of vehicles advanced.
    pub moved: usize,
    /// The number of segment boundaries crossed.
    pub transitions: usize,
    /// The number of vehicles spawned.
    pub spawned: usize,
    /// The number of vehicles which completed their trip.
    pub completed: usize,
    /// The number of vehicles which ran off the end of their route.
    pub end_of_route: usize,
    /// The number of vehicles removed because their segment was missing.
    pub missing_segment: usize,
    /// The number of vehicles which reached the per-frame transition limit.
    pub capped: usize,
    /// The total distance dropped by vehicles reaching the transition limit, in m.
    pub discarded_meters: f64,
}

impl FrameStats {
    /// The total number of vehicles removed.
    pub fn despawned(&self) -> usize {
        self.completed + self.end_of_route + self.missing_segment
    }
}

impl Simulation<StdRng> {
    /// Creates a new simulation, seeded from `config.seed` if given.
    ///
    /// # Parameters
    /// * `network` - The road network
    /// * `routes` - The routes available from each entry segment
    /// * `config` - The simulation parameters
    pub fn new(
        network: impl Into<Rc<RoadNetwork>>,
        routes: impl Into<Rc<RouteCatalog>>,
        config: SimulationConfig,
    ) -> TrafficResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(network, routes, config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Creates a new simulation which draws random numbers from `rng`.
    /// The `seed` field of `config` is ignored.
    pub fn with_rng(
        network: impl Into<Rc<RoadNetwork>>,
        routes: impl Into<Rc<RouteCatalog>>,
        config: SimulationConfig,
        rng: R,
    ) -> TrafficResult<Self> {
        config.validate()?;
        let network = network.into();
        let routes = routes.into();
        let selector = RouteSelector::new(&config)?;

        let entries = routes
            .entry_ids()
            .filter(|id| {
                let known = network.contains(id.as_str());
                if !known {
                    warn!("Entry segment {id} is not in the road network; skipping it");
                }
                known
            })
            .cloned()
            .collect::<Rc<[SegmentId]>>();

        debug!(
            "Created simulation with {} segments, {} entry segments and {} routes",
            network.len(),
            entries.len(),
            routes.len()
        );

        Ok(Self {
            network,
            routes,
            scheduler: SpawnScheduler::new(&config),
            selector,
            entries,
            fleet: Fleet::with_capacity(config.max_vehicles),
            config,
            rng,
            slice: None,
            next_id: 0,
            frame: 0,
            stats: FrameStats::default(),
        })
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Moves every vehicle, removes those which have finished, and then, if `time` falls
    /// in a different time slice to the previous call, spawns new vehicles.
    ///
    /// # Parameters
    /// * `time` - The simulation time as a fraction of the session; only the fractional
    ///   part is used
    /// * `dt` - The time step in seconds; negative or non-finite values are treated as zero
    pub fn update(&mut self, time: f64, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut stats = FrameStats::default();

        self.advance_vehicles(dt, &mut stats);
        self.despawn_vehicles(&mut stats);

        let slice = slice_index(time);
        if self.slice != Some(slice) {
            self.slice = Some(slice);
            stats.spawned = self.on_slice_transition(slice);
        }

        self.frame += 1;
        self.stats = stats;
    }

    /// Takes a snapshot of every live vehicle.
    pub fn vehicles(&self) -> Vec<VehicleSnapshot> {
        self.fleet.iter().map(Vehicle::snapshot).collect()
    }

    /// The number of live vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.fleet.len()
    }

    /// The IDs of the segments vehicles are spawned on.
    pub fn entry_segment_ids(&self) -> &[SegmentId] {
        &self.entries
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.fleet.iter()
    }

    /// Gets a reference to the vehicle with the given ID, if it is still live.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.fleet.get(vehicle_id)
    }

    /// Spawns a vehicle on the given entry segment, choosing its route and trip length
    /// as scheduled spawns do. Returns `None` if the vehicle budget is exhausted
    /// or the segment has no routes.
    pub fn spawn_vehicle(&mut self, entry: &str) -> Option<VehicleId> {
        if self.fleet.len() >= self.config.max_vehicles {
            return None;
        }
        let routes = self.routes.routes(entry);
        let (route, target) = self.selector.select(routes, &mut self.rng)?;
        self.insert_vehicle(route, target)
    }

    /// Spawns a vehicle on a specific route.
    ///
    /// # Parameters
    /// * `entry` - The entry segment the route starts on
    /// * `route_idx` - The index of the route among those starting on `entry`
    /// * `target` - The trip length in m, clamped to the length of the route
    pub fn spawn_on_route(
        &mut self,
        entry: &str,
        route_idx: usize,
        target: f64,
    ) -> Option<VehicleId> {
        let route = self.routes.routes(entry).get(route_idx)?.clone();
        self.insert_vehicle(route, target)
    }

    /// Gets the statistics of the previous update.
    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Gets the time slice of the previous update.
    pub fn current_slice(&self) -> Option<usize> {
        self.slice
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the road network.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Gets the route catalog.
    pub fn routes(&self) -> &RouteCatalog {
        &self.routes
    }

    /// Gets the simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Moves every vehicle along its route and updates its world coordinates.
    fn advance_vehicles(&mut self, dt: f64, stats: &mut FrameStats) {
        let max_transitions = self.config.max_transitions_per_frame;
        for vehicle in self.fleet.iter_mut() {
            let outcome = vehicle.advance(dt, &self.network, max_transitions);
            vehicle.update_coords(&self.network);
            stats.moved += 1;
            stats.transitions += outcome.transitions;
            if outcome.capped {
                trace!(
                    "Vehicle {} hit the transition limit, dropping {:.3} m",
                    vehicle.id(),
                    outcome.discarded
                );
                stats.capped += 1;
                stats.discarded_meters += outcome.discarded;
            }
        }
    }

    /// Removes the vehicles which have been marked for despawning.
    fn despawn_vehicles(&mut self, stats: &mut FrameStats) {
        self.fleet.despawn_marked(|vehicle| {
            let reason = vehicle.despawn_reason();
            match reason {
                Some(DespawnReason::Completed) => stats.completed += 1,
                Some(DespawnReason::EndOfRoute) => stats.end_of_route += 1,
                Some(DespawnReason::MissingSegment) => {
                    warn!(
                        "Vehicle {} is on segment {}, which is not in the road network",
                        vehicle.id(),
                        vehicle.segment_id()
                    );
                    stats.missing_segment += 1;
                }
                None => {}
            }
            trace!(
                "Despawned vehicle {} after {:.1} m ({:?})",
                vehicle.id(),
                vehicle.traveled(),
                reason
            );
        });
    }

    /// Spawns vehicles on every entry segment at the start of a time slice.
    /// Returns the number of vehicles spawned.
    fn on_slice_transition(&mut self, slice: usize) -> usize {
        let max = self.config.max_vehicles;
        let live = self.fleet.len();
        let scale = match self.scheduler.spawn_scale(live, max) {
            Some(scale) => scale,
            None => {
                debug!("Slice {slice}: {live}/{max} vehicles, spawning suppressed");
                return 0;
            }
        };

        let entries = Rc::clone(&self.entries);
        let mut spawned = 0;
        'entries: for entry in entries.iter() {
            let rate = match self.network.get(entry.as_str()) {
                Some(segment) => segment.spawn_rate(slice),
                None => continue,
            };
            let count = self.scheduler.spawn_count(rate, scale, &mut self.rng);
            for _ in 0..count {
                if self.fleet.len() >= max {
                    break 'entries;
                }
                if self.spawn_vehicle(entry.as_str()).is_some() {
                    spawned += 1;
                }
            }
        }

        debug!(
            "Slice {slice}: {live}/{max} vehicles, spawn scale {scale:.3}, spawned {spawned}"
        );
        spawned
    }

    /// Adds a vehicle following `route` to the simulation.
    fn insert_vehicle(&mut self, route: Rc<RouteTemplate>, target: f64) -> Option<VehicleId> {
        if self.fleet.len() >= self.config.max_vehicles {
            return None;
        }
        let first = route.segment(0)?;
        let segment = match self.network.get(first.as_str()) {
            Some(segment) => segment,
            None => {
                warn!("Route from {} starts on unknown segment {first}", route.entry());
                return None;
            }
        };

        let id = VehicleId(self.next_id);
        self.next_id += 1;
        let vehicle = Vehicle::new(id, route, target, segment);
        trace!(
            "Spawned vehicle {id} on {} with a {:.1} m trip",
            vehicle.segment_id(),
            vehicle.target()
        );
        self.fleet.push(vehicle);
        Some(id)
    }
}

/// Maps a simulation time onto a time slice in `0..SLICES_PER_SESSION`.
/// Only the fractional part of `time` is used.
pub fn slice_index(time: f64) -> usize {
    if !time.is_finite() {
        return 0;
    }
    let frac = time - time.floor();
    let idx = (frac * SLICES_PER_SESSION as f64) as usize;
    idx.min(SLICES_PER_SESSION - 1)
}
