//! Road networks shared by the integration tests.

#![allow(dead_code)]

use trip_traffic::{
    RoadNetwork, RouteCatalog, RouteTemplate, SegmentAttributes, SegmentId, Simulation,
    SimulationConfig, SLICES_PER_SESSION,
};

/// Speeds used on every test segment, in mph.
pub const AVG_SPEED_MPH: f64 = 20.0;
pub const FREE_FLOW_SPEED_MPH: f64 = 30.0;

/// The speed of vehicles on test segments, in m/s.
pub const SPEED: f64 = AVG_SPEED_MPH * 0.44704;

/// The lengths of the segments in each chain of [city].
pub const CITY_CHAIN: [f64; 7] = [120.0, 80.0, 150.0, 60.0, 200.0, 90.0, 110.0];

/// Creates a chain of segments named `{prefix}0`, `{prefix}1`, ..., entered at the first.
///
/// The chain zigzags: even segments head east and odd segments head north.
pub fn chain(prefix: &str, lengths: &[f64], spawn_rate: f64) -> Vec<SegmentAttributes> {
    let id = |i: usize| SegmentId::new(format!("{prefix}{i}"));
    let mut pos = [0.0, 0.0, 0.0];
    lengths
        .iter()
        .enumerate()
        .map(|(i, len)| {
            let start = pos;
            if i % 2 == 0 {
                pos[0] += len;
            } else {
                pos[2] -= len;
            }
            SegmentAttributes {
                id: id(i),
                points: vec![start, pos],
                avg_speed_mph: AVG_SPEED_MPH,
                free_flow_speed_mph: FREE_FLOW_SPEED_MPH,
                spawn_rates: if i == 0 {
                    vec![spawn_rate; SLICES_PER_SESSION]
                } else {
                    vec![]
                },
                is_entry: i == 0,
                successors: (i + 1 < lengths.len())
                    .then(|| id(i + 1))
                    .into_iter()
                    .collect(),
                predecessors: i.checked_sub(1).map(id).into_iter().collect(),
                ..Default::default()
            }
        })
        .collect()
}

/// Creates a route through the named segments.
pub fn route(network: &RoadNetwork, ids: &[&str]) -> RouteTemplate {
    let ids = ids.iter().copied().map(SegmentId::from).collect();
    RouteTemplate::new(ids, network).unwrap()
}

/// A single chain of `lengths` with one route along its full length.
pub fn single_chain(lengths: &[f64], spawn_rate: f64) -> (RoadNetwork, RouteCatalog) {
    let network = RoadNetwork::from_attributes(&chain("s", lengths, spawn_rate));
    let ids = (0..lengths.len()).map(|i| format!("s{i}")).collect::<Vec<_>>();
    let ids = ids.iter().map(String::as_str).collect::<Vec<_>>();
    let mut routes = RouteCatalog::new();
    routes.insert(route(&network, &ids));
    (network, routes)
}

/// Four separate chains, `a` to `d`, each with a long and a short route.
pub fn city(spawn_rate: f64) -> (RoadNetwork, RouteCatalog) {
    let attribs = ["a", "b", "c", "d"]
        .iter()
        .flat_map(|prefix| chain(prefix, &CITY_CHAIN, spawn_rate))
        .collect::<Vec<_>>();
    let network = RoadNetwork::from_attributes(&attribs);

    let mut routes = RouteCatalog::new();
    for prefix in ["a", "b", "c", "d"] {
        let ids = (0..CITY_CHAIN.len())
            .map(|i| format!("{prefix}{i}"))
            .collect::<Vec<_>>();
        let ids = ids.iter().map(String::as_str).collect::<Vec<_>>();
        routes.insert(route(&network, &ids));
        routes.insert(route(&network, &ids[..3]));
    }
    (network, routes)
}

/// Default parameters with a fixed seed and vehicle budget.
pub fn config(max_vehicles: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        max_vehicles,
        seed: Some(seed),
        ..Default::default()
    }
}

/// Runs the simulation for one whole session, calling `check` after every frame.
pub fn run_session(
    sim: &mut Simulation,
    frames_per_slice: usize,
    dt: f64,
    mut check: impl FnMut(&Simulation),
) {
    let frames = SLICES_PER_SESSION * frames_per_slice;
    for frame in 0..frames {
        sim.update(frame as f64 / frames as f64, dt);
        check(sim);
    }
}
