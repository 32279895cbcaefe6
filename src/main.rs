use itertools::Itertools;
use std::time::{Duration, Instant};
use trip_traffic::{
    EnumerateOptions, RoadNetwork, RoadType, RouteCatalog, SegmentAttributes, SegmentId,
    Simulation, SimulationConfig, TrafficResult, SLICES_PER_SESSION,
};

/// The number of intersections along each side of the grid.
const GRID_SIZE: i32 = 16;

/// The distance between neighbouring intersections.
const BLOCK_LENGTH: f64 = 100.0; // m

/// Avenues run along every this many rows and columns.
const AVENUE_SPACING: i32 = 4;

/// The spawn rate of every entry segment.
const SPAWN_RATE: f64 = 1.0; // vehicles/slice

/// Frames simulated per time slice.
const FRAMES_PER_SLICE: usize = 60;

/// The time step of each frame.
const DT: f64 = 1.0 / 60.0; // s

type Node = (i32, i32);

fn main() -> TrafficResult<()> {
    let network = grid_network(GRID_SIZE);
    for failure in network.report().failures() {
        println!("Warning: {failure}");
    }
    let routes = RouteCatalog::enumerate(&network, &EnumerateOptions::default());
    println!(
        "Built {} segments and {} routes",
        network.len(),
        routes.len()
    );

    let config = SimulationConfig {
        seed: Some(1),
        ..Default::default()
    };
    let mut sim = Simulation::new(network, routes, config)?;

    println!("Simulating...");
    let frames_per_session = (SLICES_PER_SESSION * FRAMES_PER_SLICE) as f64;
    let mut total = Duration::ZERO;
    for slice in 0..SLICES_PER_SESSION {
        let mut spawned = 0;
        let mut despawned = 0;
        let start = Instant::now();
        for i in 0..FRAMES_PER_SLICE {
            let frame = slice * FRAMES_PER_SLICE + i;
            sim.update(frame as f64 / frames_per_session, DT);
            spawned += sim.frame_stats().spawned;
            despawned += sim.frame_stats().despawned();
        }
        let elapsed = start.elapsed();
        total += elapsed;
        println!(
            "Slice {:2}: avg. frame {:?} ({} vehs, +{} -{})",
            slice,
            elapsed / FRAMES_PER_SLICE as u32,
            sim.vehicle_count(),
            spawned,
            despawned,
        );
    }

    let frame = total / (SLICES_PER_SESSION * FRAMES_PER_SLICE) as u32;
    println!(
        "Avg. frame: {:?} --> {:.0}x real time",
        frame,
        DT / frame.as_secs_f64()
    );
    Ok(())
}

/// Builds a square grid of two-way streets, entered from its edges.
fn grid_network(size: i32) -> RoadNetwork {
    let attribs = (0..size)
        .cartesian_product(0..size)
        .flat_map(|a| neighbours(a, size).map(move |b| (a, b)))
        .map(|(a, b)| {
            let avenue = if a.1 == b.1 {
                a.1 % AVENUE_SPACING == 0
            } else {
                a.0 % AVENUE_SPACING == 0
            };
            let (road_type, avg_speed_mph, free_flow_speed_mph) = if avenue {
                (RoadType::Avenue, 24.0, 35.0)
            } else {
                (RoadType::Street, 15.0, 25.0)
            };
            let is_entry = on_boundary(a, size) && !on_boundary(b, size);
            SegmentAttributes {
                id: segment_id(a, b),
                road_type,
                points: vec![node_position(a), node_position(b)],
                avg_speed_mph,
                free_flow_speed_mph,
                spawn_rates: if is_entry {
                    vec![SPAWN_RATE; SLICES_PER_SESSION]
                } else {
                    vec![]
                },
                is_major: avenue,
                is_entry,
                // No U-turns
                successors: neighbours(b, size)
                    .filter(|c| *c != a)
                    .map(|c| segment_id(b, c))
                    .collect(),
                predecessors: neighbours(a, size)
                    .filter(|c| *c != b)
                    .map(|c| segment_id(c, a))
                    .collect(),
                ..Default::default()
            }
        })
        .collect::<Vec<_>>();
    RoadNetwork::from_attributes(&attribs)
}

fn neighbours((i, j): Node, size: i32) -> impl Iterator<Item = Node> {
    [(i + 1, j), (i - 1, j), (i, j + 1), (i, j - 1)]
        .into_iter()
        .filter(move |(x, z)| (0..size).contains(x) && (0..size).contains(z))
}

fn on_boundary((i, j): Node, size: i32) -> bool {
    i == 0 || j == 0 || i == size - 1 || j == size - 1
}

fn node_position((i, j): Node) -> [f64; 3] {
    // North is towards negative z
    [i as f64 * BLOCK_LENGTH, 0.0, -j as f64 * BLOCK_LENGTH]
}

fn segment_id(a: Node, b: Node) -> SegmentId {
    SegmentId::new(format!("{}_{}-{}_{}", a.0, a.1, b.0, b.1))
}
