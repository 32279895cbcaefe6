//! End-to-end scenarios with known outcomes.

mod common;

use assert_approx_eq::assert_approx_eq;
use common::*;
use trip_traffic::{
    EnumerateOptions, RoadNetwork, RouteCatalog, RouteTemplate, SegmentId, Simulation,
};

/// A vehicle crossing a segment boundary in a single large step keeps the leftover distance.
#[test]
fn leftover_distance_carries_into_next_segment() {
    let (network, routes) = single_chain(&[100.0, 100.0, 100.0], 0.0);
    let mut sim = Simulation::new(network, routes, config(10, 1)).unwrap();
    sim.spawn_on_route("s0", 0, 300.0).unwrap();

    sim.update(0.0, 15.0);

    let vehicles = sim.vehicles();
    assert_eq!(vehicles.len(), 1);
    let veh = &vehicles[0];
    assert_approx_eq!(veh.traveled_meters, 15.0 * SPEED, 1e-6);
    assert!((100.0..200.0).contains(&veh.traveled_meters));
    assert_eq!(veh.segment_id.as_str(), "s1");
    // The second segment heads north from (100, 0, 0)
    assert_approx_eq!(veh.position.x, 100.0, 1e-6);
    assert_approx_eq!(veh.position.z, -(15.0 * SPEED - 100.0), 1e-6);
    assert_approx_eq!(veh.heading, 0.0, 1e-9);
    assert_approx_eq!(veh.route_progress, 15.0 * SPEED / 300.0, 1e-9);
    assert_approx_eq!(veh.speed_ratio, 20.0 / 30.0, 1e-9);
    assert_eq!(sim.frame_stats().transitions, 1);
}

/// Heavy demand never pushes the fleet over its budget.
#[test]
fn vehicle_budget_is_never_exceeded() {
    let (network, routes) = single_chain(&[500.0, 500.0, 500.0], 10.0);
    let mut sim = Simulation::new(network, routes, config(10, 2)).unwrap();
    let mut peak = 0;
    run_session(&mut sim, 3, 0.5, |sim| {
        assert!(sim.vehicle_count() <= 10);
        peak = peak.max(sim.vehicle_count());
    });
    assert!(peak > 0);
}

/// A trip exactly as long as its single-segment route ends at the segment end.
#[test]
fn short_trip_is_removed_on_completion() {
    let (network, routes) = single_chain(&[50.0], 0.0);
    let mut sim = Simulation::new(network, routes, config(10, 3)).unwrap();
    sim.spawn_on_route("s0", 0, 50.0).unwrap();
    assert_eq!(sim.vehicle_count(), 1);

    sim.update(0.0, 10.0);

    assert_eq!(sim.vehicle_count(), 0);
    assert_eq!(sim.frame_stats().completed, 1);
    assert!(sim.vehicles().is_empty());
}

/// A trip shorter than its route still ends at a segment boundary.
#[test]
fn trip_target_shorter_than_route() {
    let (network, routes) = single_chain(&[100.0, 100.0, 100.0], 0.0);
    let mut sim = Simulation::new(network, routes, config(10, 4)).unwrap();
    let id = sim.spawn_on_route("s0", 0, 150.0).unwrap();

    sim.update(0.0, 15.0);
    assert_eq!(sim.get_vehicle(id).unwrap().segment_id().as_str(), "s1");
    sim.update(0.0, 15.0);
    assert!(sim.get_vehicle(id).is_none());
    assert_eq!(sim.frame_stats().completed, 1);
}

/// A vehicle whose route leads onto a missing segment is removed without affecting others.
#[test]
fn missing_segment_removes_only_that_vehicle() {
    let (network, mut routes) = single_chain(&[100.0, 100.0], 0.0);
    let s0 = SegmentId::from("s0");
    routes.insert(
        RouteTemplate::from_parts(
            s0.clone(),
            vec![s0, "ghost".into()],
            200.0,
            vec![0.0, 100.0, 200.0],
        )
        .unwrap(),
    );
    let mut sim = Simulation::new(network, routes, config(10, 5)).unwrap();
    let good = sim.spawn_on_route("s0", 0, 200.0).unwrap();
    let bad = sim.spawn_on_route("s0", 1, 200.0).unwrap();

    sim.update(0.0, 15.0);

    assert!(sim.get_vehicle(bad).is_none());
    assert_eq!(sim.get_vehicle(good).unwrap().segment_id().as_str(), "s1");
    let stats = sim.frame_stats();
    assert_eq!(stats.missing_segment, 1);
    assert_eq!(stats.despawned(), 1);
}

/// Routes of many tiny segments are crossed a few segments per frame.
#[test]
fn transitions_per_frame_are_bounded() {
    let lengths = [0.01; 20];
    let (network, routes) = single_chain(&lengths, 0.0);
    let mut sim = Simulation::new(network, routes, config(10, 6)).unwrap();
    let id = sim.spawn_on_route("s0", 0, 1000.0).unwrap();

    sim.update(0.0, 1.0);
    let stats = sim.frame_stats();
    assert_eq!(stats.transitions, 5);
    assert_eq!(stats.capped, 1);
    assert!(stats.discarded_meters > SPEED - 0.1);
    assert_eq!(sim.get_vehicle(id).unwrap().segment_id().as_str(), "s5");

    sim.update(0.0, 1.0);
    sim.update(0.0, 1.0);
    assert_eq!(sim.get_vehicle(id).unwrap().segment_id().as_str(), "s15");
    sim.update(0.0, 1.0);
    assert!(sim.get_vehicle(id).is_none());
    assert_eq!(sim.frame_stats().completed, 1);
}

/// A segment with unusable geometry gets no routes, so nothing is ever spawned on it.
#[test]
fn broken_geometry_never_spawns() {
    let mut attribs = chain("s", &[300.0], 5.0);
    attribs[0].points[1][0] = f64::NAN;
    let network = RoadNetwork::from_attributes(&attribs);
    assert!(RouteTemplate::new(vec!["s0".into()], &network).is_err());
    let routes = RouteCatalog::enumerate(&network, &EnumerateOptions::default());
    assert!(routes.is_empty());

    let mut sim = Simulation::new(network, routes, config(10, 8)).unwrap();
    sim.update(0.0, 1.0);
    assert_eq!(sim.vehicle_count(), 0);
    assert!(sim.spawn_vehicle("s0").is_none());
    assert!(sim.spawn_on_route("s0", 0, 100.0).is_none());
}

/// Entry segments without routes, or missing from the network, never spawn vehicles.
#[test]
fn entries_need_routes() {
    let (network, routes) = single_chain(&[100.0, 100.0], 5.0);
    let mut orphaned = RouteCatalog::new();
    let ghost = SegmentId::from("ghost");
    orphaned.insert(
        RouteTemplate::from_parts(ghost.clone(), vec![ghost], 100.0, vec![0.0, 100.0]).unwrap(),
    );
    let mut sim = Simulation::new(network.clone(), orphaned, config(100, 7)).unwrap();
    assert!(sim.entry_segment_ids().is_empty());
    sim.update(0.0, 0.1);
    assert_eq!(sim.vehicle_count(), 0);

    let mut sim = Simulation::new(network, routes, config(100, 7)).unwrap();
    assert_eq!(sim.entry_segment_ids(), [SegmentId::from("s0")]);
    sim.update(0.0, 0.1);
    assert!(sim.vehicle_count() > 0);
}

/// Identically seeded simulations evolve identically.
#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let (network, routes) = city(1.5);
        let mut sim = Simulation::new(network, routes, config(200, 42)).unwrap();
        let mut history = vec![];
        run_session(&mut sim, 2, 0.75, |sim| history.push(sim.vehicles()));
        history
    };
    let a = run();
    assert!(a.iter().any(|frame| !frame.is_empty()));
    assert_eq!(a, run());
}
