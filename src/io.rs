//! Loading road networks and route caches from JSON.

use crate::error::TrafficResult;
use crate::network::RoadNetwork;
use crate::route::{RouteCatalog, RouteTemplate};
use crate::segment::SegmentAttributes;
use crate::SegmentId;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

/// A road graph file.
#[derive(Deserialize)]
struct GraphFile {
    segments: Vec<SegmentAttributes>,
}

/// A route as stored in a route cache file.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteRecord {
    segment_sequence: Vec<SegmentId>,
    total_length_meters: f64,
    cumulative_distances: Vec<f64>,
}

/// Reads a road network from a graph file of the form `{ "segments": [...] }`.
/// Any other top level fields, such as `meta`, are ignored.
pub fn load_network<Rd: Read>(reader: Rd) -> TrafficResult<RoadNetwork> {
    let graph: GraphFile = serde_json::from_reader(reader)?;
    Ok(RoadNetwork::from_attributes(&graph.segments))
}

/// Reads a route cache, mapping each entry segment ID to a list of routes.
///
/// Every route must start on the entry segment it is listed under and have consistent
/// cumulative distances. Routes whose entry segment is missing from `network` are
/// dropped with a warning.
pub fn load_routes<Rd: Read>(reader: Rd, network: &RoadNetwork) -> TrafficResult<RouteCatalog> {
    let records: BTreeMap<SegmentId, Vec<RouteRecord>> = serde_json::from_reader(reader)?;
    let mut catalog = RouteCatalog::new();
    let mut skipped = 0;

    for (entry, routes) in records {
        if !network.contains(entry.as_str()) {
            warn!("Route cache entry {entry} is not in the road network");
            skipped += routes.len();
            continue;
        }
        for record in routes {
            let route = RouteTemplate::from_parts(
                entry.clone(),
                record.segment_sequence,
                record.total_length_meters,
                record.cumulative_distances,
            )?;
            catalog.insert(route);
        }
    }

    debug!(
        "Loaded {} routes ({} skipped) from {} entry segments",
        catalog.len(),
        skipped,
        catalog.entry_ids().count()
    );
    Ok(catalog)
}
