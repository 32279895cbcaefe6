use crate::error::{TrafficError, TrafficResult};
use crate::network::RoadNetwork;
use crate::SegmentId;
use itertools::Itertools;
use log::{debug, warn};
use pathfinding::directed::dijkstra::{build_path, dijkstra_all};
use std::collections::BTreeMap;
use std::rc::Rc;

pub use selector::RouteSelector;

mod selector;

/// Relative tolerance when checking supplied cumulative distances.
const DISTANCE_TOLERANCE: f64 = 1e-3;

/// A precomputed chain of connected segments which a vehicle can follow.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteTemplate {
    /// The segment the route starts on.
    entry: SegmentId,
    /// The segments in order of travel.
    segments: Vec<SegmentId>,
    /// Distance from the start of the route to the start of each segment,
    /// followed by the total length, in m.
    cumulative: Vec<f64>,
}

/// Options for [RouteCatalog::enumerate].
#[derive(Clone, Copy, Debug)]
pub struct EnumerateOptions {
    /// The shortest route to keep, in m.
    pub min_length: f64,
    /// The longest route to keep, in m.
    pub max_length: f64,
    /// The maximum number of routes to keep for each entry segment.
    pub max_routes_per_entry: usize,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            min_length: 200.0,
            max_length: 2500.0,
            max_routes_per_entry: 8,
        }
    }
}

impl RouteTemplate {
    /// Creates a route through the given segments, which must all exist in the
    /// network and each lead onto the next.
    pub fn new(segments: Vec<SegmentId>, network: &RoadNetwork) -> TrafficResult<Self> {
        let entry = segments.first().cloned().ok_or_else(|| TrafficError::InvalidRoute {
            entry: SegmentId::default(),
            reason: "route has no segments".into(),
        })?;
        let invalid = |reason: String| TrafficError::InvalidRoute {
            entry: entry.clone(),
            reason,
        };

        let mut cumulative = Vec::with_capacity(segments.len() + 1);
        cumulative.push(0.0);
        for (idx, id) in segments.iter().enumerate() {
            let segment = network
                .get(id.as_str())
                .ok_or_else(|| invalid(format!("unknown segment {id}")))?;
            if let Some(next) = segments.get(idx + 1) {
                if !segment.successors().contains(next) {
                    return Err(invalid(format!("{next} does not follow {id}")));
                }
            }
            let length = segment.length();
            if !(length.is_finite() && length >= 0.0) {
                return Err(invalid(format!("segment {id} has invalid length {length}")));
            }
            cumulative.push(cumulative[idx] + length);
        }

        Ok(Self {
            entry,
            segments,
            cumulative,
        })
    }

    /// Creates a route from precomputed parts, as stored in a route cache.
    ///
    /// The route must start on `entry`, and the distances must hold one more value than
    /// there are segments, start at zero, never decrease, and end at `total_length`.
    /// The segments are not checked against
    /// a network; vehicles on a route through missing segments are removed when they reach them.
    pub fn from_parts(
        entry: SegmentId,
        segments: Vec<SegmentId>,
        total_length: f64,
        cumulative: Vec<f64>,
    ) -> TrafficResult<Self> {
        let invalid = |reason: &str| {
            Err(TrafficError::InvalidRoute {
                entry: entry.clone(),
                reason: reason.to_owned(),
            })
        };
        if segments.is_empty() {
            return invalid("route has no segments");
        }
        if segments[0] != entry {
            return invalid("route does not start on its entry segment");
        }
        if cumulative.len() != segments.len() + 1 {
            return invalid("expected one more cumulative distance than segments");
        }
        if cumulative[0] != 0.0 {
            return invalid("cumulative distances must start at zero");
        }
        if cumulative.iter().any(|d| !d.is_finite())
            || cumulative.iter().tuple_windows().any(|(a, b)| b < a)
        {
            return invalid("cumulative distances must be finite and non-decreasing");
        }
        let last = cumulative[cumulative.len() - 1];
        if (last - total_length).abs() > DISTANCE_TOLERANCE * f64::max(total_length.abs(), 1.0) {
            return invalid("last cumulative distance must equal the total length");
        }

        Ok(Self {
            entry,
            segments,
            cumulative,
        })
    }

    /// The segment the route starts on.
    pub fn entry(&self) -> &SegmentId {
        &self.entry
    }

    /// The segments in order of travel.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// Gets the segment at the given index along the route.
    pub fn segment(&self, idx: usize) -> Option<&SegmentId> {
        self.segments.get(idx)
    }

    /// The number of segments on the route.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distance from the start of the route to each segment boundary, in m.
    pub fn cumulative_distances(&self) -> &[f64] {
        &self.cumulative
    }

    /// The total length of the route in m.
    pub fn total_length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }
}

/// The precomputed routes available from each entry segment.
#[derive(Clone, Debug, Default)]
pub struct RouteCatalog {
    routes: BTreeMap<SegmentId, Vec<Rc<RouteTemplate>>>,
}

impl RouteCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a route, filed under its entry segment.
    pub fn insert(&mut self, route: RouteTemplate) {
        self.routes
            .entry(route.entry().clone())
            .or_default()
            .push(Rc::new(route));
    }

    /// Gets the routes starting on the given segment.
    pub fn routes(&self, entry: &str) -> &[Rc<RouteTemplate>] {
        self.routes.get(entry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the IDs of the segments with at least one route, in sorted order.
    pub fn entry_ids(&self) -> impl Iterator<Item = &SegmentId> {
        self.routes
            .iter()
            .filter(|(_, routes)| !routes.is_empty())
            .map(|(id, _)| id)
    }

    /// The total number of routes.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds routes from every entry segment of the network.
    ///
    /// Each route is the shortest path from an entry segment to some reachable segment,
    /// and routes are kept longest first if their length lies within the given bounds.
    pub fn enumerate(network: &RoadNetwork, options: &EnumerateOptions) -> Self {
        let mut catalog = Self::new();

        for entry in network.entry_segments() {
            let parents = dijkstra_all(entry.id(), |id: &SegmentId| {
                network
                    .known_successors(id.as_str())
                    .map(|s| (s.id().clone(), to_decimetres(s.length())))
                    .collect::<Vec<_>>()
            });

            let candidates = parents
                .iter()
                .filter(|(id, _)| *id != entry.id())
                .map(|(id, (_, cost))| (id, entry.length() + *cost as f64 / 10.0))
                .chain(std::iter::once((entry.id(), entry.length())))
                .filter(|(_, len)| (options.min_length..=options.max_length).contains(len))
                .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)))
                .take(options.max_routes_per_entry);

            for (target, _) in candidates {
                let path = if target == entry.id() {
                    vec![target.clone()]
                } else {
                    build_path(target, &parents)
                };
                match RouteTemplate::new(path, network) {
                    Ok(route) => catalog.insert(route),
                    Err(err) => warn!("Skipping enumerated route: {err}"),
                }
            }
        }

        debug!(
            "Enumerated {} routes from {} entry segments",
            catalog.len(),
            catalog.entry_ids().count()
        );
        catalog
    }
}

/// Converts a length to an integer path cost.
fn to_decimetres(len: f64) -> u64 {
    (10.0 * len).round() as u64
}
