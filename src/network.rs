use crate::segment::{RoadSegment, SegmentAttributes};
use crate::SegmentId;
use itertools::Itertools;
use log::{debug, warn};
use pathfinding::directed::bfs::bfs_reach;
use pathfinding::undirected::connected_components::connected_components;
use std::collections::HashMap;

/// The largest weakly connected component should hold at least this fraction of segments.
const LARGEST_COMPONENT_THRESHOLD: f64 = 0.90;

/// At most this fraction of segments may be dead ends.
const DEAD_END_THRESHOLD: f64 = 0.05;

/// At least this fraction of segments should be reachable from an entry segment.
const ENTRY_REACHABILITY_THRESHOLD: f64 = 0.85;

/// A read-only index of the road segments in the network.
#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    segments: HashMap<SegmentId, RoadSegment>,
}

/// Connectivity statistics of a [RoadNetwork].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkReport {
    /// The number of segments.
    pub segment_count: usize,
    /// The number of weakly connected components.
    pub component_count: usize,
    /// The number of segments in the largest weakly connected component.
    pub largest_component: usize,
    /// The number of segments reachable by driving from an entry segment.
    pub reachable_from_entries: usize,
    /// The number of segments with no successors.
    pub dead_ends: usize,
    /// The number of segments with neither successors nor predecessors.
    pub orphans: usize,
    /// The number of entry segments.
    pub entry_count: usize,
    /// The number of major segments.
    pub major_count: usize,
    /// The average number of successors per segment.
    pub avg_successors: f64,
    /// The average number of predecessors per segment.
    pub avg_predecessors: f64,
}

impl RoadNetwork {
    /// Creates a network from a set of segments.
    /// If two segments share an ID, the last one is kept.
    pub fn new(segments: impl IntoIterator<Item = RoadSegment>) -> Self {
        let mut map = HashMap::new();
        for segment in segments {
            if let Some(prev) = map.insert(segment.id().clone(), segment) {
                warn!("Duplicate road segment {}; keeping the last", prev.id());
            }
        }
        debug!("Road network has {} segments", map.len());
        Self { segments: map }
    }

    /// Creates a network from raw segment attributes.
    pub fn from_attributes<'a>(attribs: impl IntoIterator<Item = &'a SegmentAttributes>) -> Self {
        Self::new(attribs.into_iter().map(RoadSegment::new))
    }

    /// Gets the segment with the given ID.
    pub fn get(&self, id: &str) -> Option<&RoadSegment> {
        self.segments.get(id)
    }

    /// Whether the network contains the given segment.
    pub fn contains(&self, id: &str) -> bool {
        self.segments.contains_key(id)
    }

    /// The number of segments in the network.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over all the segments, in no particular order.
    pub fn iter_segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.values()
    }

    /// Returns the entry segments, sorted by ID.
    pub fn entry_segments(&self) -> Vec<&RoadSegment> {
        self.segments
            .values()
            .filter(|s| s.is_entry())
            .sorted_by(|a, b| a.id().cmp(b.id()))
            .collect()
    }

    /// The successors of a segment which exist in the network.
    pub(crate) fn known_successors<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a RoadSegment> + 'a {
        self.get(id)
            .into_iter()
            .flat_map(|s| s.successors())
            .filter_map(|succ| self.get(succ.as_str()))
    }

    /// Analyses the connectivity of the network.
    /// Links to segments missing from the network are ignored.
    pub fn report(&self) -> NetworkReport {
        let n = self.segments.len();
        if n == 0 {
            return NetworkReport::default();
        }

        let ids = self.segments.keys().cloned().collect::<Vec<_>>();
        let components = connected_components(&ids, |id: &SegmentId| {
            let segment = &self.segments[id];
            segment
                .successors()
                .iter()
                .chain(segment.predecessors())
                .filter(|other| self.contains(other.as_str()))
                .cloned()
                .collect::<Vec<_>>()
        });

        // Breadth-first search from a virtual root which leads onto every entry
        let entries = self.entry_segments();
        let reachable = bfs_reach(None::<&SegmentId>, |node| match node {
            None => entries.iter().copied().map(|s| Some(s.id())).collect::<Vec<_>>(),
            Some(id) => self
                .known_successors(id.as_str())
                .map(|s| Some(s.id()))
                .collect(),
        })
        .filter(Option::is_some)
        .count();

        let total_succ: usize = self.segments.values().map(|s| s.successors().len()).sum();
        let total_pred: usize = self.segments.values().map(|s| s.predecessors().len()).sum();

        NetworkReport {
            segment_count: n,
            component_count: components.len(),
            largest_component: components.iter().map(|c| c.len()).max().unwrap_or(0),
            reachable_from_entries: reachable,
            dead_ends: self
                .segments
                .values()
                .filter(|s| s.successors().is_empty())
                .count(),
            orphans: self
                .segments
                .values()
                .filter(|s| s.successors().is_empty() && s.predecessors().is_empty())
                .count(),
            entry_count: entries.len(),
            major_count: self.segments.values().filter(|s| s.is_major()).count(),
            avg_successors: total_succ as f64 / n as f64,
            avg_predecessors: total_pred as f64 / n as f64,
        }
    }
}

impl NetworkReport {
    /// Describes each way in which the network falls short of being well connected.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = vec![];
        if self.segment_count == 0 {
            return failures;
        }
        let n = self.segment_count as f64;

        let largest = self.largest_component as f64 / n;
        if largest < LARGEST_COMPONENT_THRESHOLD {
            failures.push(format!(
                "largest component {:.1}% < {:.0}%",
                largest * 100.0,
                LARGEST_COMPONENT_THRESHOLD * 100.0
            ));
        }
        let dead_ends = self.dead_ends as f64 / n;
        if dead_ends > DEAD_END_THRESHOLD {
            failures.push(format!(
                "dead ends {:.1}% > {:.0}%",
                dead_ends * 100.0,
                DEAD_END_THRESHOLD * 100.0
            ));
        }
        let reachable = self.reachable_from_entries as f64 / n;
        if reachable < ENTRY_REACHABILITY_THRESHOLD {
            failures.push(format!(
                "entry reachability {:.1}% < {:.0}%",
                reachable * 100.0,
                ENTRY_REACHABILITY_THRESHOLD * 100.0
            ));
        }
        failures
    }

    /// Whether the network passed every connectivity check.
    pub fn passed(&self) -> bool {
        self.failures().is_empty()
    }
}
