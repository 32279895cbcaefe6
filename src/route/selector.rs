use super::RouteTemplate;
use crate::config::SimulationConfig;
use crate::error::{TrafficError, TrafficResult};
use crate::util::Interval;
use itertools::Itertools;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use std::rc::Rc;

/// Chooses which route a newly spawned vehicle will follow, and how far it will go.
#[derive(Clone, Debug)]
pub struct RouteSelector {
    /// The distribution of desired trip lengths, in m.
    trip_length: LogNormal<f64>,
    /// Bounds on the desired trip length, in m.
    bounds: Interval<f64>,
    /// The fraction of the desired trip length a route must reach to be viable.
    viability: f64,
    /// The number of shortest viable routes to choose among.
    candidates: usize,
}

impl RouteSelector {
    /// Creates a route selector from the simulation parameters.
    pub fn new(config: &SimulationConfig) -> TrafficResult<Self> {
        // Choose `mu` so that the distribution's mean, not its median, is `trip_length_mean`
        let sigma = config.trip_length_sigma;
        let mu = config.trip_length_mean.ln() - 0.5 * sigma * sigma;
        let trip_length = LogNormal::new(mu, sigma)
            .map_err(|err| TrafficError::Config(format!("trip length distribution: {err}")))?;
        Ok(Self {
            trip_length,
            bounds: config.trip_length,
            viability: config.route_viability,
            candidates: config.route_candidates.max(1),
        })
    }

    /// Samples a desired trip length in m.
    pub fn sample_target<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.bounds.clamp(self.trip_length.sample(rng))
    }

    /// Chooses a route suited to a trip of the `target` length.
    ///
    /// Picks uniformly among the few shortest routes at least the viable fraction
    /// of `target` long, or the longest route if none are viable.
    pub fn choose<'a, R: Rng + ?Sized>(
        &self,
        routes: &'a [Rc<RouteTemplate>],
        target: f64,
        rng: &mut R,
    ) -> Option<&'a Rc<RouteTemplate>> {
        let min_length = self.viability * target;
        let viable = routes
            .iter()
            .filter(|r| r.total_length() >= min_length)
            .sorted_by(|a, b| a.total_length().total_cmp(&b.total_length()))
            .take(self.candidates)
            .collect::<Vec<_>>();

        if viable.is_empty() {
            routes
                .iter()
                .rev()
                .max_by(|a, b| a.total_length().total_cmp(&b.total_length()))
        } else {
            let idx = rng.gen_range(0..viable.len());
            Some(viable[idx])
        }
    }

    /// Chooses a route and a trip length, no longer than the route, for a new vehicle.
    /// Returns `None` if there are no routes.
    pub fn select<R: Rng + ?Sized>(
        &self,
        routes: &[Rc<RouteTemplate>],
        rng: &mut R,
    ) -> Option<(Rc<RouteTemplate>, f64)> {
        if routes.is_empty() {
            return None;
        }
        let target = self.sample_target(rng);
        let route = self.choose(routes, target, rng)?;
        let target = f64::min(target, route.total_length());
        Some((Rc::clone(route), target))
    }
}
