use crate::config::SimulationConfig;
use crate::util::Interval;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Decides how many vehicles to create on each entry segment when a new time slice begins.
///
/// Spawning slows down as the simulation fills up: at full rate below the soft load cap,
/// linearly less between the soft and hard caps, and not at all above the hard cap.
#[derive(Clone, Copy, Debug)]
pub struct SpawnScheduler {
    /// The soft (`min`) and hard (`max`) load caps, as fractions of the vehicle budget.
    caps: Interval<f64>,
    /// Multiplier applied to every segment spawn rate.
    amplification: f64,
}

impl SpawnScheduler {
    /// Creates a spawn scheduler from the simulation parameters.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            caps: config.load_caps,
            amplification: config.spawn_amplification,
        }
    }

    /// The fraction of the nominal spawn rate to use at the given load,
    /// or `None` if spawning is suppressed.
    ///
    /// # Parameters
    /// * `live` - The number of live vehicles
    /// * `max` - The vehicle budget
    pub fn spawn_scale(&self, live: usize, max: usize) -> Option<f64> {
        if max == 0 {
            return None;
        }
        let load = live as f64 / max as f64;
        if load >= self.caps.max {
            None
        } else if load < self.caps.min {
            Some(1.0)
        } else {
            Some(1.0 - self.caps.inv_lerp(load))
        }
    }

    /// Draws the number of vehicles to spawn on a segment.
    ///
    /// # Parameters
    /// * `rate` - The segment's spawn rate for the current time slice
    /// * `scale` - The result of [Self::spawn_scale]
    /// * `rng` - The random number source
    pub fn spawn_count<R: Rng + ?Sized>(&self, rate: f64, scale: f64, rng: &mut R) -> u32 {
        let lambda = rate * self.amplification * scale;
        if !lambda.is_finite() {
            return 0;
        }
        match Poisson::new(lambda) {
            Ok(poisson) => poisson.sample(rng) as u32,
            // Zero and negative rates
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scheduler() -> SpawnScheduler {
        SpawnScheduler::new(&SimulationConfig::default())
    }

    #[test]
    fn throttles_between_caps() {
        let s = scheduler();
        assert_eq!(s.spawn_scale(0, 100), Some(1.0));
        assert_eq!(s.spawn_scale(69, 100), Some(1.0));
        assert_approx_eq!(s.spawn_scale(70, 100).unwrap(), 1.0);
        assert_approx_eq!(s.spawn_scale(80, 100).unwrap(), 0.6, 1e-9);
        assert!(s.spawn_scale(94, 100).unwrap() > 0.0);
        assert_eq!(s.spawn_scale(95, 100), None);
        assert_eq!(s.spawn_scale(100, 100), None);
        assert_eq!(s.spawn_scale(0, 0), None);
    }

    #[test]
    fn non_positive_rates_spawn_nothing() {
        let s = scheduler();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(s.spawn_count(0.0, 1.0, &mut rng), 0);
        assert_eq!(s.spawn_count(-3.0, 1.0, &mut rng), 0);
        assert_eq!(s.spawn_count(f64::NAN, 1.0, &mut rng), 0);
        assert_eq!(s.spawn_count(5.0, 0.0, &mut rng), 0);
    }

    #[test]
    fn counts_follow_the_amplified_rate() {
        let s = scheduler();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 5000;
        let total: u64 = (0..n).map(|_| s.spawn_count(1.5, 1.0, &mut rng) as u64).sum();
        let mean = total as f64 / n as f64;
        // lambda = 1.5 * 2.0
        assert!((mean - 3.0).abs() < 0.15, "mean {mean}");
    }
}
