//! # Phase policy for the first firing of a trigger.
//!
//! [`PhasePolicy`] decides where inside the first period a trigger fires for
//! the first time. Every later firing is exactly one period after the previous
//! scheduled one.
//!
//! - [`PhasePolicy::Aligned`] - first firing at `start + period`
//! - [`PhasePolicy::Spread`] - first firing at `start + random(0, period]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling the offset of a trigger's first firing.
///
/// ## Trade-offs
/// - **Aligned**: units spawned together fire together; the sink sees bursts of N lines every period.
/// - **Spread**: the same N firings are smeared across the period; steadier sink load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PhasePolicy {
    /// First firing one full period after the trigger starts.
    #[default]
    Aligned,
    /// First firing at a uniformly random offset in `(0, period]`.
    Spread,
}

impl PhasePolicy {
    /// Returns the delay before the first firing for a trigger with `period`.
    pub fn first_delay(&self, period: Duration) -> Duration {
        match self {
            PhasePolicy::Aligned => period,
            PhasePolicy::Spread => Self::spread(period),
        }
    }

    fn spread(period: Duration) -> Duration {
        let nanos = period.as_nanos().min(u128::from(u64::MAX)) as u64;
        if nanos == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        Duration::from_nanos(rng.random_range(1..=nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_waits_one_full_period() {
        let p = Duration::from_millis(10);
        assert_eq!(PhasePolicy::Aligned.first_delay(p), p);
    }

    #[test]
    fn spread_stays_within_first_period() {
        let p = Duration::from_millis(10);
        for _ in 0..1000 {
            let d = PhasePolicy::Spread.first_delay(p);
            assert!(d > Duration::ZERO && d <= p, "offset {d:?} outside (0, {p:?}]");
        }
    }

    #[test]
    fn spread_of_zero_period_is_zero() {
        assert_eq!(PhasePolicy::Spread.first_delay(Duration::ZERO), Duration::ZERO);
    }
}
