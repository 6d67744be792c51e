//! Run timing: the dispatch round counter and the wall-clock pacing config.
//!
//! # Design
//!
//! The simulation runs in real time: vehicles and the dispatcher are
//! threads that poll and sleep.  `Tick` numbers dispatcher iterations so
//! observers can correlate log lines; it carries no wall-clock meaning.
//!
//! Edge costs are abstract units.  `SimConfig::cost_unit` maps one unit of
//! cost to a wall-clock duration when a vehicle traverses a hop.

use std::fmt;
use std::time::Duration;

use crate::{SdnError, SdnResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Dispatcher iteration counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The next round.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Master RNG seed.  Drives per-vehicle polling jitter.
    pub seed: u64,

    /// How long a vehicle sleeps between two steps.
    pub poll_interval: Duration,

    /// Upper bound of the random delay added to each vehicle poll.
    pub poll_jitter: Duration,

    /// How long the dispatcher sleeps between two `dispatch_once` calls.
    pub dispatch_interval: Duration,

    /// Wall-clock time represented by one unit of edge cost.
    pub cost_unit: Duration,

    /// Hard stop for the whole run.  `None` runs until every vehicle left.
    pub max_wall_time: Option<Duration>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:              42,
            poll_interval:     Duration::from_millis(300),
            poll_jitter:       Duration::from_millis(50),
            dispatch_interval: Duration::from_millis(10),
            cost_unit:         Duration::from_millis(100),
            max_wall_time:     Some(Duration::from_secs(600)),
        }
    }
}

impl SimConfig {
    /// Zero-delay pacing: hops complete instantly and nothing sleeps longer
    /// than a millisecond.  Intended for tests.
    pub fn instant(seed: u64) -> Self {
        Self {
            seed,
            poll_interval:     Duration::from_millis(1),
            poll_jitter:       Duration::ZERO,
            dispatch_interval: Duration::from_millis(1),
            cost_unit:         Duration::ZERO,
            max_wall_time:     Some(Duration::from_secs(30)),
        }
    }

    /// Wall-clock duration of a hop with the given edge cost.
    pub fn hop_duration(&self, cost: f64) -> Duration {
        if cost <= 0.0 || !cost.is_finite() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.cost_unit.as_secs_f64() * cost).unwrap_or(Duration::MAX)
    }

    /// Reject settings that would make the run spin or never progress.
    pub fn validate(&self) -> SdnResult<()> {
        if self.poll_interval.is_zero() {
            return Err(SdnError::Config("poll_interval must be non-zero".into()));
        }
        if self.dispatch_interval.is_zero() {
            return Err(SdnError::Config("dispatch_interval must be non-zero".into()));
        }
        if self.max_wall_time.is_some_and(|t| t.is_zero()) {
            return Err(SdnError::Config("max_wall_time must be non-zero when set".into()));
        }
        Ok(())
    }
}
