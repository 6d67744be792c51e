//! `sdn-sim` — runs a scenario against the central compute node.
//!
//! # Threads
//!
//! ```text
//! setup      — build node from scenario, join every vehicle at its source
//! dispatcher — loop: dispatch_once, sleep(dispatch_interval)
//!              until Stopped (nobody joined) or max_wall_time
//! vehicle×N  — loop: step, sleep(poll_interval + jitter)
//!              until Left or the run is stopped
//! ```
//!
//! All vehicles join before the dispatcher starts, so `Stopped` can only
//! mean every vehicle has left.  No thread sleeps while holding a lock.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sdn_core::SimConfig;
//! use sdn_scenario::Scenario;
//! use sdn_sim::{LoggingObserver, SimBuilder};
//!
//! let scenario = Scenario::grid(5, 5, 1.0, 3).with_random_vehicles(40, 7);
//! let mut sim = SimBuilder::new(SimConfig::default(), scenario).build()?;
//! let report = sim.run(&LoggingObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{LoggingObserver, NoopObserver, SimObserver};
pub use sim::{Sim, SimReport};
