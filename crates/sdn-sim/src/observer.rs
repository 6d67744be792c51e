//! Simulation observer trait for progress reporting.

use sdn_agent::TripSummary;
use sdn_control::DispatchOutcome;
use sdn_core::Tick;

use crate::SimReport;

/// Callbacks invoked by [`Sim::run`](crate::Sim::run).
///
/// The dispatcher and every vehicle thread share one observer, so methods
/// take `&self` and implementors must be `Sync`; use atomics or a lock for
/// any state.  All methods default to no-ops.
pub trait SimObserver: Sync {
    /// Called once, after every vehicle has joined.
    fn on_sim_start(&self, _vehicles: usize) {}

    /// Called by the dispatcher thread after each dispatch pass.
    fn on_dispatch(&self, _round: Tick, _outcome: &DispatchOutcome) {}

    /// Called by a vehicle's thread when it leaves at its destination.
    fn on_vehicle_left(&self, _trip: &TripSummary) {}

    /// Called once, after all threads have finished.
    fn on_sim_end(&self, _report: &SimReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Reports progress through the `log` facade.
///
/// Dispatches and arrivals go to `debug`, the start and end of the run to
/// `info`, and a timed-out run to `warn`.
pub struct LoggingObserver;

impl SimObserver for LoggingObserver {
    fn on_sim_start(&self, vehicles: usize) {
        log::info!("simulation started with {vehicles} vehicles");
    }

    fn on_dispatch(&self, round: Tick, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Dispatched { start, dest, assigned, .. } => {
                log::debug!("{round}: route {start} -> {dest} sent to {} vehicles", assigned.len());
            }
            DispatchOutcome::NoRoute { vehicle, start, dest } => {
                log::debug!("{round}: no route {start} -> {dest} for {vehicle}; retrying later");
            }
            DispatchOutcome::Stopped => log::debug!("{round}: no vehicles left"),
            DispatchOutcome::Idle => {}
        }
    }

    fn on_vehicle_left(&self, trip: &TripSummary) {
        log::debug!(
            "{} arrived at {} after {} hops ({} blocked) in {:?}",
            trip.vehicle,
            trip.destination,
            trip.hops,
            trip.blocked,
            trip.trip_time.unwrap_or_default(),
        );
    }

    fn on_sim_end(&self, report: &SimReport) {
        let arrived = report.arrived().count();
        if report.timed_out {
            log::warn!(
                "simulation timed out after {:?}: {arrived}/{} vehicles arrived",
                report.wall_time,
                report.trips.len(),
            );
        } else {
            log::info!(
                "simulation finished in {:?} over {} dispatch rounds: {arrived}/{} vehicles arrived",
                report.wall_time,
                report.rounds.0,
                report.trips.len(),
            );
        }
    }
}
