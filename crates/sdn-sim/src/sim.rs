//! The `Sim` struct and its threaded run loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use sdn_agent::{TripSummary, Vehicle};
use sdn_control::{CentralComputeNode, ControlResult, DispatchOutcome};
use sdn_core::{SimConfig, Tick};
use sdn_spatial::{AStarRouter, Router};

use crate::{SimError, SimObserver, SimResult};

// ── SimReport ─────────────────────────────────────────────────────────────────

/// What happened during a run.
#[derive(Debug, Clone)]
pub struct SimReport {
    /// Dispatch passes performed, including idle ones.
    pub rounds:     Tick,
    /// Passes that planned a route.
    pub dispatched: u64,
    /// Passes whose front job had no route.
    pub no_route:   u64,
    /// One entry per vehicle, in scenario order.
    pub trips:      Vec<TripSummary>,
    /// `true` if the run was cut off by `max_wall_time`.
    pub timed_out:  bool,
    pub wall_time:  Duration,
}

impl SimReport {
    /// Trips that reached their destination.
    pub fn arrived(&self) -> impl Iterator<Item = &TripSummary> + '_ {
        self.trips.iter().filter(|t| t.phase.is_done())
    }

    /// Trips still underway when the run ended.
    pub fn unfinished(&self) -> impl Iterator<Item = &TripSummary> + '_ {
        self.trips.iter().filter(|t| !t.phase.is_done())
    }

    pub fn all_arrived(&self) -> bool {
        self.trips.iter().all(|t| t.phase.is_done())
    }

    /// Mean join-to-leave time over arrived vehicles.
    pub fn mean_trip_time(&self) -> Option<Duration> {
        let times: Vec<Duration> = self.trips.iter().filter_map(|t| t.trip_time).collect();
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<Duration>() / times.len() as u32)
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// A compute node plus the vehicles that will drive on it.
///
/// Create via [`SimBuilder`](crate::SimBuilder).  A `Sim` runs once.
pub struct Sim<R: Router = AStarRouter> {
    pub config: SimConfig,
    node:       CentralComputeNode<R>,
    vehicles:   Vec<Vehicle>,
    ran:        bool,
}

impl<R: Router> Sim<R> {
    pub(crate) fn new(config: SimConfig, node: CentralComputeNode<R>, vehicles: Vec<Vehicle>) -> Self {
        Self { config, node, vehicles, ran: false }
    }

    pub fn node(&self) -> &CentralComputeNode<R> {
        &self.node
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Join every vehicle, then run the dispatcher and one thread per
    /// vehicle until all vehicles have left or `max_wall_time` elapses.
    ///
    /// # Errors
    ///
    /// A second call, a vehicle that cannot join, a node error inside a
    /// vehicle thread (which stops the run), or a panicked vehicle thread.
    pub fn run<O: SimObserver>(&mut self, observer: &O) -> SimResult<SimReport> {
        if self.ran {
            return Err(SimError::Config("a Sim can only be run once".into()));
        }
        self.ran = true;

        let started = Instant::now();
        for v in &mut self.vehicles {
            v.join(&self.node, started)?;
        }
        observer.on_sim_start(self.vehicles.len());

        let running = AtomicBool::new(true);
        let stats = DispatchStats::default();
        let node = &self.node;
        let config = &self.config;

        let results: Vec<SimResult<()>> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .vehicles
                .iter_mut()
                .map(|v| {
                    let running = &running;
                    let id = v.id();
                    let handle = scope.spawn(move || drive(v, node, config, running, observer));
                    (id, handle)
                })
                .collect();

            dispatch_loop(node, config, &running, &stats, started, observer);

            handles
                .into_iter()
                .map(|(id, h)| match h.join() {
                    Ok(r) => r.map_err(SimError::from),
                    Err(_) => Err(SimError::VehiclePanicked(id)),
                })
                .collect()
        });

        let report = SimReport {
            rounds:     Tick(stats.rounds.load(Ordering::Relaxed)),
            dispatched: stats.dispatched.load(Ordering::Relaxed),
            no_route:   stats.no_route.load(Ordering::Relaxed),
            trips:      self.vehicles.iter().map(Vehicle::summary).collect(),
            timed_out:  stats.timed_out.load(Ordering::Relaxed),
            wall_time:  started.elapsed(),
        };
        observer.on_sim_end(&report);

        results.into_iter().collect::<SimResult<Vec<()>>>()?;
        Ok(report)
    }
}

// ── Threads ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct DispatchStats {
    rounds:     AtomicU64,
    dispatched: AtomicU64,
    no_route:   AtomicU64,
    timed_out:  AtomicBool,
}

fn dispatch_loop<R: Router, O: SimObserver>(
    node:     &CentralComputeNode<R>,
    config:   &SimConfig,
    running:  &AtomicBool,
    stats:    &DispatchStats,
    started:  Instant,
    observer: &O,
) {
    let mut round = Tick::ZERO;
    while running.load(Ordering::SeqCst) {
        if config.max_wall_time.is_some_and(|max| started.elapsed() >= max) {
            stats.timed_out.store(true, Ordering::Relaxed);
            break;
        }

        let outcome = node.dispatch_once();
        match &outcome {
            DispatchOutcome::Dispatched { .. } => {
                stats.dispatched.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::NoRoute { .. } => {
                stats.no_route.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::Idle | DispatchOutcome::Stopped => {}
        }
        observer.on_dispatch(round, &outcome);
        round = round.next();
        stats.rounds.store(round.0, Ordering::Relaxed);

        if outcome.is_stopped() {
            break;
        }
        thread::sleep(config.dispatch_interval);
    }
    running.store(false, Ordering::SeqCst);
}

/// One vehicle's thread body.  On a node error the vehicle leaves and the
/// whole run is stopped.
fn drive<R: Router, O: SimObserver>(
    vehicle:  &mut Vehicle,
    node:     &CentralComputeNode<R>,
    config:   &SimConfig,
    running:  &AtomicBool,
    observer: &O,
) -> ControlResult<()> {
    while running.load(Ordering::SeqCst) {
        match vehicle.step(node, config, Instant::now()) {
            Ok(phase) if phase.is_done() => {
                observer.on_vehicle_left(&vehicle.summary());
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("{} stopped: {e}", vehicle.id());
                node.leave_network(vehicle.id(), vehicle.position());
                running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        thread::sleep(vehicle.poll_delay(config));
    }
    Ok(())
}
