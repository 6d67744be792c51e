//! Unit tests for sdn-sim.  Every run uses `SimConfig::instant` pacing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sdn_agent::TripSummary;
use sdn_control::DispatchOutcome;
use sdn_core::{SimConfig, Tick, VehicleId};
use sdn_scenario::{EdgeSpec, Scenario, SubnetSpec, VehicleSpec};

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, SimReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn triangle(caps: [usize; 3], vehicles: &[(u32, &str, &str)]) -> Scenario {
    let road = |a: &str, b: &str, cost: f64| EdgeSpec { from: a.into(), to: b.into(), cost, two_way: true };
    Scenario {
        subnets: ["A", "B", "C"]
            .iter()
            .zip(caps)
            .map(|(n, c)| SubnetSpec { name: (*n).into(), capacity: c })
            .collect(),
        edges: vec![road("A", "B", 1.0), road("B", "C", 1.0), road("A", "C", 5.0)],
        vehicles: vehicles
            .iter()
            .map(|(id, s, d)| VehicleSpec { id: *id, source: (*s).into(), destination: (*d).into() })
            .collect(),
    }
}

fn short_timeout() -> SimConfig {
    SimConfig { max_wall_time: Some(Duration::from_millis(200)), ..SimConfig::instant(1) }
}

#[derive(Default)]
struct Counting {
    started:  AtomicUsize,
    left:     AtomicUsize,
    assigned: AtomicUsize,
    ended:    AtomicUsize,
    trips:    Mutex<Vec<VehicleId>>,
}

impl SimObserver for Counting {
    fn on_sim_start(&self, vehicles: usize) {
        self.started.store(vehicles, Ordering::SeqCst);
    }
    fn on_dispatch(&self, _round: Tick, outcome: &DispatchOutcome) {
        self.assigned.fetch_add(outcome.assigned().len(), Ordering::SeqCst);
    }
    fn on_vehicle_left(&self, trip: &TripSummary) {
        self.left.fetch_add(1, Ordering::SeqCst);
        self.trips.lock().unwrap().push(trip.vehicle);
    }
    fn on_sim_end(&self, _report: &SimReport) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn rejects_zero_poll_interval() {
        let config = SimConfig { poll_interval: Duration::ZERO, ..SimConfig::instant(1) };
        let err = SimBuilder::new(config, triangle([1, 1, 1], &[])).build().err().unwrap();
        assert!(matches!(err, SimError::Core(_)));
    }

    #[test]
    fn rejects_inconsistent_scenario() {
        let scenario = triangle([1, 1, 1], &[(1, "A", "Nowhere")]);
        let err = SimBuilder::new(SimConfig::instant(1), scenario).build().err().unwrap();
        assert!(matches!(err, SimError::Scenario(_)));
    }

    #[test]
    fn vehicles_resolved_in_scenario_order() {
        let sim = SimBuilder::new(SimConfig::instant(1), triangle([1, 1, 1], &[(5, "C", "A"), (2, "A", "B")]))
            .build()
            .unwrap();
        let ids: Vec<VehicleId> = sim.vehicles().iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![VehicleId(5), VehicleId(2)]);
        assert_eq!(sim.node().capacity(sim.vehicles()[0].position()), 1);
        assert_eq!(sim.node().joined_count(), 0, "nobody joins before run");
    }
}

// ── Runs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use super::*;

    #[test]
    fn single_vehicle_takes_the_cheap_corridor() {
        let mut sim = SimBuilder::new(SimConfig::instant(1), triangle([1, 1, 1], &[(1, "A", "C")]))
            .build()
            .unwrap();
        let report = sim.run(&NoopObserver).unwrap();

        assert!(report.all_arrived());
        assert!(!report.timed_out);
        assert_eq!(report.trips[0].hops, 2);
        assert!(report.dispatched >= 1);
        assert!(report.rounds.0 >= 2);
        assert!(report.mean_trip_time().is_some());
        assert_eq!(sim.node().joined_count(), 0);
    }

    #[test]
    fn empty_scenario_stops_on_first_round() {
        let mut sim = SimBuilder::new(SimConfig::instant(1), triangle([1, 1, 1], &[]))
            .build()
            .unwrap();
        let report = sim.run(&NoopObserver).unwrap();
        assert_eq!(report.rounds, Tick(1));
        assert!(report.trips.is_empty());
        assert!(report.mean_trip_time().is_none());
    }

    #[test]
    fn grid_fleet_all_arrive() {
        let scenario = Scenario::grid(4, 4, 1.0, 64).with_random_vehicles(24, 3);
        let mut sim = SimBuilder::new(SimConfig::instant(3), scenario).build().unwrap();
        let obs = Counting::default();
        let report = sim.run(&obs).unwrap();

        assert!(report.all_arrived(), "unfinished: {:?}", report.unfinished().collect::<Vec<_>>());
        assert_eq!(obs.started.load(Ordering::SeqCst), 24);
        assert_eq!(obs.left.load(Ordering::SeqCst), 24);
        assert_eq!(obs.ended.load(Ordering::SeqCst), 1);
        assert!(obs.assigned.load(Ordering::SeqCst) >= 24);
        assert_eq!(obs.trips.lock().unwrap().len(), 24);
        assert!(sim.node().pending_jobs().is_empty());
    }

    #[test]
    fn vehicle_at_destination_needs_no_route() {
        let mut sim = SimBuilder::new(SimConfig::instant(1), triangle([1, 1, 1], &[(1, "B", "B")]))
            .build()
            .unwrap();
        let report = sim.run(&NoopObserver).unwrap();
        assert!(report.all_arrived());
        assert_eq!(report.trips[0].hops, 0);
        assert_eq!(report.trips[0].routes, 0);
    }

    #[test]
    fn full_destination_times_out() {
        let mut sim = SimBuilder::new(short_timeout(), triangle([1, 1, 0], &[(1, "A", "C")]))
            .build()
            .unwrap();
        let report = sim.run(&NoopObserver).unwrap();
        assert!(report.timed_out);
        let stuck: Vec<_> = report.unfinished().collect();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].position, sim.node().subnet_id("B").unwrap());
        assert!(stuck[0].blocked > 0);
    }

    #[test]
    fn unreachable_destination_keeps_retrying() {
        let mut scenario = triangle([1, 1, 1], &[(1, "A", "island")]);
        scenario.subnets.push(SubnetSpec { name: "island".into(), capacity: 1 });
        let mut sim = SimBuilder::new(short_timeout(), scenario).build().unwrap();
        let report = sim.run(&NoopObserver).unwrap();
        assert!(report.timed_out);
        assert!(report.no_route > 0);
        assert_eq!(report.dispatched, 0);
        assert_eq!(sim.node().pending_jobs().len(), 1);
    }

    #[test]
    fn second_run_is_rejected() {
        let mut sim = SimBuilder::new(SimConfig::instant(1), triangle([1, 1, 1], &[]))
            .build()
            .unwrap();
        sim.run(&NoopObserver).unwrap();
        assert!(matches!(sim.run(&NoopObserver), Err(SimError::Config(_))));
    }
}
