//! Unit tests for sdn-control.

use std::sync::Arc;

use sdn_core::{SubnetId, VehicleId};
use sdn_spatial::{RoadNetwork, RoadNetworkBuilder, RouteStep};

use crate::{CentralComputeNode, DispatchOutcome, Job, NodeBuilder, RouteSlot};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: SubnetId = SubnetId(0);
const B: SubnetId = SubnetId(1);
const C: SubnetId = SubnetId(2);

/// A–B 1, B–C 1, A–C 5, all two-way.
fn triangle() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    b.build_index(["A", "B", "C"]).unwrap();
    b.set_adjacency(&[
        vec![0.0, 1.0, 5.0],
        vec![1.0, 0.0, 1.0],
        vec![5.0, 1.0, 0.0],
    ])
    .unwrap();
    b.build()
}

fn node(caps: [usize; 3]) -> CentralComputeNode {
    NodeBuilder::new(triangle())
        .capacities([("A", caps[0]), ("B", caps[1]), ("C", caps[2])])
        .build()
        .unwrap()
}

fn join(node: &CentralComputeNode, id: u32, at: SubnetId) -> Arc<RouteSlot> {
    let slot = Arc::new(RouteSlot::new());
    node.join_network(VehicleId(id), at, &slot).unwrap();
    slot
}

fn job(id: u32, start: SubnetId, dest: SubnetId) -> Job {
    Job::new(VehicleId(id), start, dest)
}

fn v(id: u32) -> VehicleId {
    VehicleId(id)
}

// ── OccupancyTracker ──────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use super::*;
    use crate::{ControlError, OccupancyTracker};
    use sdn_spatial::CongestionView;

    #[test]
    fn join_and_leave() {
        let mut t = OccupancyTracker::with_capacities(vec![1, 1]);
        t.join(v(1), A).unwrap();
        t.join(v(2), A).unwrap();
        assert_eq!(t.occupancy(A), 2);
        assert_eq!(t.occupants(A), vec![v(1), v(2)]);
        assert!(t.leave(v(1), A));
        assert!(!t.leave(v(1), A), "second leave is a no-op");
        assert_eq!(t.occupancy(A), 1);
        assert_eq!(t.total(), 1);
    }

    #[test]
    fn join_unknown_subnet() {
        let mut t = OccupancyTracker::new(1);
        assert!(matches!(t.join(v(1), SubnetId(5)), Err(ControlError::SubnetNotFound(_))));
    }

    #[test]
    fn unconfigured_capacity_is_zero() {
        let mut t = OccupancyTracker::new(2);
        t.join(v(1), A).unwrap();
        assert_eq!(t.capacity(B), 0);
        assert!(!t.try_change(v(1), A, B));
        assert!(t.is_on(v(1), A));
    }

    #[test]
    fn self_loop_always_succeeds() {
        let mut t = OccupancyTracker::new(1);
        t.join(v(1), A).unwrap();
        assert!(t.try_change(v(1), A, A));
        assert_eq!(t.occupancy(A), 1);
    }

    #[test]
    fn move_respects_capacity() {
        let mut t = OccupancyTracker::with_capacities(vec![5, 2]);
        t.join(v(1), B).unwrap();
        t.join(v(2), B).unwrap();
        t.join(v(3), A).unwrap();
        assert!(!t.try_change(v(3), A, B));
        assert_eq!(t.occupancy(B), 2);
        assert!(t.is_on(v(3), A));

        t.leave(v(1), B);
        assert!(t.try_change(v(3), A, B));
        assert_eq!(t.occupants(B), vec![v(2), v(3)]);
        assert_eq!(t.occupancy(A), 0);
    }

    #[test]
    fn move_from_wrong_subnet_fails() {
        let mut t = OccupancyTracker::with_capacities(vec![1, 1, 1]);
        t.join(v(1), A).unwrap();
        assert!(!t.try_change(v(1), B, C));
        assert_eq!(t.occupants(A), vec![v(1)]);
        assert_eq!(t.occupancy(C), 0);
    }

    #[test]
    fn move_to_unknown_subnet_fails() {
        let mut t = OccupancyTracker::with_capacities(vec![1]);
        t.join(v(1), A).unwrap();
        assert!(!t.try_change(v(1), A, SubnetId(9)));
        assert!(t.is_on(v(1), A));
    }

    #[test]
    fn evict_removes_everywhere() {
        let mut t = OccupancyTracker::new(3);
        t.join(v(1), A).unwrap();
        t.join(v(1), C).unwrap();
        assert_eq!(t.evict(v(1)), 2);
        assert_eq!(t.total(), 0);
        assert_eq!(t.evict(v(1)), 0);
    }

    #[test]
    fn congestion_view_reports_counts() {
        let mut t = OccupancyTracker::new(2);
        t.join(v(1), B).unwrap();
        let view: &dyn CongestionView = &t;
        assert_eq!(view.occupancy(A), 0);
        assert_eq!(view.occupancy(B), 1);
        assert_eq!(view.occupancy(SubnetId(7)), 0);
    }
}

// ── RouteSlot, registry, queue ────────────────────────────────────────────────

#[cfg(test)]
mod parts {
    use super::*;
    use crate::{ControlError, JobQueue, VehicleRegistry};
    use sdn_spatial::Route;

    fn route_ab() -> Route {
        Route {
            start: A,
            dest:  B,
            steps: vec![RouteStep { subnet: A, cost: 0.0 }, RouteStep { subnet: B, cost: 1.0 }],
        }
    }

    #[test]
    fn slot_request_flag_guards_duplicates() {
        let slot = RouteSlot::new();
        assert!(slot.mark_requested());
        assert!(!slot.mark_requested());
        assert!(slot.is_requested());
        slot.clear_requested();
        assert!(slot.mark_requested());
    }

    #[test]
    fn slot_delivery_clears_flag() {
        let slot = RouteSlot::new();
        slot.mark_requested();
        assert!(slot.set_route(route_ab()));
        assert!(!slot.is_requested());
        assert!(slot.has_route());
        assert_eq!(slot.peek_route(), Some(route_ab()));
        assert_eq!(slot.take_route(), Some(route_ab()));
        assert!(!slot.has_route());
    }

    #[test]
    fn slot_ignores_empty_route() {
        let slot = RouteSlot::new();
        slot.mark_requested();
        let empty = Route { start: A, dest: B, steps: Vec::new() };
        assert!(!slot.set_route(empty));
        assert!(!slot.is_requested());
        assert!(!slot.has_route());
    }

    #[test]
    fn registry_rejects_double_join() {
        let mut r = VehicleRegistry::new();
        let slot = Arc::new(RouteSlot::new());
        r.insert(v(1), &slot).unwrap();
        assert!(matches!(r.insert(v(1), &slot), Err(ControlError::AlreadyJoined(_))));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn removed_key_never_resolves_again() {
        let mut r = VehicleRegistry::new();
        let slot = Arc::new(RouteSlot::new());
        let old = r.insert(v(1), &slot).unwrap();
        assert_eq!(r.remove(v(1)), Some(old));
        let new = r.insert(v(1), &slot).unwrap();
        assert_ne!(old, new);
        assert!(r.slot(old).is_none());
        assert!(r.slot(new).is_some());
        assert_eq!(r.id(new), Some(v(1)));
    }

    #[test]
    fn dropped_slot_is_dangling() {
        let mut r = VehicleRegistry::new();
        let slot = Arc::new(RouteSlot::new());
        let key = r.insert(v(4), &slot).unwrap();
        assert!(r.dangling().is_empty());
        drop(slot);
        assert!(r.slot(key).is_none());
        assert_eq!(r.dangling(), vec![v(4)]);
    }

    #[test]
    fn queue_purge_keeps_order() {
        let mut r = VehicleRegistry::new();
        let slot = Arc::new(RouteSlot::new());
        let k1 = r.insert(v(1), &slot).unwrap();
        let k2 = r.insert(v(2), &slot).unwrap();

        let mut q = JobQueue::new();
        q.push(job(1, A, C), k1);
        q.push(job(2, B, C), k2);
        q.push(job(1, C, A), k1);
        q.push(job(2, C, B), k2);
        assert_eq!(q.purge(k1), 2);
        let left: Vec<Job> = q.iter().copied().collect();
        assert_eq!(left, vec![job(2, B, C), job(2, C, B)]);
        assert_eq!(q.front(), Some(&job(2, B, C)));
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch {
    use super::*;

    #[test]
    fn stops_when_nobody_joined() {
        let n = node([1, 1, 1]);
        assert_eq!(n.dispatch_once(), DispatchOutcome::Stopped);
        assert!(n.dispatch_once().is_stopped());
    }

    #[test]
    fn idle_with_empty_queue() {
        let n = node([1, 1, 1]);
        let _s = join(&n, 1, A);
        assert_eq!(n.dispatch_once(), DispatchOutcome::Idle);
    }

    #[test]
    fn triangle_routes_through_b() {
        let n = node([1, 1, 1]);
        let slot = join(&n, 1, A);
        n.queue_job(job(1, A, C)).unwrap();

        let out = n.dispatch_once();
        assert_eq!(out.assigned(), &[v(1)]);
        assert!(n.pending_jobs().is_empty());

        let route = slot.take_route().unwrap();
        assert_eq!(
            route.steps,
            vec![
                RouteStep { subnet: A, cost: 0.0 },
                RouteStep { subnet: B, cost: 1.0 },
                RouteStep { subnet: C, cost: 1.0 },
            ]
        );
        assert_eq!(route.total_cost(), 2.0);
    }

    #[test]
    fn unreachable_job_stays_at_head() {
        let mut b = RoadNetworkBuilder::new();
        b.build_index(["A", "B", "island"]).unwrap();
        b.add_road("A", "B", 1.0).unwrap();
        let n = NodeBuilder::new(b.build())
            .capacities([("A", 5), ("B", 5), ("island", 5)])
            .build()
            .unwrap();
        let island = n.subnet_id("island").unwrap();
        let s1 = join(&n, 1, A);
        let s2 = join(&n, 2, A);
        n.queue_job(job(1, A, island)).unwrap();
        n.queue_job(job(2, A, B)).unwrap();

        for _ in 0..3 {
            assert_eq!(
                n.dispatch_once(),
                DispatchOutcome::NoRoute { vehicle: v(1), start: A, dest: island }
            );
        }
        assert_eq!(n.pending_jobs(), vec![job(1, A, island), job(2, A, B)]);
        assert!(!s1.has_route());
        assert!(!s2.has_route());
    }

    #[test]
    fn batch_serves_every_matching_job() {
        let n = node([5, 5, 5]);
        let slots: Vec<_> = (1..=3).map(|i| join(&n, i, A)).collect();
        let other = join(&n, 9, B);
        n.queue_job(job(1, A, C)).unwrap();
        n.queue_job(job(9, B, C)).unwrap();
        n.queue_job(job(2, A, C)).unwrap();
        n.queue_job(job(3, A, C)).unwrap();

        let out = n.dispatch_once();
        assert_eq!(out.assigned(), &[v(1), v(2), v(3)]);
        assert!(slots.iter().all(|s| s.has_route()));
        assert!(!other.has_route());
        assert_eq!(n.pending_jobs(), vec![job(9, B, C)]);
    }

    #[test]
    fn admission_stops_at_bottleneck_capacity() {
        // B is the bottleneck (capacity 1, empty): the counter admits at 0
        // and at 1, then stops.
        let n = node([10, 1, 10]);
        let slots: Vec<_> = (1..=3).map(|i| join(&n, i, A)).collect();
        for i in 1..=3 {
            n.queue_job(job(i, A, C)).unwrap();
        }

        let out = n.dispatch_once();
        match &out {
            DispatchOutcome::Dispatched { bottleneck, assigned, .. } => {
                assert_eq!(*bottleneck, B);
                assert_eq!(assigned, &vec![v(1), v(2)]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(slots[0].has_route() && slots[1].has_route());
        assert!(!slots[2].has_route());
        assert_eq!(n.pending_jobs(), vec![job(3, A, C)]);
    }

    #[test]
    fn unmatched_jobs_keep_fifo_order() {
        let n = node([9, 9, 9]);
        let _slots: Vec<_> = (1..=4).map(|i| join(&n, i, A)).collect();
        n.queue_job(job(1, A, C)).unwrap();
        n.queue_job(job(2, B, A)).unwrap();
        n.queue_job(job(3, A, C)).unwrap();
        n.queue_job(job(4, C, A)).unwrap();

        n.dispatch_once();
        assert_eq!(n.pending_jobs(), vec![job(2, B, A), job(4, C, A)]);
    }

    #[test]
    fn every_job_is_queued_or_delivered() {
        let n = node([2, 1, 2]);
        let slots: Vec<_> = (0..6).map(|i| join(&n, i, if i % 2 == 0 { A } else { C })).collect();
        for i in 0..6u32 {
            let (s, d) = if i % 2 == 0 { (A, C) } else { (C, A) };
            n.queue_job(job(i, s, d)).unwrap();
        }
        for _ in 0..3 {
            n.dispatch_once();
            let pending: Vec<VehicleId> = n.pending_jobs().iter().map(|j| j.vehicle).collect();
            for (i, slot) in slots.iter().enumerate() {
                let queued = pending.contains(&v(i as u32));
                assert!(queued != slot.has_route(), "vehicle {i}: queued={queued}");
            }
        }
    }

    #[test]
    fn dropped_vehicle_is_reaped() {
        let n = node([5, 5, 5]);
        let keep = join(&n, 1, A);
        let gone = join(&n, 2, A);
        n.queue_job(job(2, A, C)).unwrap();
        drop(gone);

        assert_eq!(n.dispatch_once(), DispatchOutcome::Idle);
        assert_eq!(n.joined_count(), 1);
        assert!(n.pending_jobs().is_empty());
        assert_eq!(n.occupants(A), vec![v(1)]);

        drop(keep);
        assert!(n.dispatch_once().is_stopped());
        assert_eq!(n.occupancy(A), 0);
    }
}

// ── Node façade ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod node {
    use super::*;
    use crate::ControlError;
    use sdn_spatial::SpatialError;

    #[test]
    fn third_vehicle_cannot_enter_full_subnet() {
        let n = node([5, 2, 5]);
        let _s1 = join(&n, 1, B);
        let _s2 = join(&n, 2, B);
        let _s3 = join(&n, 3, A);
        assert!(!n.try_change_road(v(3), A, B));
        assert_eq!(n.occupants(B), vec![v(1), v(2)]);
        assert_eq!(n.occupants(A), vec![v(3)]);
    }

    #[test]
    fn self_loop_leaves_occupancy_unchanged() {
        let n = node([1, 1, 1]);
        let _s = join(&n, 1, A);
        assert!(n.try_change_road(v(1), A, A));
        assert!(n.try_change_road(v(42), C, C));
        assert_eq!(n.occupants(A), vec![v(1)]);
    }

    #[test]
    fn wrong_current_subnet_is_refused() {
        let n = node([1, 1, 1]);
        let _s = join(&n, 1, A);
        assert!(!n.try_change_road(v(1), B, C));
        assert_eq!(n.occupants(A), vec![v(1)]);
        assert!(n.occupants(B).is_empty());
        assert!(n.occupants(C).is_empty());
    }

    #[test]
    fn unjoined_vehicle_never_moves() {
        let n = node([1, 1, 1]);
        assert!(!n.try_change_road(v(7), A, B));
        assert_eq!(n.occupancy(B), 0);
    }

    #[test]
    fn double_join_is_rejected() {
        let n = node([1, 1, 1]);
        let slot = join(&n, 1, A);
        assert!(matches!(
            n.join_network(v(1), B, &slot),
            Err(ControlError::AlreadyJoined(_))
        ));
        assert_eq!(n.occupancy(B), 0);
    }

    #[test]
    fn join_at_unknown_subnet_fails() {
        let n = node([1, 1, 1]);
        let slot = Arc::new(RouteSlot::new());
        assert!(n.join_network(v(1), SubnetId(3), &slot).is_err());
        assert_eq!(n.joined_count(), 0);
    }

    #[test]
    fn leave_purges_jobs_and_occupancy() {
        let n = node([1, 1, 1]);
        let _s1 = join(&n, 1, A);
        let _s2 = join(&n, 2, B);
        n.queue_job(job(1, A, C)).unwrap();
        n.queue_job(job(2, B, C)).unwrap();

        assert!(n.leave_network(v(1), A));
        assert!(!n.leave_network(v(1), A), "double leave is a no-op");
        assert!(!n.is_joined(v(1)));
        assert_eq!(n.pending_jobs(), vec![job(2, B, C)]);
        assert_eq!(n.occupancy(A), 0);
        assert_eq!(n.occupancy(B), 1);
    }

    #[test]
    fn leave_from_wrong_subnet_still_cleans_up() {
        let n = node([1, 1, 1]);
        let _s = join(&n, 1, A);
        assert!(n.leave_network(v(1), C));
        assert_eq!(n.occupancy(A), 0);
        assert_eq!(n.occupancy(C), 0);
    }

    #[test]
    fn queue_job_validates_inputs() {
        let n = node([1, 1, 1]);
        assert!(matches!(n.queue_job(job(1, A, C)), Err(ControlError::UnknownVehicle(_))));
        let _s = join(&n, 1, A);
        assert!(matches!(
            n.queue_job(job(1, A, SubnetId(8))),
            Err(ControlError::SubnetNotFound(_))
        ));
        assert!(n.pending_jobs().is_empty());
    }

    #[test]
    fn set_capacity_by_name() {
        let n = node([0, 0, 0]);
        n.set_capacity("B", 3).unwrap();
        assert_eq!(n.capacity(B), 3);
        assert!(matches!(n.set_capacity("Q", 1), Err(ControlError::UnknownSubnet(_))));
    }

    #[test]
    fn replacing_the_matrix_changes_routes() {
        let n = node([5, 5, 5]);
        let slot = join(&n, 1, A);
        n.set_adjacency(&[
            vec![0.0, 0.0, 5.0],
            vec![0.0, 0.0, 0.0],
            vec![5.0, 0.0, 0.0],
        ])
        .unwrap();
        n.queue_job(job(1, A, C)).unwrap();
        n.dispatch_once();
        let route = slot.take_route().unwrap();
        assert_eq!(route.subnets().collect::<Vec<_>>(), vec![A, C]);
    }

    #[test]
    fn bad_matrix_is_rejected_and_old_one_kept() {
        let n = node([5, 5, 5]);
        let err = n.set_adjacency(&[vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, ControlError::Spatial(SpatialError::MatrixSize { .. })));
        assert_eq!(n.network().edge_count(), 6);
    }

    #[test]
    fn builder_rejects_unknown_capacity_name() {
        let err = NodeBuilder::new(triangle()).capacity("Z", 1).build().err().unwrap();
        assert!(matches!(err, ControlError::UnknownSubnet(name) if name == "Z"));
    }

    #[test]
    fn builder_defaults_capacity_to_zero() {
        let n = NodeBuilder::new(triangle()).capacity("A", 4).build().unwrap();
        assert_eq!(n.capacity(A), 4);
        assert_eq!(n.capacity(B), 0);
        assert_eq!(n.subnet_name(C).as_deref(), Some("C"));
    }
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrency {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn concurrent_entries_never_exceed_capacity() {
        let n = Arc::new(node([100, 3, 100]));
        let slots: Vec<_> = (0..16).map(|i| join(&n, i, A)).collect();
        let barrier = Arc::new(Barrier::new(16));
        let admitted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16u32)
            .map(|i| {
                let (n, barrier, admitted) = (n.clone(), barrier.clone(), admitted.clone());
                thread::spawn(move || {
                    barrier.wait();
                    if n.try_change_road(VehicleId(i), A, B) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(n.occupancy(B) <= 3);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 3);
        assert_eq!(n.occupancy(B), 3);
        assert_eq!(n.occupancy(A), 13);
        drop(slots);
    }

    #[test]
    fn concurrent_producers_and_dispatcher_conserve_jobs() {
        const VEHICLES: u32 = 24;
        let n = Arc::new(node([100, 100, 100]));
        let slots: Vec<_> = (0..VEHICLES).map(|i| join(&n, i, A)).collect();
        let producing = Arc::new(AtomicBool::new(true));

        let dispatcher = {
            let (n, producing) = (n.clone(), producing.clone());
            thread::spawn(move || {
                loop {
                    // Read the flag first: once it is false every job is
                    // already queued, so a following Idle means drained.
                    let done = !producing.load(Ordering::SeqCst);
                    if n.dispatch_once() == DispatchOutcome::Idle && done {
                        break;
                    }
                    thread::yield_now();
                }
            })
        };

        let producers: Vec<_> = (0..4u32)
            .map(|p| {
                let n = n.clone();
                thread::spawn(move || {
                    for i in (p..VEHICLES).step_by(4) {
                        let dest = if i % 2 == 0 { C } else { B };
                        n.queue_job(job(i, A, dest)).unwrap();
                    }
                })
            })
            .collect();
        for h in producers {
            h.join().unwrap();
        }
        producing.store(false, Ordering::SeqCst);
        dispatcher.join().unwrap();

        assert!(n.pending_jobs().is_empty());
        for (i, slot) in slots.iter().enumerate() {
            let route = slot.take_route().unwrap_or_else(|| panic!("vehicle {i} got no route"));
            let dest = if i % 2 == 0 { C } else { B };
            assert_eq!(route.dest, dest);
        }
    }
}
