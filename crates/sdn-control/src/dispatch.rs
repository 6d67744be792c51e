//! One batched dispatch pass.
//!
//! ```text
//! 1. no vehicles joined            → Stopped
//! 2. queue empty                   → Idle
//! 3. plan the front job's pair     → NoRoute (front job stays queued)
//! 4. bottleneck = first subnet on the route with the smallest capacity
//!    counter    = occupancy(bottleneck)
//! 5. scan the queue front to back; each job with the same pair is admitted
//!    while counter <= capacity(bottleneck): deliver route, counter += 1,
//!    remove job.  Everything else stays, in order.
//! ```
//!
//! The whole pass runs under the node lock.  Delivery takes the matched
//! vehicle's slot lock inside that, so a job is removed from the queue in
//! the same critical section that fills its vehicle's slot.
//!
//! The counter is an optimistic gate: it starts from the bottleneck's
//! current occupancy but admitted vehicles only physically occupy their
//! start subnet until they move.

use sdn_core::{SubnetId, VehicleId};
use sdn_spatial::{Route, Router, SpatialError};

use crate::node::NodeState;

/// What a call to [`dispatch_once`](crate::CentralComputeNode::dispatch_once)
/// did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No vehicle is joined; the driver may stop.
    Stopped,
    /// Nothing is queued.
    Idle,
    /// The front job's destination is unreachable right now.  It stays at
    /// the head of the queue and is retried on the next pass.
    NoRoute { vehicle: VehicleId, start: SubnetId, dest: SubnetId },
    /// A route was planned for `(start, dest)` and delivered to `assigned`,
    /// in queue order.  `assigned` may be empty when the bottleneck is
    /// already over capacity.
    Dispatched {
        start:      SubnetId,
        dest:       SubnetId,
        bottleneck: SubnetId,
        assigned:   Vec<VehicleId>,
    },
}

impl DispatchOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, DispatchOutcome::Stopped)
    }

    /// Vehicles that received a route in this pass.
    pub fn assigned(&self) -> &[VehicleId] {
        match self {
            DispatchOutcome::Dispatched { assigned, .. } => assigned,
            _ => &[],
        }
    }
}

/// First subnet on `route` with the strictly smallest capacity.
pub(crate) fn bottleneck(route: &Route, capacity: impl Fn(SubnetId) -> usize) -> Option<(SubnetId, usize)> {
    let mut best: Option<(SubnetId, usize)> = None;
    for subnet in route.subnets() {
        let cap = capacity(subnet);
        if best.is_none_or(|(_, min)| cap < min) {
            best = Some((subnet, cap));
        }
    }
    best
}

pub(crate) fn run<R: Router>(state: &mut NodeState, router: &R) -> DispatchOutcome {
    state.reap_dangling();

    if state.registry.is_empty() {
        return DispatchOutcome::Stopped;
    }
    let Some(&front) = state.queue.front() else {
        return DispatchOutcome::Idle;
    };
    let (start, dest) = front.pair();

    let route = match router.route(&state.network, &state.occupancy, start, dest) {
        Ok(route) if !route.is_empty() => route,
        Ok(_) | Err(SpatialError::NoRoute { .. }) => {
            log::trace!("dispatch: no route {start} -> {dest} for {}", front.vehicle);
            return DispatchOutcome::NoRoute { vehicle: front.vehicle, start, dest };
        }
        Err(e) => {
            // Only reachable if the matrix was replaced with one that no
            // longer covers a queued subnet; treat as unroutable.
            log::warn!("dispatch: routing {start} -> {dest} failed: {e}");
            return DispatchOutcome::NoRoute { vehicle: front.vehicle, start, dest };
        }
    };

    let Some((neck, min_capacity)) = bottleneck(&route, |s| state.occupancy.capacity(s)) else {
        return DispatchOutcome::NoRoute { vehicle: front.vehicle, start, dest };
    };
    let mut counter = state.occupancy.occupancy(neck);

    let mut assigned = Vec::new();
    let mut lost = Vec::new();
    let registry = &state.registry;
    state.queue.retain(|job, key| {
        if job.pair() != (start, dest) || counter > min_capacity {
            return true;
        }
        match registry.slot(key) {
            Some(slot) => {
                slot.set_route(route.clone());
                counter += 1;
                assigned.push(job.vehicle);
            }
            None => lost.push(job.vehicle),
        }
        false
    });

    // A slot dropped between the reap above and the scan.
    for vehicle in lost {
        state.forget(vehicle);
    }

    log::debug!(
        "dispatch: {start} -> {dest} via {} steps, bottleneck {neck} (cap {min_capacity}), assigned {}",
        route.len(),
        assigned.len(),
    );
    DispatchOutcome::Dispatched { start, dest, bottleneck: neck, assigned }
}
