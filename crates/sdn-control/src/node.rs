//! The central compute node.

use std::sync::Arc;

use sdn_core::{Guarded, SubnetId, VehicleId};
use sdn_spatial::{AStarRouter, RoadNetwork, Router};

use crate::dispatch::{self, DispatchOutcome};
use crate::{ControlError, ControlResult, Job, JobQueue, OccupancyTracker, RouteSlot, VehicleRegistry};

// ── NodeState ─────────────────────────────────────────────────────────────────

/// Everything guarded by the node lock.
#[derive(Debug)]
pub(crate) struct NodeState {
    pub(crate) network:   RoadNetwork,
    pub(crate) occupancy: OccupancyTracker,
    pub(crate) queue:     JobQueue,
    pub(crate) registry:  VehicleRegistry,
}

impl NodeState {
    fn require_subnet(&self, subnet: SubnetId) -> ControlResult<()> {
        if self.network.contains(subnet) {
            Ok(())
        } else {
            Err(ControlError::SubnetNotFound(subnet))
        }
    }

    /// Drop every trace of `vehicle`: registry entry, queued jobs and any
    /// occupant entry.
    pub(crate) fn forget(&mut self, vehicle: VehicleId) {
        if let Some(key) = self.registry.remove(vehicle) {
            self.queue.purge(key);
        }
        self.occupancy.evict(vehicle);
    }

    /// Forget vehicles whose route slot was dropped without leaving.
    pub(crate) fn reap_dangling(&mut self) {
        for vehicle in self.registry.dangling() {
            log::warn!("{vehicle} dropped without leaving the network; removing it");
            self.forget(vehicle);
        }
    }
}

// ── CentralComputeNode ────────────────────────────────────────────────────────

/// Thread-safe façade over the road network, occupancy, job queue and
/// vehicle registry.
///
/// Every method takes the node lock for its whole duration.  Share the node
/// between threads with `Arc<CentralComputeNode>`.
///
/// Build with [`NodeBuilder`](crate::NodeBuilder).
pub struct CentralComputeNode<R: Router = AStarRouter> {
    router: R,
    state:  Guarded<NodeState>,
}

impl<R: Router> CentralComputeNode<R> {
    pub(crate) fn from_parts(router: R, network: RoadNetwork, occupancy: OccupancyTracker) -> Self {
        Self {
            router,
            state: Guarded::new(NodeState {
                network,
                occupancy,
                queue:    JobQueue::new(),
                registry: VehicleRegistry::new(),
            }),
        }
    }

    // ── Vehicle-facing operations ─────────────────────────────────────────

    /// Register `vehicle` and place it on `source`.
    ///
    /// The node keeps only a weak handle to `slot`; routes are delivered
    /// into it by [`dispatch_once`](Self::dispatch_once).
    ///
    /// # Errors
    ///
    /// [`ControlError::SubnetNotFound`] for an unknown `source`,
    /// [`ControlError::AlreadyJoined`] on a double join.
    pub fn join_network(
        &self,
        vehicle: VehicleId,
        source:  SubnetId,
        slot:    &Arc<RouteSlot>,
    ) -> ControlResult<()> {
        let mut st = self.state.lock();
        st.require_subnet(source)?;
        st.registry.insert(vehicle, slot)?;
        st.occupancy.join(vehicle, source)?;
        log::debug!("{vehicle} joined at {source}");
        Ok(())
    }

    /// Unregister `vehicle`, remove it from `last` and drop its queued jobs.
    ///
    /// Returns `false` (and changes nothing) if the vehicle is not joined.
    /// If the vehicle is not on `last`, it is removed from wherever it is.
    pub fn leave_network(&self, vehicle: VehicleId, last: SubnetId) -> bool {
        let mut st = self.state.lock();
        let Some(key) = st.registry.remove(vehicle) else {
            log::debug!("leave ignored: {vehicle} is not joined");
            return false;
        };
        let purged = st.queue.purge(key);
        if !st.occupancy.leave(vehicle, last) {
            let n = st.occupancy.evict(vehicle);
            log::warn!("{vehicle} left from {last} but was not on it (found on {n} other subnets)");
        }
        log::debug!("{vehicle} left at {last}, {purged} queued jobs dropped");
        true
    }

    /// Append a route request.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownVehicle`] if the vehicle has not joined,
    /// [`ControlError::SubnetNotFound`] for an unknown start or destination.
    pub fn queue_job(&self, job: Job) -> ControlResult<()> {
        let mut st = self.state.lock();
        let key = st
            .registry
            .key(job.vehicle)
            .ok_or(ControlError::UnknownVehicle(job.vehicle))?;
        st.require_subnet(job.start)?;
        st.require_subnet(job.dest)?;
        st.queue.push(job, key);
        log::trace!("queued job {} {} -> {}", job.vehicle, job.start, job.dest);
        Ok(())
    }

    /// Move `vehicle` from `current` to `next` if `next` has room.
    ///
    /// `current == next` always succeeds.  A vehicle that is not joined, or
    /// is not on `current`, is never moved.
    pub fn try_change_road(&self, vehicle: VehicleId, current: SubnetId, next: SubnetId) -> bool {
        if current == next {
            return true;
        }
        let mut st = self.state.lock();
        if !st.registry.contains(vehicle) {
            log::debug!("road change refused: {vehicle} is not joined");
            return false;
        }
        if !st.occupancy.is_on(vehicle, current) {
            log::debug!("road change refused: {vehicle} is not on {current}");
            return false;
        }
        let moved = st.occupancy.try_change(vehicle, current, next);
        if !moved {
            log::trace!("{vehicle} blocked entering {next} (at capacity)");
        }
        moved
    }

    // ── Dispatcher-facing operations ──────────────────────────────────────

    /// Plan the front job's route and deliver it to every compatible queued
    /// job the admission gate lets through.  See [`crate::dispatch`].
    pub fn dispatch_once(&self) -> DispatchOutcome {
        let mut st = self.state.lock();
        dispatch::run(&mut st, &self.router)
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Set the capacity of the subnet named `name`.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownSubnet`] if no subnet has that name.
    pub fn set_capacity(&self, name: &str, capacity: usize) -> ControlResult<()> {
        let mut st = self.state.lock();
        let subnet = st
            .network
            .subnet_id(name)
            .ok_or_else(|| ControlError::UnknownSubnet(name.to_owned()))?;
        st.occupancy.set_capacity(subnet, capacity)?;
        log::debug!("capacity of {name:?} set to {capacity}");
        Ok(())
    }

    /// Replace the cost matrix.  The subnet index is unchanged.
    ///
    /// # Errors
    ///
    /// Size mismatch or non-finite entries; the old matrix is kept.
    pub fn set_adjacency(&self, matrix: &[Vec<f64>]) -> ControlResult<()> {
        self.state.lock().network.set_adjacency(matrix)?;
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn subnet_id(&self, name: &str) -> Option<SubnetId> {
        self.state.lock().network.subnet_id(name)
    }

    pub fn subnet_name(&self, subnet: SubnetId) -> Option<String> {
        self.state.lock().network.name(subnet).map(str::to_owned)
    }

    pub fn subnet_count(&self) -> usize {
        self.state.lock().network.subnet_count()
    }

    pub fn occupancy(&self, subnet: SubnetId) -> usize {
        self.state.lock().occupancy.occupancy(subnet)
    }

    /// Vehicles on `subnet`, sorted by id.
    pub fn occupants(&self, subnet: SubnetId) -> Vec<VehicleId> {
        self.state.lock().occupancy.occupants(subnet)
    }

    pub fn capacity(&self, subnet: SubnetId) -> usize {
        self.state.lock().occupancy.capacity(subnet)
    }

    /// Queued jobs in queue order.
    pub fn pending_jobs(&self) -> Vec<Job> {
        self.state.lock().queue.iter().copied().collect()
    }

    pub fn joined_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn is_joined(&self, vehicle: VehicleId) -> bool {
        self.state.lock().registry.contains(vehicle)
    }

    /// Clone of the current road network.
    pub fn network(&self) -> RoadNetwork {
        self.state.lock().network.clone()
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}
