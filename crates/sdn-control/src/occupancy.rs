//! Per-subnet occupant sets and the single-hop capacity gate.

use sdn_core::{SubnetId, VehicleId};
use sdn_spatial::CongestionView;

use crate::{ControlError, ControlResult};

#[cfg(feature = "fx-hash")]
type OccupantSet = rustc_hash::FxHashSet<VehicleId>;
#[cfg(not(feature = "fx-hash"))]
type OccupantSet = std::collections::HashSet<VehicleId>;

/// Which vehicles are on which subnet, and how many each subnet admits.
///
/// Both tables are indexed by `SubnetId` and sized to the network when the
/// node is built.  A subnet whose capacity was never configured admits
/// nothing (capacity `0`).
///
/// The tracker is not synchronised on its own; it lives inside the node
/// state and is only touched under the node lock.
#[derive(Debug)]
pub struct OccupancyTracker {
    occupants: Vec<OccupantSet>,
    capacity:  Vec<usize>,
}

impl OccupancyTracker {
    /// A tracker for `subnet_count` empty subnets, all with capacity `0`.
    pub fn new(subnet_count: usize) -> Self {
        Self::with_capacities(vec![0; subnet_count])
    }

    /// A tracker with one capacity per subnet, in `SubnetId` order.
    pub fn with_capacities(capacity: Vec<usize>) -> Self {
        let occupants = (0..capacity.len()).map(|_| OccupantSet::default()).collect();
        Self { occupants, capacity }
    }

    pub fn subnet_count(&self) -> usize {
        self.capacity.len()
    }

    // ── Capacity ──────────────────────────────────────────────────────────

    pub fn capacity(&self, subnet: SubnetId) -> usize {
        self.capacity.get(subnet.index()).copied().unwrap_or(0)
    }

    pub fn set_capacity(&mut self, subnet: SubnetId, capacity: usize) -> ControlResult<()> {
        let slot = self
            .capacity
            .get_mut(subnet.index())
            .ok_or(ControlError::SubnetNotFound(subnet))?;
        *slot = capacity;
        Ok(())
    }

    // ── Occupancy ─────────────────────────────────────────────────────────

    /// Number of vehicles on `subnet` (`0` for an unknown id).
    pub fn occupancy(&self, subnet: SubnetId) -> usize {
        self.occupants.get(subnet.index()).map_or(0, |s| s.len())
    }

    /// Vehicles on `subnet`, sorted by id.
    pub fn occupants(&self, subnet: SubnetId) -> Vec<VehicleId> {
        let mut v: Vec<VehicleId> = self
            .occupants
            .get(subnet.index())
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        v.sort_unstable();
        v
    }

    pub fn is_on(&self, vehicle: VehicleId, subnet: SubnetId) -> bool {
        self.occupants
            .get(subnet.index())
            .is_some_and(|s| s.contains(&vehicle))
    }

    /// Total vehicles across all subnets.
    pub fn total(&self) -> usize {
        self.occupants.iter().map(|s| s.len()).sum()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Place `vehicle` on `subnet`.  Joining does not check capacity: a
    /// vehicle has to start somewhere.
    pub fn join(&mut self, vehicle: VehicleId, subnet: SubnetId) -> ControlResult<()> {
        let set = self
            .occupants
            .get_mut(subnet.index())
            .ok_or(ControlError::SubnetNotFound(subnet))?;
        set.insert(vehicle);
        Ok(())
    }

    /// Remove `vehicle` from `subnet`.  Returns `false` if it was not there.
    pub fn leave(&mut self, vehicle: VehicleId, subnet: SubnetId) -> bool {
        self.occupants
            .get_mut(subnet.index())
            .is_some_and(|s| s.remove(&vehicle))
    }

    /// Remove `vehicle` from every subnet.  Returns how many sets held it.
    pub fn evict(&mut self, vehicle: VehicleId) -> usize {
        self.occupants
            .iter_mut()
            .filter_map(|s| s.remove(&vehicle).then_some(()))
            .count()
    }

    /// Move `vehicle` from `from` to `to` if `to` has room.
    ///
    /// `from == to` always succeeds without touching state.  Otherwise the
    /// move happens only when `vehicle` is on `from` and
    /// `occupancy(to) < capacity(to)`; a rejected move leaves both sets
    /// unchanged.
    pub fn try_change(&mut self, vehicle: VehicleId, from: SubnetId, to: SubnetId) -> bool {
        if from == to {
            return true;
        }
        if !self.is_on(vehicle, from) {
            return false;
        }
        let to_i = to.index();
        if to_i >= self.occupants.len() || self.occupants[to_i].len() >= self.capacity[to_i] {
            return false;
        }
        self.occupants[from.index()].remove(&vehicle);
        self.occupants[to_i].insert(vehicle);
        true
    }
}

impl CongestionView for OccupancyTracker {
    fn occupancy(&self, subnet: SubnetId) -> usize {
        OccupancyTracker::occupancy(self, subnet)
    }
}
