//! Generational handles for joined vehicles.
//!
//! The node never holds a strong reference to a vehicle.  Each join inserts
//! a `Weak<RouteSlot>` into a `SlotMap`; the returned [`VehicleKey`] carries
//! a generation, so once the vehicle leaves, the key no longer resolves even
//! if the slot is reused by a later join.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use slotmap::{SlotMap, new_key_type};

use sdn_core::VehicleId;

use crate::{ControlError, ControlResult, RouteSlot};

new_key_type! {
    /// Generational key of a joined vehicle.
    pub struct VehicleKey;
}

#[derive(Debug)]
struct Registered {
    id:   VehicleId,
    slot: Weak<RouteSlot>,
}

/// Joined vehicles, addressable by id or by key.
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    entries: SlotMap<VehicleKey, Registered>,
    by_id:   HashMap<VehicleId, VehicleKey>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` with a non-owning handle to its route slot.
    ///
    /// # Errors
    ///
    /// [`ControlError::AlreadyJoined`] if `id` is already registered.
    pub fn insert(&mut self, id: VehicleId, slot: &Arc<RouteSlot>) -> ControlResult<VehicleKey> {
        if self.by_id.contains_key(&id) {
            return Err(ControlError::AlreadyJoined(id));
        }
        let key = self.entries.insert(Registered { id, slot: Arc::downgrade(slot) });
        self.by_id.insert(id, key);
        Ok(key)
    }

    /// Unregister `id`, invalidating its key.
    pub fn remove(&mut self, id: VehicleId) -> Option<VehicleKey> {
        let key = self.by_id.remove(&id)?;
        self.entries.remove(key);
        Some(key)
    }

    pub fn key(&self, id: VehicleId) -> Option<VehicleKey> {
        self.by_id.get(&id).copied()
    }

    pub fn id(&self, key: VehicleKey) -> Option<VehicleId> {
        self.entries.get(key).map(|r| r.id)
    }

    /// Upgrade `key` to the vehicle's route slot.  `None` if the vehicle has
    /// left or its slot has been dropped.
    pub fn slot(&self, key: VehicleKey) -> Option<Arc<RouteSlot>> {
        self.entries.get(key).and_then(|r| r.slot.upgrade())
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered vehicles whose route slot has been dropped.
    pub fn dangling(&self) -> Vec<VehicleId> {
        self.entries
            .values()
            .filter(|r| r.slot.strong_count() == 0)
            .map(|r| r.id)
            .collect()
    }
}
