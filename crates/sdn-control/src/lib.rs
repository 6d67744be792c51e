//! `sdn-control` — the central compute node.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`occupancy`] | `OccupancyTracker`: per-subnet occupant sets and capacities   |
//! | [`queue`]     | `Job`, `JobQueue`                                             |
//! | [`slot`]      | `RouteSlot`: the vehicle-owned, lock-guarded route mailbox    |
//! | [`registry`]  | `VehicleRegistry`, `VehicleKey`: generational vehicle handles |
//! | [`dispatch`]  | `DispatchOutcome` and the batched dispatch pass               |
//! | [`node`]      | `CentralComputeNode`: the thread-safe façade                  |
//! | [`builder`]   | `NodeBuilder`                                                 |
//! | [`error`]     | `ControlError`, `ControlResult<T>`                            |
//!
//! # Locking
//!
//! The node owns one lock over all of its state.  Each vehicle owns one lock
//! over its [`RouteSlot`].  The only place both are held is the dispatch
//! pass, which takes the node lock first and then each matched vehicle's slot
//! lock just long enough to install the route.  Vehicles must never call into
//! the node while holding their own slot lock.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                             |
//! |-----------|----------------------------------------------------|
//! | `fx-hash` | Use `FxHashSet` for the per-subnet occupant sets.  |

pub mod builder;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod occupancy;
pub mod queue;
pub mod registry;
pub mod slot;

#[cfg(test)]
mod tests;

pub use builder::NodeBuilder;
pub use dispatch::DispatchOutcome;
pub use error::{ControlError, ControlResult};
pub use node::CentralComputeNode;
pub use occupancy::OccupancyTracker;
pub use queue::{Job, JobQueue};
pub use registry::{VehicleKey, VehicleRegistry};
pub use slot::RouteSlot;
