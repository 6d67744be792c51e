//! `sdn-agent` — the vehicle side of the network.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`phase`]   | `VehiclePhase`: where a vehicle is in its trip        |
//! | [`vehicle`] | `Vehicle`: identity, route slot, itinerary, `step`    |
//!
//! A vehicle is driven by repeated calls to [`Vehicle::step`], one per poll,
//! from the thread that owns it.

pub mod phase;
pub mod vehicle;


pub use phase::VehiclePhase;
pub use vehicle::{TripSummary, Vehicle};
