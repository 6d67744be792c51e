//! `sdn-core` — foundational types for the software-defined traffic network.
//!
//! This crate is a dependency of every other `sdn-*` crate.  It has no
//! `sdn-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`ids`]    | `SubnetId`, `VehicleId`                                     |
//! | [`time`]   | `Tick` (dispatch round counter), `SimConfig`                |
//! | [`rng`]    | `VehicleRng` (per-vehicle), `SimRng` (global)               |
//! | [`sync`]   | `Guarded<T>` — the lock-guarded state wrapper               |
//! | [`error`]  | `SdnError`, `SdnResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and `Tick`.          |

pub mod error;
pub mod ids;
pub mod rng;
pub mod sync;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SdnError, SdnResult};
pub use ids::{SubnetId, VehicleId};
pub use rng::{SimRng, VehicleRng};
pub use sync::Guarded;
pub use time::{SimConfig, Tick};
