//! `sdn-scenario` — what the network looks like and who drives on it.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`model`]    | `Scenario`, `SubnetSpec`, `EdgeSpec`, `VehicleSpec`          |
//! | [`loader`]   | CSV loading: `load_scenario_dir` and per-file `_reader` fns  |
//! | [`generate`] | `Scenario::grid`, `Scenario::with_random_vehicles`           |
//! | [`error`]    | `ScenarioError`, `ScenarioResult<T>`                         |

pub mod error;
pub mod generate;
pub mod loader;
pub mod model;


pub use error::{ScenarioError, ScenarioResult};
pub use loader::{
    load_edges_reader, load_scenario_dir, load_subnets_reader, load_vehicles_reader,
};
pub use model::{EdgeSpec, Scenario, SubnetSpec, VehicleSpec};
