//! `sdn-spatial` — road network graph and congestion-aware routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (subnet index + cost matrix), `RoadNetworkBuilder` |
//! | [`router`]  | `Router` trait, `Route`, `RouteStep`, `AStarRouter`, `CongestionView` |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                              |

pub mod error;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{AStarRouter, CongestionView, FreeFlow, Route, RouteStep, Router};
