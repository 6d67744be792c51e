//! Spatial-subsystem error type.

use thiserror::Error;

use sdn_core::SubnetId;

/// Errors produced by `sdn-spatial`.
///
/// `NoRoute` and `NoEdge` are ordinary runtime outcomes; every other variant
/// is a configuration error that must abort setup.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: SubnetId, to: SubnetId },

    #[error("no direct edge from {from} to {to}")]
    NoEdge { from: SubnetId, to: SubnetId },

    #[error("subnet {0} not found in network")]
    SubnetNotFound(SubnetId),

    #[error("unknown subnet name {0:?}")]
    UnknownSubnet(String),

    #[error("subnet {0:?} listed more than once")]
    DuplicateSubnet(String),

    #[error("subnet index already built")]
    IndexAlreadyBuilt,

    #[error("subnet index must be built before the adjacency matrix is set")]
    IndexNotBuilt,

    #[error("adjacency matrix must be {expected}x{expected}: {detail}")]
    MatrixSize { expected: usize, detail: String },

    #[error("invalid edge cost {cost} from {from:?} to {to:?}")]
    InvalidCost { from: String, to: String, cost: f64 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
