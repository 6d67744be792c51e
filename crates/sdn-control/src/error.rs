//! Control-plane error type.

use thiserror::Error;

use sdn_core::{SubnetId, VehicleId};
use sdn_spatial::SpatialError;

/// Errors produced by `sdn-control`.
///
/// Capacity rejections and unroutable jobs are not errors; they come back as
/// `false` from [`try_change_road`](crate::CentralComputeNode::try_change_road)
/// and [`DispatchOutcome::NoRoute`](crate::DispatchOutcome::NoRoute).
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("unknown subnet name {0:?}")]
    UnknownSubnet(String),

    #[error("subnet {0} not found in network")]
    SubnetNotFound(SubnetId),

    #[error("vehicle {0} has not joined the network")]
    UnknownVehicle(VehicleId),

    #[error("vehicle {0} has already joined the network")]
    AlreadyJoined(VehicleId),
}

pub type ControlResult<T> = Result<T, ControlError>;
