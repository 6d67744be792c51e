use thiserror::Error;

use sdn_control::ControlError;
use sdn_core::{SdnError, VehicleId};
use sdn_scenario::ScenarioError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] SdnError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("compute node error: {0}")]
    Control(#[from] ControlError),

    #[error("thread for vehicle {0} panicked")]
    VehiclePanicked(VehicleId),
}

pub type SimResult<T> = Result<T, SimError>;
