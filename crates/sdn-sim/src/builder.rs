//! Fluent builder for constructing a [`Sim`].

use sdn_agent::Vehicle;
use sdn_control::NodeBuilder;
use sdn_core::{SimConfig, VehicleId};
use sdn_scenario::Scenario;
use sdn_spatial::{AStarRouter, Router};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed and pacing
/// - [`Scenario`]: subnets with capacities, edges, vehicles
///
/// # Optional inputs
///
/// | Method       | Default           |
/// |--------------|-------------------|
/// | `.router(r)` | [`AStarRouter`]   |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default(), scenario).build()?;
/// let report = sim.run(&NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router = AStarRouter> {
    config:   SimConfig,
    scenario: Scenario,
    router:   R,
}

impl SimBuilder<AStarRouter> {
    pub fn new(config: SimConfig, scenario: Scenario) -> Self {
        Self { config, scenario, router: AStarRouter }
    }
}

impl<R: Router> SimBuilder<R> {
    /// Swap the routing engine.
    pub fn router<R2: Router>(self, router: R2) -> SimBuilder<R2> {
        SimBuilder { config: self.config, scenario: self.scenario, router }
    }

    /// Validate everything and build the [`Sim`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Core`] if the config would never make progress.
    /// - [`SimError::Scenario`] for an inconsistent scenario or bad matrix.
    /// - [`SimError::Control`] if a capacity cannot be applied.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        self.scenario.validate()?;

        let network = self.scenario.network()?;
        let node = NodeBuilder::new(network)
            .router(self.router)
            .capacities(self.scenario.capacities())
            .build()?;

        let vehicles = self
            .scenario
            .vehicles
            .iter()
            .map(|spec| {
                let resolve = |name: &str| {
                    node.subnet_id(name)
                        .ok_or_else(|| SimError::Config(format!("vehicle {} uses unknown subnet {name:?}", spec.id)))
                };
                Ok(Vehicle::new(
                    VehicleId(spec.id),
                    resolve(&spec.source)?,
                    resolve(&spec.destination)?,
                    self.config.seed,
                ))
            })
            .collect::<SimResult<Vec<_>>>()?;

        log::debug!("sim built: {} vehicles, seed {}", vehicles.len(), self.config.seed);
        Ok(Sim::new(self.config, node, vehicles))
    }
}
