//! Fluent builder for a [`CentralComputeNode`].

use sdn_core::SubnetId;
use sdn_spatial::{AStarRouter, RoadNetwork, Router};

use crate::{CentralComputeNode, ControlError, ControlResult, OccupancyTracker};

/// Builder for [`CentralComputeNode<R>`].
///
/// # Inputs
///
/// | Method            | Default                                   |
/// |-------------------|-------------------------------------------|
/// | `new(network)`    | required                                  |
/// | `.capacity(n, c)` | unconfigured subnets get capacity `0`     |
/// | `.router(r)`      | [`AStarRouter`]                           |
///
/// # Example
///
/// ```rust,ignore
/// let node = NodeBuilder::new(network)
///     .capacities([("A", 1), ("B", 1), ("C", 1)])
///     .build()?;
/// ```
pub struct NodeBuilder<R: Router = AStarRouter> {
    network:    RoadNetwork,
    capacities: Vec<(String, usize)>,
    router:     R,
}

impl NodeBuilder<AStarRouter> {
    pub fn new(network: RoadNetwork) -> Self {
        Self { network, capacities: Vec::new(), router: AStarRouter }
    }
}

impl<R: Router> NodeBuilder<R> {
    /// Swap the routing engine.
    pub fn router<R2: Router>(self, router: R2) -> NodeBuilder<R2> {
        NodeBuilder { network: self.network, capacities: self.capacities, router }
    }

    /// Capacity of the subnet named `name`.  A later call for the same name
    /// wins.
    pub fn capacity(mut self, name: impl Into<String>, capacity: usize) -> Self {
        self.capacities.push((name.into(), capacity));
        self
    }

    pub fn capacities<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        self.capacities
            .extend(entries.into_iter().map(|(n, c)| (n.into(), c)));
        self
    }

    /// Validate the capacity table and build the node.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownSubnet`] if a capacity names a subnet that is
    /// not in the network.
    pub fn build(self) -> ControlResult<CentralComputeNode<R>> {
        let n = self.network.subnet_count();
        let mut table: Vec<Option<usize>> = vec![None; n];
        for (name, cap) in &self.capacities {
            let id = self
                .network
                .subnet_id(name)
                .ok_or_else(|| ControlError::UnknownSubnet(name.clone()))?;
            table[id.index()] = Some(*cap);
        }

        let capacity: Vec<usize> = table
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.unwrap_or_else(|| {
                    let name = self.network.name(SubnetId(i as u32)).unwrap_or("?");
                    log::warn!("subnet {name:?} has no capacity configured; it admits no vehicles");
                    0
                })
            })
            .collect();

        log::info!(
            "compute node ready: {n} subnets, {} directed edges, total capacity {}",
            self.network.edge_count(),
            capacity.iter().fold(0usize, |acc, c| acc.saturating_add(*c)),
        );
        Ok(CentralComputeNode::from_parts(
            self.router,
            self.network,
            OccupancyTracker::with_capacities(capacity),
        ))
    }
}
