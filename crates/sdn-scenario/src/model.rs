//! Scenario description: subnets, edges, vehicles.

use std::collections::{HashMap, HashSet};

use sdn_spatial::{RoadNetwork, RoadNetworkBuilder};

use crate::{ScenarioError, ScenarioResult};

/// A subnet and how many vehicles it holds at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetSpec {
    pub name:     String,
    pub capacity: usize,
}

/// A road between two subnets.  `two_way` adds the reverse edge with the
/// same cost.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub from:    String,
    pub to:      String,
    pub cost:    f64,
    pub two_way: bool,
}

/// A vehicle to spawn: where it starts and where it is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleSpec {
    pub id:          u32,
    pub source:      String,
    pub destination: String,
}

/// Everything needed to set up a run.
///
/// Subnet order is significant: it is the order in which subnet ids are
/// assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub subnets:  Vec<SubnetSpec>,
    pub edges:    Vec<EdgeSpec>,
    pub vehicles: Vec<VehicleSpec>,
}

impl Scenario {
    pub fn subnet_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.subnets.iter().map(|s| s.name.as_str())
    }

    /// `(name, capacity)` pairs in subnet order.
    pub fn capacities(&self) -> Vec<(String, usize)> {
        self.subnets.iter().map(|s| (s.name.clone(), s.capacity)).collect()
    }

    /// Check names, costs and vehicle ids for consistency.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::Invalid`] for duplicate subnet names, edges or
    /// vehicles that mention an unknown subnet, non-positive or non-finite
    /// edge costs, and duplicate vehicle ids.
    pub fn validate(&self) -> ScenarioResult<()> {
        let mut names = HashSet::new();
        for s in &self.subnets {
            if !names.insert(s.name.as_str()) {
                return Err(ScenarioError::Invalid(format!("subnet {:?} listed twice", s.name)));
            }
        }
        let known = |n: &str, what: &str| {
            if names.contains(n) {
                Ok(())
            } else {
                Err(ScenarioError::Invalid(format!("{what} refers to unknown subnet {n:?}")))
            }
        };
        for e in &self.edges {
            known(&e.from, "edge")?;
            known(&e.to, "edge")?;
            if !e.cost.is_finite() || e.cost <= 0.0 {
                return Err(ScenarioError::Invalid(format!(
                    "edge {:?} -> {:?} has cost {}; costs must be positive",
                    e.from, e.to, e.cost
                )));
            }
        }
        let mut ids = HashSet::new();
        for v in &self.vehicles {
            known(&v.source, "vehicle")?;
            known(&v.destination, "vehicle")?;
            if !ids.insert(v.id) {
                return Err(ScenarioError::Invalid(format!("vehicle id {} listed twice", v.id)));
            }
        }
        Ok(())
    }

    /// Full `N × N` cost matrix in subnet order, `0.0` where there is no
    /// edge.  A later edge overrides an earlier one between the same pair.
    pub fn adjacency_matrix(&self) -> ScenarioResult<Vec<Vec<f64>>> {
        self.validate()?;
        let index: HashMap<&str, usize> = self
            .subnets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i))
            .collect();
        let n = self.subnets.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for e in &self.edges {
            let (a, b) = (index[e.from.as_str()], index[e.to.as_str()]);
            if a == b {
                continue;
            }
            matrix[a][b] = e.cost;
            if e.two_way {
                matrix[b][a] = e.cost;
            }
        }
        Ok(matrix)
    }

    /// Build the road network: index in subnet order, then the matrix.
    pub fn network(&self) -> ScenarioResult<RoadNetwork> {
        let matrix = self.adjacency_matrix()?;
        let mut b = RoadNetworkBuilder::new();
        b.build_index(self.subnet_names())?;
        b.set_adjacency(&matrix)?;
        Ok(b.build())
    }
}
