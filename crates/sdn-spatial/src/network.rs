//! Road network representation and builder.
//!
//! # Data layout
//!
//! Subnets are named by the scenario and indexed by `SubnetId` in the order
//! the index was built.  Edge costs are a dense row-major `N × N` table of
//! `Option<f64>`:
//!
//! ```text
//! costs[ from.index() * N + to.index() ]  →  Some(cost) | None
//! ```
//!
//! `None` means "no direct edge".  The diagonal is always `None`: staying on
//! a subnet is not an edge.  The networks this crate routes over are small
//! (tens to hundreds of subnets) so a dense table keeps `neighbors` a single
//! contiguous row scan.
//!
//! # Matrix boundary
//!
//! Topology loaders hand over a plain `Vec<Vec<f64>>` in which any value
//! `<= 0` means "no edge".  The conversion to `Option<f64>` happens once, in
//! [`RoadNetworkBuilder::set_adjacency`] / [`RoadNetwork::set_adjacency`];
//! nothing past that point compares against a sentinel.

use std::collections::HashMap;

use sdn_core::SubnetId;

use crate::{SpatialError, SpatialResult};

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Subnet index plus directed edge costs.
///
/// Do not construct directly; use [`RoadNetworkBuilder`].  The index is
/// fixed at build time; only the costs may be replaced afterwards, and only
/// by a matrix of the same dimension.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    /// Subnet names, indexed by `SubnetId`.
    names: Vec<String>,
    /// Name → id lookup.
    index: HashMap<String, SubnetId>,
    /// Row-major `N × N` edge costs.
    costs: Vec<Option<f64>>,
}

impl RoadNetwork {
    /// A network with no subnets.  Every routing request fails with
    /// [`SpatialError::NoRoute`] or [`SpatialError::SubnetNotFound`].
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn subnet_count(&self) -> usize {
        self.names.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.costs.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    // ── Index lookups ─────────────────────────────────────────────────────

    /// The id assigned to `name`, or `None` if the subnet is unknown.
    pub fn subnet_id(&self, name: &str) -> Option<SubnetId> {
        self.index.get(name).copied()
    }

    /// Like [`subnet_id`](Self::subnet_id) but unknown names are an error.
    pub fn resolve(&self, name: &str) -> SpatialResult<SubnetId> {
        self.subnet_id(name)
            .ok_or_else(|| SpatialError::UnknownSubnet(name.to_owned()))
    }

    /// The name of `subnet`, or `None` if the id is out of range.
    pub fn name(&self, subnet: SubnetId) -> Option<&str> {
        self.names.get(subnet.index()).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, subnet: SubnetId) -> bool {
        subnet.index() < self.names.len()
    }

    /// All subnet ids in index order.
    pub fn subnets(&self) -> impl Iterator<Item = SubnetId> + '_ {
        (0..self.names.len() as u32).map(SubnetId)
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Subnets reachable from `subnet` by one direct edge, with the edge cost.
    ///
    /// Excludes `subnet` itself.  Yields nothing for an unknown id.
    pub fn neighbors(&self, subnet: SubnetId) -> impl Iterator<Item = (SubnetId, f64)> + '_ {
        let n = self.names.len();
        let row: &[Option<f64>] = if self.contains(subnet) {
            &self.costs[subnet.index() * n..(subnet.index() + 1) * n]
        } else {
            &[]
        };
        row.iter()
            .enumerate()
            .filter_map(|(j, c)| c.map(|cost| (SubnetId(j as u32), cost)))
    }

    /// Raw traversal cost of the direct edge `from → to`.
    pub fn edge_cost(&self, from: SubnetId, to: SubnetId) -> SpatialResult<f64> {
        self.cost(from, to).ok_or(SpatialError::NoEdge { from, to })
    }

    /// `Some(cost)` if there is a direct edge `from → to`.
    #[inline]
    pub fn cost(&self, from: SubnetId, to: SubnetId) -> Option<f64> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        self.costs[from.index() * self.names.len() + to.index()]
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Replace every edge cost with `matrix`.  The subnet index is unchanged.
    ///
    /// # Errors
    ///
    /// [`SpatialError::MatrixSize`] if `matrix` is not `N × N`,
    /// [`SpatialError::InvalidCost`] for NaN or infinite entries.  On error
    /// the existing costs are left untouched.
    pub fn set_adjacency(&mut self, matrix: &[Vec<f64>]) -> SpatialResult<()> {
        self.costs = convert_matrix(&self.names, matrix)?;
        Ok(())
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] in two steps, index then costs, and call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sdn_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// b.build_index(["A", "B", "C"]).unwrap();
/// b.set_adjacency(&[
///     vec![0.0, 1.0, 5.0],
///     vec![1.0, 0.0, 1.0],
///     vec![5.0, 1.0, 0.0],
/// ]).unwrap();
/// let net = b.build();
/// assert_eq!(net.subnet_count(), 3);
/// assert_eq!(net.edge_count(), 6);
/// ```
#[derive(Default)]
pub struct RoadNetworkBuilder {
    names: Option<Vec<String>>,
    index: HashMap<String, SubnetId>,
    costs: Vec<Option<f64>>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign each name a stable index `0..N-1` in iteration order.
    ///
    /// Must be called exactly once, before any cost is set.
    pub fn build_index<I, S>(&mut self, subnets: I) -> SpatialResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.names.is_some() {
            return Err(SpatialError::IndexAlreadyBuilt);
        }
        let mut names = Vec::new();
        let mut index = HashMap::new();
        for name in subnets {
            let name: String = name.into();
            let id = SubnetId(names.len() as u32);
            if index.insert(name.clone(), id).is_some() {
                return Err(SpatialError::DuplicateSubnet(name));
            }
            names.push(name);
        }
        self.costs = vec![None; names.len() * names.len()];
        self.index = index;
        self.names = Some(names);
        Ok(self)
    }

    /// Replace the cost table wholesale from an `N × N` matrix where values
    /// `<= 0` (and the whole diagonal) mean "no edge".
    pub fn set_adjacency(&mut self, matrix: &[Vec<f64>]) -> SpatialResult<&mut Self> {
        let names = self.names.as_ref().ok_or(SpatialError::IndexNotBuilt)?;
        self.costs = convert_matrix(names, matrix)?;
        Ok(self)
    }

    /// Add (or overwrite) a single **directed** edge by subnet name.
    pub fn add_directed_edge(&mut self, from: &str, to: &str, cost: f64) -> SpatialResult<&mut Self> {
        let n = self.names.as_ref().ok_or(SpatialError::IndexNotBuilt)?.len();
        let a = self.lookup(from)?;
        let b = self.lookup(to)?;
        if !cost.is_finite() || cost <= 0.0 {
            return Err(SpatialError::InvalidCost { from: from.into(), to: to.into(), cost });
        }
        if a != b {
            self.costs[a.index() * n + b.index()] = Some(cost);
        }
        Ok(self)
    }

    /// Convenience: edges in **both directions** with the same cost.
    pub fn add_road(&mut self, a: &str, b: &str, cost: f64) -> SpatialResult<&mut Self> {
        self.add_directed_edge(a, b, cost)?;
        self.add_directed_edge(b, a, cost)
    }

    /// Consume the builder.  A builder whose index was never built yields an
    /// empty network.
    pub fn build(self) -> RoadNetwork {
        let names = self.names.unwrap_or_default();
        log::debug!(
            "road network built: {} subnets, {} directed edges",
            names.len(),
            self.costs.iter().filter(|c| c.is_some()).count(),
        );
        RoadNetwork { names, index: self.index, costs: self.costs }
    }

    fn lookup(&self, name: &str) -> SpatialResult<SubnetId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| SpatialError::UnknownSubnet(name.to_owned()))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Validate an `N × N` sentinel matrix and convert it to the `Option` table.
fn convert_matrix(names: &[String], matrix: &[Vec<f64>]) -> SpatialResult<Vec<Option<f64>>> {
    let n = names.len();
    if matrix.len() != n {
        return Err(SpatialError::MatrixSize {
            expected: n,
            detail:   format!("got {} rows", matrix.len()),
        });
    }
    let mut costs = Vec::with_capacity(n * n);
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != n {
            return Err(SpatialError::MatrixSize {
                expected: n,
                detail:   format!("row {i} ({:?}) has {} columns", names[i], row.len()),
            });
        }
        for (j, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(SpatialError::InvalidCost {
                    from: names[i].clone(),
                    to:   names[j].clone(),
                    cost: value,
                });
            }
            costs.push((i != j && value > 0.0).then_some(value));
        }
    }
    Ok(costs)
}
