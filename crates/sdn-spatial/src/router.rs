//! Routing trait and the congestion-aware A* router.
//!
//! # Pluggability
//!
//! The compute node calls routing via the [`Router`] trait, so applications
//! can swap in another search without touching the dispatcher.  Congestion
//! is read through [`CongestionView`], which the occupancy tracker
//! implements; routing itself never mutates occupancy.
//!
//! # Search semantics
//!
//! [`AStarRouter`] is a best-first search over `f = g + penalty`:
//!
//! ```text
//! f(start)    = occupancy(start)
//! g(n)        = g(current) + cost(current, n)
//! f(n)        = g(n) + cost(current, n) * (occupancy(current) + occupancy(n))
//! ```
//!
//! The congestion term makes crowded corridors progressively less attractive
//! but never forbids them.  It mixes units (vehicle counts against edge
//! costs) and is not an admissible heuristic, so the result is the path the
//! weighted search settles on, not a guaranteed cost-optimal path.
//!
//! A relaxation is skipped only when the tentative `g` is strictly worse
//! than the recorded one; an equal `g` still rewrites the predecessor and
//! refreshes `f` with current occupancy.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sdn_core::SubnetId;

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// One entry of a [`Route`]: a subnet and the cost of the edge that leads to
/// it from the previous entry (`0.0` for the first entry).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStep {
    pub subnet: SubnetId,
    pub cost:   f64,
}

/// An ordered path from `start` to `dest`, in traversal order.
///
/// A route returned by a [`Router`] always begins with `start` (cost `0.0`)
/// and ends with `dest`.  `start == dest` yields the single-step route
/// `[(start, 0.0)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub start: SubnetId,
    pub dest:  SubnetId,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Sum of the per-step edge costs.
    pub fn total_cost(&self) -> f64 {
        self.steps.iter().map(|s| s.cost).sum()
    }

    /// `true` if the route has no steps ("no path").
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` if the route never leaves its start subnet.
    pub fn is_trivial(&self) -> bool {
        self.start == self.dest && self.steps.len() <= 1
    }

    /// Subnets in traversal order.
    pub fn subnets(&self) -> impl Iterator<Item = SubnetId> + '_ {
        self.steps.iter().map(|s| s.subnet)
    }

    /// `true` if the route passes through `subnet`.
    pub fn contains(&self, subnet: SubnetId) -> bool {
        self.steps.iter().any(|s| s.subnet == subnet)
    }
}

// ── Congestion ────────────────────────────────────────────────────────────────

/// Read-only view of how many vehicles currently occupy each subnet.
pub trait CongestionView {
    fn occupancy(&self, subnet: SubnetId) -> usize;
}

/// An empty network: every subnet reports zero occupancy.
pub struct FreeFlow;

impl CongestionView for FreeFlow {
    fn occupancy(&self, _subnet: SubnetId) -> usize {
        0
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// The router is owned by the compute node and called while the node lock
/// is held; it must be `Send + Sync` so the node can be shared by the
/// dispatcher and vehicle threads.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to` under the given congestion.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NoRoute`] when `to` is unreachable (a normal outcome),
    /// [`SpatialError::SubnetNotFound`] when either id is outside the network.
    fn route(
        &self,
        network:    &RoadNetwork,
        congestion: &dyn CongestionView,
        from:       SubnetId,
        to:         SubnetId,
    ) -> SpatialResult<Route>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Congestion-weighted A* over the subnet cost matrix.  See the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn route(
        &self,
        network:    &RoadNetwork,
        congestion: &dyn CongestionView,
        from:       SubnetId,
        to:         SubnetId,
    ) -> SpatialResult<Route> {
        astar(network, congestion, from, to)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Frontier entry.  Ordered so that `BinaryHeap` pops the lowest `f` first,
/// then the lowest `SubnetId` for a deterministic tie-break.
#[derive(Clone, Copy)]
struct Open {
    f:      f64,
    subnet: SubnetId,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.subnet.cmp(&self.subnet))
    }
}

fn astar(
    network:    &RoadNetwork,
    congestion: &dyn CongestionView,
    from:       SubnetId,
    to:         SubnetId,
) -> SpatialResult<Route> {
    for id in [from, to] {
        if !network.contains(id) {
            return Err(SpatialError::SubnetNotFound(id));
        }
    }

    let n = network.subnet_count();
    let mut g_score   = vec![f64::INFINITY; n];
    let mut f_score   = vec![f64::INFINITY; n];
    let mut came_from = vec![None::<SubnetId>; n];
    let mut in_open   = vec![false; n];
    let mut closed    = vec![false; n];

    g_score[from.index()] = 0.0;
    f_score[from.index()] = congestion.occupancy(from) as f64;
    in_open[from.index()] = true;

    // Lazy-deletion frontier: an entry is live only while its subnet is open
    // and its `f` still equals `f_score`.
    let mut frontier = BinaryHeap::new();
    frontier.push(Open { f: f_score[from.index()], subnet: from });

    let mut expanded = 0usize;
    while let Some(Open { f, subnet: current }) = frontier.pop() {
        let i = current.index();
        if !in_open[i] || f.total_cmp(&f_score[i]) != Ordering::Equal {
            continue;
        }

        if current == to {
            log::trace!("A* {from} -> {to}: reached after expanding {expanded} subnets");
            return Ok(reconstruct(network, &came_from, from, to));
        }

        in_open[i] = false;
        closed[i] = true;
        expanded += 1;

        let occupancy_here = congestion.occupancy(current);
        for (neighbor, cost) in network.neighbors(current) {
            let j = neighbor.index();
            if closed[j] {
                continue;
            }
            in_open[j] = true;

            let tentative = g_score[i] + cost;
            if tentative > g_score[j] {
                continue;
            }

            came_from[j] = Some(current);
            g_score[j] = tentative;
            let crowd = (occupancy_here + congestion.occupancy(neighbor)) as f64;
            f_score[j] = tentative + cost * crowd;
            frontier.push(Open { f: f_score[j], subnet: neighbor });
        }
    }

    log::trace!("A* {from} -> {to}: frontier exhausted after {expanded} subnets");
    Err(SpatialError::NoRoute { from, to })
}

/// Walk `came_from` back from `to`, attaching to each subnet the cost of the
/// edge from its predecessor.
fn reconstruct(
    network:   &RoadNetwork,
    came_from: &[Option<SubnetId>],
    from:      SubnetId,
    to:        SubnetId,
) -> Route {
    let mut steps = Vec::new();
    let mut cur = to;
    loop {
        match came_from[cur.index()] {
            Some(prev) if cur != from => {
                let cost = network.cost(prev, cur).unwrap_or(0.0);
                steps.push(RouteStep { subnet: cur, cost });
                cur = prev;
            }
            _ => {
                steps.push(RouteStep { subnet: cur, cost: 0.0 });
                break;
            }
        }
    }
    steps.reverse();
    Route { start: from, dest: to, steps }
}
