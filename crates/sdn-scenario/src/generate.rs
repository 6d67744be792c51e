//! Synthetic scenarios.

use sdn_core::SimRng;

use crate::{EdgeSpec, Scenario, SubnetSpec, VehicleSpec};

impl Scenario {
    /// A `width × height` grid of subnets named `"x{col}y{row}"`, each with
    /// `capacity`, joined to their orthogonal neighbours by two-way roads of
    /// `cost`.  No vehicles.
    pub fn grid(width: usize, height: usize, cost: f64, capacity: usize) -> Self {
        let name = |x: usize, y: usize| format!("x{x}y{y}");
        let mut subnets = Vec::with_capacity(width * height);
        let mut edges = Vec::new();
        for y in 0..height {
            for x in 0..width {
                subnets.push(SubnetSpec { name: name(x, y), capacity });
                if x + 1 < width {
                    edges.push(EdgeSpec { from: name(x, y), to: name(x + 1, y), cost, two_way: true });
                }
                if y + 1 < height {
                    edges.push(EdgeSpec { from: name(x, y), to: name(x, y + 1), cost, two_way: true });
                }
            }
        }
        Scenario { subnets, edges, vehicles: Vec::new() }
    }

    /// Add `count` vehicles with random, distinct source and destination
    /// subnets.  Ids continue after the largest existing id.
    ///
    /// With fewer than two subnets every vehicle starts at its destination.
    pub fn with_random_vehicles(mut self, count: usize, seed: u64) -> Self {
        if self.subnets.is_empty() {
            return self;
        }
        let mut rng = SimRng::new(seed);
        let mut next_id = self.vehicles.iter().map(|v| v.id + 1).max().unwrap_or(0);
        let n = self.subnets.len();
        for _ in 0..count {
            let source = rng.gen_range(0..n);
            let destination = if n < 2 {
                source
            } else {
                // Draw from the other n-1 subnets.
                let d = rng.gen_range(0..n - 1);
                if d >= source { d + 1 } else { d }
            };
            self.vehicles.push(VehicleSpec {
                id:          next_id,
                source:      self.subnets[source].name.clone(),
                destination: self.subnets[destination].name.clone(),
            });
            next_id += 1;
        }
        self
    }
}
