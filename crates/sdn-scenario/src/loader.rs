//! CSV scenario loader.
//!
//! # Directory layout
//!
//! ```text
//! scenario/
//!   subnets.csv    name,capacity
//!   edges.csv      from,to,cost[,two_way]
//!   vehicles.csv   id,source,destination      (optional)
//! ```
//!
//! ```csv
//! name,capacity
//! A,1
//! B,1
//! C,1
//! ```
//!
//! ```csv
//! from,to,cost,two_way
//! A,B,1,true
//! B,C,1,true
//! A,C,5,true
//! ```
//!
//! `two_way` defaults to `true` when the column is absent.  A missing
//! `vehicles.csv` yields a scenario with no vehicles.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{EdgeSpec, Scenario, ScenarioError, ScenarioResult, SubnetSpec, VehicleSpec};

pub const SUBNETS_FILE:  &str = "subnets.csv";
pub const EDGES_FILE:    &str = "edges.csv";
pub const VEHICLES_FILE: &str = "vehicles.csv";

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SubnetRecord {
    name:     String,
    capacity: usize,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:    String,
    to:      String,
    cost:    f64,
    #[serde(default = "two_way_default")]
    two_way: bool,
}

fn two_way_default() -> bool {
    true
}

#[derive(Deserialize)]
struct VehicleRecord {
    id:          u32,
    source:      String,
    destination: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and validate a scenario directory.
pub fn load_scenario_dir(dir: &Path) -> ScenarioResult<Scenario> {
    let subnets = load_subnets_reader(std::fs::File::open(dir.join(SUBNETS_FILE))?)?;
    let edges = load_edges_reader(std::fs::File::open(dir.join(EDGES_FILE))?)?;
    let vehicles_path = dir.join(VEHICLES_FILE);
    let vehicles = if vehicles_path.exists() {
        load_vehicles_reader(std::fs::File::open(vehicles_path)?)?
    } else {
        Vec::new()
    };

    let scenario = Scenario { subnets, edges, vehicles };
    scenario.validate()?;
    log::info!(
        "loaded scenario {}: {} subnets, {} edges, {} vehicles",
        dir.display(),
        scenario.subnets.len(),
        scenario.edges.len(),
        scenario.vehicles.len(),
    );
    Ok(scenario)
}

/// Parse `subnets.csv` rows from any `Read` source.
pub fn load_subnets_reader<R: Read>(reader: R) -> ScenarioResult<Vec<SubnetSpec>> {
    Ok(read_rows::<_, SubnetRecord>(reader)?
        .into_iter()
        .map(|r| SubnetSpec { name: r.name, capacity: r.capacity })
        .collect())
}

/// Parse `edges.csv` rows from any `Read` source.
pub fn load_edges_reader<R: Read>(reader: R) -> ScenarioResult<Vec<EdgeSpec>> {
    Ok(read_rows::<_, EdgeRecord>(reader)?
        .into_iter()
        .map(|r| EdgeSpec {
            from:    r.from,
            to:      r.to,
            cost:    r.cost,
            two_way: r.two_way,
        })
        .collect())
}

/// Parse `vehicles.csv` rows from any `Read` source.
pub fn load_vehicles_reader<R: Read>(reader: R) -> ScenarioResult<Vec<VehicleSpec>> {
    Ok(read_rows::<_, VehicleRecord>(reader)?
        .into_iter()
        .map(|r| VehicleSpec {
            id:          r.id,
            source:      r.source,
            destination: r.destination,
        })
        .collect())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(reader: R) -> ScenarioResult<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| ScenarioError::Parse(e.to_string())))
        .collect()
}
