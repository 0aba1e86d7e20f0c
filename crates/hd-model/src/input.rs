//! Static input tables and their CSV loaders.
//!
//! # CSV formats
//!
//! ```csv
//! depot_id,lat,lon,loader_capacity
//! plant_a,26.10,-80.20,1
//! ```
//!
//! ```csv
//! site_id,lat,lon,bay_capacity
//! tower_1,26.30,-80.10,1
//! ```
//!
//! ```csv
//! truck_id,home_depot,clock_in,clock_out
//! truck_01,plant_a,0,600
//! ```
//!
//! ```csv
//! order_id,site_id,due_time,quantity
//! ord_1,tower_1,60,30
//! ```
//!
//! ```csv
//! ticket_id,order_id,dispatch_depot,return_depot,due_time,dispatch_time,depot_prep,travel_to,site_prep,unload,clean,travel_back,plan_truck
//! t1,ord_1,plant_a,,60,0,10,,10,15,5,,truck_01
//! ```
//!
//! Empty cells are allowed for `loader_capacity`/`bay_capacity` (default 1),
//! `quantity`, `return_depot` (defaults to the dispatch depot),
//! `travel_to`/`travel_back` (derived from coordinates by the yard builder),
//! `dispatch_time` (defaults to the due time minus the time to readiness,
//! floored at zero), and `plan_truck`.
//!
//! Rows keep their file order; ids are assigned in that order.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{ModelError, ModelResult};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DepotRecord {
    pub depot_id:        String,
    pub lat:             f64,
    pub lon:             f64,
    #[serde(default)]
    pub loader_capacity: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SiteRecord {
    pub site_id:      String,
    pub lat:          f64,
    pub lon:          f64,
    #[serde(default)]
    pub bay_capacity: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TruckRecord {
    pub truck_id:   String,
    pub home_depot: String,
    pub clock_in:   f64,
    pub clock_out:  f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub site_id:  String,
    pub due_time: f64,
    #[serde(default)]
    pub quantity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TicketRecord {
    pub ticket_id:      String,
    pub order_id:       String,
    pub dispatch_depot: String,
    #[serde(default)]
    pub return_depot:   Option<String>,
    pub due_time:       f64,
    #[serde(default)]
    pub dispatch_time:  Option<f64>,
    pub depot_prep:     f64,
    #[serde(default)]
    pub travel_to:      Option<f64>,
    pub site_prep:      f64,
    pub unload:         f64,
    pub clean:          f64,
    #[serde(default)]
    pub travel_back:    Option<f64>,
    #[serde(default)]
    pub plan_truck:     Option<String>,
}

/// Every static table a run needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputTables {
    pub depots:  Vec<DepotRecord>,
    pub sites:   Vec<SiteRecord>,
    pub trucks:  Vec<TruckRecord>,
    pub orders:  Vec<OrderRecord>,
    pub tickets: Vec<TicketRecord>,
}

impl InputTables {
    /// Load `depots.csv`, `sites.csv`, `orders.csv`, `tickets.csv`, and (if
    /// present) `trucks.csv` from `dir`.
    pub fn load_dir(dir: &Path) -> ModelResult<Self> {
        let trucks_path = dir.join("trucks.csv");
        Ok(Self {
            depots:  load_depots_csv(&dir.join("depots.csv"))?,
            sites:   load_sites_csv(&dir.join("sites.csv"))?,
            trucks:  if trucks_path.exists() { load_trucks_csv(&trucks_path)? } else { Vec::new() },
            orders:  load_orders_csv(&dir.join("orders.csv"))?,
            tickets: load_tickets_csv(&dir.join("tickets.csv"))?,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

pub fn load_depots_csv(path: &Path) -> ModelResult<Vec<DepotRecord>> {
    load_depots_reader(open(path)?)
}

/// Like [`load_depots_csv`] but accepts any `Read` source.
pub fn load_depots_reader<R: Read>(reader: R) -> ModelResult<Vec<DepotRecord>> {
    read_records(reader)
}

pub fn load_sites_csv(path: &Path) -> ModelResult<Vec<SiteRecord>> {
    load_sites_reader(open(path)?)
}

pub fn load_sites_reader<R: Read>(reader: R) -> ModelResult<Vec<SiteRecord>> {
    read_records(reader)
}

pub fn load_trucks_csv(path: &Path) -> ModelResult<Vec<TruckRecord>> {
    load_trucks_reader(open(path)?)
}

pub fn load_trucks_reader<R: Read>(reader: R) -> ModelResult<Vec<TruckRecord>> {
    read_records(reader)
}

pub fn load_orders_csv(path: &Path) -> ModelResult<Vec<OrderRecord>> {
    load_orders_reader(open(path)?)
}

pub fn load_orders_reader<R: Read>(reader: R) -> ModelResult<Vec<OrderRecord>> {
    read_records(reader)
}

pub fn load_tickets_csv(path: &Path) -> ModelResult<Vec<TicketRecord>> {
    load_tickets_reader(open(path)?)
}

pub fn load_tickets_reader<R: Read>(reader: R) -> ModelResult<Vec<TicketRecord>> {
    read_records(reader)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open(path: &Path) -> ModelResult<std::fs::File> {
    std::fs::File::open(path).map_err(ModelError::Io)
}

fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> ModelResult<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv_reader
        .deserialize::<T>()
        .map(|row| row.map_err(|e| ModelError::Parse(e.to_string())))
        .collect()
}
