//! plant_day: one working day of a two-plant ready-mix operation.
//!
//! Usage:
//!
//! ```text
//! plant_day [CONFIG.json] [INPUT_DIR]
//! ```
//!
//! With a config file the configured mode runs once.  Without one the three
//! controller policies and the truck assignment loop run side by side on the
//! same tickets so their bay waits can be compared.  Input tables come from
//! `INPUT_DIR` when given, otherwise from the embedded sample below.
//!
//! Logging follows `RUST_LOG` (default `info`).

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hd_core::{
    AssignmentConfig, DischargeConfig, DispatchMode, DispatchPolicy, Horizon, SimConfig,
};
use hd_model::{
    InputTables, load_depots_reader, load_orders_reader, load_sites_reader, load_tickets_reader,
    load_trucks_reader,
};
use hd_output::{CsvWriter, ReportObserver};
use hd_sim::{RunReport, SimBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 42;
const OUTPUT_ROOT:     &str = "output/plant_day";
const REPORT_INTERVAL: f64 = 30.0; // progress row every half hour
const DAY_END:         f64 = 720.0;

// ── Embedded sample ───────────────────────────────────────────────────────────

const DEPOTS_CSV: &str = "\
depot_id,lat,lon,loader_capacity\n\
north_plant,26.32,-80.12,1\n\
south_plant,26.05,-80.20,2\n\
";

const SITES_CSV: &str = "\
site_id,lat,lon,bay_capacity\n\
harbor_tower,26.12,-80.13,1\n\
mall_garage,26.20,-80.25,1\n\
school_slab,26.27,-80.09,2\n\
";

const TRUCKS_CSV: &str = "\
truck_id,home_depot,clock_in,clock_out\n\
truck_01,north_plant,0,480\n\
truck_02,north_plant,0,480\n\
truck_03,north_plant,60,540\n\
truck_04,south_plant,0,480\n\
truck_05,south_plant,30,510\n\
truck_06,south_plant,120,600\n\
";

const ORDERS_CSV: &str = "\
order_id,site_id,due_time,quantity\n\
ord_harbor,harbor_tower,60,40\n\
ord_mall,mall_garage,90,30\n\
ord_school,school_slab,120,50\n\
";

// Tickets of one order are spaced closer than their unload time so the
// site bay builds a line.  Travel legs are left empty and derived from
// the coordinates.
const TICKETS_CSV: &str = "\
ticket_id,order_id,dispatch_depot,return_depot,due_time,dispatch_time,depot_prep,travel_to,site_prep,unload,clean,travel_back,plan_truck\n\
h1,ord_harbor,south_plant,,60,,10,,10,25,5,,truck_04\n\
h2,ord_harbor,south_plant,,75,,10,,10,25,5,,truck_05\n\
h3,ord_harbor,south_plant,,90,,10,,10,25,5,,truck_04\n\
h4,ord_harbor,north_plant,south_plant,105,,10,,10,25,5,,truck_01\n\
m1,ord_mall,south_plant,,90,,12,,8,20,5,,truck_05\n\
m2,ord_mall,south_plant,,105,,12,,8,20,5,,\n\
m3,ord_mall,north_plant,,120,,12,,8,20,5,,truck_02\n\
s1,ord_school,north_plant,,120,,10,,15,30,5,,truck_01\n\
s2,ord_school,north_plant,,130,,10,,15,30,5,,truck_02\n\
s3,ord_school,north_plant,,140,,10,,15,30,5,,truck_03\n\
s4,ord_school,south_plant,north_plant,150,,10,,15,30,5,,truck_06\n\
s5,ord_school,north_plant,,160,,10,,15,30,5,,truck_03\n\
";

fn sample_tables() -> Result<InputTables> {
    Ok(InputTables {
        depots:  load_depots_reader(Cursor::new(DEPOTS_CSV))?,
        sites:   load_sites_reader(Cursor::new(SITES_CSV))?,
        trucks:  load_trucks_reader(Cursor::new(TRUCKS_CSV))?,
        orders:  load_orders_reader(Cursor::new(ORDERS_CSV))?,
        tickets: load_tickets_reader(Cursor::new(TICKETS_CSV))?,
    })
}

// ── Runs ──────────────────────────────────────────────────────────────────────

/// The comparison set used when no config file is given.
fn comparison_configs() -> Vec<(&'static str, SimConfig)> {
    let base = SimConfig {
        seed:             SEED,
        discharge:        DischargeConfig::Triangular { offset_factor: 1.0, spread_factor: 0.2 },
        use_loading_bays: true,
        report_interval:  REPORT_INTERVAL,
        ..SimConfig::default()
    };
    let controller = |policy| SimConfig { mode: DispatchMode::Controller(policy), ..base.clone() };
    vec![
        ("immediate", controller(DispatchPolicy::Immediate)),
        ("queue_gated", controller(DispatchPolicy::queue_gated())),
        ("estimated", controller(DispatchPolicy::estimated())),
        (
            "assignment",
            SimConfig {
                mode:    DispatchMode::Assignment(AssignmentConfig::default()),
                horizon: Horizon::UntilAllAssigned { check_interval: 10.0, limit: DAY_END },
                ..base.clone()
            },
        ),
    ]
}

fn run_one(name: &str, config: SimConfig, tables: &InputTables) -> Result<RunReport> {
    // Controller runs launch tickets without a fleet.
    let controller_tables;
    let tables = if matches!(config.mode, DispatchMode::Controller(_)) && !tables.trucks.is_empty() {
        controller_tables = InputTables { trucks: Vec::new(), ..tables.clone() };
        &controller_tables
    } else {
        tables
    };

    let dir = Path::new(OUTPUT_ROOT).join(name);
    let mut obs = ReportObserver::new(CsvWriter::new(&dir)?);
    let mut sim = SimBuilder::new(config, tables).build()?;

    let t0 = Instant::now();
    let report = sim.run(&mut obs)?;
    info!(run = name, secs = t0.elapsed().as_secs_f64(), "run complete");

    if let Some(e) = obs.take_error() {
        eprintln!("output error ({name}): {e}");
    }

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(dir.join("report.json"), json)?;
    Ok(report)
}

fn fmt_summary(s: Option<hd_sim::Summary>) -> String {
    match s {
        Some(s) => format!("{:>7.2} ± {:<6.2}", s.mean, s.std_dev),
        None => format!("{:>16}", "-"),
    }
}

fn print_table(rows: &[(String, RunReport)]) {
    println!(
        "{:<12} {:>5} {:>5} {:>5}  {:<16}  {:<16}  {:>8}",
        "Run", "Done", "Unas", "Abrt", "Bay wait", "Discharge", "Waiting"
    );
    println!("{}", "-".repeat(80));
    for (name, r) in rows {
        println!(
            "{:<12} {:>5} {:>5} {:>5}  {}  {}  {:>7.2}%",
            name,
            r.count(hd_sim::TicketStatus::Done),
            r.count(hd_sim::TicketStatus::Unassigned),
            r.aborted.len(),
            fmt_summary(r.wait_summary()),
            fmt_summary(r.discharge_summary()),
            r.waiting_share() * 100.0,
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let input_dir = args.next().map(PathBuf::from);

    println!("=== plant_day: ready-mix dispatch simulation ===");

    // 1. Input tables.
    let tables = match &input_dir {
        Some(dir) => InputTables::load_dir(dir)
            .with_context(|| format!("loading input tables from {}", dir.display()))?,
        None => sample_tables()?,
    };
    println!(
        "Input: {} depots, {} sites, {} trucks, {} orders, {} tickets",
        tables.depots.len(),
        tables.sites.len(),
        tables.trucks.len(),
        tables.orders.len(),
        tables.tickets.len(),
    );

    // 2. Runs.
    let runs = match &config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: SimConfig = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            vec![("configured", config)]
        }
        None => comparison_configs(),
    };

    let mut results = Vec::with_capacity(runs.len());
    for (name, config) in runs {
        let report = run_one(name, config, &tables)?;
        results.push((name.to_string(), report));
    }

    // 3. Summary.
    println!();
    print_table(&results);
    println!();
    println!("Output written under {OUTPUT_ROOT}/<run>/");

    Ok(())
}
