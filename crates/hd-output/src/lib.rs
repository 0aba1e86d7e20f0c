//! `hd-output`: run output writers for the haul-dispatch simulator.
//!
//! | File              | Rows                                            |
//! |-------------------|-------------------------------------------------|
//! | `stage_times.csv` | seed, ticket, stage, start, end, duration       |
//! | `tickets.csv`     | status, plan/actual truck, wait, theoretical    |
//! | `trucks.csv`      | final location, duty flags, planned tickets     |
//! | `summary.csv`     | one row per run: counts, wait/discharge stats   |
//! | `progress.csv`    | ticket counts every `report_interval`           |
//!
//! Writers implement [`OutputWriter`] and are driven by [`ReportObserver`],
//! which implements `hd_sim::SimObserver`.  Charts are left to whatever
//! reads these files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hd_output::{CsvWriter, ReportObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ReportObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ReportObserver;
pub use row::{ProgressRow, StageTimeRow, SummaryRow, TicketRow, TruckRow};
pub use writer::OutputWriter;
