//! `hd-sim`: assembles and runs one haul-dispatch simulation.
//!
//! # Run loop
//!
//! ```text
//! SimBuilder::build
//!   ① validate SimConfig
//!   ② InputTables → Yard, registering bays and truck slots as resources
//!   ③ spawn launch processes:
//!        Controller(policy) → one DispatchController over every ticket
//!        Assignment(cfg)    → one TruckShift per truck + the AssignmentLoop
//! Sim::run
//!   ④ pump the kernel to the horizon, calling on_interval every
//!      report_interval
//!   ⑤ collect the RunReport
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | `run_replications` runs on Rayon's thread pool.   |
//! | `fx-hash`  | FxHash for the yard's name indexes.               |
//! | `serde`    | `Serialize` on `RunReport` and its parts.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use hd_core::SimConfig;
//! use hd_model::InputTables;
//! use hd_sim::{NoopObserver, SimBuilder};
//!
//! let tables = InputTables::load_dir(Path::new("data"))?;
//! let mut sim = SimBuilder::new(SimConfig::default(), &tables).build()?;
//! let report = sim.run(&mut NoopObserver)?;
//! println!("waiting share {:.2}%", report.waiting_share() * 100.0);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod replicate;
pub mod report;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use replicate::run_replications;
pub use report::{
    AbortSummary, ResourceUsage, RunReport, StageTime, Summary, TicketStatus, TicketSummary,
    TruckSummary,
};
pub use sim::Sim;
