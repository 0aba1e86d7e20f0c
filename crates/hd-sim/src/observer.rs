//! Simulation observer trait for progress reporting and data collection.

use hd_core::{SimConfig, SimTime};
use hd_dispatch::Plant;

use crate::RunReport;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_interval(&mut self, now: SimTime, plant: &Plant) {
///         let done = plant.yard.tickets.iter().filter(|t| t.is_done()).count();
///         println!("{now}: {done} tickets done");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once before the first event is processed.
    fn on_run_start(&mut self, _config: &SimConfig) {}

    /// Called every `config.report_interval` virtual time units.
    ///
    /// Provides read-only access to the whole world so that writers can
    /// record a snapshot without the sim knowing about any output format.
    fn on_interval(&mut self, _now: SimTime, _plant: &Plant) {}

    /// Called once after the horizon is reached, with the final report.
    fn on_run_end(&mut self, _report: &RunReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
