//! The `OutputWriter` trait implemented by report writers.

use hd_sim::RunReport;

use crate::{OutputResult, ProgressRow};

/// Sink for everything a run produces.
///
/// Errors are stored by [`ReportObserver`](crate::ReportObserver) and
/// retrieved with `take_error`.
pub trait OutputWriter {
    /// Write one interval snapshot.
    fn write_progress(&mut self, row: &ProgressRow) -> OutputResult<()>;

    /// Write the per-ticket, per-stage, and per-truck tables plus one
    /// summary row of a finished run.
    fn write_report(&mut self, report: &RunReport) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
