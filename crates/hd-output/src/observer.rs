//! `ReportObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use hd_core::SimTime;
use hd_dispatch::Plant;
use hd_sim::{RunReport, SimObserver};
use tracing::warn;

use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, ProgressRow};

/// A [`SimObserver`] that writes interval progress and the final report to
/// any [`OutputWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: OutputWriter> {
    writer:     W,
    /// Close the writer after the first report.  Off when several runs share
    /// one writer.
    finish:     bool,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, finish: true, last_error: None }
    }

    /// Keep the writer open after `on_run_end`; call
    /// [`OutputWriter::finish`] yourself once every run is written.
    pub fn keep_open(mut self) -> Self {
        self.finish = false;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "output write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for ReportObserver<W> {
    fn on_interval(&mut self, now: SimTime, plant: &Plant) {
        let result = self.writer.write_progress(&ProgressRow::snapshot(now, plant));
        self.store_err(result);
    }

    fn on_run_end(&mut self, report: &RunReport) {
        let result = self.writer.write_report(report);
        self.store_err(result);
        if self.finish {
            let result = self.writer.finish();
            self.store_err(result);
        }
    }
}
