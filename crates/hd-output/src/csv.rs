//! CSV output backend.
//!
//! Creates five files in the configured output directory:
//! - `stage_times.csv`: one row per recorded stage
//! - `tickets.csv`: one row per ticket
//! - `trucks.csv`: final truck locations and planned lists
//! - `summary.csv`: one row per written report
//! - `progress.csv`: one row per interval callback

use std::fs::File;
use std::path::Path;

use csv::Writer;
use hd_sim::RunReport;

use crate::writer::OutputWriter;
use crate::{OutputResult, ProgressRow, StageTimeRow, SummaryRow, TicketRow, TruckRow};

/// Writes run output to CSV files.
///
/// Several reports may be written to the same writer (replications); rows of
/// every table carry the run seed so they can be told apart.
pub struct CsvWriter {
    stages:   Writer<File>,
    tickets:  Writer<File>,
    trucks:   Writer<File>,
    summary:  Writer<File>,
    progress: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut stages = Writer::from_path(dir.join("stage_times.csv"))?;
        stages.write_record(["seed", "ticket", "stage", "start", "end", "duration"])?;

        let mut tickets = Writer::from_path(dir.join("tickets.csv"))?;
        tickets.write_record([
            "seed", "ticket", "order", "status", "due_time", "dispatch_time", "launched_at",
            "plan_truck", "actual_truck", "wait", "theoretical",
        ])?;

        let mut trucks = Writer::from_path(dir.join("trucks.csv"))?;
        trucks.write_record(["seed", "truck", "location", "on_duty", "shift_ending", "planned"])?;

        let mut summary = Writer::from_path(dir.join("summary.csv"))?;
        summary.write_record([
            "seed", "mode", "end_time", "done", "unassigned", "in_progress", "mean_wait",
            "std_wait", "mean_discharge", "std_discharge", "waiting_share", "aborted",
        ])?;

        let mut progress = Writer::from_path(dir.join("progress.csv"))?;
        progress.write_record(["time", "pending", "active", "done", "waiting"])?;

        Ok(Self { stages, tickets, trucks, summary, progress, finished: false })
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_progress(&mut self, row: &ProgressRow) -> OutputResult<()> {
        self.progress.write_record(&[
            row.time.to_string(),
            row.pending.to_string(),
            row.active.to_string(),
            row.done.to_string(),
            row.waiting.to_string(),
        ])?;
        Ok(())
    }

    fn write_report(&mut self, report: &RunReport) -> OutputResult<()> {
        let seed = report.seed.to_string();

        for row in StageTimeRow::from_report(report) {
            self.stages.write_record(&[
                seed.clone(),
                row.ticket,
                row.stage.to_string(),
                row.start.to_string(),
                row.end.to_string(),
                row.duration.to_string(),
            ])?;
        }

        for row in TicketRow::from_report(report) {
            self.tickets.write_record(&[
                seed.clone(),
                row.ticket,
                row.order,
                row.status.to_string(),
                row.due_time.to_string(),
                row.dispatch_time.to_string(),
                opt(row.launched_at),
                row.plan_truck.unwrap_or_default(),
                row.actual_truck.unwrap_or_default(),
                opt(row.wait),
                row.theoretical.to_string(),
            ])?;
        }

        for row in TruckRow::from_report(report) {
            self.trucks.write_record(&[
                seed.clone(),
                row.truck,
                row.location,
                (row.on_duty as u8).to_string(),
                (row.shift_ending as u8).to_string(),
                row.planned,
            ])?;
        }

        let s = SummaryRow::from_report(report);
        self.summary.write_record(&[
            seed,
            s.mode,
            s.end_time.to_string(),
            s.done.to_string(),
            s.unassigned.to_string(),
            s.in_progress.to_string(),
            opt(s.mean_wait),
            opt(s.std_wait),
            opt(s.mean_discharge),
            opt(s.std_discharge),
            s.waiting_share.to_string(),
            s.aborted.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.stages.flush()?;
        self.tickets.flush()?;
        self.trucks.flush()?;
        self.summary.flush()?;
        self.progress.flush()?;
        Ok(())
    }
}
