//! Plain data row types written by output backends.

use hd_core::SimTime;
use hd_dispatch::Plant;
use hd_model::TicketState;
use hd_sim::{RunReport, TicketStatus};

/// One recorded stage of one ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTimeRow {
    pub ticket:   String,
    /// Ordinal-prefixed stage key, e.g. `4_waiting`.
    pub stage:    &'static str,
    pub start:    f64,
    pub end:      f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketRow {
    pub ticket:        String,
    pub order:         String,
    pub status:        &'static str,
    pub due_time:      f64,
    pub dispatch_time: f64,
    pub launched_at:   Option<f64>,
    pub plan_truck:    Option<String>,
    pub actual_truck:  Option<String>,
    pub wait:          Option<f64>,
    pub theoretical:   f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruckRow {
    pub truck:        String,
    pub location:     String,
    pub on_duty:      bool,
    pub shift_ending: bool,
    /// Planned ticket names joined with `;`.
    pub planned:      String,
}

/// Run-level figures of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub seed:           u64,
    pub mode:           String,
    pub end_time:       f64,
    pub done:           usize,
    pub unassigned:     usize,
    pub in_progress:    usize,
    pub mean_wait:      Option<f64>,
    pub std_wait:       Option<f64>,
    pub mean_discharge: Option<f64>,
    pub std_discharge:  Option<f64>,
    pub waiting_share:  f64,
    pub aborted:        usize,
}

/// Ticket counts and bay queue length at one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRow {
    pub time:    f64,
    pub pending: usize,
    pub active:  usize,
    pub done:    usize,
    /// Tickets between site prep and the bay grant.
    pub waiting: usize,
}

// ── Builders ──────────────────────────────────────────────────────────────────

impl StageTimeRow {
    pub fn from_report(report: &RunReport) -> Vec<Self> {
        report
            .tickets
            .iter()
            .flat_map(|t| {
                t.stages.iter().map(|s| StageTimeRow {
                    ticket:   t.name.clone(),
                    stage:    s.stage.key(),
                    start:    s.start,
                    end:      s.end,
                    duration: s.end - s.start,
                })
            })
            .collect()
    }
}

impl TicketRow {
    pub fn from_report(report: &RunReport) -> Vec<Self> {
        report
            .tickets
            .iter()
            .map(|t| TicketRow {
                ticket:        t.name.clone(),
                order:         t.order.clone(),
                status:        t.status.as_str(),
                due_time:      t.due_time,
                dispatch_time: t.dispatch_time,
                launched_at:   t.launched_at,
                plan_truck:    t.plan_truck.clone(),
                actual_truck:  t.actual_truck.clone(),
                wait:          t.wait(),
                theoretical:   t.theoretical,
            })
            .collect()
    }
}

impl TruckRow {
    pub fn from_report(report: &RunReport) -> Vec<Self> {
        report
            .trucks
            .iter()
            .map(|t| TruckRow {
                truck:        t.name.clone(),
                location:     t.location.clone(),
                on_duty:      t.on_duty,
                shift_ending: t.shift_ending,
                planned:      t.planned.join(";"),
            })
            .collect()
    }
}

impl SummaryRow {
    pub fn from_report(report: &RunReport) -> Self {
        let waits = report.wait_summary();
        let discharges = report.discharge_summary();
        Self {
            seed:           report.seed,
            mode:           report.mode.clone(),
            end_time:       report.end_time,
            done:           report.count(TicketStatus::Done),
            unassigned:     report.count(TicketStatus::Unassigned),
            in_progress:    report.count(TicketStatus::InProgress),
            mean_wait:      waits.map(|s| s.mean),
            std_wait:       waits.map(|s| s.std_dev),
            mean_discharge: discharges.map(|s| s.mean),
            std_discharge:  discharges.map(|s| s.std_dev),
            waiting_share:  report.waiting_share(),
            aborted:        report.aborted.len(),
        }
    }
}

impl ProgressRow {
    pub fn snapshot(now: SimTime, plant: &Plant) -> Self {
        let mut row = ProgressRow { time: now.as_f64(), pending: 0, active: 0, done: 0, waiting: 0 };
        for t in &plant.yard.tickets {
            match t.state {
                TicketState::Pending => row.pending += 1,
                TicketState::Active(stage) => {
                    row.active += 1;
                    if stage == hd_model::Stage::WaitingForBay {
                        row.waiting += 1;
                    }
                }
                TicketState::Done => row.done += 1,
            }
        }
        row
    }
}
