//! `RunReport`: everything a finished run hands to external reporting.
//!
//! Names, not ids: the report is meant to be written out or compared across
//! runs, and ids are only meaningful inside one yard.

use hd_dispatch::{mean, std_dev, Plant};
use hd_kernel::Kernel;
use hd_model::{Stage, Ticket, TicketState, Yard};

#[cfg(feature = "serde")]
use serde::Serialize;

// ── Tickets ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TicketStatus {
    Done,
    /// Never launched: no truck took it before the horizon, or one of its
    /// references did not resolve.
    Unassigned,
    /// Launched but not done.  Only seen in mid-run snapshots
    /// (`Sim::report`, `Sim::run_until`); `Sim::run` finishes every launched
    /// ticket before reporting.
    InProgress,
}

impl TicketStatus {
    pub fn of(ticket: &Ticket) -> Self {
        match ticket.state {
            TicketState::Done => TicketStatus::Done,
            _ if !ticket.is_assigned => TicketStatus::Unassigned,
            _ => TicketStatus::InProgress,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Done       => "done",
            TicketStatus::Unassigned => "unassigned",
            TicketStatus::InProgress => "in_progress",
        }
    }
}

/// One recorded stage.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StageTime {
    pub stage: Stage,
    pub start: f64,
    pub end:   f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TicketSummary {
    pub name:          String,
    pub order:         String,
    pub status:        TicketStatus,
    pub due_time:      f64,
    pub dispatch_time: f64,
    pub launched_at:   Option<f64>,
    pub plan_truck:    Option<String>,
    pub actual_truck:  Option<String>,
    /// Recorded stages in lifecycle order.
    pub stages:        Vec<StageTime>,
    /// Nominal end-to-end duration with no waiting.
    pub theoretical:   f64,
}

impl TicketSummary {
    fn of(yard: &Yard, t: &Ticket) -> Self {
        let truck_name = |id: Option<hd_core::TruckId>| id.map(|id| yard.truck(id).name.clone());
        Self {
            name:          t.name.clone(),
            order:         t.order.name.clone(),
            status:        TicketStatus::of(t),
            due_time:      t.due_time,
            dispatch_time: t.dispatch_time,
            launched_at:   t.launched_at.map(|at| at.as_f64()),
            plan_truck:    truck_name(t.plan_truck),
            actual_truck:  truck_name(t.actual_truck),
            stages:        t
                .stages
                .iter()
                .map(|(stage, span)| StageTime { stage, start: span.start.as_f64(), end: span.end.as_f64() })
                .collect(),
            theoretical:   t.durations.theoretical_total(),
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageTime> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Time spent waiting for the unloading bay, once granted.
    pub fn wait(&self) -> Option<f64> {
        self.stage(Stage::WaitingForBay).map(|s| s.end - s.start)
    }
}

// ── Trucks ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TruckSummary {
    pub name:         String,
    /// Depot the truck last parked at.
    pub location:     String,
    /// On a depot roster when the run ended.
    pub on_duty:      bool,
    pub shift_ending: bool,
    /// Planned tickets after every schedule exchange.
    pub planned:      Vec<String>,
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Mean and population standard deviation of a sample.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Summary {
    pub count:   usize,
    pub mean:    f64,
    pub std_dev: f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(xs: &[f64]) -> Option<Self> {
        Some(Self { count: xs.len(), mean: mean(xs)?, std_dev: std_dev(xs)? })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResourceUsage {
    pub name:         String,
    pub capacity:     usize,
    pub peak_users:   usize,
    pub total_grants: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AbortSummary {
    pub label:  String,
    pub at:     f64,
    pub reason: String,
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RunReport {
    pub seed:          u64,
    /// Dispatch policy name, or `"assignment"`.
    pub mode:          String,
    pub end_time:      f64,
    pub events:        u64,
    pub tickets:       Vec<TicketSummary>,
    pub trucks:        Vec<TruckSummary>,
    /// Bay waits in grant order.
    pub waits:         Vec<f64>,
    /// Discharge durations in completion order.
    pub discharges:    Vec<f64>,
    pub loading_waits: Vec<f64>,
    pub aborted:       Vec<AbortSummary>,
    pub resources:     Vec<ResourceUsage>,
}

impl RunReport {
    pub fn collect(seed: u64, mode: impl Into<String>, kernel: &Kernel<Plant>) -> Self {
        let plant = kernel.world();
        let yard = &plant.yard;

        let tickets = yard.tickets.iter().map(|t| TicketSummary::of(yard, t)).collect();
        let trucks = yard
            .trucks
            .iter()
            .map(|t| {
                let stationed = yard.stationed_at(t.id);
                TruckSummary {
                    name:         t.name.clone(),
                    location:     match stationed {
                        Some(d) => yard.depot(d).name.clone(),
                        None => t.home_depot.name.clone(),
                    },
                    on_duty:      stationed.is_some(),
                    shift_ending: t.shift_ending,
                    planned:      t.planned.iter().map(|&p| yard.ticket(p).name.clone()).collect(),
                }
            })
            .collect();

        Self {
            seed,
            mode: mode.into(),
            end_time: kernel.now().as_f64(),
            events: kernel.events_processed(),
            tickets,
            trucks,
            waits: plant.stats.waits.clone(),
            discharges: plant.stats.discharges.clone(),
            loading_waits: plant.stats.loading_waits.clone(),
            aborted: kernel
                .aborted()
                .iter()
                .map(|a| AbortSummary { label: a.label.clone(), at: a.at.as_f64(), reason: a.reason.clone() })
                .collect(),
            resources: kernel
                .resources()
                .iter()
                .map(|r| ResourceUsage {
                    name:         r.name().to_string(),
                    capacity:     r.capacity(),
                    peak_users:   r.peak_users(),
                    total_grants: r.total_grants(),
                })
                .collect(),
        }
    }

    pub fn ticket(&self, name: &str) -> Option<&TicketSummary> {
        self.tickets.iter().find(|t| t.name == name)
    }

    pub fn truck(&self, name: &str) -> Option<&TruckSummary> {
        self.trucks.iter().find(|t| t.name == name)
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &TicketSummary> {
        self.tickets.iter().filter(|t| t.status == TicketStatus::Unassigned)
    }

    pub fn count(&self, status: TicketStatus) -> usize {
        self.tickets.iter().filter(|t| t.status == status).count()
    }

    pub fn wait_summary(&self) -> Option<Summary> {
        Summary::of(&self.waits)
    }

    pub fn discharge_summary(&self) -> Option<Summary> {
        Summary::of(&self.discharges)
    }

    pub fn total_wait(&self) -> f64 {
        self.waits.iter().sum()
    }

    /// Sum of every ticket's nominal end-to-end duration.
    pub fn total_theoretical(&self) -> f64 {
        self.tickets.iter().map(|t| t.theoretical).sum()
    }

    /// Total bay wait as a fraction of total theoretical time.
    pub fn waiting_share(&self) -> f64 {
        let theoretical = self.total_theoretical();
        if theoretical > 0.0 { self.total_wait() / theoretical } else { 0.0 }
    }
}
