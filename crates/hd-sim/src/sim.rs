//! The `Sim` struct and its horizon loop.

use hd_core::{Horizon, SimConfig, SimTime};
use hd_dispatch::Plant;
use hd_kernel::Kernel;
use hd_model::TicketState;
use tracing::info;

use crate::builder::mode_name;
use crate::{RunReport, SimObserver, SimResult};

/// One configured run: a kernel over a [`Plant`] with its launch processes
/// already spawned.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config:  SimConfig,
    kernel:      Kernel<Plant>,
    /// Next instant an interval callback is due.
    next_report: SimTime,
}

impl Sim {
    pub(crate) fn new(config: SimConfig, kernel: Kernel<Plant>) -> Self {
        let next_report = SimTime::new(config.report_interval);
        Self { config, kernel, next_report }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run to the configured horizon and return the report.
    ///
    /// | Horizon            | Stops when                                          |
    /// |--------------------|-----------------------------------------------------|
    /// | `Drain`            | no events remain                                    |
    /// | `Fixed`            | the clock reaches `until`                           |
    /// | `UntilAllAssigned` | every ticket is assigned and none is in progress, checked every `check_interval`, or at `limit` |
    ///
    /// At a `Fixed` or `UntilAllAssigned` stop no further ticket is launched,
    /// and every ticket already launched runs on to `Done`.  The report
    /// therefore holds only done and unassigned tickets, and its `end_time`
    /// may lie past the horizon.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunReport> {
        observer.on_run_start(&self.config);
        info!(seed = self.config.seed, horizon = ?self.config.horizon, "run start");

        match self.config.horizon.clone() {
            Horizon::Drain => self.drain(observer),
            Horizon::Fixed { until } => {
                self.advance_to(SimTime::new(until), observer);
                self.finish_in_flight(observer);
            }
            Horizon::UntilAllAssigned { check_interval, limit } => {
                let limit = SimTime::new(limit);
                while !self.settled() && self.kernel.now() < limit {
                    let next = self.kernel.now().after(check_interval).min(limit);
                    self.advance_to(next, observer);
                }
                self.finish_in_flight(observer);
            }
        }

        let report = self.report();
        info!(
            t = report.end_time,
            events = report.events,
            done = report.count(crate::TicketStatus::Done),
            unassigned = report.count(crate::TicketStatus::Unassigned),
            aborted = report.aborted.len(),
            "run end"
        );
        observer.on_run_end(&report);
        Ok(report)
    }

    /// Advance to `until` regardless of the configured horizon.
    pub fn run_until<O: SimObserver>(&mut self, until: f64, observer: &mut O) {
        self.advance_to(SimTime::new(until), observer);
    }

    /// Snapshot the current state as a report.
    pub fn report(&self) -> RunReport {
        RunReport::collect(self.config.seed, mode_name(&self.config.mode), &self.kernel)
    }

    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    pub fn plant(&self) -> &Plant {
        self.kernel.world()
    }

    pub fn kernel(&self) -> &Kernel<Plant> {
        &self.kernel
    }

    // ── Horizon helpers ───────────────────────────────────────────────────

    /// Every ticket assigned and none mid-lifecycle.
    fn settled(&self) -> bool {
        let yard = &self.kernel.world().yard;
        yard.tickets.iter().all(|t| t.is_assigned && t.state == TicketState::Done)
    }

    /// Close admission, then run until every launched ticket is `Done`.
    fn finish_in_flight<O: SimObserver>(&mut self, observer: &mut O) {
        self.kernel.world_mut().close_admission();
        let in_flight = self.kernel.world().in_flight();
        if in_flight > 0 {
            info!(in_flight, t = self.kernel.now().as_f64(), "horizon reached, finishing launched tickets");
        }
        while self.kernel.world().in_flight() > 0 {
            let Some(next) = self.kernel.next_event_time() else {
                break;
            };
            self.advance_to(next, observer);
        }
    }

    fn drain<O: SimObserver>(&mut self, observer: &mut O) {
        if !self.reporting() {
            self.kernel.run();
            return;
        }
        while let Some(next) = self.kernel.next_event_time() {
            let target = next.max(self.next_report);
            self.advance_to(target, observer);
        }
    }

    /// Process events up to `until`, firing interval callbacks on the way.
    fn advance_to<O: SimObserver>(&mut self, until: SimTime, observer: &mut O) {
        if self.reporting() {
            while self.next_report <= until {
                let at = self.next_report;
                self.kernel.run_until(at);
                observer.on_interval(at, self.kernel.world());
                self.next_report = at.after(self.config.report_interval);
            }
        }
        self.kernel.run_until(until);
    }

    fn reporting(&self) -> bool {
        self.config.report_interval > 0.0
    }
}
