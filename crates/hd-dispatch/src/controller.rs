//! `DispatchController`: decides when each ticket's lifecycle is launched.
//!
//! Tickets are handled one at a time in input order.  For each ticket the
//! controller walks these gates, sleeping between checks:
//!
//! | Policy       | Gate 1                              | Gate 2                       |
//! |--------------|-------------------------------------|------------------------------|
//! | `Immediate`  | wait until `dispatch_time`          |                              |
//! | `QueueGated` | poll until the site bay has no line | wait until `dispatch_time`   |
//! | `Estimated`  | wait until `dispatch_time`          | re-check until `now >= max_release - time_to_readiness` |
//!
//! A ticket already past its dispatch time when it reaches the front is
//! launched as soon as its gates clear.  Once the plant closes admission the
//! controller finishes at its next wake-up without launching anything else.

use hd_core::{DispatchPolicy, SimTime, TicketId};
use hd_kernel::{Ctx, Process, ProcessResult, Step, Wake};
use tracing::{debug, info};

use crate::{Plant, Route, TicketLifecycle};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Gate {
    /// Front ticket not looked at yet.
    Fresh,
    /// Polling the destination bay's wait line.
    Queue,
    /// Waiting out `dispatch_time`.
    Dispatch,
    /// Re-checking the release forecast.
    Forecast,
}

pub struct DispatchController {
    policy:  DispatchPolicy,
    tickets: Vec<TicketId>,
    next:    usize,
    gate:    Gate,
}

impl DispatchController {
    /// Control every ticket of the yard, in input order.
    pub fn new(policy: DispatchPolicy, tickets: Vec<TicketId>) -> Self {
        Self { policy, tickets, next: 0, gate: Gate::Fresh }
    }

    /// Walk the gates of the front ticket until one needs to sleep.
    fn advance(&mut self, cx: &mut Ctx<'_, Plant>) -> Step {
        loop {
            if !cx.world.admitting {
                let held = self.tickets.len() - self.next;
                info!(launched = self.next, held, t = cx.now().as_f64(), "admission closed");
                return Step::Finish;
            }
            let Some(&ticket) = self.tickets.get(self.next) else {
                info!(launched = self.next, t = cx.now().as_f64(), "dispatch controller done");
                return Step::Finish;
            };
            let now = cx.now();
            let dispatch_at = SimTime::new(cx.world.yard.ticket(ticket).dispatch_time);

            match (self.gate, &self.policy) {
                (Gate::Fresh, DispatchPolicy::QueueGated { .. }) => self.gate = Gate::Queue,
                (Gate::Fresh, _) => self.gate = Gate::Dispatch,

                (Gate::Queue, DispatchPolicy::QueueGated { probe_interval }) => {
                    // An unresolvable ticket has no bay to probe; launch it
                    // and let the lifecycle report the bad reference.
                    let line = Route::resolve(&cx.world.yard, ticket)
                        .map(|r| cx.resource(r.unloading_bay).queue_len())
                        .unwrap_or(0);
                    if line >= 1 {
                        debug!(%ticket, line, t = now.as_f64(), "bay has a line, holding");
                        return Step::Sleep(*probe_interval);
                    }
                    self.gate = Gate::Dispatch;
                    if dispatch_at > now {
                        return Step::SleepUntil(dispatch_at);
                    }
                }

                (Gate::Dispatch, DispatchPolicy::QueueGated { .. }) => self.launch(ticket, cx),

                (Gate::Dispatch, _) => {
                    if dispatch_at > now {
                        return Step::SleepUntil(dispatch_at);
                    }
                    match self.policy {
                        DispatchPolicy::Estimated { .. } => self.gate = Gate::Forecast,
                        _ => self.launch(ticket, cx),
                    }
                }

                (Gate::Forecast, DispatchPolicy::Estimated { recheck_interval }) => {
                    let readiness = cx.world.yard.ticket(ticket).durations.time_to_readiness();
                    let max_release = cx.world.forecast.max_release();
                    if now.as_f64() < max_release - readiness {
                        debug!(%ticket, max_release, readiness, t = now.as_f64(), "too early, holding");
                        return Step::Sleep(*recheck_interval);
                    }
                    self.launch(ticket, cx);
                }

                // Gates only reachable under another policy.
                (Gate::Queue | Gate::Forecast, _) => self.launch(ticket, cx),
            }
        }
    }

    fn launch(&mut self, ticket: TicketId, cx: &mut Ctx<'_, Plant>) {
        let planned = cx.world.yard.ticket(ticket).dispatch_time;
        debug!(%ticket, planned, t = cx.now().as_f64(), "dispatch");
        cx.spawn(TicketLifecycle::new(ticket));
        self.next += 1;
        self.gate = Gate::Fresh;
    }
}

impl Process<Plant> for DispatchController {
    fn label(&self) -> String {
        format!("dispatch-{}", self.policy.as_str())
    }

    fn resume(&mut self, _wake: Wake, cx: &mut Ctx<'_, Plant>) -> ProcessResult<Step> {
        Ok(self.advance(cx))
    }
}
