//! `AssignmentLoop`: matches idle trucks to tickets that are coming due.
//!
//! Every `tick` the loop visits each depot in table order.  A depot gets at
//! most one match per tick:
//!
//! 1. the first truck on its roster that is not busy and not clocking out;
//! 2. among unassigned tickets dispatched from this depot with
//!    `due_time - now <= due_threshold`, the earliest due (input order on
//!    ties).
//!
//! If no ticket is eligible, the truck stays idle.  A match marks the
//! ticket assigned to the truck; when the truck differs from the planned one
//! their planned lists are exchanged.  The lifecycle is then spawned holding
//! the truck's busy slot.
//!
//! The loop never finishes on its own; it stops once the run horizon closes
//! admission on the plant.

use std::collections::HashSet;

use hd_core::{AssignmentConfig, DepotId, TicketId, TruckId};
use hd_kernel::{Ctx, Process, ProcessResult, Step, Wake};
use tracing::{debug, info, warn};

use crate::{Plant, Route, TicketLifecycle};

pub struct AssignmentLoop {
    config:  AssignmentConfig,
    /// Tickets whose references never resolve; not offered again.
    skipped: HashSet<TicketId>,
    matches: u64,
}

impl AssignmentLoop {
    pub fn new(config: AssignmentConfig) -> Self {
        Self { config, skipped: HashSet::new(), matches: 0 }
    }

    /// Matches made so far.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    fn idle_truck(cx: &Ctx<'_, Plant>, depot: DepotId) -> Option<TruckId> {
        let yard = &cx.world.yard;
        yard.depot(depot).roster.iter().copied().find(|&t| {
            let truck = yard.truck(t);
            !truck.shift_ending && cx.resource(truck.busy).users() == 0
        })
    }

    /// Earliest-due eligible ticket of `depot` that resolves to a route.
    fn pick_ticket(&mut self, cx: &Ctx<'_, Plant>, depot: DepotId) -> Option<TicketId> {
        let now = cx.now().as_f64();
        let yard = &cx.world.yard;
        loop {
            let best = yard
                .tickets
                .iter()
                .filter(|t| !t.is_assigned && !self.skipped.contains(&t.id))
                .filter(|t| t.dispatch_depot.id == Some(depot))
                .filter(|t| t.due_time - now <= self.config.due_threshold)
                .min_by(|a, b| a.due_time.total_cmp(&b.due_time))?;

            match Route::resolve(yard, best.id) {
                Ok(_) => return Some(best.id),
                Err(e) => {
                    warn!(ticket = %best.name, error = %e, "ticket cannot be assigned");
                    self.skipped.insert(best.id);
                }
            }
        }
    }

    fn commit(&mut self, cx: &mut Ctx<'_, Plant>, ticket: TicketId, truck: TruckId) {
        let busy = cx.world.yard.truck(truck).busy;
        let Some(token) = cx.try_acquire(busy) else {
            return;
        };

        let yard = &mut cx.world.yard;
        let t = yard.ticket_mut(ticket);
        t.assign(Some(truck));
        let plan = t.plan_truck;
        yard.truck_mut(truck).tasks_finished = false;

        if plan.is_some_and(|p| p != truck) {
            if let Some(other) = yard.exchange_schedules(ticket, truck) {
                debug!(%ticket, %truck, %other, "schedules exchanged");
            }
        }
        debug!(%ticket, %truck, t = cx.now().as_f64(), "assigned");

        let hold = self.config.hold_until_due;
        cx.spawn_holding(token, |token| TicketLifecycle::with_truck(ticket, truck, token, hold));
        self.matches += 1;
    }
}

impl Process<Plant> for AssignmentLoop {
    fn label(&self) -> String {
        "assignment".to_string()
    }

    fn resume(&mut self, _wake: Wake, cx: &mut Ctx<'_, Plant>) -> ProcessResult<Step> {
        if !cx.world.admitting {
            info!(matches = self.matches, t = cx.now().as_f64(), "admission closed");
            return Ok(Step::Finish);
        }
        let depots: Vec<DepotId> = cx.world.yard.depots.iter().map(|d| d.id).collect();
        for depot in depots {
            let Some(truck) = Self::idle_truck(cx, depot) else {
                continue;
            };
            if let Some(ticket) = self.pick_ticket(cx, depot) {
                self.commit(cx, ticket, truck);
            }
        }
        Ok(Step::Sleep(self.config.tick))
    }
}
