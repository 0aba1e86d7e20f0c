//! `TicketLifecycle`: drives one ticket from launch to `Done`.
//!
//! ```text
//! Launch ─▶ [Hold until due] ─▶ [Await loader] ─▶ DepotPrep ─▶ TravelTo ─▶ SitePrep
//!        ─▶ WaitingForBay ─▶ Discharging ─▶ Cleaning ─▶ TravelBack ─▶ Done
//! ```
//!
//! The unloading bay is requested when site prep ends and held for the
//! sampled discharge duration.  The wait until grant is recorded both as the
//! `WaitingForBay` span and in the run statistics.  Each of the first three
//! stages refreshes the release forecast on completion.
//!
//! If the ticket runs on a truck, the lifecycle owns the truck's busy slot
//! and releases it after travel back.  Should the process abort, the kernel
//! reclaims that slot along with any bay it holds.

use hd_core::{SimTime, TicketId, TruckId};
use hd_kernel::{Ctx, Process, ProcessResult, ResourceToken, Step, Wake};
use hd_model::Stage;
use tracing::debug;

use crate::{DispatchError, Plant, Route};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Launch,
    Holding,
    AwaitLoader,
    Running(Stage),
    AwaitBay,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Launch => "launch",
            Phase::Holding => "holding",
            Phase::AwaitLoader => "await_loader",
            Phase::Running(_) => "running",
            Phase::AwaitBay => "await_bay",
        }
    }
}

pub struct TicketLifecycle {
    ticket:         TicketId,
    truck:          Option<(TruckId, ResourceToken)>,
    hold_until_due: bool,
    phase:          Phase,
    route:          Option<Route>,
    stage_start:    SimTime,
    requested_at:   SimTime,
    loader:         Option<ResourceToken>,
    bay:            Option<ResourceToken>,
}

impl TicketLifecycle {
    /// A ticket launched by the dispatch controller, with no truck modelled.
    pub fn new(ticket: TicketId) -> Self {
        Self {
            ticket,
            truck: None,
            hold_until_due: false,
            phase: Phase::Launch,
            route: None,
            stage_start: SimTime::ZERO,
            requested_at: SimTime::ZERO,
            loader: None,
            bay: None,
        }
    }

    /// A ticket already assigned to `truck`, whose busy slot it now owns.
    pub fn with_truck(ticket: TicketId, truck: TruckId, token: ResourceToken, hold_until_due: bool) -> Self {
        Self { truck: Some((truck, token)), hold_until_due, ..Self::new(ticket) }
    }

    fn route(&self) -> Route {
        // Set on launch before any other phase is reachable.
        self.route.unwrap_or_else(|| panic!("ticket {} has no route", self.ticket))
    }

    // ── Phase transitions ─────────────────────────────────────────────────

    fn launch(&mut self, cx: &mut Ctx<'_, Plant>) -> ProcessResult<Step> {
        let now = cx.now();
        let route = Route::resolve(&cx.world.yard, self.ticket)?;
        self.route = Some(route);

        let ticket = cx.world.yard.ticket_mut(self.ticket);
        if !ticket.is_assigned {
            ticket.assign(None);
        }
        ticket.launched_at = Some(now);
        debug!(ticket = %ticket.name, t = now.as_f64(), "launch");

        if self.hold_until_due {
            let hold = (ticket.due_time - now.as_f64()).max(0.0);
            if hold > 0.0 {
                self.phase = Phase::Holding;
                return Ok(Step::Sleep(hold));
            }
        }
        Ok(self.begin_depot_prep(cx))
    }

    fn begin_depot_prep(&mut self, cx: &mut Ctx<'_, Plant>) -> Step {
        if cx.world.use_loading_bays {
            self.phase = Phase::AwaitLoader;
            self.requested_at = cx.now();
            Step::Request(self.route().loading_bay)
        } else {
            self.start(Stage::DepotPrep, cx)
        }
    }

    /// Enter a timed stage and sleep for its nominal duration.
    fn start(&mut self, stage: Stage, cx: &mut Ctx<'_, Plant>) -> Step {
        let d = cx.world.yard.ticket(self.ticket).durations.of(stage).unwrap_or(0.0);
        self.start_for(stage, d, cx)
    }

    fn start_for(&mut self, stage: Stage, d: f64, cx: &mut Ctx<'_, Plant>) -> Step {
        let now = cx.now();
        let ticket = cx.world.yard.ticket_mut(self.ticket);
        ticket.enter(stage);
        debug!(ticket = %ticket.name, %stage, t = now.as_f64(), d, "stage start");
        self.phase = Phase::Running(stage);
        self.stage_start = now;
        Step::Sleep(d)
    }

    /// A timed stage just elapsed.
    fn complete(&mut self, stage: Stage, cx: &mut Ctx<'_, Plant>) -> Step {
        let now = cx.now();
        let start = self.stage_start;
        {
            let plant = &mut *cx.world;
            let ticket = plant.yard.ticket_mut(self.ticket);
            ticket.record(stage, start, now);
            if let Some(at) = plant.forecast.update(self.ticket, stage, now, &ticket.durations, &plant.stats) {
                debug!(ticket = %ticket.name, %stage, release = at, "forecast");
            }
        }

        match stage {
            Stage::DepotPrep => {
                if let Some(token) = self.loader.take() {
                    cx.release(token);
                }
                self.start(Stage::TravelTo, cx)
            }
            Stage::TravelTo => self.start(Stage::SitePrep, cx),
            Stage::SitePrep => {
                cx.world.yard.ticket_mut(self.ticket).enter(Stage::WaitingForBay);
                self.phase = Phase::AwaitBay;
                self.requested_at = now;
                Step::Request(self.route().unloading_bay)
            }
            Stage::Discharging => {
                if let Some(token) = self.bay.take() {
                    cx.release(token);
                }
                cx.world.stats.discharges.push(now - start);
                self.start(Stage::Cleaning, cx)
            }
            Stage::Cleaning => self.start(Stage::TravelBack, cx),
            Stage::TravelBack => {
                self.wrap_up(cx);
                Step::Finish
            }
            Stage::WaitingForBay => unreachable!("waiting is not a timed stage"),
        }
    }

    fn bay_granted(&mut self, token: ResourceToken, cx: &mut Ctx<'_, Plant>) -> Step {
        let now = cx.now();
        let ready = self.requested_at;
        self.bay = Some(token);

        let plant = &mut *cx.world;
        plant.stats.waits.push(now - ready);
        let ticket = plant.yard.ticket_mut(self.ticket);
        ticket.record(Stage::WaitingForBay, ready, now);
        let d = plant.sampler.sample(self.ticket, ticket.durations.unload);
        self.start_for(Stage::Discharging, d, cx)
    }

    fn loader_granted(&mut self, token: ResourceToken, cx: &mut Ctx<'_, Plant>) -> Step {
        let waited = cx.now() - self.requested_at;
        self.loader = Some(token);
        cx.world.stats.loading_waits.push(waited);
        self.start(Stage::DepotPrep, cx)
    }

    /// Free the truck, move it to the return depot, seal the ticket.
    fn wrap_up(&mut self, cx: &mut Ctx<'_, Plant>) {
        let route = self.route();
        if let Some((truck, token)) = self.truck.take() {
            cx.release(token);
            let yard = &mut cx.world.yard;
            let name = yard.depot(route.return_depot).name.clone();
            let t = yard.truck_mut(truck);
            t.home_depot = hd_model::EntityRef::resolved(name, route.return_depot);
            t.tasks_finished = true;
            if yard.stationed_at(truck).is_some() {
                yard.station(truck, route.return_depot);
            }
        }
        let now = cx.now();
        let ticket = cx.world.yard.ticket_mut(self.ticket);
        ticket.finish();
        debug!(ticket = %ticket.name, t = now.as_f64(), "done");
    }

    fn unexpected(&self, cx: &Ctx<'_, Plant>, wake: &Wake) -> DispatchError {
        DispatchError::UnexpectedWake {
            ticket: cx.world.yard.ticket(self.ticket).name.clone(),
            phase:  self.phase.name(),
            wake:   match wake {
                Wake::Start => "start",
                Wake::Timeout => "timeout",
                Wake::Granted(_) => "grant",
                Wake::Expired => "expiry",
            },
        }
    }
}

impl Process<Plant> for TicketLifecycle {
    fn label(&self) -> String {
        format!("ticket-{}", self.ticket.0)
    }

    fn resume(&mut self, wake: Wake, cx: &mut Ctx<'_, Plant>) -> ProcessResult<Step> {
        match (self.phase, wake) {
            (Phase::Launch, Wake::Start) => self.launch(cx),
            (Phase::Holding, Wake::Timeout) => Ok(self.begin_depot_prep(cx)),
            (Phase::AwaitLoader, Wake::Granted(token)) => Ok(self.loader_granted(token, cx)),
            (Phase::Running(stage), Wake::Timeout) => Ok(self.complete(stage, cx)),
            (Phase::AwaitBay, Wake::Granted(token)) => Ok(self.bay_granted(token, cx)),
            (_, wake) => Err(self.unexpected(cx, &wake).into()),
        }
    }
}
