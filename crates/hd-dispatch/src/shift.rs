//! `TruckShift`: one truck's working day.
//!
//! ```text
//! clock_in ─▶ on roster of home depot ─▶ clock_out ─▶ shift_ending
//!          ─▶ (poll until tasks_finished) ─▶ off roster
//! ```

use hd_core::{SimTime, TruckId};
use hd_kernel::{Ctx, Process, ProcessError, ProcessResult, Step, Wake};
use hd_model::ModelError;
use tracing::debug;

use crate::{DispatchError, Plant};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    OffDuty,
    OnDuty,
    ClockingOut,
}

pub struct TruckShift {
    truck: TruckId,
    poll:  f64,
    phase: Phase,
}

impl TruckShift {
    /// `poll` is how often a truck past clock-out checks whether its current
    /// ticket is done.
    pub fn new(truck: TruckId, poll: f64) -> Self {
        Self { truck, poll, phase: Phase::OffDuty }
    }
}

impl Process<Plant> for TruckShift {
    fn label(&self) -> String {
        format!("shift-{}", self.truck.0)
    }

    fn resume(&mut self, wake: Wake, cx: &mut Ctx<'_, Plant>) -> ProcessResult<Step> {
        let now = cx.now();
        // A lifecycle that aborted mid-ticket never sets `tasks_finished`,
        // but the kernel has still freed the busy slot.
        let busy = cx.world.yard.truck(self.truck).busy;
        let idle = cx.resource(busy).users() == 0;
        let yard = &mut cx.world.yard;
        let truck = yard.truck(self.truck);

        match (self.phase, wake) {
            (Phase::OffDuty, Wake::Start) => {
                // Unknown home depot: the truck never comes on duty.
                truck.home_depot.require(ModelError::UnknownDepot).map_err(DispatchError::from)?;
                self.phase = Phase::OnDuty;
                Ok(Step::SleepUntil(SimTime::new(truck.clock_in).max(now)))
            }
            (Phase::OnDuty, Wake::Timeout) => {
                let depot = truck.home_depot.require(ModelError::UnknownDepot).map_err(DispatchError::from)?;
                let clock_out = SimTime::new(truck.clock_out).max(now);
                yard.station(self.truck, depot);
                debug!(truck = %yard.truck(self.truck).name, t = now.as_f64(), "clock in");
                self.phase = Phase::ClockingOut;
                Ok(Step::SleepUntil(clock_out))
            }
            (Phase::ClockingOut, Wake::Timeout) => {
                let truck = yard.truck_mut(self.truck);
                truck.shift_ending = true;
                if !truck.tasks_finished && !idle {
                    return Ok(Step::Sleep(self.poll));
                }
                debug!(truck = %truck.name, t = now.as_f64(), "clock out");
                yard.unstation(self.truck);
                Ok(Step::Finish)
            }
            (phase, _) => Err(ProcessError::abort(format!(
                "truck shift woke unexpectedly in {phase:?}"
            ))),
        }
    }
}
