//! Domain entities.
//!
//! Entities are plain structs stored in the [`Yard`](crate::Yard) tables and
//! indexed by their typed id.  Cross-references that come from input data are
//! [`EntityRef`]s: the original name plus the id it resolved to, if any.  A
//! reference that failed to resolve is not an input error on its own; the
//! process that needs it aborts and the ticket stays unassigned.

use hd_core::{DepotId, GeoPoint, OrderId, ResourceId, SimTime, SiteId, TicketId, TruckId};

use crate::{ModelError, ModelResult, Stage, StageLog, TicketState};

// ── References ────────────────────────────────────────────────────────────────

/// A by-name reference from input data, resolved once at setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRef<I> {
    pub name: String,
    pub id:   Option<I>,
}

impl<I: Copy> EntityRef<I> {
    pub fn resolved(name: impl Into<String>, id: I) -> Self {
        Self { name: name.into(), id: Some(id) }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self { name: name.into(), id: None }
    }

    /// The resolved id, or `missing(name)` if resolution failed.
    pub fn require(&self, missing: fn(String) -> ModelError) -> ModelResult<I> {
        self.id.ok_or_else(|| missing(self.name.clone()))
    }
}

// ── Depot ─────────────────────────────────────────────────────────────────────

/// A batch plant.
#[derive(Clone, Debug)]
pub struct Depot {
    pub id:              DepotId,
    pub name:            String,
    pub location:        GeoPoint,
    pub loader_capacity: usize,
    pub loading_bay:     ResourceId,
    /// Trucks currently stationed here, in arrival order.
    pub roster:          Vec<TruckId>,
}

impl Depot {
    pub fn has_truck(&self, truck: TruckId) -> bool {
        self.roster.contains(&truck)
    }
}

// ── DeliverySite ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct DeliverySite {
    pub id:            SiteId,
    pub name:          String,
    pub location:      GeoPoint,
    pub bay_capacity:  usize,
    pub unloading_bay: ResourceId,
}

// ── Truck ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Truck {
    pub id:             TruckId,
    pub name:           String,
    /// Where the truck is parked; updated to the return depot after each
    /// ticket.
    pub home_depot:     EntityRef<DepotId>,
    pub clock_in:       f64,
    pub clock_out:      f64,
    /// Capacity-1 resource held while the truck runs a ticket.
    pub busy:           ResourceId,
    /// True while no ticket is in progress.
    pub tasks_finished: bool,
    /// Past clock-out; takes no new tickets.
    pub shift_ending:   bool,
    /// Tickets this truck was originally scheduled to run.
    pub planned:        Vec<TicketId>,
}

// ── Order ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Order {
    pub id:       OrderId,
    pub name:     String,
    pub site:     EntityRef<SiteId>,
    pub due_time: f64,
    pub quantity: f64,
    pub tickets:  Vec<TicketId>,
}

// ── Ticket ────────────────────────────────────────────────────────────────────

/// Nominal stage durations of one ticket.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageDurations {
    pub depot_prep:  f64,
    pub travel_to:   f64,
    pub site_prep:   f64,
    pub unload:      f64,
    pub clean:       f64,
    pub travel_back: f64,
}

impl StageDurations {
    /// Fixed duration of a timed stage.  `WaitingForBay` has none and
    /// `Discharging` is sampled, so both return `None`.
    pub fn of(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::DepotPrep => Some(self.depot_prep),
            Stage::TravelTo => Some(self.travel_to),
            Stage::SitePrep => Some(self.site_prep),
            Stage::Cleaning => Some(self.clean),
            Stage::TravelBack => Some(self.travel_back),
            Stage::WaitingForBay | Stage::Discharging => None,
        }
    }

    /// Depot prep + travel out + site prep: time from launch until the
    /// ticket first wants the unloading bay.
    pub fn time_to_readiness(&self) -> f64 {
        self.depot_prep + self.travel_to + self.site_prep
    }

    /// Every nominal duration end to end, with no waiting.
    pub fn theoretical_total(&self) -> f64 {
        self.depot_prep + self.travel_to + self.site_prep + self.unload + self.clean + self.travel_back
    }
}

/// One truck load.
#[derive(Clone, Debug)]
pub struct Ticket {
    pub id:             TicketId,
    pub name:           String,
    pub order:          EntityRef<OrderId>,
    pub site:           EntityRef<SiteId>,
    pub dispatch_depot: EntityRef<DepotId>,
    pub return_depot:   EntityRef<DepotId>,
    /// Absolute instant the load is due at the site.
    pub due_time:       f64,
    /// Absolute instant the controller may launch the load.
    pub dispatch_time:  f64,
    pub durations:      StageDurations,
    pub is_assigned:    bool,
    pub plan_truck:     Option<TruckId>,
    pub actual_truck:   Option<TruckId>,
    /// When the lifecycle process started.
    pub launched_at:    Option<SimTime>,
    pub state:          TicketState,
    pub stages:         StageLog,
}

impl Ticket {
    /// Commit the ticket for execution, by `truck` when a fleet is modelled.
    ///
    /// # Panics
    /// Panics if the ticket is already assigned.
    pub fn assign(&mut self, truck: Option<TruckId>) {
        assert!(!self.is_assigned, "ticket {} assigned twice", self.name);
        self.is_assigned = true;
        self.actual_truck = truck;
    }

    /// Enter `stage`.
    ///
    /// # Panics
    /// Panics if the ticket is already done.
    pub fn enter(&mut self, stage: Stage) {
        assert!(self.state != TicketState::Done, "ticket {} is done", self.name);
        self.state = TicketState::Active(stage);
    }

    /// Record a completed stage.
    pub fn record(&mut self, stage: Stage, start: SimTime, end: SimTime) {
        self.stages.record(stage, start, end);
    }

    /// Move to `Done` and freeze the stage log.
    pub fn finish(&mut self) {
        assert!(self.state != TicketState::Done, "ticket {} finished twice", self.name);
        self.state = TicketState::Done;
        self.stages.seal();
    }

    pub fn is_done(&self) -> bool {
        self.state == TicketState::Done
    }

    pub fn is_started(&self) -> bool {
        self.launched_at.is_some()
    }
}
