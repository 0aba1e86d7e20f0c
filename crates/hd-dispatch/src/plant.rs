//! `Plant`: the world every dispatch process acts on.

use hd_core::{DepotId, ResourceId, SiteId, TicketId};
use hd_model::{ModelError, Yard};

use crate::{DeliveryStats, DischargeSampler, DispatchResult, ReleaseForecast};

/// Domain state shared by all processes of one run.
///
/// Owned by the kernel and handed to each process through `Ctx::world`, so
/// independent runs never share accumulators.
#[derive(Clone, Debug)]
pub struct Plant {
    pub yard:             Yard,
    pub forecast:         ReleaseForecast,
    pub stats:            DeliveryStats,
    pub sampler:          DischargeSampler,
    /// Hold the dispatch depot's loading bay during depot prep.
    pub use_loading_bays: bool,
    /// Cleared at the run horizon.  The controller and the assignment loop
    /// finish instead of launching further tickets.
    pub admitting:        bool,
}

impl Plant {
    pub fn new(yard: Yard, sampler: DischargeSampler) -> Self {
        Self {
            yard,
            forecast: ReleaseForecast::new(),
            stats: DeliveryStats::default(),
            sampler,
            use_loading_bays: false,
            admitting: true,
        }
    }

    pub fn with_loading_bays(mut self, on: bool) -> Self {
        self.use_loading_bays = on;
        self
    }

    /// Stop launching tickets; lifecycles already running carry on.
    pub fn close_admission(&mut self) {
        self.admitting = false;
    }

    /// Tickets launched but not yet `Done`.
    pub fn in_flight(&self) -> usize {
        self.yard.tickets.iter().filter(|t| t.is_assigned && !t.is_done()).count()
    }
}

/// Every place a ticket touches, resolved to ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub dispatch_depot: DepotId,
    pub loading_bay:    ResourceId,
    pub site:           SiteId,
    pub unloading_bay:  ResourceId,
    pub return_depot:   DepotId,
}

impl Route {
    /// Resolve the ticket's references, failing on the first unknown one.
    pub fn resolve(yard: &Yard, ticket: TicketId) -> DispatchResult<Route> {
        let t = yard.ticket(ticket);
        t.order.require(ModelError::UnknownOrder)?;
        let site = t.site.require(ModelError::UnknownSite)?;
        let dispatch_depot = t.dispatch_depot.require(ModelError::UnknownDepot)?;
        let return_depot = t.return_depot.require(ModelError::UnknownDepot)?;
        Ok(Route {
            dispatch_depot,
            loading_bay: yard.depot(dispatch_depot).loading_bay,
            site,
            unloading_bay: yard.site(site).unloading_bay,
            return_depot,
        })
    }
}
