//! `Yard`: every entity table of one run plus the lookup indexes.
//!
//! Tables are `Vec`s indexed by typed id in input order.  Name lookups go
//! through hash indexes built once by the [`YardBuilder`](crate::YardBuilder),
//! and `planned_owner` maps each ticket to the truck whose planned list
//! currently contains it, so a schedule exchange never scans the fleet.

use hd_core::{DepotId, OrderId, SiteId, TicketId, TruckId};

use crate::{DeliverySite, Depot, Order, Ticket, Truck};

#[cfg(feature = "fx-hash")]
pub(crate) type NameIndex<I> = rustc_hash::FxHashMap<String, I>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type NameIndex<I> = std::collections::HashMap<String, I>;

/// Entity tables and indexes.
#[derive(Clone, Debug, Default)]
pub struct Yard {
    pub depots:  Vec<Depot>,
    pub sites:   Vec<DeliverySite>,
    pub trucks:  Vec<Truck>,
    pub orders:  Vec<Order>,
    pub tickets: Vec<Ticket>,

    pub(crate) depot_index:   NameIndex<DepotId>,
    pub(crate) site_index:    NameIndex<SiteId>,
    pub(crate) truck_index:   NameIndex<TruckId>,
    pub(crate) order_index:   NameIndex<OrderId>,
    pub(crate) ticket_index:  NameIndex<TicketId>,
    /// Ticket → truck whose `planned` list holds it.
    pub(crate) planned_owner: Vec<Option<TruckId>>,
}

impl Yard {
    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn depot(&self, id: DepotId) -> &Depot {
        &self.depots[id.index()]
    }

    pub fn depot_mut(&mut self, id: DepotId) -> &mut Depot {
        &mut self.depots[id.index()]
    }

    pub fn site(&self, id: SiteId) -> &DeliverySite {
        &self.sites[id.index()]
    }

    pub fn truck(&self, id: TruckId) -> &Truck {
        &self.trucks[id.index()]
    }

    pub fn truck_mut(&mut self, id: TruckId) -> &mut Truck {
        &mut self.trucks[id.index()]
    }

    pub fn order(&self, id: OrderId) -> &Order {
        &self.orders[id.index()]
    }

    pub fn ticket(&self, id: TicketId) -> &Ticket {
        &self.tickets[id.index()]
    }

    pub fn ticket_mut(&mut self, id: TicketId) -> &mut Ticket {
        &mut self.tickets[id.index()]
    }

    pub fn depot_by_name(&self, name: &str) -> Option<DepotId> {
        self.depot_index.get(name).copied()
    }

    pub fn site_by_name(&self, name: &str) -> Option<SiteId> {
        self.site_index.get(name).copied()
    }

    pub fn truck_by_name(&self, name: &str) -> Option<TruckId> {
        self.truck_index.get(name).copied()
    }

    pub fn order_by_name(&self, name: &str) -> Option<OrderId> {
        self.order_index.get(name).copied()
    }

    pub fn ticket_by_name(&self, name: &str) -> Option<TicketId> {
        self.ticket_index.get(name).copied()
    }

    /// The truck whose planned list currently contains `ticket`.
    pub fn planned_owner(&self, ticket: TicketId) -> Option<TruckId> {
        self.planned_owner[ticket.index()]
    }

    /// True once any ticket of the order has been launched.
    pub fn order_is_started(&self, order: OrderId) -> bool {
        self.order(order).tickets.iter().any(|&t| self.ticket(t).is_started())
    }

    pub fn unassigned_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| !t.is_assigned)
    }

    pub fn all_assigned(&self) -> bool {
        self.tickets.iter().all(|t| t.is_assigned)
    }

    // ── Rosters ───────────────────────────────────────────────────────────

    /// Depot whose roster currently lists `truck`.
    pub fn stationed_at(&self, truck: TruckId) -> Option<DepotId> {
        self.depots.iter().find(|d| d.has_truck(truck)).map(|d| d.id)
    }

    /// Station `truck` at `depot`, taking it off any other roster first so it
    /// is never listed twice.
    pub fn station(&mut self, truck: TruckId, depot: DepotId) {
        self.unstation(truck);
        self.depot_mut(depot).roster.push(truck);
    }

    /// Remove `truck` from whichever roster lists it.
    pub fn unstation(&mut self, truck: TruckId) {
        for depot in &mut self.depots {
            depot.roster.retain(|&t| t != truck);
        }
    }

    // ── Schedule exchange ─────────────────────────────────────────────────

    /// Swap the planned lists of `truck` and of the truck that currently
    /// plans `ticket`.  Returns the other truck, or `None` when nothing was
    /// swapped (nobody plans the ticket, or `truck` already does).
    pub fn exchange_schedules(&mut self, ticket: TicketId, truck: TruckId) -> Option<TruckId> {
        let owner = self.planned_owner(ticket)?;
        if owner == truck {
            return None;
        }

        let mine = std::mem::take(&mut self.trucks[truck.index()].planned);
        let theirs = std::mem::take(&mut self.trucks[owner.index()].planned);
        for &t in &mine {
            self.planned_owner[t.index()] = Some(owner);
        }
        for &t in &theirs {
            self.planned_owner[t.index()] = Some(truck);
        }
        self.trucks[truck.index()].planned = theirs;
        self.trucks[owner.index()].planned = mine;
        Some(owner)
    }
}
