//! Build a [`Yard`] from [`InputTables`].
//!
//! # What fails the build vs what doesn't
//!
//! Malformed data (duplicate ids, zero capacities, negative or NaN
//! durations, a clock-out before clock-in) is rejected with a `ModelError`.
//!
//! A reference to an id that does not exist (a ticket's depot, an order's
//! site, a truck's home depot) is only logged: the reference stays
//! unresolved, and the process that needs it aborts at run time, leaving the
//! ticket unassigned in the final report.

use hd_core::{travel_minutes, DepotId, GeoPoint, OrderId, SiteId, TicketId, TruckId};
use hd_kernel::ResourcePool;
use tracing::warn;

use crate::entity::{EntityRef, StageDurations};
use crate::yard::NameIndex;
use crate::{
    DeliverySite, Depot, InputTables, ModelError, ModelResult, Order, StageLog, Ticket,
    TicketState, Truck, Yard,
};

/// Assembles entity tables, registers their resources, and resolves names.
pub struct YardBuilder<'a> {
    tables:           &'a InputTables,
    minutes_per_mile: f64,
}

impl<'a> YardBuilder<'a> {
    pub fn new(tables: &'a InputTables) -> Self {
        Self { tables, minutes_per_mile: 1.5 }
    }

    /// Pace used to derive travel durations missing from the ticket table.
    pub fn minutes_per_mile(mut self, pace: f64) -> Self {
        self.minutes_per_mile = pace;
        self
    }

    /// Build the yard, registering one loading bay per depot, one unloading
    /// bay per site, and one busy slot per truck in `pool`.
    pub fn build(self, pool: &mut ResourcePool) -> ModelResult<Yard> {
        let mut yard = Yard::default();

        // ── Depots ────────────────────────────────────────────────────────
        for (i, r) in self.tables.depots.iter().enumerate() {
            let id = DepotId(i as u32);
            insert_unique(&mut yard.depot_index, "depot", &r.depot_id, id)?;
            let capacity = positive_capacity("loader_capacity", &r.depot_id, r.loader_capacity)?;
            yard.depots.push(Depot {
                id,
                name: r.depot_id.clone(),
                location: GeoPoint::new(r.lat, r.lon),
                loader_capacity: capacity,
                loading_bay: pool.add(format!("depot:{}:loader", r.depot_id), capacity),
                roster: Vec::new(),
            });
        }

        // ── Sites ─────────────────────────────────────────────────────────
        for (i, r) in self.tables.sites.iter().enumerate() {
            let id = SiteId(i as u32);
            insert_unique(&mut yard.site_index, "site", &r.site_id, id)?;
            let capacity = positive_capacity("bay_capacity", &r.site_id, r.bay_capacity)?;
            yard.sites.push(DeliverySite {
                id,
                name: r.site_id.clone(),
                location: GeoPoint::new(r.lat, r.lon),
                bay_capacity: capacity,
                unloading_bay: pool.add(format!("site:{}:bay", r.site_id), capacity),
            });
        }

        // ── Trucks ────────────────────────────────────────────────────────
        for (i, r) in self.tables.trucks.iter().enumerate() {
            let id = TruckId(i as u32);
            insert_unique(&mut yard.truck_index, "truck", &r.truck_id, id)?;
            non_negative("clock_in", &r.truck_id, r.clock_in)?;
            if r.clock_out.is_nan() || r.clock_out < r.clock_in {
                return Err(ModelError::Invalid {
                    what:   "clock_out",
                    name:   r.truck_id.clone(),
                    detail: format!("{} is before clock_in {}", r.clock_out, r.clock_in),
                });
            }
            let home = resolve(&yard.depot_index, &r.home_depot, "depot", &r.truck_id);
            yard.trucks.push(Truck {
                id,
                name: r.truck_id.clone(),
                home_depot: home,
                clock_in: r.clock_in,
                clock_out: r.clock_out,
                busy: pool.add(format!("truck:{}", r.truck_id), 1),
                tasks_finished: true,
                shift_ending: false,
                planned: Vec::new(),
            });
        }

        // ── Orders ────────────────────────────────────────────────────────
        for (i, r) in self.tables.orders.iter().enumerate() {
            let id = OrderId(i as u32);
            insert_unique(&mut yard.order_index, "order", &r.order_id, id)?;
            non_negative("due_time", &r.order_id, r.due_time)?;
            let site = resolve(&yard.site_index, &r.site_id, "site", &r.order_id);
            yard.orders.push(Order {
                id,
                name: r.order_id.clone(),
                site,
                due_time: r.due_time,
                quantity: r.quantity.unwrap_or(0.0),
                tickets: Vec::new(),
            });
        }

        // ── Tickets ───────────────────────────────────────────────────────
        for (i, r) in self.tables.tickets.iter().enumerate() {
            let id = TicketId(i as u32);
            insert_unique(&mut yard.ticket_index, "ticket", &r.ticket_id, id)?;
            for (what, v) in [
                ("due_time", r.due_time),
                ("depot_prep", r.depot_prep),
                ("site_prep", r.site_prep),
                ("unload", r.unload),
                ("clean", r.clean),
            ] {
                non_negative(what, &r.ticket_id, v)?;
            }

            let order = resolve(&yard.order_index, &r.order_id, "order", &r.ticket_id);
            let site = match order.id {
                Some(o) => yard.orders[o.index()].site.clone(),
                None => EntityRef::unresolved(String::new()),
            };
            let dispatch_depot = resolve(&yard.depot_index, &r.dispatch_depot, "depot", &r.ticket_id);
            let return_depot = match &r.return_depot {
                Some(name) => resolve(&yard.depot_index, name, "depot", &r.ticket_id),
                None => dispatch_depot.clone(),
            };

            let site_loc = site.id.map(|s| yard.sites[s.index()].location);
            let travel_to = match r.travel_to {
                Some(v) => non_negative("travel_to", &r.ticket_id, v)?,
                None => self.derive_travel(&yard, dispatch_depot.id, site_loc),
            };
            let travel_back = match r.travel_back {
                Some(v) => non_negative("travel_back", &r.ticket_id, v)?,
                None if return_depot.id.is_some() => self.derive_travel(&yard, return_depot.id, site_loc),
                None => travel_to,
            };

            let durations = StageDurations {
                depot_prep: r.depot_prep,
                travel_to,
                site_prep: r.site_prep,
                unload: r.unload,
                clean: r.clean,
                travel_back,
            };
            let dispatch_time = match r.dispatch_time {
                Some(v) => non_negative("dispatch_time", &r.ticket_id, v)?,
                None => (r.due_time - durations.time_to_readiness()).max(0.0),
            };

            let plan_truck = r.plan_truck.as_deref().and_then(|name| {
                let t = yard.truck_index.get(name).copied();
                if t.is_none() {
                    warn!(ticket = %r.ticket_id, truck = name, "planned truck not found");
                }
                t
            });

            if let Some(o) = order.id {
                yard.orders[o.index()].tickets.push(id);
            }
            if let Some(t) = plan_truck {
                yard.trucks[t.index()].planned.push(id);
            }
            yard.planned_owner.push(plan_truck);

            yard.tickets.push(Ticket {
                id,
                name: r.ticket_id.clone(),
                order,
                site,
                dispatch_depot,
                return_depot,
                due_time: r.due_time,
                dispatch_time,
                durations,
                is_assigned: false,
                plan_truck,
                actual_truck: None,
                launched_at: None,
                state: TicketState::Pending,
                stages: StageLog::new(),
            });
        }

        Ok(yard)
    }

    fn derive_travel(&self, yard: &Yard, depot: Option<DepotId>, site: Option<GeoPoint>) -> f64 {
        match (depot, site) {
            (Some(d), Some(s)) => travel_minutes(yard.depots[d.index()].location, s, self.minutes_per_mile),
            // Unresolved reference: the lifecycle aborts before travelling.
            _ => 0.0,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn insert_unique<I: Copy>(
    index: &mut NameIndex<I>,
    kind:  &'static str,
    name:  &str,
    id:    I,
) -> ModelResult<()> {
    if index.insert(name.to_string(), id).is_some() {
        return Err(ModelError::Duplicate { kind, name: name.to_string() });
    }
    Ok(())
}

fn resolve<I: Copy>(index: &NameIndex<I>, name: &str, kind: &'static str, owner: &str) -> EntityRef<I> {
    match index.get(name) {
        Some(&id) => EntityRef::resolved(name, id),
        None => {
            warn!(owner, kind, name, "unresolved reference");
            EntityRef::unresolved(name)
        }
    }
}

fn positive_capacity(what: &'static str, name: &str, v: Option<usize>) -> ModelResult<usize> {
    match v.unwrap_or(1) {
        0 => Err(ModelError::Invalid { what, name: name.to_string(), detail: "must be at least 1".into() }),
        c => Ok(c),
    }
}

fn non_negative(what: &'static str, name: &str, v: f64) -> ModelResult<f64> {
    if v >= 0.0 && v.is_finite() {
        Ok(v)
    } else {
        Err(ModelError::Invalid { what, name: name.to_string(), detail: format!("{v} is not a non-negative duration") })
    }
}
