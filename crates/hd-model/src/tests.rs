//! Unit tests for hd-model.

#[cfg(test)]
mod fixture {
    use std::io::Cursor;

    use crate::{
        load_depots_reader, load_orders_reader, load_sites_reader, load_tickets_reader,
        load_trucks_reader, InputTables,
    };

    pub const DEPOTS: &str = "\
depot_id,lat,lon,loader_capacity
plant_a,26.00,-80.20,2
plant_b,26.10,-80.30,
";

    pub const SITES: &str = "\
site_id,lat,lon,bay_capacity
tower,26.20,-80.20,1
";

    pub const TRUCKS: &str = "\
truck_id,home_depot,clock_in,clock_out
truck_01,plant_a,0,600
truck_02,plant_b,5,600
truck_03,plant_x,0,600
";

    pub const ORDERS: &str = "\
order_id,site_id,due_time,quantity
ord_1,tower,60,30
ord_2,nowhere,90,
";

    pub const TICKETS: &str = "\
ticket_id,order_id,dispatch_depot,return_depot,due_time,dispatch_time,depot_prep,travel_to,site_prep,unload,clean,travel_back,plan_truck
t1,ord_1,plant_a,,60,0,10,20,10,15,5,20,truck_01
t2,ord_1,plant_a,plant_b,75,,10,20,10,15,5,,truck_02
t3,ord_1,plant_b,,80,30,10,,10,15,5,,truck_01
t4,ord_2,plant_a,,90,40,10,20,10,15,5,20,
";

    pub fn tables() -> InputTables {
        InputTables {
            depots:  load_depots_reader(Cursor::new(DEPOTS)).unwrap(),
            sites:   load_sites_reader(Cursor::new(SITES)).unwrap(),
            trucks:  load_trucks_reader(Cursor::new(TRUCKS)).unwrap(),
            orders:  load_orders_reader(Cursor::new(ORDERS)).unwrap(),
            tickets: load_tickets_reader(Cursor::new(TICKETS)).unwrap(),
        }
    }
}

#[cfg(test)]
mod input {
    use std::io::Cursor;

    use super::fixture::tables;
    use crate::{load_tickets_reader, ModelError};

    #[test]
    fn empty_cells_become_none() {
        let t = tables();
        assert_eq!(t.depots[0].loader_capacity, Some(2));
        assert_eq!(t.depots[1].loader_capacity, None);
        assert_eq!(t.orders[1].quantity, None);
        assert_eq!(t.tickets[1].return_depot.as_deref(), Some("plant_b"));
        assert_eq!(t.tickets[0].return_depot, None);
        assert_eq!(t.tickets[1].dispatch_time, None);
        assert_eq!(t.tickets[3].plan_truck, None);
    }

    #[test]
    fn bad_number_is_parse_error() {
        let csv = "ticket_id,order_id,dispatch_depot,due_time,depot_prep,site_prep,unload,clean\n\
                   t1,o,d,soon,1,1,1,1\n";
        let err = load_tickets_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn load_dir_reads_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("depots.csv", super::fixture::DEPOTS),
            ("sites.csv", super::fixture::SITES),
            ("orders.csv", super::fixture::ORDERS),
            ("tickets.csv", super::fixture::TICKETS),
        ] {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        let t = crate::InputTables::load_dir(dir.path()).unwrap();
        assert_eq!(t.tickets.len(), 4);
        assert!(t.trucks.is_empty());
    }
}

#[cfg(test)]
mod builder {
    use hd_core::{DepotId, SiteId, TicketId, TruckId};
    use hd_kernel::ResourcePool;

    use super::fixture::tables;
    use crate::{ModelError, TicketRecord, YardBuilder};

    #[test]
    fn builds_tables_and_resources() {
        let mut pool = ResourcePool::new();
        let yard = YardBuilder::new(&tables()).build(&mut pool).unwrap();

        assert_eq!(yard.depots.len(), 2);
        assert_eq!(yard.depots[0].loader_capacity, 2);
        assert_eq!(yard.depots[1].loader_capacity, 1);
        // 2 loaders + 1 bay + 3 trucks
        assert_eq!(pool.len(), 6);
        assert_eq!(pool.get(yard.sites[0].unloading_bay).capacity(), 1);
        assert_eq!(yard.depot_by_name("plant_b"), Some(DepotId(1)));
        assert_eq!(yard.site_by_name("tower"), Some(SiteId(0)));
    }

    #[test]
    fn unresolved_references_are_kept_not_fatal() {
        let mut pool = ResourcePool::new();
        let yard = YardBuilder::new(&tables()).build(&mut pool).unwrap();

        let t3 = yard.truck(TruckId(2));
        assert_eq!(t3.home_depot.name, "plant_x");
        assert!(t3.home_depot.id.is_none());
        assert!(matches!(
            t3.home_depot.require(ModelError::UnknownDepot),
            Err(ModelError::UnknownDepot(n)) if n == "plant_x"
        ));

        let t4 = yard.ticket(TicketId(3));
        assert!(t4.order.id.is_some());
        assert!(t4.site.id.is_none());
        assert_eq!(t4.site.name, "nowhere");
    }

    #[test]
    fn defaults_fill_missing_cells() {
        let mut pool = ResourcePool::new();
        let yard = YardBuilder::new(&tables()).build(&mut pool).unwrap();

        let t2 = yard.ticket(TicketId(1));
        assert_eq!(t2.return_depot.id, Some(DepotId(1)));
        // due 75 − (10 + 20 + 10)
        assert_eq!(t2.dispatch_time, 35.0);
        // travel back derived from plant_b → tower coordinates
        assert!(t2.durations.travel_back > 0.0);

        let t3 = yard.ticket(TicketId(2));
        assert!(t3.durations.travel_to > 0.0);
        assert_eq!(t3.durations.travel_back, t3.durations.travel_to);
    }

    #[test]
    fn orders_and_plans_link_tickets() {
        let mut pool = ResourcePool::new();
        let yard = YardBuilder::new(&tables()).build(&mut pool).unwrap();

        assert_eq!(yard.order(yard.order_by_name("ord_1").unwrap()).tickets.len(), 3);
        assert_eq!(yard.truck(TruckId(0)).planned, vec![TicketId(0), TicketId(2)]);
        assert_eq!(yard.truck(TruckId(1)).planned, vec![TicketId(1)]);
        assert_eq!(yard.planned_owner(TicketId(2)), Some(TruckId(0)));
        assert_eq!(yard.planned_owner(TicketId(3)), None);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut t = tables();
        let dup = t.depots[0].clone();
        t.depots.push(dup);
        let err = YardBuilder::new(&t).build(&mut ResourcePool::new()).unwrap_err();
        assert!(matches!(err, ModelError::Duplicate { kind: "depot", .. }));
    }

    #[test]
    fn negative_duration_rejected() {
        let mut t = tables();
        t.tickets[0] = TicketRecord { unload: -1.0, ..t.tickets[0].clone() };
        let err = YardBuilder::new(&t).build(&mut ResourcePool::new()).unwrap_err();
        assert!(matches!(err, ModelError::Invalid { what: "unload", .. }));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut t = tables();
        t.sites[0].bay_capacity = Some(0);
        assert!(YardBuilder::new(&t).build(&mut ResourcePool::new()).is_err());
    }
}

#[cfg(test)]
mod yard {
    use std::collections::BTreeSet;

    use hd_core::{DepotId, TicketId, TruckId};
    use hd_kernel::ResourcePool;

    use super::fixture::tables;
    use crate::{Yard, YardBuilder};

    fn yard() -> Yard {
        YardBuilder::new(&tables()).build(&mut ResourcePool::new()).unwrap()
    }

    fn planned_union(yard: &Yard) -> Vec<TicketId> {
        let mut all: Vec<TicketId> = yard.trucks.iter().flat_map(|t| t.planned.iter().copied()).collect();
        all.sort();
        all
    }

    #[test]
    fn exchange_swaps_lists() {
        let mut y = yard();
        // truck_02 takes t1, which truck_01 planned.
        assert_eq!(y.exchange_schedules(TicketId(0), TruckId(1)), Some(TruckId(0)));
        assert_eq!(y.truck(TruckId(1)).planned, vec![TicketId(0), TicketId(2)]);
        assert_eq!(y.truck(TruckId(0)).planned, vec![TicketId(1)]);
        assert_eq!(y.planned_owner(TicketId(2)), Some(TruckId(1)));
        assert_eq!(y.planned_owner(TicketId(1)), Some(TruckId(0)));
    }

    #[test]
    fn exchange_is_noop_for_owner_or_unplanned() {
        let mut y = yard();
        assert_eq!(y.exchange_schedules(TicketId(0), TruckId(0)), None);
        assert_eq!(y.exchange_schedules(TicketId(3), TruckId(1)), None);
        assert_eq!(y.truck(TruckId(0)).planned, vec![TicketId(0), TicketId(2)]);
    }

    #[test]
    fn exchanges_preserve_the_ticket_universe() {
        let mut y = yard();
        let before = planned_union(&y);
        let moves = [
            (TicketId(0), TruckId(2)),
            (TicketId(1), TruckId(0)),
            (TicketId(2), TruckId(1)),
            (TicketId(0), TruckId(0)),
            (TicketId(1), TruckId(2)),
        ];
        for (ticket, truck) in moves {
            y.exchange_schedules(ticket, truck);
            assert_eq!(planned_union(&y), before);
            let distinct: BTreeSet<TicketId> = planned_union(&y).into_iter().collect();
            assert_eq!(distinct.len(), before.len());
            for t in &before {
                let owner = y.planned_owner(*t).unwrap();
                assert!(y.truck(owner).planned.contains(t));
            }
        }
    }

    #[test]
    fn station_keeps_one_roster() {
        let mut y = yard();
        y.station(TruckId(0), DepotId(0));
        y.station(TruckId(0), DepotId(1));
        assert!(!y.depot(DepotId(0)).has_truck(TruckId(0)));
        assert_eq!(y.stationed_at(TruckId(0)), Some(DepotId(1)));
        y.unstation(TruckId(0));
        assert_eq!(y.stationed_at(TruckId(0)), None);
    }

    #[test]
    fn order_started_follows_tickets() {
        let mut y = yard();
        let ord = y.order_by_name("ord_1").unwrap();
        assert!(!y.order_is_started(ord));
        y.ticket_mut(TicketId(2)).launched_at = Some(hd_core::SimTime::new(3.0));
        assert!(y.order_is_started(ord));
    }
}

#[cfg(test)]
mod stage_log {
    use hd_core::SimTime;

    use crate::{Stage, StageLog};

    #[test]
    fn records_in_order() {
        let mut log = StageLog::new();
        log.record(Stage::DepotPrep, SimTime::new(0.0), SimTime::new(10.0));
        log.record(Stage::TravelTo, SimTime::new(10.0), SimTime::new(30.0));
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(Stage::TravelTo).unwrap().duration(), 20.0);
        let keys: Vec<&str> = log.iter().map(|(s, _)| s.key()).collect();
        assert_eq!(keys, vec!["1_depot_prep", "2_travel_to"]);
    }

    #[test]
    #[should_panic(expected = "recorded twice")]
    fn overwrite_panics() {
        let mut log = StageLog::new();
        log.record(Stage::DepotPrep, SimTime::new(0.0), SimTime::new(10.0));
        log.record(Stage::DepotPrep, SimTime::new(10.0), SimTime::new(12.0));
    }

    #[test]
    #[should_panic(expected = "before")]
    fn backwards_start_panics() {
        let mut log = StageLog::new();
        log.record(Stage::DepotPrep, SimTime::new(0.0), SimTime::new(10.0));
        log.record(Stage::TravelTo, SimTime::new(5.0), SimTime::new(12.0));
    }

    #[test]
    #[should_panic(expected = "after ticket is done")]
    fn sealed_log_is_frozen() {
        let mut log = StageLog::new();
        log.record(Stage::DepotPrep, SimTime::new(0.0), SimTime::new(10.0));
        log.seal();
        log.record(Stage::TravelTo, SimTime::new(10.0), SimTime::new(12.0));
    }
}
