//! Integration tests for hd-sim.

use hd_core::{
    AssignmentConfig, DischargeConfig, DispatchMode, DispatchPolicy, Horizon, SimConfig, SimTime,
};
use hd_model::{DepotRecord, InputTables, OrderRecord, SiteRecord, TicketRecord, TruckRecord};

use crate::{NoopObserver, RunReport, SimBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// prep 10, travel 20, site prep 10, clean 5, travel back 20.
fn ticket(name: &str, due: f64, dispatch: f64, unload: f64) -> TicketRecord {
    TicketRecord {
        ticket_id:      name.to_string(),
        order_id:       "o1".to_string(),
        dispatch_depot: "d1".to_string(),
        return_depot:   None,
        due_time:       due,
        dispatch_time:  Some(dispatch),
        depot_prep:     10.0,
        travel_to:      Some(20.0),
        site_prep:      10.0,
        unload,
        clean:          5.0,
        travel_back:    Some(20.0),
        plan_truck:     None,
    }
}

fn tables(tickets: Vec<TicketRecord>) -> InputTables {
    InputTables {
        depots:  vec![DepotRecord { depot_id: "d1".into(), lat: 26.0, lon: -80.2, loader_capacity: None }],
        sites:   vec![SiteRecord { site_id: "s1".into(), lat: 26.2, lon: -80.2, bay_capacity: None }],
        trucks:  Vec::new(),
        orders:  vec![OrderRecord { order_id: "o1".into(), site_id: "s1".into(), due_time: 0.0, quantity: None }],
        tickets,
    }
}

/// Three tickets dispatched 15 apart, all discharging for `unload`.
fn spaced(unload: f64) -> InputTables {
    tables(vec![
        ticket("t1", 40.0, 0.0, unload),
        ticket("t2", 55.0, 15.0, unload),
        ticket("t3", 70.0, 30.0, unload),
    ])
}

fn controller(policy: DispatchPolicy) -> SimConfig {
    SimConfig { mode: DispatchMode::Controller(policy), ..SimConfig::default() }
}

fn run(config: SimConfig, tables: &InputTables) -> RunReport {
    SimBuilder::new(config, tables).build().unwrap().run(&mut NoopObserver).unwrap()
}

fn waits(report: &RunReport) -> Vec<f64> {
    report.tickets.iter().map(|t| t.wait().unwrap()).collect()
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = controller(DispatchPolicy::QueueGated { probe_interval: 0.0 });
        let err = SimBuilder::new(cfg, &spaced(15.0)).build().err().unwrap();
        assert!(matches!(err, SimError::Core(_)));
    }

    #[test]
    fn assignment_mode_needs_a_horizon() {
        let cfg = SimConfig { mode: DispatchMode::Assignment(AssignmentConfig::default()), ..SimConfig::default() };
        let err = SimBuilder::new(cfg, &spaced(15.0)).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn duplicate_ids_are_input_errors() {
        let mut t = spaced(15.0);
        t.tickets[1].ticket_id = "t1".into();
        let err = SimBuilder::new(SimConfig::default(), &t).build().err().unwrap();
        assert!(matches!(err, SimError::Model(hd_model::ModelError::Duplicate { .. })));
    }

    #[test]
    fn seed_override_reaches_the_report() {
        let mut sim = SimBuilder::new(SimConfig::default(), &spaced(15.0)).seed(99).build().unwrap();
        assert_eq!(sim.run(&mut NoopObserver).unwrap().seed, 99);
    }
}

// ── Delivery scenarios ────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;
    use crate::TicketStatus;
    use hd_model::Stage;

    #[test]
    fn spacing_wider_than_discharge_never_waits() {
        let report = run(controller(DispatchPolicy::Immediate), &spaced(15.0));
        assert_eq!(waits(&report), vec![0.0, 0.0, 0.0]);
        assert_eq!(report.count(TicketStatus::Done), 3);
    }

    #[test]
    fn longer_discharge_queues_cumulatively() {
        let report = run(controller(DispatchPolicy::Immediate), &spaced(25.0));
        assert_eq!(waits(&report), vec![0.0, 10.0, 20.0]);
        assert_eq!(report.waits, vec![0.0, 10.0, 20.0]);
        assert_eq!(report.discharges, vec![25.0, 25.0, 25.0]);

        let s = report.wait_summary().unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, 10.0);
        assert!((s.std_dev - (200.0f64 / 3.0).sqrt()).abs() < 1e-12);

        assert_eq!(report.total_theoretical(), 270.0);
        assert!((report.waiting_share() - 30.0 / 270.0).abs() < 1e-12);
    }

    #[test]
    fn estimated_policy_delays_the_fast_ticket() {
        let mut slow = ticket("slow", 60.0, 0.0, 40.0);
        let mut fast = ticket("fast", 95.0, 35.0, 10.0);
        for t in [&mut slow, &mut fast] {
            t.depot_prep = 30.0;
            t.site_prep = 10.0;
        }
        let tbl = tables(vec![slow, fast]);

        let est = run(controller(DispatchPolicy::estimated()), &tbl);
        let f = est.ticket("fast").unwrap();
        assert!(f.launched_at.unwrap() > f.dispatch_time);
        assert_eq!(f.launched_at, Some(40.0));
        assert_eq!(f.wait(), Some(0.0));

        let imm = run(controller(DispatchPolicy::Immediate), &tbl);
        let f = imm.ticket("fast").unwrap();
        assert_eq!(f.launched_at, Some(35.0));
        assert_eq!(f.wait(), Some(5.0));
    }

    #[test]
    fn queue_gated_never_launches_into_a_line() {
        let tbl = tables(vec![
            ticket("t1", 40.0, 0.0, 25.0),
            ticket("t2", 40.0, 0.0, 25.0),
            ticket("t3", 90.0, 50.0, 25.0),
            ticket("t4", 90.0, 50.0, 25.0),
        ]);
        let report = run(controller(DispatchPolicy::queue_gated()), &tbl);
        assert_eq!(report.ticket("t4").unwrap().launched_at, Some(66.0));
        assert_eq!(report.count(TicketStatus::Done), 4);
    }

    #[test]
    fn stage_map_is_contiguous_around_the_bay_wait() {
        let report = run(controller(DispatchPolicy::Immediate), &spaced(25.0));
        for t in &report.tickets {
            assert_eq!(t.stages.len(), Stage::ALL.len());
            for pair in t.stages.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            let site_prep = t.stage(Stage::SitePrep).unwrap();
            let discharge = t.stage(Stage::Discharging).unwrap();
            assert_eq!(discharge.start - site_prep.end, t.wait().unwrap());
        }
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::{run_replications, TicketStatus};

    fn stochastic(seed: u64) -> SimConfig {
        SimConfig {
            seed,
            discharge: DischargeConfig::Triangular { offset_factor: 1.2, spread_factor: 0.5 },
            ..controller(DispatchPolicy::estimated())
        }
    }

    fn busy_day() -> InputTables {
        let tickets = (0..12)
            .map(|i| {
                let d = 8.0 * i as f64;
                ticket(&format!("t{i}"), d + 40.0, d, 20.0)
            })
            .collect();
        tables(tickets)
    }

    #[test]
    fn same_seed_same_report() {
        let tbl = busy_day();
        assert_eq!(run(stochastic(5), &tbl), run(stochastic(5), &tbl));
    }

    #[test]
    fn different_seed_different_discharges() {
        let tbl = busy_day();
        assert_ne!(run(stochastic(5), &tbl).discharges, run(stochastic(6), &tbl).discharges);
    }

    #[test]
    fn holders_never_exceed_capacity() {
        let mut tbl = tables((0..6).map(|i| ticket(&format!("t{i}"), 40.0, 0.0, 30.0)).collect());
        tbl.sites[0].bay_capacity = Some(2);
        let cfg = SimConfig { use_loading_bays: true, ..SimConfig::default() };
        let report = run(cfg, &tbl);
        for r in &report.resources {
            assert!(r.peak_users <= r.capacity, "{} peaked at {}", r.name, r.peak_users);
        }
        let bay = report.resources.iter().find(|r| r.name == "site:s1:bay").unwrap();
        assert_eq!(bay.peak_users, 2);
        assert_eq!(bay.total_grants, 6);
        assert_eq!(report.loading_waits.len(), 6);
    }

    #[test]
    fn every_ticket_is_done_or_unassigned_after_drain() {
        let mut tbl = busy_day();
        tbl.tickets[3].dispatch_depot = "plant_x".into();
        let report = run(stochastic(1), &tbl);
        assert_eq!(report.count(TicketStatus::InProgress), 0);
        let unassigned: Vec<_> = report.unassigned().map(|t| t.name.as_str()).collect();
        assert_eq!(unassigned, vec!["t3"]);
        assert_eq!(report.aborted.len(), 1);
        assert!(report.aborted[0].reason.contains("plant_x"));
    }

    #[test]
    fn fixed_horizon_finishes_launched_tickets() {
        // All three are launched by 50; the last one is back at 110.
        let cfg = SimConfig { horizon: Horizon::Fixed { until: 50.0 }, ..SimConfig::default() };
        let report = run(cfg, &spaced(15.0));
        assert_eq!(report.count(TicketStatus::InProgress), 0);
        assert_eq!(report.count(TicketStatus::Done), 3);
        assert_eq!(report.end_time, 110.0);
    }

    #[test]
    fn fixed_horizon_launches_nothing_after_until() {
        // t3 is due for dispatch at 30, after the horizon.
        let cfg = SimConfig { horizon: Horizon::Fixed { until: 20.0 }, ..SimConfig::default() };
        let report = run(cfg, &spaced(15.0));
        assert_eq!(report.count(TicketStatus::InProgress), 0);
        let unassigned: Vec<_> = report.unassigned().map(|t| t.name.as_str()).collect();
        assert_eq!(unassigned, vec!["t3"]);
        assert_eq!(report.ticket("t2").unwrap().status, TicketStatus::Done);
        assert_eq!(report.end_time, 95.0);
        assert!(report.aborted.is_empty());
    }

    #[test]
    fn mid_run_snapshot_shows_tickets_in_progress() {
        let mut sim = SimBuilder::new(SimConfig::default(), &spaced(15.0)).build().unwrap();
        sim.run_until(50.0, &mut NoopObserver);
        assert_eq!(sim.report().count(TicketStatus::InProgress), 3);
    }

    #[test]
    fn replications_come_back_in_seed_order() {
        let tbl = busy_day();
        let reports = run_replications(&stochastic(0), &tbl, &[3, 1, 2]).unwrap();
        let seeds: Vec<u64> = reports.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![3, 1, 2]);
        assert_eq!(reports[1], run(stochastic(1), &tbl));
    }
}

// ── Assignment mode ───────────────────────────────────────────────────────────

#[cfg(test)]
mod assignment_tests {
    use super::*;
    use crate::TicketStatus;

    fn fleet() -> InputTables {
        let mut tbl = spaced(15.0);
        tbl.trucks = vec![
            TruckRecord { truck_id: "a".into(), home_depot: "d1".into(), clock_in: 0.0, clock_out: 600.0 },
            TruckRecord { truck_id: "b".into(), home_depot: "d1".into(), clock_in: 0.0, clock_out: 600.0 },
        ];
        tbl.tickets[0].plan_truck = Some("b".into());
        tbl.tickets[1].plan_truck = Some("a".into());
        tbl
    }

    fn assignment(horizon: Horizon) -> SimConfig {
        SimConfig {
            mode: DispatchMode::Assignment(AssignmentConfig::default()),
            horizon,
            ..SimConfig::default()
        }
    }

    #[test]
    fn until_all_assigned_finishes_every_ticket() {
        let cfg = assignment(Horizon::UntilAllAssigned { check_interval: 10.0, limit: 1_000.0 });
        let report = run(cfg, &fleet());
        assert_eq!(report.count(TicketStatus::Done), 3);
        assert!(report.end_time < 1_000.0);

        // Every ticket appears in exactly one planned list.
        let mut planned: Vec<&str> = report.trucks.iter().flat_map(|t| t.planned.iter().map(String::as_str)).collect();
        planned.sort_unstable();
        assert_eq!(planned, vec!["t1", "t2"]);
    }

    #[test]
    fn fixed_horizon_reports_truck_locations() {
        let report = run(assignment(Horizon::Fixed { until: 300.0 }), &fleet());
        assert_eq!(report.end_time, 300.0);
        for t in &report.trucks {
            assert_eq!(t.location, "d1");
            assert!(t.on_duty);
        }
        assert!(report.tickets.iter().all(|t| t.actual_truck.is_some()));
    }

    #[test]
    fn limit_finishes_assigned_tickets_and_stops_matching() {
        // t1 is matched at 30 and t2 at 45; t3 would only be matched at 60.
        let cfg = assignment(Horizon::UntilAllAssigned { check_interval: 25.0, limit: 50.0 });
        let report = run(cfg, &fleet());
        assert_eq!(report.count(TicketStatus::InProgress), 0);
        assert_eq!(report.count(TicketStatus::Done), 2);
        let unassigned: Vec<_> = report.unassigned().map(|t| t.name.as_str()).collect();
        assert_eq!(unassigned, vec!["t3"]);
        // t2 is held until due at 55 and is back at 135.
        assert_eq!(report.end_time, 135.0);
    }

    #[test]
    fn limit_stops_a_run_that_cannot_settle() {
        let mut tbl = fleet();
        tbl.trucks.clear();
        let cfg = assignment(Horizon::UntilAllAssigned { check_interval: 25.0, limit: 100.0 });
        let report = run(cfg, &tbl);
        assert_eq!(report.end_time, 100.0);
        assert_eq!(report.unassigned().count(), 3);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;
    use crate::SimObserver;
    use hd_dispatch::Plant;

    #[derive(Default)]
    struct Counter {
        starts:      usize,
        intervals:   Vec<f64>,
        ends:        usize,
        done_at_end: usize,
    }

    impl SimObserver for Counter {
        fn on_run_start(&mut self, _config: &SimConfig) {
            self.starts += 1;
        }

        fn on_interval(&mut self, now: SimTime, _plant: &Plant) {
            self.intervals.push(now.as_f64());
        }

        fn on_run_end(&mut self, report: &RunReport) {
            self.ends += 1;
            self.done_at_end = report.count(crate::TicketStatus::Done);
        }
    }

    #[test]
    fn interval_callbacks_cover_the_run() {
        let cfg = SimConfig { report_interval: 10.0, ..SimConfig::default() };
        let tbl = tables(vec![ticket("t1", 40.0, 0.0, 15.0)]);
        let mut obs = Counter::default();
        let mut sim = SimBuilder::new(cfg, &tbl).build().unwrap();
        sim.run(&mut obs).unwrap();

        assert_eq!(obs.starts, 1);
        assert_eq!(obs.ends, 1);
        assert_eq!(obs.done_at_end, 1);
        assert_eq!(obs.intervals, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]);
    }

    #[test]
    fn reporting_does_not_change_results() {
        let tbl = spaced(25.0);
        let quiet = run(SimConfig::default(), &tbl);
        let loud = run(SimConfig { report_interval: 7.0, ..SimConfig::default() }, &tbl);
        assert_eq!(quiet.tickets, loud.tickets);
        assert_eq!(quiet.waits, loud.waits);
    }
}
