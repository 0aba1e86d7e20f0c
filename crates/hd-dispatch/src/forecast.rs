//! Projected unloading-bay release times.
//!
//! After each of its first three stages a ticket records when it expects to
//! leave the unloading bay:
//!
//! ```text
//! after DepotPrep: now + travel_to + site_prep + avg_unload + avg_wait
//! after TravelTo:  now + site_prep + avg_unload + avg_wait
//! after SitePrep:  now + avg_unload + avg_wait
//! ```
//!
//! Averages come from [`DeliveryStats`]; with no history the ticket's own
//! nominal unload and a zero wait stand in.  Entries are keyed by
//! (ticket, stage just completed) and never removed, so the controller always
//! sees the latest projection recorded by anyone.

use std::collections::BTreeMap;

use hd_core::{SimTime, TicketId};
use hd_model::{Stage, StageDurations};

use crate::DeliveryStats;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReleaseForecast {
    entries: BTreeMap<(TicketId, Stage), f64>,
}

impl ReleaseForecast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the projection of `ticket` after completing `done` at `now`.
    /// Returns the projected instant, or `None` for stages past site prep.
    pub fn update(
        &mut self,
        ticket:    TicketId,
        done:      Stage,
        now:       SimTime,
        durations: &StageDurations,
        stats:     &DeliveryStats,
    ) -> Option<f64> {
        let ahead = match done {
            Stage::DepotPrep => durations.travel_to + durations.site_prep,
            Stage::TravelTo => durations.site_prep,
            Stage::SitePrep => 0.0,
            _ => return None,
        };
        let avg_unload = stats.mean_discharge().unwrap_or(durations.unload);
        let avg_wait = stats.mean_wait().unwrap_or(0.0);
        let at = now.as_f64() + ahead + avg_unload + avg_wait;
        self.entries.insert((ticket, done), at);
        Some(at)
    }

    /// Latest projected release across every recorded entry, `0` if none.
    pub fn max_release(&self) -> f64 {
        self.entries.values().copied().fold(0.0, f64::max)
    }

    pub fn get(&self, ticket: TicketId, stage: Stage) -> Option<f64> {
        self.entries.get(&(ticket, stage)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
