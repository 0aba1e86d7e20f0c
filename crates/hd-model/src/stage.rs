//! Ticket stages and the per-ticket stage log.
//!
//! A ticket moves through a fixed sequence of stages:
//!
//! ```text
//! DepotPrep → TravelTo → SitePrep → WaitingForBay → Discharging → Cleaning → TravelBack → Done
//! ```
//!
//! Each completed stage is recorded once as a [`Span`].  Spans are appended in
//! stage order with non-decreasing instants and are never overwritten; once
//! the ticket is sealed (`Done`) the log is frozen.  Breaking any of these is
//! a programming error and panics.

use std::collections::BTreeMap;
use std::fmt;

use hd_core::SimTime;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    DepotPrep,
    TravelTo,
    SitePrep,
    WaitingForBay,
    Discharging,
    Cleaning,
    TravelBack,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::DepotPrep,
        Stage::TravelTo,
        Stage::SitePrep,
        Stage::WaitingForBay,
        Stage::Discharging,
        Stage::Cleaning,
        Stage::TravelBack,
    ];

    /// Stable report key, prefixed with the stage ordinal so keys sort in
    /// lifecycle order.
    pub fn key(self) -> &'static str {
        match self {
            Stage::DepotPrep     => "1_depot_prep",
            Stage::TravelTo      => "2_travel_to",
            Stage::SitePrep      => "3_site_prep",
            Stage::WaitingForBay => "4_waiting",
            Stage::Discharging   => "5_discharging",
            Stage::Cleaning      => "6_cleaning",
            Stage::TravelBack    => "7_travel_back",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a ticket is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TicketState {
    /// Not yet launched (or held before depot prep).
    #[default]
    Pending,
    Active(Stage),
    /// Absorbing.
    Done,
}

/// A recorded `[start, end]` interval.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: SimTime,
    pub end:   SimTime,
}

impl Span {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Append-only stage → span map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageLog {
    spans:  BTreeMap<Stage, Span>,
    sealed: bool,
}

impl StageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `stage` as `[start, end]`.
    ///
    /// # Panics
    /// Panics if the log is sealed, the stage is already recorded, the span
    /// runs backwards, or it starts before the latest recorded stage ended.
    pub fn record(&mut self, stage: Stage, start: SimTime, end: SimTime) {
        assert!(!self.sealed, "stage {stage} recorded after ticket is done");
        assert!(!self.spans.contains_key(&stage), "stage {stage} recorded twice");
        assert!(end >= start, "stage {stage} ends ({end}) before it starts ({start})");
        if let Some((last, span)) = self.spans.iter().next_back() {
            assert!(*last < stage, "stage {stage} recorded out of order after {last}");
            assert!(
                start >= span.end,
                "stage {stage} starts at {start} before {last} ended at {}",
                span.end
            );
        }
        self.spans.insert(stage, Span { start, end });
    }

    /// Freeze the log.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn get(&self, stage: Stage) -> Option<Span> {
        self.spans.get(&stage).copied()
    }

    /// Spans in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, Span)> + '_ {
        self.spans.iter().map(|(s, span)| (*s, *span))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
