//! Virtual time.
//!
//! # Design
//!
//! The clock is a continuous `f64` instant measured in model minutes from the
//! start of the run.  Stage durations are sampled from continuous
//! distributions, so an integer tick would force rounding into every stage
//! boundary.
//!
//! `f64` is not `Ord`, and the event queue needs a total order to break ties
//! deterministically.  `SimTime` implements `Ord` via [`f64::total_cmp`];
//! constructing a NaN instant is a programming error and panics.  The field
//! is private so every instant passes through [`SimTime::new`]; deserialising
//! goes through [`TryFrom<f64>`] and rejects NaN with an error instead.

use std::cmp::Ordering;
use std::fmt;

/// An absolute instant on the virtual clock.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Build an instant, rejecting NaN.
    ///
    /// # Panics
    /// Panics if `t` is NaN.
    #[inline]
    pub fn new(t: f64) -> SimTime {
        assert!(!t.is_nan(), "virtual time cannot be NaN");
        // `-0.0 + 0.0 == +0.0`, so both zeros order identically under total_cmp.
        SimTime(t + 0.0)
    }

    /// Return the instant `d` time units after `self`.
    #[inline]
    pub fn after(self, d: f64) -> SimTime {
        SimTime::new(self.0 + d)
    }

    /// Time elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn max(self, other: SimTime) -> SimTime {
        if other > self { other } else { self }
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        self.after(rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.since(rhs)
    }
}

impl TryFrom<f64> for SimTime {
    type Error = crate::CoreError;

    fn try_from(t: f64) -> Result<SimTime, Self::Error> {
        if t.is_nan() {
            return Err(crate::CoreError::Parse("virtual time cannot be NaN".into()));
        }
        Ok(SimTime::new(t))
    }
}

impl From<SimTime> for f64 {
    fn from(t: SimTime) -> f64 {
        t.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.2}", self.0)
    }
}
