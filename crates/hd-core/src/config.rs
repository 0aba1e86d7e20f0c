//! Run configuration.
//!
//! Typically loaded from a JSON file by the application crate (enable the
//! `serde` feature) and passed to `hd_sim::SimBuilder`.  Every field has a
//! default so a partial file is enough.

/// How tickets are launched into their lifecycle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DispatchMode {
    /// No fleet: a dispatch controller launches every ticket itself, gated by
    /// the given policy.
    Controller(DispatchPolicy),
    /// Truck fleet: the assignment loop matches idle trucks to due tickets.
    Assignment(AssignmentConfig),
}

impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Controller(DispatchPolicy::default())
    }
}

/// Admission policy of the dispatch controller.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DispatchPolicy {
    /// Launch each ticket exactly at its dispatch time.
    #[default]
    Immediate,
    /// Hold while the destination bay has a waiting line, re-polling every
    /// `probe_interval`.
    QueueGated { probe_interval: f64 },
    /// Hold until the destination bay is forecast to be free on arrival,
    /// re-checking every `recheck_interval`.
    Estimated { recheck_interval: f64 },
}

impl DispatchPolicy {
    pub fn queue_gated() -> Self {
        DispatchPolicy::QueueGated { probe_interval: 2.0 }
    }

    pub fn estimated() -> Self {
        DispatchPolicy::Estimated { recheck_interval: 5.0 }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPolicy::Immediate          => "immediate",
            DispatchPolicy::QueueGated { .. }  => "queue_gated",
            DispatchPolicy::Estimated { .. }   => "estimated",
        }
    }
}

/// Truck assignment loop settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AssignmentConfig {
    /// Interval between scans of the depot rosters.
    pub tick: f64,
    /// A ticket becomes eligible once `due_time - now <= due_threshold`.
    pub due_threshold: f64,
    /// Hold a matched ticket until its due time before depot prep starts.
    pub hold_until_due: bool,
    /// Poll interval of a truck waiting to clock out mid-ticket.
    pub shift_poll: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            tick:           1.0,
            due_threshold:  10.0,
            hold_until_due: true,
            shift_poll:     1.0,
        }
    }
}

/// Discharge-duration sampling mode.
///
/// For the stochastic modes the mode (peak) of the distribution is
/// `nominal * offset_factor` and its half-range is `mode * spread_factor`;
/// the lower bound is clamped at zero.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DischargeConfig {
    #[default]
    Deterministic,
    Triangular { offset_factor: f64, spread_factor: f64 },
    TruncatedGaussian { offset_factor: f64, spread_factor: f64 },
}

/// When a run stops.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Horizon {
    /// Run until no events remain.  Never returns with the assignment loop
    /// active; use one of the other variants there.
    #[default]
    Drain,
    /// Stop at a fixed virtual instant.
    Fixed { until: f64 },
    /// Advance in `check_interval` slices until every ticket is assigned (or
    /// `limit` is reached).
    UntilAllAssigned { check_interval: f64, limit: f64 },
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    pub mode: DispatchMode,

    pub discharge: DischargeConfig,

    pub horizon: Horizon,

    /// Hold the dispatch depot's loading bay during depot prep.
    pub use_loading_bays: bool,

    /// Pace used to derive missing travel durations from coordinates.
    pub minutes_per_mile: f64,

    /// Observer interval in virtual time units.  `0` disables interval
    /// callbacks.
    pub report_interval: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:             42,
            mode:             DispatchMode::default(),
            discharge:        DischargeConfig::default(),
            horizon:          Horizon::default(),
            use_loading_bays: false,
            minutes_per_mile: 1.5,
            report_interval:  0.0,
        }
    }
}

impl SimConfig {
    /// Reject settings that would stall the event loop (zero or negative
    /// polling intervals) or sample nonsense durations.
    pub fn validate(&self) -> crate::CoreResult<()> {
        fn positive(what: &str, v: f64) -> crate::CoreResult<()> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(crate::CoreError::Config(format!("{what} must be positive, got {v}")))
            }
        }

        match &self.mode {
            DispatchMode::Controller(DispatchPolicy::Immediate) => {}
            DispatchMode::Controller(DispatchPolicy::QueueGated { probe_interval }) => {
                positive("probe_interval", *probe_interval)?;
            }
            DispatchMode::Controller(DispatchPolicy::Estimated { recheck_interval }) => {
                positive("recheck_interval", *recheck_interval)?;
            }
            DispatchMode::Assignment(a) => {
                positive("assignment tick", a.tick)?;
                positive("shift_poll", a.shift_poll)?;
            }
        }

        match &self.discharge {
            DischargeConfig::Deterministic => {}
            DischargeConfig::Triangular { offset_factor, spread_factor }
            | DischargeConfig::TruncatedGaussian { offset_factor, spread_factor } => {
                positive("offset_factor", *offset_factor)?;
                if spread_factor.is_nan() || *spread_factor < 0.0 {
                    return Err(crate::CoreError::Config(format!(
                        "spread_factor must be non-negative, got {spread_factor}"
                    )));
                }
            }
        }

        match &self.horizon {
            Horizon::Drain => {}
            Horizon::Fixed { until } => positive("horizon", *until)?,
            Horizon::UntilAllAssigned { check_interval, limit } => {
                positive("check_interval", *check_interval)?;
                positive("limit", *limit)?;
            }
        }

        if self.report_interval < 0.0 {
            return Err(crate::CoreError::Config("report_interval must not be negative".into()));
        }
        Ok(())
    }
}
