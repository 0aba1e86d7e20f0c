//! Discharge-duration sampling.
//!
//! Every ticket draws from its own RNG stream (`SimRng::for_stream(seed,
//! ticket)`), so a ticket's duration does not depend on which other tickets
//! happened to unload first.

use hd_core::{DischargeConfig, SimRng, TicketId};
use rand_distr::{Distribution, Normal, Triangular};

/// Rejection attempts before a truncated Gaussian falls back to zero.
const MAX_REDRAWS: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct DischargeSampler {
    config: DischargeConfig,
    seed:   u64,
}

impl DischargeSampler {
    pub fn new(config: DischargeConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn config(&self) -> &DischargeConfig {
        &self.config
    }

    /// Discharge duration for `ticket` with nominal unload time `nominal`.
    pub fn sample(&self, ticket: TicketId, nominal: f64) -> f64 {
        match self.config {
            DischargeConfig::Deterministic => nominal,

            DischargeConfig::Triangular { offset_factor, spread_factor } => {
                let mode = nominal * offset_factor;
                let half = mode * spread_factor;
                let low = (mode - half).max(0.0);
                let high = mode + half;
                if high <= low {
                    return mode;
                }
                match Triangular::new(low, high, mode) {
                    Ok(dist) => dist.sample(self.rng(ticket).inner()),
                    Err(_) => mode,
                }
            }

            DischargeConfig::TruncatedGaussian { offset_factor, spread_factor } => {
                let mu = nominal * offset_factor;
                let sd = mu * spread_factor;
                if sd <= 0.0 {
                    return mu.max(0.0);
                }
                let Ok(dist) = Normal::new(mu, sd) else {
                    return mu.max(0.0);
                };
                let mut rng = self.rng(ticket);
                (0..MAX_REDRAWS)
                    .map(|_| dist.sample(rng.inner()))
                    .find(|x| *x >= 0.0)
                    .unwrap_or(0.0)
            }
        }
    }

    fn rng(&self, ticket: TicketId) -> SimRng {
        SimRng::for_stream(self.seed, u64::from(ticket.0))
    }
}
