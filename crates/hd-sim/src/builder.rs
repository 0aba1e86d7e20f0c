//! Fluent builder for constructing a [`Sim`].

use hd_core::{DispatchMode, Horizon, SimConfig, TicketId, TruckId};
use hd_dispatch::{AssignmentLoop, DischargeSampler, DispatchController, Plant, TruckShift};
use hd_kernel::{Kernel, ResourcePool};
use hd_model::{InputTables, YardBuilder};
use tracing::{info, warn};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Example
///
/// ```rust,ignore
/// let tables = InputTables::load_dir(Path::new("data"))?;
/// let mut sim = SimBuilder::new(config, &tables).build()?;
/// let report = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<'a> {
    config: SimConfig,
    tables: &'a InputTables,
}

impl<'a> SimBuilder<'a> {
    pub fn new(config: SimConfig, tables: &'a InputTables) -> Self {
        Self { config, tables }
    }

    /// Override the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validate the configuration, build the yard, and spawn the launch
    /// processes for the configured mode.
    pub fn build(self) -> SimResult<Sim> {
        let config = self.config;
        config.validate()?;
        if matches!(config.mode, DispatchMode::Assignment(_)) && config.horizon == Horizon::Drain {
            return Err(SimError::Config(
                "the assignment loop never drains; use a fixed or until-all-assigned horizon".into(),
            ));
        }

        let mut pool = ResourcePool::new();
        let yard = YardBuilder::new(self.tables)
            .minutes_per_mile(config.minutes_per_mile)
            .build(&mut pool)?;

        let sampler = DischargeSampler::new(config.discharge.clone(), config.seed);
        let plant = Plant::new(yard, sampler).with_loading_bays(config.use_loading_bays);
        let mut kernel = Kernel::new(plant, pool);

        let tickets: Vec<TicketId> = kernel.world().yard.tickets.iter().map(|t| t.id).collect();
        let trucks: Vec<TruckId> = kernel.world().yard.trucks.iter().map(|t| t.id).collect();

        match &config.mode {
            DispatchMode::Controller(policy) => {
                if !trucks.is_empty() {
                    warn!(trucks = trucks.len(), "controller mode ignores the truck table");
                }
                kernel.spawn(DispatchController::new(policy.clone(), tickets.clone()));
            }
            DispatchMode::Assignment(a) => {
                if trucks.is_empty() {
                    warn!("assignment mode with no trucks; no ticket will be launched");
                }
                for &t in &trucks {
                    kernel.spawn(TruckShift::new(t, a.shift_poll));
                }
                kernel.spawn(AssignmentLoop::new(a.clone()));
            }
        }

        info!(
            seed = config.seed,
            mode = %mode_name(&config.mode),
            tickets = tickets.len(),
            trucks = trucks.len(),
            "simulation built"
        );
        Ok(Sim::new(config, kernel))
    }
}

pub(crate) fn mode_name(mode: &DispatchMode) -> &'static str {
    match mode {
        DispatchMode::Controller(policy) => policy.as_str(),
        DispatchMode::Assignment(_) => "assignment",
    }
}
