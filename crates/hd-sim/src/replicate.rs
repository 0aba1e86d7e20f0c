//! Independent replications of one configuration over several seeds.
//!
//! Each replication builds its own yard, kernel, and statistics, so runs
//! never share state.  With the `parallel` feature they run on Rayon's
//! thread pool; results come back in seed order either way.

use hd_core::SimConfig;
use hd_model::InputTables;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{NoopObserver, RunReport, SimBuilder, SimResult};

/// Run `config` once per seed and collect the reports.
pub fn run_replications(config: &SimConfig, tables: &InputTables, seeds: &[u64]) -> SimResult<Vec<RunReport>> {
    let one = |&seed: &u64| -> SimResult<RunReport> {
        let mut sim = SimBuilder::new(config.clone(), tables).seed(seed).build()?;
        sim.run(&mut NoopObserver)
    };

    #[cfg(feature = "parallel")]
    let reports = seeds.par_iter().map(one).collect();
    #[cfg(not(feature = "parallel"))]
    let reports = seeds.iter().map(one).collect();

    reports
}
