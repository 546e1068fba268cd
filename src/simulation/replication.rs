// src/simulation/replication.rs

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::simulation::stats::{mean, std_dev};
use crate::simulation::{SimulationConfig, SimulationParameters, SimulationStats, Simulator};
use crate::strategy::Policy;

/// Statistics of one finished replication.
#[derive(Debug, Clone)]
pub struct ReplicationOutcome {
    pub replication: usize,
    pub seed: u64,
    pub stats: SimulationStats,
}

#[derive(Debug, Default)]
pub struct ReplicationReport {
    pub outcomes: Vec<ReplicationOutcome>,
    /// Replications that aborted, with the error that stopped them.
    pub failures: Vec<(usize, SimError)>,
}

/// Mean and spread of the headline metrics across replications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub failed: usize,
    pub service_level_mean: f64,
    pub service_level_std_dev: f64,
    pub inventory_mean: f64,
    pub inventory_std_dev: f64,
    pub max_inventory_mean: f64,
}

/// Run `replications` independent simulations in parallel.
///
/// `build` creates a fresh network and policy for each replication; nothing
/// is shared between replications except the read-only base config.
pub fn run_replications<F>(replications: usize, config: &SimulationConfig, build: F) -> ReplicationReport
where
    F: Fn() -> SimResult<(Simulator, Policy)> + Sync,
{
    info!(replications, seed = config.random_seed, "running replications");

    let results: Vec<(usize, SimResult<ReplicationOutcome>)> = (0..replications)
        .into_par_iter()
        .map(|i| {
            let config = config.for_replication(i);
            let seed = config.random_seed;
            let result = build().and_then(|(mut simulator, policy)| {
                simulator.simulate(SimulationParameters::new(policy).with_config(config))?;
                let stats = SimulationStats::from_simulator(&simulator)?;
                Ok(ReplicationOutcome {
                    replication: i,
                    seed,
                    stats,
                })
            });
            (i, result)
        })
        .collect();

    let mut report = ReplicationReport::default();
    for (i, result) in results {
        match result {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(e) => {
                warn!(replication = i, error = %e, "replication failed");
                report.failures.push((i, e));
            }
        }
    }
    report
}

impl ReplicationReport {
    pub fn summarize(&self) -> ReplicationSummary {
        let service: Vec<f64> = self.outcomes.iter().map(|o| o.stats.service_level).collect();
        let inventory: Vec<f64> = self
            .outcomes
            .iter()
            .map(|o| o.stats.inventory_in_demand_per_period)
            .collect();
        let max_inventory: Vec<f64> = self
            .outcomes
            .iter()
            .map(|o| o.stats.max_inventory_in_demand_per_period)
            .collect();

        ReplicationSummary {
            replications: self.outcomes.len(),
            failed: self.failures.len(),
            service_level_mean: mean(&service).unwrap_or(f64::NAN),
            service_level_std_dev: std_dev(&service),
            inventory_mean: mean(&inventory).unwrap_or(f64::NAN),
            inventory_std_dev: std_dev(&inventory),
            max_inventory_mean: mean(&max_inventory).unwrap_or(f64::NAN),
        }
    }
}
