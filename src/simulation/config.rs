// src/simulation/config.rs

use serde::{Deserialize, Serialize};

use crate::strategy::Policy;
use crate::Period;

/// Golden-ratio constant used to spread derived seeds across the seed space.
const SEED_MIXING: u64 = 0x9e37_79b9_7f4a_7c15;

/// Length of the warmup before period 0, in whole years or raw periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warmup {
    Years(u32),
    Periods(u32),
}

impl Warmup {
    pub fn periods(&self, periods_in_year: usize) -> u32 {
        match *self {
            Warmup::Years(years) => years * periods_in_year as u32,
            Warmup::Periods(periods) => periods,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub warmup: Warmup,
    pub simulation_years: u32,
    pub random_seed: u64,
    /// Write off lots past their expiry period. Off unless a scenario asks.
    pub expiry_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            warmup: Warmup::Years(1),
            simulation_years: 2,
            random_seed: 0,
            expiry_enabled: false,
        }
    }
}

impl SimulationConfig {
    /// Simulated range `[start, end)`; `start` is minus the warmup.
    pub fn horizon(&self, periods_in_year: usize) -> (Period, Period) {
        let start = -(self.warmup.periods(periods_in_year) as Period);
        let end = (self.simulation_years as usize * periods_in_year) as Period;
        (start, end)
    }

    /// Demand seed for retailer `r`.
    pub fn retailer_seed(&self, retailer: usize) -> u64 {
        self.random_seed.wrapping_add(retailer as u64)
    }

    /// Lead-time seed, kept off the retailer sequence.
    pub fn lead_time_seed(&self) -> u64 {
        self.random_seed ^ SEED_MIXING
    }

    /// Copy of this config for replication `i` of a batch.
    pub fn for_replication(&self, i: usize) -> Self {
        Self {
            random_seed: self
                .random_seed
                .wrapping_add((i as u64).wrapping_mul(SEED_MIXING)),
            ..self.clone()
        }
    }
}

/// Everything one call to [`Simulator::simulate`](crate::simulation::Simulator::simulate)
/// consumes. Built fresh per run.
#[derive(Debug)]
pub struct SimulationParameters {
    pub config: SimulationConfig,
    pub policy: Policy,
}

impl SimulationParameters {
    pub fn new(policy: Policy) -> Self {
        Self {
            config: SimulationConfig::default(),
            policy,
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_warmup(mut self, warmup: Warmup) -> Self {
        self.config.warmup = warmup;
        self
    }

    pub fn with_simulation_years(mut self, years: u32) -> Self {
        self.config.simulation_years = years;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    pub fn with_expiry(mut self, enabled: bool) -> Self {
        self.config.expiry_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_starts_before_zero() {
        let mut config = SimulationConfig::default();
        assert_eq!(config.horizon(5), (-5, 10));
        config.warmup = Warmup::Periods(3);
        config.simulation_years = 1;
        assert_eq!(config.horizon(5), (-3, 5));
    }

    #[test]
    fn derived_seeds_differ() {
        let config = SimulationConfig {
            random_seed: 42,
            ..SimulationConfig::default()
        };
        assert_eq!(config.retailer_seed(3), 45);
        assert_ne!(config.lead_time_seed(), config.retailer_seed(0));
        assert_ne!(
            config.for_replication(1).random_seed,
            config.for_replication(2).random_seed
        );
        assert_eq!(config.for_replication(0).random_seed, 42);
    }
}
