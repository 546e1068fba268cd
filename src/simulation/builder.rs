// src/simulation/builder.rs

use serde::{Deserialize, Serialize};

use crate::demand::{scale_seasonality, MultMmfeDemand};
use crate::error::{ConfigError, SimError, SimResult};
use crate::lead_time::GeometricLeadTimeBuilder;
use crate::model::{Retailer, Warehouse};
use crate::simulation::Simulator;

/// Scenario tables and knobs from which a [`Simulator`] is assembled:
/// one MMFE demand model per retailer, a warehouse supplied on a fixed
/// yearly schedule and a geometric lead-time model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioBuilder {
    /// Seasonal mean demand, one row per retailer, one column per period.
    demand_mean: Vec<Vec<f64>>,
    forecast_variance: Vec<f64>,
    forecast_accuracy: Vec<f64>,
    forecast_level: usize,
    scale_demand_mean: f64,
    scale_pre_simulation_demand: f64,
    demand_seasonality: Option<f64>,
    warehouse_shipments_per_year: usize,
    supply_demand_ratio: f64,
    shelf_life: Option<u32>,
    lead_time: GeometricLeadTimeBuilder,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self {
            demand_mean: Vec::new(),
            forecast_variance: Vec::new(),
            forecast_accuracy: vec![0.0, 0.5, 1.0],
            forecast_level: 0,
            scale_demand_mean: 1.0,
            scale_pre_simulation_demand: 1.0,
            demand_seasonality: None,
            warehouse_shipments_per_year: 1,
            supply_demand_ratio: 1.0,
            shelf_life: None,
            lead_time: GeometricLeadTimeBuilder::default(),
        }
    }
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demand_mean(mut self, demand_mean: Vec<Vec<f64>>) -> Self {
        self.demand_mean = demand_mean;
        self
    }

    pub fn forecast_variance(mut self, variance: Vec<f64>) -> Self {
        self.forecast_variance = variance;
        self
    }

    pub fn forecast_accuracy(mut self, accuracy: Vec<f64>) -> Self {
        self.forecast_accuracy = accuracy;
        self
    }

    pub fn forecast_level(mut self, level: usize) -> Self {
        self.forecast_level = level;
        self
    }

    pub fn scale_demand_mean(mut self, scale: f64) -> Self {
        self.scale_demand_mean = scale;
        self
    }

    pub fn scale_pre_simulation_demand(mut self, scale: f64) -> Self {
        self.scale_pre_simulation_demand = scale;
        self
    }

    /// Rescale every demand curve so its peak is `factor` times its trough.
    pub fn demand_seasonality(mut self, factor: f64) -> Self {
        self.demand_seasonality = Some(factor);
        self
    }

    pub fn warehouse_shipments_per_year(mut self, shipments: usize) -> Self {
        self.warehouse_shipments_per_year = shipments;
        self
    }

    /// Yearly warehouse supply as a multiple of yearly mean demand.
    pub fn supply_demand_ratio(mut self, ratio: f64) -> Self {
        self.supply_demand_ratio = ratio;
        self
    }

    pub fn shelf_life(mut self, periods: u32) -> Self {
        self.shelf_life = Some(periods);
        self
    }

    pub fn lead_time(mut self, lead_time: GeometricLeadTimeBuilder) -> Self {
        self.lead_time = lead_time;
        self
    }

    pub fn get_lead_time(&self) -> &GeometricLeadTimeBuilder {
        &self.lead_time
    }

    pub fn get_demand_seasonality(&self) -> Option<f64> {
        self.demand_seasonality
    }

    pub fn num_retailers(&self) -> usize {
        self.demand_mean.len()
    }

    pub fn periods_in_year(&self) -> usize {
        self.demand_mean.first().map_or(0, Vec::len)
    }

    pub fn build(&self) -> SimResult<Simulator> {
        let retailers = self.build_retailers()?;
        let warehouse = self.build_warehouse()?;
        let lead_time = self.lead_time.build()?;
        Simulator::new(warehouse, retailers, Box::new(lead_time))
    }

    /// Mean demand curves after seasonality and scale adjustments.
    pub fn scaled_demand_mean(&self) -> SimResult<Vec<Vec<f64>>> {
        let year = self.periods_in_year();
        if year == 0 {
            return Err(SimError::invalid("demand mean table is empty"));
        }
        self.demand_mean
            .iter()
            .map(|row| {
                if row.len() != year {
                    return Err(ConfigError::LengthMismatch {
                        what: "demand mean row",
                        expected: year,
                        got: row.len(),
                    }
                    .into());
                }
                let curve = match self.demand_seasonality {
                    Some(factor) => scale_seasonality(row, factor)?,
                    None => row.clone(),
                };
                Ok(curve.iter().map(|m| m * self.scale_demand_mean).collect())
            })
            .collect()
    }

    fn build_retailers(&self) -> SimResult<Vec<Retailer>> {
        self.scaled_demand_mean()?
            .into_iter()
            .enumerate()
            .map(|(r, mean)| {
                let demand = MultMmfeDemand::new(
                    mean,
                    self.forecast_variance.clone(),
                    self.forecast_accuracy.clone(),
                    self.forecast_level,
                )?;
                Ok(Retailer::new(r, Box::new(demand))
                    .with_pre_simulation_scale(self.scale_pre_simulation_demand))
            })
            .collect()
    }

    /// `K` equal deliveries per year at periods `round(k * Y / K)`, together
    /// worth `supply_demand_ratio` times the yearly mean demand.
    pub fn supply_schedule(&self) -> SimResult<Vec<u64>> {
        let year = self.periods_in_year();
        let shipments = self.warehouse_shipments_per_year;
        if shipments == 0 || shipments > year {
            return Err(SimError::invalid(format!(
                "{shipments} warehouse shipments cannot fit a year of {year} periods"
            )));
        }
        if self.supply_demand_ratio < 0.0 {
            return Err(SimError::invalid("supply/demand ratio must be non-negative"));
        }

        let yearly: f64 = self.scaled_demand_mean()?.iter().flatten().sum();
        let delivery = (self.supply_demand_ratio * yearly / shipments as f64).round() as u64;
        let mut schedule = vec![0; year];
        for k in 0..shipments {
            let t = (k as f64 * year as f64 / shipments as f64).round() as usize;
            schedule[t.min(year - 1)] = delivery;
        }
        Ok(schedule)
    }

    fn build_warehouse(&self) -> SimResult<Warehouse> {
        let warehouse = Warehouse::new(self.supply_schedule()?)?;
        Ok(match self.shelf_life {
            Some(life) => warehouse.with_shelf_life(life),
            None => warehouse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioBuilder {
        ScenarioBuilder::new()
            .demand_mean(vec![vec![10.0; 12], vec![5.0; 12]])
            .forecast_variance(vec![0.01, 0.01])
            .forecast_accuracy(vec![0.0, 0.5, 1.0])
            .forecast_level(1)
            .warehouse_shipments_per_year(4)
            .supply_demand_ratio(1.5)
            .lead_time(
                GeometricLeadTimeBuilder::new()
                    .cycle_length(2)
                    .primary_offsets(vec![0])
                    .secondary_offsets(vec![0, 1])
                    .delay(1)
                    .retailer_to_district(vec![0, 0])
                    .primary_lead_times(vec![1])
                    .mean_secondary_lead_times(vec![2.0, 3.0])
                    .accessibility(vec![vec![1.0; 12], vec![0.5; 12]]),
            )
    }

    #[test]
    fn supply_is_spread_evenly_over_the_year() {
        let schedule = scenario().supply_schedule().unwrap();
        // 1.5 * 180 / 4
        assert_eq!(schedule, vec![68, 0, 0, 68, 0, 0, 68, 0, 0, 68, 0, 0]);
    }

    #[test]
    fn builds_a_network() {
        let sim = scenario().scale_demand_mean(0.5).build().unwrap();
        assert_eq!(sim.num_retailers(), 2);
        assert_eq!(sim.num_districts(), 1);
        assert_eq!(sim.periods_in_year(), 12);
        assert_eq!(sim.retailers()[1].baseline_mean(3), 2.5);
    }

    #[test]
    fn ragged_tables_are_rejected() {
        let err = scenario()
            .demand_mean(vec![vec![1.0; 12], vec![1.0; 11]])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::LengthMismatch { expected: 12, got: 11, .. })
        ));
    }
}
