// src/simulation/stats.rs

use serde::Serialize;

use crate::error::{ConfigError, SimResult};
use crate::lead_time::LeadTimeModel;
use crate::model::Retailer;
use crate::simulation::Simulator;
use crate::Period;

/// Outcome of one retailer over the measured periods `[0, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerStats {
    pub retailer: usize,
    pub demand_total: u64,
    pub demand_unmet: u64,
    pub service_level: f64,
    /// Sum of ending inventory over the measured periods.
    pub inventory_total: u64,
    pub max_inventory_in_demand_per_period: f64,
    /// Mean realized warehouse to retailer lead time, over shipment periods
    /// whose shipment arrives inside the window.
    pub mean_lead_time: Option<f64>,
}

impl RetailerStats {
    pub fn compute(
        retailer: &Retailer,
        lead_time: &dyn LeadTimeModel,
        end: Period,
    ) -> SimResult<Self> {
        let r = retailer.index();
        let mut demand_total = 0;
        let mut demand_unmet = 0;
        let mut inventory_total = 0;
        let mut max_inventory = 0;
        let mut lead_times = Vec::new();
        for t in 0..end {
            demand_total += retailer.demand(t, 1)?[0];
            demand_unmet += retailer.unmet_demand(t)?;
            let ending = retailer.facility().ending_inventory(t)?;
            inventory_total += ending;
            max_inventory = max_inventory.max(ending);
            if let Some(l) = lead_time.total_lead_time(r, t)? {
                lead_times.push(l as f64);
            }
        }

        let demand_per_period = per_period(demand_total, end);
        Ok(Self {
            retailer: r,
            demand_total,
            demand_unmet,
            service_level: service_level(demand_total, demand_unmet),
            inventory_total,
            max_inventory_in_demand_per_period: ratio(max_inventory as f64, demand_per_period),
            mean_lead_time: mean(&lead_times),
        })
    }
}

/// Network-wide outcome of one finished replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub service_level: f64,
    pub demand_per_period: f64,
    pub inventory_per_period: f64,
    /// Mean retailer inventory in units of mean per-period demand.
    pub inventory_in_demand_per_period: f64,
    pub max_inventory_in_demand_per_period: f64,
    pub demand_total: u64,
    pub demand_unmet: u64,
    pub inventory_total: u64,
    pub service_level_std_dev: f64,
    #[serde(skip)]
    pub retailers: Vec<RetailerStats>,
}

impl SimulationStats {
    /// Aggregate over `[0, end)` of the simulator's latest run.
    pub fn from_simulator(simulator: &Simulator) -> SimResult<Self> {
        let end = simulator.end();
        let retailers = simulator
            .retailers()
            .iter()
            .map(|r| RetailerStats::compute(r, simulator.lead_time(), end))
            .collect::<SimResult<Vec<_>>>()?;

        let demand_total = retailers.iter().map(|s| s.demand_total).sum();
        let demand_unmet = retailers.iter().map(|s| s.demand_unmet).sum();
        let inventory_total = retailers.iter().map(|s| s.inventory_total).sum();
        let max_inventory_in_demand_per_period = retailers
            .iter()
            .map(|s| s.max_inventory_in_demand_per_period)
            .fold(0.0, f64::max);
        let levels: Vec<f64> = retailers.iter().map(|s| s.service_level).collect();

        let demand_per_period = per_period(demand_total, end);
        let inventory_per_period = per_period(inventory_total, end);
        Ok(Self {
            service_level: service_level(demand_total, demand_unmet),
            demand_per_period,
            inventory_per_period,
            inventory_in_demand_per_period: ratio(inventory_per_period, demand_per_period),
            max_inventory_in_demand_per_period,
            demand_total,
            demand_unmet,
            inventory_total,
            service_level_std_dev: std_dev(&levels),
            retailers,
        })
    }
}

/// Mean fraction of demand unmet, per period of the year, for one retailer.
pub fn stockout_probabilities(simulator: &Simulator, retailer: usize) -> SimResult<Vec<f64>> {
    let year = simulator.periods_in_year();
    let retailers = simulator.retailers();
    let retailer = retailers.get(retailer).ok_or(ConfigError::UnknownIndex {
        what: "retailer",
        index: retailer,
        count: retailers.len(),
    })?;
    let mut totals = vec![0.0; year];
    let mut counts = vec![0usize; year];
    for t in 0..simulator.end() {
        let y = t.rem_euclid(year as Period) as usize;
        let demand = retailer.demand(t, 1)?[0];
        if demand > 0 {
            totals[y] += retailer.unmet_demand(t)? as f64 / demand as f64;
        }
        counts[y] += 1;
    }
    Ok(totals
        .iter()
        .zip(&counts)
        .map(|(&total, &count)| ratio(total, count as f64))
        .collect())
}

fn service_level(demand: u64, unmet: u64) -> f64 {
    if demand == 0 {
        1.0
    } else {
        1.0 - unmet as f64 / demand as f64
    }
}

fn per_period(total: u64, periods: Period) -> f64 {
    ratio(total as f64, periods as f64)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; zero for fewer than two values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_level_of_no_demand_is_full() {
        assert_eq!(service_level(0, 0), 1.0);
        assert_eq!(service_level(10, 2), 0.8);
    }

    #[test]
    fn sample_std_dev() {
        assert_eq!(std_dev(&[0.5]), 0.0);
        assert!((std_dev(&[1.0, 2.0, 3.0, 4.0]) - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn stockout_profile_of_missing_retailer_is_an_error() {
        use crate::demand::ConstantDemand;
        use crate::error::SimError;
        use crate::lead_time::{ConstantLeadTime, ShipmentCycle};
        use crate::model::Warehouse;

        let cycle = ShipmentCycle::new(1, vec![0], vec![0], 0, vec![0]).unwrap();
        let lead_time = ConstantLeadTime::new(cycle, 1, 1, 3).unwrap();
        let retailer = Retailer::new(0, Box::new(ConstantDemand::new(2, 3).unwrap()));
        let warehouse = Warehouse::new(vec![5; 3]).unwrap();
        let sim = Simulator::new(warehouse, vec![retailer], Box::new(lead_time)).unwrap();

        assert!(matches!(
            stockout_probabilities(&sim, 1),
            Err(SimError::Config(ConfigError::UnknownIndex {
                what: "retailer",
                index: 1,
                count: 1,
            }))
        ));
    }
}
