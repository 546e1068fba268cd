// src/strategy/implementations.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::model::Facility;
use crate::simulation::Simulator;
use crate::strategy::allocation::{priority, round_to_boxes, Allocation, BOX_SIZE};
use crate::strategy::estimation::DemandEstimation;
use crate::strategy::optimization::{critical_ratio, order_up_to_level};
use crate::strategy::traits::{CrossDockPolicy, DistrictPolicy, ShipmentPlan};
use crate::Period;

// =========================================================================
// 1. Constant Policies
// =========================================================================

/// Ships a fixed quantity to every retailer on each of its shipment
/// periods, as long as the warehouse has stock.
#[derive(Debug, Clone)]
pub struct ConstantCrossDock {
    quantity: u64,
}

impl ConstantCrossDock {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl CrossDockPolicy for ConstantCrossDock {
    fn compute_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();
        let orders: Vec<u64> = (0..simulator.num_retailers())
            .map(|r| {
                if lead_time.is_total_shipment_period(r, t) {
                    self.quantity
                } else {
                    0
                }
            })
            .collect();
        let stock = simulator.warehouse().facility().inventory_level();
        Ok(ShipmentPlan::with_orders(priority(stock, &orders), orders))
    }
}

impl fmt::Display for ConstantCrossDock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constant cross-dock policy ({} per shipment)", self.quantity)
    }
}

/// Fixed quantities on every primary and secondary shipment period.
#[derive(Debug, Clone)]
pub struct ConstantDistrict {
    district_quantity: u64,
    retailer_quantity: u64,
}

impl ConstantDistrict {
    pub fn new(district_quantity: u64, retailer_quantity: u64) -> Self {
        Self {
            district_quantity,
            retailer_quantity,
        }
    }
}

impl DistrictPolicy for ConstantDistrict {
    fn compute_retailer_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();
        let mut stock = district_stock(simulator);

        let mut quantities = vec![0; simulator.num_retailers()];
        for (r, q) in quantities.iter_mut().enumerate() {
            if lead_time.is_secondary_shipment_period(r, t) {
                let d = lead_time.district_of(r);
                *q = self.retailer_quantity.min(stock[d]);
                stock[d] -= *q;
            }
        }
        Ok(ShipmentPlan::new(quantities))
    }

    fn compute_district_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();
        let orders: Vec<u64> = (0..simulator.num_districts())
            .map(|d| {
                if lead_time.is_primary_shipment_period(d, t) {
                    self.district_quantity
                } else {
                    0
                }
            })
            .collect();
        let stock = simulator.warehouse().facility().inventory_level();
        Ok(ShipmentPlan::with_orders(priority(stock, &orders), orders))
    }
}

impl fmt::Display for ConstantDistrict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constant district policy ({} per district, {} per retailer)",
            self.district_quantity, self.retailer_quantity
        )
    }
}

fn district_stock(simulator: &Simulator) -> Vec<u64> {
    simulator
        .districts()
        .iter()
        .map(Facility::inventory_level)
        .collect()
}

// =========================================================================
// 2. Order-Up-To Policies
// =========================================================================

/// Orders up to `periods` periods of estimated demand on each shipment
/// period, rationing warehouse stock when it is short.
#[derive(Debug, Clone)]
pub struct OrderUpToCrossDock {
    estimation: DemandEstimation,
    periods: f64,
    allocation: Allocation,
    box_size: Option<u64>,
}

impl OrderUpToCrossDock {
    pub fn new(estimation: DemandEstimation, periods: f64, allocation: Allocation) -> Self {
        Self {
            estimation,
            periods,
            allocation,
            box_size: Some(BOX_SIZE),
        }
    }

    /// Ship exact quantities instead of whole boxes.
    pub fn without_boxes(mut self) -> Self {
        self.box_size = None;
        self
    }
}

impl CrossDockPolicy for OrderUpToCrossDock {
    fn compute_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();

        let mut orders = vec![0; simulator.num_retailers()];
        for (r, retailer) in simulator.retailers().iter().enumerate() {
            if !lead_time.is_total_shipment_period(r, t) {
                continue;
            }
            let position = retailer.facility().inventory_position() as f64;
            let target = self.periods * self.estimation.per_period_demand(retailer, t)?;
            orders[r] = (target - position).max(0.0) as u64;
        }

        let stock = simulator.warehouse().facility().inventory_level();
        let mut quantities = self.allocation.allocate(stock, &orders);
        if let Some(box_size) = self.box_size {
            quantities = round_to_boxes(stock, &quantities, box_size);
        }
        Ok(ShipmentPlan::with_orders(quantities, orders))
    }
}

impl fmt::Display for OrderUpToCrossDock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order-up-to cross-dock policy ({:.1} periods of {}, {:?} allocation)",
            self.periods, self.estimation, self.allocation
        )
    }
}

/// Two-echelon order-up-to: retailers order up to `retailer_periods`
/// periods of recent demand from their district, districts order up to
/// `district_periods` periods of recent retailer orders from the warehouse.
#[derive(Debug, Clone)]
pub struct OrderUpToDistrict {
    history: usize,
    district_periods: f64,
    retailer_periods: f64,
}

impl OrderUpToDistrict {
    pub fn new(history: usize, district_periods: f64, retailer_periods: f64) -> Self {
        Self {
            history: history.max(1),
            district_periods,
            retailer_periods,
        }
    }

    fn target(&self, recent: u64, periods: f64) -> u64 {
        (recent as f64 * periods / self.history as f64).ceil() as u64
    }
}

impl DistrictPolicy for OrderUpToDistrict {
    fn compute_retailer_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();
        let mut stock = district_stock(simulator);

        let retailers = simulator.num_retailers();
        let mut quantities = vec![0; retailers];
        let mut orders = vec![0; retailers];
        for (r, retailer) in simulator.retailers().iter().enumerate() {
            if !lead_time.is_secondary_shipment_period(r, t) {
                continue;
            }
            let recent: u64 = retailer
                .demand(t - self.history as Period, self.history)?
                .iter()
                .sum();
            let target = self.target(recent, self.retailer_periods);
            let d = lead_time.district_of(r);
            orders[r] = target.saturating_sub(retailer.facility().inventory_position());
            quantities[r] = orders[r].min(stock[d]);
            stock[d] -= quantities[r];
        }
        Ok(ShipmentPlan::with_orders(quantities, orders))
    }

    fn compute_district_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let lead_time = simulator.lead_time();

        let districts = simulator.num_districts();
        let mut orders = vec![0; districts];
        for (d, district) in simulator.districts().iter().enumerate() {
            if !lead_time.is_primary_shipment_period(d, t) {
                continue;
            }
            let recent = (t - self.history as Period..t)
                .map(|u| district.orders(u))
                .sum::<SimResult<u64>>()?;
            let target = self.target(recent, self.district_periods);
            orders[d] = target.saturating_sub(district.inventory_position());
        }
        let stock = simulator.warehouse().facility().inventory_level();
        Ok(ShipmentPlan::with_orders(priority(stock, &orders), orders))
    }
}

impl fmt::Display for OrderUpToDistrict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order-up-to district policy (history {}, district {:.1}, retailer {:.1})",
            self.history, self.district_periods, self.retailer_periods
        )
    }
}

// =========================================================================
// 3. Forecast-Driven Policy
// =========================================================================

/// How the forecast policy turns a lead-time distribution into the single
/// lead time it plans with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LeadTimePlanning {
    /// Clairvoyant: the lead time that will actually be realized.
    Actual,
    /// Mean of the lead-time pmf, truncated.
    Mean,
    /// The `percentile` quantile of the pmf. A retailer's first shipment,
    /// which fills an empty pipeline, plans with the `1 - percentile`
    /// quantile instead.
    Conservative { percentile: f64 },
}

/// Orders up to the forecast demand over the planned lead time plus one
/// shipment cycle, with normal safety stock for a target service level.
///
/// In-transit stock only counts towards the position with the probability
/// that it arrives inside that horizon.
#[derive(Debug, Clone)]
pub struct ForecastCrossDock {
    planning: LeadTimePlanning,
    service_level: f64,
    allocation: Allocation,
    first_shipment_sent: Vec<bool>,
}

impl ForecastCrossDock {
    pub fn new(planning: LeadTimePlanning, service_level: f64, allocation: Allocation) -> Self {
        Self {
            planning,
            service_level,
            allocation,
            first_shipment_sent: Vec::new(),
        }
    }

    /// Service level set by the newsvendor critical ratio of a lost sale
    /// against holding one unit.
    pub fn from_costs(
        planning: LeadTimePlanning,
        unmet_penalty: f64,
        holding_cost: f64,
        allocation: Allocation,
    ) -> Self {
        Self::new(planning, critical_ratio(unmet_penalty, holding_cost), allocation)
    }

    pub fn service_level(&self) -> f64 {
        self.service_level
    }

    fn planned_lead_time(&self, simulator: &Simulator, r: usize, t: Period) -> SimResult<u32> {
        let lead_time = simulator.lead_time();
        let pmf = lead_time.total_lead_time_pmf(r, t)?;
        let fallback = pmf.len() as u32;
        Ok(match self.planning {
            LeadTimePlanning::Actual => lead_time.total_lead_time(r, t)?.unwrap_or(fallback),
            LeadTimePlanning::Mean => pmf.mean() as u32,
            LeadTimePlanning::Conservative { percentile } => {
                let p = if self.first_shipment_sent[r] {
                    percentile
                } else {
                    1.0 - percentile
                };
                pmf.quantile(p).unwrap_or(fallback)
            }
        })
    }
}

/// Expected part of `facility`'s pipeline delivered before `horizon_end`.
fn expected_arrivals(facility: &Facility, t: Period, horizon_end: Period) -> f64 {
    facility
        .pipeline()
        .iter()
        .map(|s| {
            // still in transit, so it was not delivered by period t
            let not_before = (t - s.period_sent() + 1).max(0) as u32;
            let within = (horizon_end - s.period_sent()).max(0) as usize;
            let probability = s.pmf().conditional(not_before).map_or(1.0, |pmf| {
                pmf.probabilities().iter().take(within).sum::<f64>()
            });
            s.quantity() as f64 * probability
        })
        .sum()
}

impl CrossDockPolicy for ForecastCrossDock {
    fn compute_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan> {
        let t = simulator.period();
        let retailers = simulator.num_retailers();
        if self.first_shipment_sent.len() != retailers {
            self.first_shipment_sent = vec![false; retailers];
        }
        let lead_time = simulator.lead_time();
        let review = lead_time.cycle().cycle_length();
        // demand is generated one year past the end
        let forecast_end = simulator.end() + simulator.periods_in_year() as Period;

        let mut orders = vec![0; retailers];
        for (r, retailer) in simulator.retailers().iter().enumerate() {
            if !lead_time.is_total_shipment_period(r, t) {
                continue;
            }
            let planned = self.planned_lead_time(simulator, r, t)?;
            let horizon = ((planned + review) as Period).min(forecast_end - t).max(0);
            let forecast = retailer.forecast(t, horizon as usize)?;
            let level = order_up_to_level(
                forecast.total_mean(),
                forecast.total_variance(),
                self.service_level,
            );
            let facility = retailer.facility();
            let position = facility.inventory_level() as f64
                + expected_arrivals(facility, t, t + horizon);
            orders[r] = (level as f64 - position).max(0.0).round() as u64;
        }

        let stock = simulator.warehouse().facility().inventory_level();
        let quantities = self.allocation.allocate(stock, &orders);
        for (sent, &q) in self.first_shipment_sent.iter_mut().zip(&quantities) {
            *sent |= q > 0;
        }
        Ok(ShipmentPlan::with_orders(quantities, orders))
    }
}

impl fmt::Display for ForecastCrossDock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Forecast cross-dock policy ({:?} lead time, service level {:.3}, {:?} allocation)",
            self.planning, self.service_level, self.allocation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_ratio_sets_service_level() {
        let policy = ForecastCrossDock::from_costs(
            LeadTimePlanning::Mean,
            19.0,
            1.0,
            Allocation::Priority,
        );
        assert!((policy.service_level() - 0.95).abs() < 1e-12);
    }

    #[test]
    fn order_up_to_district_target_rounds_up() {
        let policy = OrderUpToDistrict::new(4, 3.0, 2.0);
        // 10 units over 4 periods, 3 periods of cover
        assert_eq!(policy.target(10, 3.0), 8);
        assert_eq!(OrderUpToDistrict::new(0, 1.0, 1.0).history, 1);
    }
}
