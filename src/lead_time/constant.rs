// src/lead_time/constant.rs

use crate::error::{ConfigError, SimError, SimResult};
use crate::lead_time::{LeadTimeModel, LeadTimePmf, Link, ShipmentCycle};
use crate::Period;

/// Deterministic lead times: `delay + primary` to a district,
/// `delay + secondary` from a district and `2 * delay + primary + secondary`
/// straight from the warehouse.
#[derive(Debug, Clone)]
pub struct ConstantLeadTime {
    cycle: ShipmentCycle,
    primary: u32,
    secondary: u32,
    periods_in_year: usize,
}

impl ConstantLeadTime {
    /// Both hops must take at least one period; a shipment due in the
    /// period it leaves would miss that period's receipts.
    pub fn new(
        cycle: ShipmentCycle,
        primary: u32,
        secondary: u32,
        periods_in_year: usize,
    ) -> SimResult<Self> {
        if periods_in_year == 0 {
            return Err(SimError::invalid("a year needs at least one period"));
        }
        let delay = cycle.delay();
        // every link shares the same hop lengths, so report the first one
        if delay + primary == 0 && cycle.num_districts() > 0 {
            return Err(ConfigError::ZeroLeadTime {
                link: Link::WarehouseToDistrict(0),
            }
            .into());
        }
        if delay + secondary == 0 && cycle.num_retailers() > 0 {
            return Err(ConfigError::ZeroLeadTime {
                link: Link::DistrictToRetailer(0),
            }
            .into());
        }
        Ok(Self {
            cycle,
            primary,
            secondary,
            periods_in_year,
        })
    }

    fn total(&self) -> u32 {
        2 * self.cycle.delay() + self.primary + self.secondary
    }
}

impl LeadTimeModel for ConstantLeadTime {
    fn cycle(&self) -> &ShipmentCycle {
        &self.cycle
    }

    fn periods_in_year(&self) -> usize {
        self.periods_in_year
    }

    fn generate(&mut self, _start: Period, _end: Period, _seed: u64) -> SimResult<()> {
        Ok(())
    }

    fn primary_lead_time(&self, district: usize, t: Period) -> SimResult<Option<u32>> {
        Ok(self
            .cycle
            .is_primary_shipment_period(district, t)
            .then(|| self.cycle.delay() + self.primary))
    }

    fn secondary_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        Ok(self
            .cycle
            .is_secondary_shipment_period(retailer, t)
            .then(|| self.cycle.delay() + self.secondary))
    }

    fn total_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        Ok(self
            .cycle
            .is_total_shipment_period(retailer, t)
            .then(|| self.total()))
    }

    fn total_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf> {
        Ok(self
            .total_lead_time(retailer, t)?
            .map(LeadTimePmf::point_mass)
            .unwrap_or_default())
    }

    fn secondary_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf> {
        Ok(self
            .secondary_lead_time(retailer, t)?
            .map(LeadTimePmf::point_mass)
            .unwrap_or_default())
    }

    fn accessibility(&self, _retailer: usize, _t: Period) -> f64 {
        1.0
    }

    fn mean_accessibility(&self, _retailer: usize) -> f64 {
        1.0
    }
}
