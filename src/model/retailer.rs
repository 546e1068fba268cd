// src/model/retailer.rs

use tracing::debug;

use crate::demand::{DemandModel, Forecast};
use crate::error::SimResult;
use crate::model::{Facility, FacilityKind, PeriodArray};
use crate::Period;

/// A retailer facility together with the demand it faces.
#[derive(Debug)]
pub struct Retailer {
    index: usize,
    facility: Facility,
    demand: Box<dyn DemandModel>,
    /// Multiplier applied to realized demand when back-filling the year of
    /// issues before the simulation starts.
    pre_simulation_scale: f64,
    unmet: PeriodArray<u64>,
}

impl Retailer {
    pub fn new(index: usize, demand: Box<dyn DemandModel>) -> Self {
        Self {
            index,
            facility: Facility::new(FacilityKind::Retailer(index), 0, 0, 0, false),
            demand,
            pre_simulation_scale: 1.0,
            unmet: PeriodArray::new(0, 0, 0),
        }
    }

    pub fn with_pre_simulation_scale(mut self, scale: f64) -> Self {
        self.pre_simulation_scale = scale;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn periods_in_year(&self) -> usize {
        self.demand.periods_in_year()
    }

    /// Draw this replication's demand for a year either side of
    /// `[start, end)` and reset the facility ledger.
    pub fn generate(
        &mut self,
        start: Period,
        end: Period,
        seed: u64,
        expiry_enabled: bool,
    ) -> SimResult<()> {
        let year = self.periods_in_year() as Period;
        self.demand.generate(seed, start - year, end + year)?;
        self.facility = Facility::new(
            FacilityKind::Retailer(self.index),
            start,
            end,
            year as usize,
            expiry_enabled,
        );
        self.unmet = PeriodArray::new(start, end, 0);

        for t in (start - year)..start {
            let demand = self.demand.demand(t, 1)?[0];
            let issued = (self.pre_simulation_scale * demand as f64).ceil() as u64;
            self.facility.set_issues(t, issued)?;
        }
        debug!(retailer = self.index, seed, "retailer demand generated");
        Ok(())
    }

    /// Serve this period's demand from stock; the shortfall is lost.
    pub fn demand_appears(&mut self) -> SimResult<u64> {
        let t = self.facility.period();
        let demand = self.demand.demand(t, 1)?[0];
        let served = demand.min(self.facility.inventory_level());
        self.facility.withdraw(served)?;
        self.unmet.set(t, demand - served)?;
        Ok(served)
    }

    pub fn demand(&self, t: Period, n: usize) -> SimResult<Vec<u64>> {
        self.demand.demand(t, n)
    }

    pub fn forecast(&self, as_of: Period, n: usize) -> SimResult<Forecast> {
        self.demand.forecast(as_of, n)
    }

    pub fn baseline_mean(&self, t: Period) -> f64 {
        self.demand.baseline_mean(t)
    }

    pub fn unmet_demand(&self, t: Period) -> SimResult<u64> {
        self.unmet.value(t)
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn facility_mut(&mut self) -> &mut Facility {
        &mut self.facility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::ConstantDemand;
    use crate::model::Inventory;

    #[test]
    fn unmet_demand_is_lost() {
        let demand = ConstantDemand::new(4, 5).unwrap();
        let mut r = Retailer::new(0, Box::new(demand)).with_pre_simulation_scale(1.3);
        r.generate(0, 5, 1, false).unwrap();
        // ceil(1.3 * 4)
        assert_eq!(r.facility().issues(-5).unwrap(), 6);

        r.facility_mut().receive_shipments().unwrap();
        r.facility_mut()
            .receive_external(Inventory::with_lot(3, None))
            .unwrap();
        assert_eq!(r.demand_appears().unwrap(), 3);
        assert_eq!(r.unmet_demand(0).unwrap(), 1);
        assert_eq!(r.facility().inventory_level(), 0);
    }
}
