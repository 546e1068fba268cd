// src/simulation/engine.rs

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ConfigError, ConsistencyError, SimError, SimResult};
use crate::lead_time::{LeadTimeModel, Link};
use crate::model::{Facility, FacilityKind, Retailer, Shipment, Warehouse};
use crate::simulation::config::{SimulationConfig, SimulationParameters};
use crate::strategy::{Policy, ShipmentPlan};
use crate::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    NotStarted,
    Running,
    Finished,
    Aborted,
}

/// One facility's ledger for one period, written out as a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub period: Period,
    pub facility: String,
    pub starting_inventory: u64,
    pub received: u64,
    pub issued: u64,
    pub ending_inventory: u64,
    pub orders: u64,
    pub pipeline: u64,
    pub demand: Option<u64>,
    pub unmet_demand: Option<u64>,
}

/// Steps a warehouse, its districts and retailers through time.
///
/// The network is fixed at construction. Each call to
/// [`simulate`](Simulator::simulate) regenerates all randomness from the
/// parameters' seed and replays the period loop from scratch.
#[derive(Debug)]
pub struct Simulator {
    warehouse: Warehouse,
    districts: Vec<Facility>,
    retailers: Vec<Retailer>,
    lead_time: Box<dyn LeadTimeModel>,

    period: Period,
    start: Period,
    end: Period,
    status: Status,
    policy_name: String,
    history: Vec<HistoryRecord>,
}

impl Simulator {
    pub fn new(
        warehouse: Warehouse,
        retailers: Vec<Retailer>,
        lead_time: Box<dyn LeadTimeModel>,
    ) -> SimResult<Self> {
        if retailers.len() != lead_time.num_retailers() {
            return Err(ConfigError::LengthMismatch {
                what: "retailers",
                expected: lead_time.num_retailers(),
                got: retailers.len(),
            }
            .into());
        }
        let year = lead_time.periods_in_year();
        if warehouse.periods_in_year() != year {
            return Err(ConfigError::LengthMismatch {
                what: "warehouse supply schedule",
                expected: year,
                got: warehouse.periods_in_year(),
            }
            .into());
        }
        if let Some(r) = retailers.iter().find(|r| r.periods_in_year() != year) {
            return Err(ConfigError::LengthMismatch {
                what: "retailer demand year",
                expected: year,
                got: r.periods_in_year(),
            }
            .into());
        }

        let districts = (0..lead_time.num_districts())
            .map(|d| Facility::new(FacilityKind::District(d), 0, 0, 0, false))
            .collect();

        Ok(Self {
            warehouse,
            districts,
            retailers,
            lead_time,
            period: 0,
            start: 0,
            end: 0,
            status: Status::NotStarted,
            policy_name: String::new(),
            history: Vec::new(),
        })
    }

    /// Run one replication. Any error aborts the run and is returned with
    /// the period in which it happened.
    pub fn simulate(&mut self, parameters: SimulationParameters) -> SimResult<()> {
        let SimulationParameters { config, mut policy } = parameters;
        let year = self.periods_in_year();
        let (start, end) = config.horizon(year);

        self.status = Status::Running;
        self.start = start;
        self.end = end;
        self.period = start;
        self.policy_name = policy.to_string();
        self.history.clear();

        info!(
            start,
            end,
            seed = config.random_seed,
            retailers = self.retailers.len(),
            districts = self.districts.len(),
            "simulation started"
        );

        let result = self.setup(&config).and_then(|_| {
            for t in start..end {
                self.period = t;
                self.step(&mut policy)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                self.status = Status::Finished;
                info!(end, "simulation finished");
                Ok(())
            }
            Err(e) => {
                self.status = Status::Aborted;
                error!(period = self.period, error = %e, "simulation aborted");
                Err(e)
            }
        }
    }

    fn setup(&mut self, config: &SimulationConfig) -> SimResult<()> {
        let (start, end) = (self.start, self.end);
        let year = self.periods_in_year();
        let expiry = config.expiry_enabled;

        self.warehouse.reset(start, end, expiry);
        self.districts = (0..self.lead_time.num_districts())
            .map(|d| Facility::new(FacilityKind::District(d), start, end, year, expiry))
            .collect();
        for retailer in &mut self.retailers {
            let seed = config.retailer_seed(retailer.index());
            retailer.generate(start, end, seed, expiry)?;
        }
        self.lead_time.generate(
            start - year as Period,
            end + year as Period,
            config.lead_time_seed(),
        )?;
        Ok(())
    }

    fn step(&mut self, policy: &mut Policy) -> SimResult<()> {
        let t = self.period;

        self.warehouse.receive_shipments()?;
        for district in &mut self.districts {
            district.receive_shipments()?;
        }
        for retailer in &mut self.retailers {
            retailer.facility_mut().receive_shipments()?;
        }

        match policy {
            Policy::CrossDock(policy) => {
                let plan = policy.compute_shipments(self)?;
                self.dispatch_cross_dock(&plan)?;
            }
            Policy::District(policy) => {
                let plan = policy.compute_retailer_shipments(self)?;
                self.dispatch_district_to_retailers(&plan)?;
                let plan = policy.compute_district_shipments(self)?;
                self.dispatch_warehouse_to_districts(&plan)?;
            }
        }

        for retailer in &mut self.retailers {
            retailer.demand_appears()?;
        }

        self.warehouse.facility_mut().advance_to_next_period()?;
        for district in &mut self.districts {
            district.advance_to_next_period()?;
        }
        for retailer in &mut self.retailers {
            retailer.facility_mut().advance_to_next_period()?;
        }

        self.record_history(t)
    }

    fn check_plan(&self, plan: &ShipmentPlan, what: &'static str, expected: usize) -> SimResult<()> {
        for got in [plan.quantities.len(), plan.orders.len()] {
            if got != expected {
                return Err(SimError::consistency(
                    self.period,
                    ConsistencyError::DecisionLength {
                        what,
                        expected,
                        got,
                    },
                ));
            }
        }
        Ok(())
    }

    fn ineligible(&self, link: Link) -> SimError {
        SimError::consistency(self.period, ConsistencyError::IneligibleShipment { link })
    }

    fn dispatch_cross_dock(&mut self, plan: &ShipmentPlan) -> SimResult<()> {
        let t = self.period;
        self.check_plan(plan, "retailer", self.retailers.len())?;

        for (r, (&quantity, &order)) in plan.quantities.iter().zip(&plan.orders).enumerate() {
            self.warehouse.facility_mut().add_order(order)?;
            if quantity == 0 {
                continue;
            }
            if !self.lead_time.is_total_shipment_period(r, t) {
                return Err(self.ineligible(Link::WarehouseToRetailer(r)));
            }
            let lead_time = self.lead_time.total_lead_time(r, t)?;
            let pmf = self.lead_time.total_lead_time_pmf(r, t)?;
            let contents = self.warehouse.facility_mut().withdraw(quantity)?;
            let destination = FacilityKind::Retailer(r);
            if lead_time.is_none() {
                warn!(period = t, %destination, quantity, "shipment will not arrive within the horizon");
            }
            debug!(period = t, %destination, quantity, ?lead_time, "shipment dispatched");
            self.retailers[r]
                .facility_mut()
                .add_shipment(Shipment::new(destination, t, lead_time, contents, pmf))?;
        }
        Ok(())
    }

    fn dispatch_district_to_retailers(&mut self, plan: &ShipmentPlan) -> SimResult<()> {
        let t = self.period;
        self.check_plan(plan, "retailer", self.retailers.len())?;

        for (r, (&quantity, &order)) in plan.quantities.iter().zip(&plan.orders).enumerate() {
            let d = self.lead_time.district_of(r);
            self.districts[d].add_order(order)?;
            if quantity == 0 {
                continue;
            }
            if !self.lead_time.is_secondary_shipment_period(r, t) {
                return Err(self.ineligible(Link::DistrictToRetailer(r)));
            }
            let lead_time = self.lead_time.secondary_lead_time(r, t)?;
            let pmf = self.lead_time.secondary_lead_time_pmf(r, t)?;
            let contents = self.districts[d].withdraw(quantity)?;
            let destination = FacilityKind::Retailer(r);
            if lead_time.is_none() {
                warn!(period = t, %destination, quantity, "shipment will not arrive within the horizon");
            }
            debug!(period = t, district = d, %destination, quantity, ?lead_time, "shipment dispatched");
            self.retailers[r]
                .facility_mut()
                .add_shipment(Shipment::new(destination, t, lead_time, contents, pmf))?;
        }
        Ok(())
    }

    fn dispatch_warehouse_to_districts(&mut self, plan: &ShipmentPlan) -> SimResult<()> {
        let t = self.period;
        self.check_plan(plan, "district", self.districts.len())?;

        for (d, (&quantity, &order)) in plan.quantities.iter().zip(&plan.orders).enumerate() {
            self.warehouse.facility_mut().add_order(order)?;
            if quantity == 0 {
                continue;
            }
            if !self.lead_time.is_primary_shipment_period(d, t) {
                return Err(self.ineligible(Link::WarehouseToDistrict(d)));
            }
            let lead_time = self.lead_time.primary_lead_time(d, t)?;
            let pmf = self.lead_time.primary_lead_time_pmf(d, t)?;
            let contents = self.warehouse.facility_mut().withdraw(quantity)?;
            let destination = FacilityKind::District(d);
            debug!(period = t, %destination, quantity, ?lead_time, "shipment dispatched");
            self.districts[d].add_shipment(Shipment::new(destination, t, lead_time, contents, pmf))?;
        }
        Ok(())
    }

    fn record_history(&mut self, t: Period) -> SimResult<()> {
        let mut records = Vec::with_capacity(1 + self.districts.len() + self.retailers.len());
        records.push(facility_record(self.warehouse.facility(), t, None)?);
        for district in &self.districts {
            records.push(facility_record(district, t, None)?);
        }
        for retailer in &self.retailers {
            let demand = (retailer.demand(t, 1)?[0], retailer.unmet_demand(t)?);
            records.push(facility_record(retailer.facility(), t, Some(demand))?);
        }
        self.history.extend(records);
        Ok(())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Period currently being simulated.
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn start(&self) -> Period {
        self.start
    }

    pub fn end(&self) -> Period {
        self.end
    }

    pub fn periods_in_year(&self) -> usize {
        self.lead_time.periods_in_year()
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn districts(&self) -> &[Facility] {
        &self.districts
    }

    pub fn retailers(&self) -> &[Retailer] {
        &self.retailers
    }

    pub fn num_retailers(&self) -> usize {
        self.retailers.len()
    }

    pub fn num_districts(&self) -> usize {
        self.districts.len()
    }

    pub fn lead_time(&self) -> &dyn LeadTimeModel {
        self.lead_time.as_ref()
    }

    /// Display text of the policy used by the latest run.
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }
}

fn facility_record(
    facility: &Facility,
    t: Period,
    demand: Option<(u64, u64)>,
) -> SimResult<HistoryRecord> {
    Ok(HistoryRecord {
        period: t,
        facility: facility.kind().to_string(),
        starting_inventory: facility.starting_inventory(t)?,
        received: facility.received(t)?,
        issued: facility.issues(t)?,
        ending_inventory: facility.ending_inventory(t)?,
        orders: facility.orders(t)?,
        pipeline: facility.pipeline_quantity(),
        demand: demand.map(|(d, _)| d),
        unmet_demand: demand.map(|(_, u)| u),
    })
}
