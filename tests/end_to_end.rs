use echelon_sim::demand::ConstantDemand;
use echelon_sim::error::{ConfigError, ConsistencyError};
use echelon_sim::lead_time::{
    ConstantLeadTime, GeometricLeadTimeBuilder, LeadTimeModel, LeadTimePmf, Link, ShipmentCycle,
};
use echelon_sim::model::{FacilityKind, Retailer, Warehouse};
use echelon_sim::Period;
use echelon_sim::simulation::{
    SimulationParameters, SimulationStats, Simulator, Status, Warmup,
};
use echelon_sim::strategy::{
    ConstantCrossDock, ConstantDistrict, CrossDockPolicy, Policy, ShipmentPlan,
};
use echelon_sim::{SimError, SimResult};

/// One retailer, demand 4 per period, lead time 2, warehouse supply 15 per
/// period, a 5-period year.
fn single_retailer(cycle_length: u32) -> Simulator {
    let cycle = ShipmentCycle::new(cycle_length, vec![0], vec![0], 0, vec![0]).unwrap();
    let lead_time = ConstantLeadTime::new(cycle, 1, 1, 5).unwrap();
    let demand = ConstantDemand::new(4, 5).unwrap();
    let retailer = Retailer::new(0, Box::new(demand));
    let warehouse = Warehouse::new(vec![15; 5]).unwrap();
    Simulator::new(warehouse, vec![retailer], Box::new(lead_time)).unwrap()
}

fn parameters(policy: Policy) -> SimulationParameters {
    SimulationParameters::new(policy)
        .with_warmup(Warmup::Periods(5))
        .with_simulation_years(2)
        .with_seed(7)
}

#[test]
fn constant_scenario_has_exact_trajectory() {
    let mut sim = single_retailer(1);
    sim.simulate(parameters(Policy::cross_dock(ConstantCrossDock::new(15))))
        .unwrap();
    assert_eq!(sim.status(), Status::Finished);
    assert_eq!((sim.start(), sim.end()), (-5, 10));

    let retailer = sim.retailers()[0].facility();
    let warehouse = sim.warehouse().facility();
    for t in -5..10 {
        let expected = if t < -3 { 0 } else { 11 * (t + 4) as u64 };
        assert_eq!(retailer.ending_inventory(t).unwrap(), expected, "period {t}");
        assert_eq!(warehouse.ending_inventory(t).unwrap(), 0, "period {t}");
    }
    for t in 0..10 {
        assert_eq!(sim.retailers()[0].unmet_demand(t).unwrap(), 0);
    }
    assert_eq!(sim.retailers()[0].unmet_demand(-5).unwrap(), 4);

    let stats = SimulationStats::from_simulator(&sim).unwrap();
    assert_eq!(stats.demand_total, 40);
    assert_eq!(stats.demand_unmet, 0);
    assert_eq!(stats.service_level, 1.0);
    assert_eq!(stats.inventory_total, 935);
    assert!((stats.max_inventory_in_demand_per_period - 35.75).abs() < 1e-12);
    assert!((stats.inventory_in_demand_per_period - 23.375).abs() < 1e-12);
    assert_eq!(stats.retailers[0].mean_lead_time, Some(2.0));
}

#[test]
fn every_ledger_is_conserved() {
    let mut sim = single_retailer(1);
    sim.simulate(parameters(Policy::cross_dock(ConstantCrossDock::new(15))))
        .unwrap();
    for record in sim.history() {
        assert_eq!(
            record.ending_inventory,
            record.starting_inventory + record.received - record.issued,
            "{record:?}"
        );
    }
    // warehouse, the idle district and the retailer each period
    assert_eq!(sim.history().len(), 45);
}

#[derive(Debug)]
struct ShipEveryPeriod;

impl std::fmt::Display for ShipEveryPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ship every period")
    }
}

impl CrossDockPolicy for ShipEveryPeriod {
    fn compute_shipments(&mut self, _simulator: &Simulator) -> SimResult<ShipmentPlan> {
        Ok(ShipmentPlan::new(vec![1]))
    }
}

#[test]
fn out_of_cycle_shipment_aborts() {
    // cycle of 2 with offset 0: period -5 is not a shipment period
    let mut sim = single_retailer(2);
    let err = sim
        .simulate(parameters(Policy::cross_dock(ShipEveryPeriod)))
        .unwrap_err();
    assert!(err.to_string().starts_with("period -5:"));
    match err {
        SimError::Consistency {
            period: -5,
            kind: ConsistencyError::IneligibleShipment {
                link: Link::WarehouseToRetailer(0),
            },
        } => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(sim.status(), Status::Aborted);
}

#[derive(Debug)]
struct WrongLength;

impl std::fmt::Display for WrongLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wrong length")
    }
}

impl CrossDockPolicy for WrongLength {
    fn compute_shipments(&mut self, _simulator: &Simulator) -> SimResult<ShipmentPlan> {
        Ok(ShipmentPlan::none(3))
    }
}

#[test]
fn wrong_length_decision_aborts() {
    let mut sim = single_retailer(1);
    let err = sim
        .simulate(parameters(Policy::cross_dock(WrongLength)))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Consistency {
            kind: ConsistencyError::DecisionLength {
                expected: 1,
                got: 3,
                ..
            },
            ..
        }
    ));
}

#[test]
fn district_system_moves_stock_through_both_legs() {
    let cycle = ShipmentCycle::new(1, vec![0], vec![0, 0], 0, vec![0, 0]).unwrap();
    let lead_time = ConstantLeadTime::new(cycle, 1, 1, 4).unwrap();
    let retailers = (0..2)
        .map(|r| Retailer::new(r, Box::new(ConstantDemand::new(3, 4).unwrap())))
        .collect();
    let warehouse = Warehouse::new(vec![20; 4]).unwrap();
    let mut sim = Simulator::new(warehouse, retailers, Box::new(lead_time)).unwrap();

    sim.simulate(
        SimulationParameters::new(Policy::district(ConstantDistrict::new(20, 8)))
            .with_warmup(Warmup::Periods(4))
            .with_simulation_years(1),
    )
    .unwrap();

    let district = &sim.districts()[0];
    for t in -3..4 {
        assert_eq!(district.ending_inventory(t).unwrap(), 4 * (t + 4) as u64, "period {t}");
        assert_eq!(district.orders(t).unwrap(), 16);
        assert_eq!(sim.warehouse().facility().orders(t).unwrap(), 20);
    }
    for r in 0..2 {
        let retailer = &sim.retailers()[r];
        for t in -2..4 {
            assert_eq!(
                retailer.facility().ending_inventory(t).unwrap(),
                5 * (t + 3) as u64
            );
        }
        for t in 0..4 {
            assert_eq!(retailer.unmet_demand(t).unwrap(), 0);
        }
    }
    // warehouse, district and two retailers each period
    assert_eq!(sim.history().len(), 32);
}

#[test]
fn simulator_rejects_mismatched_network() {
    let cycle = ShipmentCycle::new(1, vec![0], vec![0, 0], 0, vec![0, 0]).unwrap();
    let lead_time = ConstantLeadTime::new(cycle, 1, 1, 4).unwrap();
    let retailer = Retailer::new(0, Box::new(ConstantDemand::new(3, 4).unwrap()));
    let warehouse = Warehouse::new(vec![20; 4]).unwrap();
    assert!(matches!(
        Simulator::new(warehouse, vec![retailer], Box::new(lead_time)),
        Err(SimError::Config(_))
    ));
}

#[test]
fn instant_hops_are_rejected_by_both_lead_time_models() {
    let cycle = ShipmentCycle::new(1, vec![0], vec![0, 0], 0, vec![0, 0]).unwrap();
    assert!(matches!(
        ConstantLeadTime::new(cycle, 0, 1, 4),
        Err(SimError::Config(ConfigError::ZeroLeadTime {
            link: Link::WarehouseToDistrict(0)
        }))
    ));

    let geometric = GeometricLeadTimeBuilder::new()
        .cycle_length(1)
        .primary_offsets(vec![0])
        .secondary_offsets(vec![0])
        .delay(0)
        .retailer_to_district(vec![0])
        .primary_lead_times(vec![0])
        .mean_secondary_lead_times(vec![2.0])
        .accessibility(vec![vec![1.0; 4]])
        .build();
    assert!(matches!(
        geometric,
        Err(SimError::Config(ConfigError::ZeroLeadTime { .. }))
    ));
}

/// Constant lead times, except that direct shipments are due the period
/// they leave.
#[derive(Debug)]
struct SameDayDirect(ConstantLeadTime);

impl LeadTimeModel for SameDayDirect {
    fn cycle(&self) -> &ShipmentCycle {
        self.0.cycle()
    }

    fn periods_in_year(&self) -> usize {
        self.0.periods_in_year()
    }

    fn generate(&mut self, start: Period, end: Period, seed: u64) -> SimResult<()> {
        self.0.generate(start, end, seed)
    }

    fn primary_lead_time(&self, district: usize, t: Period) -> SimResult<Option<u32>> {
        self.0.primary_lead_time(district, t)
    }

    fn secondary_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        self.0.secondary_lead_time(retailer, t)
    }

    fn total_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        Ok(self.is_total_shipment_period(retailer, t).then_some(0))
    }

    fn total_lead_time_pmf(&self, _retailer: usize, _t: Period) -> SimResult<LeadTimePmf> {
        Ok(LeadTimePmf::point_mass(0))
    }

    fn secondary_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf> {
        self.0.secondary_lead_time_pmf(retailer, t)
    }

    fn accessibility(&self, retailer: usize, t: Period) -> f64 {
        self.0.accessibility(retailer, t)
    }

    fn mean_accessibility(&self, retailer: usize) -> f64 {
        self.0.mean_accessibility(retailer)
    }
}

#[test]
fn shipment_that_would_never_be_received_aborts() {
    let cycle = ShipmentCycle::new(1, vec![0], vec![0], 0, vec![0]).unwrap();
    let lead_time = SameDayDirect(ConstantLeadTime::new(cycle, 1, 1, 5).unwrap());
    let retailer = Retailer::new(0, Box::new(ConstantDemand::new(4, 5).unwrap()));
    let warehouse = Warehouse::new(vec![15; 5]).unwrap();
    let mut sim = Simulator::new(warehouse, vec![retailer], Box::new(lead_time)).unwrap();

    let err = sim
        .simulate(parameters(Policy::cross_dock(ShipEveryPeriod)))
        .unwrap_err();
    match err {
        SimError::Consistency {
            period: -5,
            kind:
                ConsistencyError::ArrivalNotAfterDispatch {
                    destination: FacilityKind::Retailer(0),
                    sent: -5,
                    due: -5,
                },
        } => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(sim.status(), Status::Aborted);
}
