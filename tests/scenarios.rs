use echelon_sim::lead_time::GeometricLeadTimeBuilder;
use echelon_sim::simulation::{
    run_replications, ScenarioBuilder, SimulationConfig, SimulationParameters, SimulationStats,
    Simulator, Status, Warmup,
};
use echelon_sim::strategy::{
    Allocation, DemandEstimation, EstimationKind, ForecastCrossDock, LeadTimePlanning,
    OrderUpToCrossDock, OrderUpToDistrict, Policy,
};
use echelon_sim::SimResult;

const YEAR: usize = 8;

/// Four retailers in two districts, the second district half blocked.
fn scenario() -> ScenarioBuilder {
    let seasonal: Vec<f64> = (0..YEAR).map(|y| 20.0 + 2.0 * y as f64).collect();
    let blocked: Vec<f64> = (0..YEAR)
        .map(|y| if y < YEAR / 2 { 0.3 } else { 1.0 })
        .collect();
    ScenarioBuilder::new()
        .demand_mean(vec![seasonal; 4])
        .forecast_variance(vec![0.03, 0.02])
        .forecast_accuracy(vec![0.0, 0.5, 1.0])
        .forecast_level(1)
        .warehouse_shipments_per_year(2)
        .supply_demand_ratio(1.2)
        .lead_time(
            GeometricLeadTimeBuilder::new()
                .cycle_length(2)
                .primary_offsets(vec![0, 1])
                .secondary_offsets(vec![0; 4])
                .delay(0)
                .retailer_to_district(vec![0, 0, 1, 1])
                .primary_lead_times(vec![1, 1])
                .mean_secondary_lead_times(vec![1.5, 2.0, 2.0, 3.0])
                .accessibility(vec![
                    vec![1.0; YEAR],
                    vec![1.0; YEAR],
                    blocked.clone(),
                    blocked,
                ]),
        )
}

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        warmup: Warmup::Years(1),
        simulation_years: 2,
        random_seed: seed,
        expiry_enabled: false,
    }
}

fn forecast_policy() -> Policy {
    Policy::cross_dock(ForecastCrossDock::new(
        LeadTimePlanning::Conservative { percentile: 0.9 },
        0.95,
        Allocation::Proportional,
    ))
}

fn build() -> SimResult<(Simulator, Policy)> {
    Ok((scenario().build()?, forecast_policy()))
}

fn run(policy: Policy, seed: u64) -> Simulator {
    let mut sim = scenario().build().unwrap();
    sim.simulate(SimulationParameters::new(policy).with_config(config(seed)))
        .unwrap();
    sim
}

fn assert_conserved(sim: &Simulator) {
    for record in sim.history() {
        assert_eq!(
            record.ending_inventory,
            record.starting_inventory + record.received - record.issued,
            "{record:?}"
        );
        if let (Some(demand), Some(unmet)) = (record.demand, record.unmet_demand) {
            assert_eq!(demand, record.issued + unmet, "{record:?}");
        }
    }
}

#[test]
fn same_seed_replays_identical_history() {
    let first = run(forecast_policy(), 11);
    let second = run(forecast_policy(), 11);
    assert_eq!(first.history(), second.history());

    let other = run(forecast_policy(), 12);
    assert_ne!(first.history(), other.history());
}

#[test]
fn rerunning_a_simulator_starts_from_scratch() {
    let mut sim = scenario().build().unwrap();
    sim.simulate(SimulationParameters::new(forecast_policy()).with_config(config(3)))
        .unwrap();
    let before = sim.history().to_vec();
    sim.simulate(SimulationParameters::new(forecast_policy()).with_config(config(3)))
        .unwrap();
    assert_eq!(before, sim.history());
}

#[test]
fn forecast_policy_keeps_ledgers_balanced() {
    let sim = run(forecast_policy(), 5);
    assert_eq!(sim.status(), Status::Finished);
    assert_eq!((sim.start(), sim.end()), (-(YEAR as i32), 2 * YEAR as i32));
    assert_conserved(&sim);

    let stats = SimulationStats::from_simulator(&sim).unwrap();
    assert!(stats.service_level > 0.0 && stats.service_level <= 1.0);
    assert!(stats.demand_total > 0);
    assert_eq!(stats.retailers.len(), 4);
}

#[test]
fn every_planning_mode_runs() {
    for planning in [
        LeadTimePlanning::Actual,
        LeadTimePlanning::Mean,
        LeadTimePlanning::Conservative { percentile: 0.75 },
    ] {
        let policy = Policy::cross_dock(ForecastCrossDock::new(planning, 0.9, Allocation::Priority));
        let sim = run(policy, 8);
        assert_eq!(sim.status(), Status::Finished, "{planning:?}");
        assert_conserved(&sim);
    }
}

#[test]
fn order_up_to_cross_dock_ships_whole_boxes() {
    let estimation = DemandEstimation::new(EstimationKind::PastDemand, 4);
    let policy = Policy::cross_dock(OrderUpToCrossDock::new(estimation, 6.0, Allocation::Proportional));
    let sim = run(policy, 21);
    assert_conserved(&sim);

    for record in sim.history().iter().filter(|r| r.facility == "Warehouse") {
        assert_eq!(record.issued % 30, 0, "{record:?}");
    }
}

#[test]
fn order_up_to_district_runs_two_echelons() {
    let policy = Policy::district(OrderUpToDistrict::new(4, 6.0, 4.0));
    let sim = run(policy, 4);
    assert_eq!(sim.status(), Status::Finished);
    assert_conserved(&sim);

    let moved: u64 = sim
        .history()
        .iter()
        .filter(|r| r.facility.starts_with("District"))
        .map(|r| r.received)
        .sum();
    assert!(moved > 0);
    assert!(sim.policy_name().starts_with("Order-up-to district"));
}

#[test]
fn replications_are_reproducible_and_distinct() {
    let base = config(100);

    let report = run_replications(4, &base, build);
    assert!(report.failures.is_empty());
    assert_eq!(report.outcomes.len(), 4);
    let seeds: Vec<u64> = report.outcomes.iter().map(|o| o.seed).collect();
    assert_eq!(seeds[0], 100);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.replication, i);
    }
    assert!(seeds.windows(2).all(|w| w[0] != w[1]));

    let again = run_replications(4, &base, build);
    for (a, b) in report.outcomes.iter().zip(&again.outcomes) {
        assert_eq!(a.stats, b.stats);
    }

    let summary = report.summarize();
    assert_eq!(summary.replications, 4);
    assert_eq!(summary.failed, 0);
    assert!(summary.service_level_mean > 0.0 && summary.service_level_mean <= 1.0);
}
