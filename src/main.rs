use std::env;
use std::path::{Path, PathBuf};
use std::process;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use echelon_sim::io::reporting;
use echelon_sim::io::scenario::{read_scenario, ScenarioOptions};
use echelon_sim::lead_time::GeometricLeadTimeBuilder;
use echelon_sim::simulation::{
    run_replications, stockout_probabilities, ScenarioBuilder, SimulationConfig,
    SimulationParameters, SimulationStats, Warmup,
};
use echelon_sim::strategy::{Allocation, ForecastCrossDock, LeadTimePlanning, Policy};
use echelon_sim::SimResult;

const DEFAULT_REPLICATIONS: usize = 20;

/// Twelve periods a year, six retailers in two districts, the second
/// district cut off by the rainy season.
fn synthetic_scenario() -> ScenarioBuilder {
    let year = 12;
    let seasonal: Vec<f64> = (0..year)
        .map(|y| 40.0 + 15.0 * (2.0 * std::f64::consts::PI * y as f64 / year as f64).sin())
        .collect();
    let rainy: Vec<f64> = (0..year)
        .map(|y| if (5..8).contains(&y) { 0.2 } else { 1.0 })
        .collect();

    ScenarioBuilder::new()
        .demand_mean(vec![seasonal; 6])
        .forecast_variance(vec![0.02, 0.02, 0.01])
        .forecast_accuracy(vec![0.0, 0.5, 1.0])
        .forecast_level(1)
        .warehouse_shipments_per_year(4)
        .supply_demand_ratio(1.1)
        .lead_time(
            GeometricLeadTimeBuilder::new()
                .cycle_length(2)
                .primary_offsets(vec![0, 1])
                .secondary_offsets(vec![0; 6])
                .delay(0)
                .retailer_to_district(vec![0, 0, 0, 1, 1, 1])
                .primary_lead_times(vec![1, 2])
                .mean_secondary_lead_times(vec![1.5, 1.5, 2.0, 2.0, 3.0, 3.0])
                .accessibility(vec![
                    vec![1.0; year],
                    vec![1.0; year],
                    vec![1.0; year],
                    rainy.clone(),
                    rainy.clone(),
                    rainy,
                ]),
        )
}

fn policy() -> Policy {
    Policy::cross_dock(ForecastCrossDock::new(
        LeadTimePlanning::Conservative { percentile: 0.9 },
        0.95,
        Allocation::Proportional,
    ))
}

fn run() -> SimResult<()> {
    // 1. SCENARIO
    let args: Vec<String> = env::args().skip(1).collect();
    let scenario = match args.first() {
        Some(folder) => read_scenario(Path::new(folder), &ScenarioOptions::default())?,
        None => synthetic_scenario(),
    };
    let replications = args
        .get(1)
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_REPLICATIONS);

    let config = SimulationConfig {
        warmup: Warmup::Years(1),
        simulation_years: 3,
        random_seed: 2024,
        expiry_enabled: false,
    };

    // 2. SINGLE TRACED RUN
    let mut simulator = scenario.build()?;
    simulator.simulate(SimulationParameters::new(policy()).with_config(config.clone()))?;
    let stats = SimulationStats::from_simulator(&simulator)?;
    info!(
        policy = simulator.policy_name(),
        service_level = stats.service_level,
        inventory = stats.inventory_in_demand_per_period,
        "single run finished"
    );
    let stockouts = stockout_probabilities(&simulator, 0)?;
    info!(?stockouts, "retailer 0 stock-out probability by period of year");
    reporting::write_simulation_log(&PathBuf::from("simulation_history.csv"), simulator.history())?;

    // 3. REPLICATIONS
    let report = run_replications(replications, &config, || Ok((scenario.build()?, policy())));
    let summary = report.summarize();
    info!(
        replications = summary.replications,
        failed = summary.failed,
        service_level = summary.service_level_mean,
        service_level_sd = summary.service_level_std_dev,
        inventory = summary.inventory_mean,
        "replications finished"
    );
    reporting::write_replications(&PathBuf::from("replications.csv"), &report.outcomes)?;
    reporting::write_summary(&PathBuf::from("summary.csv"), &summary)?;
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        error!(error = %e, "simulation failed");
        process::exit(1);
    }
}
