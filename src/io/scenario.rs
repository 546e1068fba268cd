// src/io/scenario.rs

//! Scenario tables read from a folder of header-less CSV files:
//!
//! * `demand-means.csv`: one row per retailer, one column per period of year
//! * `accessibility.csv`: same shape, in percent
//! * `retailers-to-districts.csv`: a single row, the district of each retailer
//! * `districts.csv`: one row per district with primary cycle offset,
//!   primary lead time and mean secondary lead time

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, SimError, SimResult};
use crate::lead_time::GeometricLeadTimeBuilder;
use crate::simulation::ScenarioBuilder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// Communication delay per hop, in periods.
    pub delay: u32,
    pub cycle_length: u32,
    /// Rotate the seasonal tables so the simulation starts this many periods
    /// into the year.
    pub shift_left: usize,
    pub warehouse_shipments_per_year: usize,
    pub supply_demand_ratio: f64,
    pub forecast_variance: Vec<f64>,
    pub forecast_accuracy: Vec<f64>,
    pub forecast_level: usize,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            delay: 0,
            cycle_length: 4,
            shift_left: 0,
            warehouse_shipments_per_year: 4,
            supply_demand_ratio: 100.0,
            forecast_variance: vec![0.0],
            forecast_accuracy: vec![0.0, 0.5, 1.0],
            forecast_level: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct DistrictRow {
    primary_cycle_offset: u32,
    primary_lead_time: u32,
    mean_secondary_lead_time: f64,
}

fn reader(path: &Path) -> SimResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Read a rectangular table of numbers.
pub fn read_matrix(path: &Path) -> SimResult<Vec<Vec<f64>>> {
    let rows = reader(path)?
        .deserialize::<Vec<f64>>()
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(width) = rows.first().map(Vec::len) {
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(ConfigError::LengthMismatch {
                what: "table row",
                expected: width,
                got: row.len(),
            }
            .into());
        }
    }
    Ok(rows)
}

fn read_districts(path: &Path) -> SimResult<Vec<DistrictRow>> {
    Ok(reader(path)?
        .deserialize::<DistrictRow>()
        .collect::<Result<Vec<_>, _>>()?)
}

fn read_mapping(path: &Path) -> SimResult<Vec<usize>> {
    reader(path)?
        .deserialize::<Vec<usize>>()
        .next()
        .transpose()?
        .ok_or_else(|| SimError::invalid(format!("{} is empty", path.display())))
}

fn check_rows(what: &'static str, rows: usize, expected: usize) -> SimResult<()> {
    if rows != expected {
        return Err(ConfigError::LengthMismatch {
            what,
            expected,
            got: rows,
        }
        .into());
    }
    Ok(())
}

/// Assemble a scenario from the tables in `folder`.
pub fn read_scenario(folder: &Path, options: &ScenarioOptions) -> SimResult<ScenarioBuilder> {
    let mut demand_mean = read_matrix(&folder.join("demand-means.csv"))?;
    let mut accessibility = read_matrix(&folder.join("accessibility.csv"))?;
    let retailer_to_district = read_mapping(&folder.join("retailers-to-districts.csv"))?;
    let districts = read_districts(&folder.join("districts.csv"))?;

    let retailers = retailer_to_district.len();
    check_rows("demand mean rows", demand_mean.len(), retailers)?;
    check_rows("accessibility rows", accessibility.len(), retailers)?;
    if let Some(&d) = retailer_to_district.iter().find(|&&d| d >= districts.len()) {
        return Err(SimError::invalid(format!(
            "retailer mapped to district {d}, only {} districts",
            districts.len()
        )));
    }

    for row in accessibility.iter_mut() {
        for a in row.iter_mut() {
            *a /= 100.0;
        }
    }
    for row in demand_mean.iter_mut().chain(accessibility.iter_mut()) {
        if !row.is_empty() {
            let shift = options.shift_left % row.len();
            row.rotate_left(shift);
        }
    }

    let mean_secondary = retailer_to_district
        .iter()
        .map(|&d| districts[d].mean_secondary_lead_time)
        .collect();

    let lead_time = GeometricLeadTimeBuilder::new()
        .cycle_length(options.cycle_length)
        .primary_offsets(districts.iter().map(|d| d.primary_cycle_offset).collect())
        // retailers order in the first period of every cycle
        .secondary_offsets(vec![0; retailers])
        .delay(options.delay)
        .retailer_to_district(retailer_to_district)
        .primary_lead_times(districts.iter().map(|d| d.primary_lead_time).collect())
        .mean_secondary_lead_times(mean_secondary)
        .accessibility(accessibility);

    info!(
        folder = %folder.display(),
        retailers,
        districts = districts.len(),
        "scenario tables loaded"
    );

    Ok(ScenarioBuilder::new()
        .demand_mean(demand_mean)
        .forecast_variance(options.forecast_variance.clone())
        .forecast_accuracy(options.forecast_accuracy.clone())
        .forecast_level(options.forecast_level)
        .warehouse_shipments_per_year(options.warehouse_shipments_per_year)
        .supply_demand_ratio(options.supply_demand_ratio)
        .lead_time(lead_time))
}
