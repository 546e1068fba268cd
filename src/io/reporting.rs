// src/io/reporting.rs

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::SimResult;
use crate::simulation::{HistoryRecord, ReplicationOutcome, ReplicationSummary};

/// One CSV row per replication.
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationRow {
    pub replication: usize,
    pub seed: u64,
    pub service_level: f64,
    pub service_level_std_dev: f64,
    pub inventory_in_demand_per_period: f64,
    pub max_inventory_in_demand_per_period: f64,
    pub demand_total: u64,
    pub demand_unmet: u64,
}

impl From<&ReplicationOutcome> for ReplicationRow {
    fn from(outcome: &ReplicationOutcome) -> Self {
        let stats = &outcome.stats;
        Self {
            replication: outcome.replication,
            seed: outcome.seed,
            service_level: stats.service_level,
            service_level_std_dev: stats.service_level_std_dev,
            inventory_in_demand_per_period: stats.inventory_in_demand_per_period,
            max_inventory_in_demand_per_period: stats.max_inventory_in_demand_per_period,
            demand_total: stats.demand_total,
            demand_unmet: stats.demand_unmet,
        }
    }
}

/// Serialize `records` to a CSV file with a header row.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> SimResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    info!(rows = records.len(), path = %path.display(), "exported CSV");
    Ok(())
}

/// Writes the per-period facility ledger of one run.
pub fn write_simulation_log(path: &Path, history: &[HistoryRecord]) -> SimResult<()> {
    write_records(path, history)
}

pub fn write_replications(path: &Path, outcomes: &[ReplicationOutcome]) -> SimResult<()> {
    let rows: Vec<ReplicationRow> = outcomes.iter().map(ReplicationRow::from).collect();
    write_records(path, &rows)
}

pub fn write_summary(path: &Path, summary: &ReplicationSummary) -> SimResult<()> {
    write_records(path, std::slice::from_ref(summary))
}
