// src/simulation/mod.rs

pub mod builder;
pub mod config;
pub mod engine;
pub mod replication;
pub mod stats;

pub use builder::ScenarioBuilder;
pub use config::{SimulationConfig, SimulationParameters, Warmup};
pub use engine::{HistoryRecord, Simulator, Status};
pub use replication::{run_replications, ReplicationOutcome, ReplicationReport, ReplicationSummary};
pub use stats::{stockout_probabilities, RetailerStats, SimulationStats};
