//! Multi-echelon inventory simulation.
//!
//! A national warehouse supplies retailers either directly (cross-docking)
//! or through district warehouses. Retail demand follows a multiplicative
//! MMFE forecast-evolution model and the last leg of every delivery follows
//! a geometric carrier-visit model modulated by seasonal accessibility.
//! Replenishment decisions come from a pluggable [`strategy::Policy`].

pub mod demand;
pub mod error;
pub mod io;
pub mod lead_time;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{SimError, SimResult};

/// A discrete simulation period. Warmup periods are negative.
pub type Period = i32;
