// src/strategy/mod.rs

pub mod allocation;
pub mod estimation;
pub mod implementations;
pub mod optimization;
pub mod traits;

pub use allocation::Allocation;
pub use estimation::{DemandEstimation, EstimationKind};
pub use implementations::{
    ConstantCrossDock, ConstantDistrict, ForecastCrossDock, LeadTimePlanning, OrderUpToCrossDock,
    OrderUpToDistrict,
};
pub use traits::{CrossDockPolicy, DistrictPolicy, Policy, ShipmentPlan};
