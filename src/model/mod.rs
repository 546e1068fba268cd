// src/model/mod.rs

pub mod facility;
pub mod inventory;
pub mod period_array;
pub mod retailer;
pub mod shipment;
pub mod warehouse;

pub use facility::{Facility, FacilityKind};
pub use inventory::{Inventory, Lot};
pub use period_array::PeriodArray;
pub use retailer::Retailer;
pub use shipment::Shipment;
pub use warehouse::Warehouse;
