// src/strategy/traits.rs

use std::fmt::{self, Debug, Display};

use crate::error::SimResult;
use crate::simulation::Simulator;

/// Shipment decisions for one period, one entry per destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentPlan {
    /// Quantity to dispatch now.
    pub quantities: Vec<u64>,
    /// Quantity each destination asked for before rationing. Booked as
    /// orders received by the supplier.
    pub orders: Vec<u64>,
}

impl ShipmentPlan {
    /// A plan whose orders equal its shipments.
    pub fn new(quantities: Vec<u64>) -> Self {
        Self {
            orders: quantities.clone(),
            quantities,
        }
    }

    pub fn with_orders(quantities: Vec<u64>, orders: Vec<u64>) -> Self {
        Self { quantities, orders }
    }

    pub fn none(destinations: usize) -> Self {
        Self::new(vec![0; destinations])
    }

    pub fn total(&self) -> u64 {
        self.quantities.iter().sum()
    }
}

/// Decides warehouse to retailer shipments directly.
///
/// The simulator asks once per period, after receipts and before demand.
/// Returning a positive quantity for a retailer whose link is not eligible
/// this period aborts the replication.
pub trait CrossDockPolicy: Debug + Display + Send {
    fn compute_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan>;
}

/// Decides shipments through the district echelon.
///
/// Retailer shipments are computed and dispatched before district
/// shipments, so orders booked by the first call are visible to the second.
pub trait DistrictPolicy: Debug + Display + Send {
    /// One quantity per retailer, drawn from its district.
    fn compute_retailer_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan>;

    /// One quantity per district, drawn from the warehouse.
    fn compute_district_shipments(&mut self, simulator: &Simulator) -> SimResult<ShipmentPlan>;
}

/// The replenishment policy driving one simulation run.
#[derive(Debug)]
pub enum Policy {
    CrossDock(Box<dyn CrossDockPolicy>),
    District(Box<dyn DistrictPolicy>),
}

impl Policy {
    pub fn cross_dock(policy: impl CrossDockPolicy + 'static) -> Self {
        Policy::CrossDock(Box::new(policy))
    }

    pub fn district(policy: impl DistrictPolicy + 'static) -> Self {
        Policy::District(Box::new(policy))
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::CrossDock(policy) => Display::fmt(policy, f),
            Policy::District(policy) => Display::fmt(policy, f),
        }
    }
}
