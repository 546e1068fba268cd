// src/lead_time/mod.rs

//! Shipment eligibility and delivery lead times.

pub mod constant;
pub mod cycle;
pub mod geometric;
pub mod pmf;

use std::fmt::Debug;

use crate::error::SimResult;
use crate::Period;

pub use constant::ConstantLeadTime;
pub use cycle::{Link, ShipmentCycle};
pub use geometric::{GeometricLeadTime, GeometricLeadTimeBuilder};
pub use pmf::LeadTimePmf;

/// Lead-time behaviour shared by every link of one network.
///
/// Realized lead times are `None` when the period is not a shipment period
/// for the link, or when no delivery happens inside the generated window.
///
/// District indices must be below [`num_districts`](Self::num_districts)
/// and retailer indices below [`num_retailers`](Self::num_retailers). The
/// simulator checks its network against the model once at construction, so
/// an out-of-range index is a caller bug and panics like slice indexing.
pub trait LeadTimeModel: Debug + Send + Sync {
    fn cycle(&self) -> &ShipmentCycle;

    fn periods_in_year(&self) -> usize;

    /// Draw all randomness for `[start, end)`. Must run before any realized
    /// lead time is queried.
    fn generate(&mut self, start: Period, end: Period, seed: u64) -> SimResult<()>;

    fn primary_lead_time(&self, district: usize, t: Period) -> SimResult<Option<u32>>;

    fn secondary_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>>;

    fn total_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>>;

    /// Distribution of the warehouse to retailer lead time for a shipment
    /// sent in period `t`. Empty when `t` is not a total shipment period.
    fn total_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf>;

    fn secondary_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf>;

    fn accessibility(&self, retailer: usize, t: Period) -> f64;

    fn mean_accessibility(&self, retailer: usize) -> f64;

    fn primary_lead_time_pmf(&self, district: usize, t: Period) -> SimResult<LeadTimePmf> {
        Ok(self
            .primary_lead_time(district, t)?
            .map(LeadTimePmf::point_mass)
            .unwrap_or_default())
    }

    fn is_primary_shipment_period(&self, district: usize, t: Period) -> bool {
        self.cycle().is_primary_shipment_period(district, t)
    }

    fn is_secondary_shipment_period(&self, retailer: usize, t: Period) -> bool {
        self.cycle().is_secondary_shipment_period(retailer, t)
    }

    fn is_total_shipment_period(&self, retailer: usize, t: Period) -> bool {
        self.cycle().is_total_shipment_period(retailer, t)
    }

    fn num_districts(&self) -> usize {
        self.cycle().num_districts()
    }

    fn num_retailers(&self) -> usize {
        self.cycle().num_retailers()
    }

    fn district_of(&self, retailer: usize) -> usize {
        self.cycle().district_of(retailer)
    }
}
