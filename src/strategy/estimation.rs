// src/strategy/estimation.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::model::Retailer;
use crate::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimationKind {
    /// Issues over the periods just before `t`.
    PastConsumption,
    /// Realized demand over the periods just before `t`.
    PastDemand,
    /// Forecast mean for the periods starting at `t`.
    Future,
    /// Issues over the same periods one year earlier.
    LastYearConsumption,
    /// Realized demand over the same periods one year earlier.
    LastYearDemand,
}

/// Estimate of a retailer's mean demand per period from a window of
/// `periods` periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandEstimation {
    pub kind: EstimationKind,
    pub periods: usize,
}

impl DemandEstimation {
    pub fn new(kind: EstimationKind, periods: usize) -> Self {
        Self { kind, periods }
    }

    pub fn per_period_demand(&self, retailer: &Retailer, t: Period) -> SimResult<f64> {
        if self.periods == 0 {
            return Ok(0.0);
        }
        let n = self.periods as Period;
        let year = retailer.periods_in_year() as Period;
        let facility = retailer.facility();

        let total: f64 = match self.kind {
            EstimationKind::PastConsumption => (t - n..t)
                .map(|u| facility.issues(u).map(|q| q as f64))
                .sum::<SimResult<f64>>()?,
            EstimationKind::PastDemand => sum(&retailer.demand(t - n, self.periods)?),
            EstimationKind::Future => retailer.forecast(t, self.periods)?.total_mean(),
            EstimationKind::LastYearConsumption => (t - year..t - year + n)
                .map(|u| facility.issues(u).map(|q| q as f64))
                .sum::<SimResult<f64>>()?,
            EstimationKind::LastYearDemand => {
                sum(&retailer.demand(t - year, self.periods)?)
            }
        };
        Ok(total / self.periods as f64)
    }
}

fn sum(values: &[u64]) -> f64 {
    values.iter().sum::<u64>() as f64
}

impl fmt::Display for DemandEstimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} over {} periods", self.kind, self.periods)
    }
}
