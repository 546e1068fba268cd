// src/demand/mod.rs

//! Retail demand realizations and their forecasts.

pub mod constant;
pub mod mmfe;

use std::fmt::{self, Debug};

use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::Period;

pub use constant::ConstantDemand;
pub use mmfe::MultMmfeDemand;

/// Forecast made at the start of period `as_of` for periods
/// `as_of .. as_of + mean.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub as_of: Period,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn total_mean(&self) -> f64 {
        self.mean.iter().sum()
    }

    /// Variance of total demand, treating periods as independent.
    pub fn total_variance(&self) -> f64 {
        self.variance.iter().sum()
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast at period {}", self.as_of)?;
        for (i, (mean, var)) in self.mean.iter().zip(&self.variance).enumerate() {
            writeln!(
                f,
                "Period = {}\tMean = {:.1}\tVar = {:.1}",
                self.as_of + i as Period,
                mean,
                var
            )?;
        }
        Ok(())
    }
}

/// A source of retail demand and demand forecasts.
///
/// All randomness is drawn by [`generate`](DemandModel::generate); every
/// query afterwards is a pure function of that state. After
/// `generate(seed, start, end)` every model answers [`demand`] and
/// [`forecast`] for periods in `[start - horizon, end)`, where the horizon
/// is model specific and at least one period. Anything outside fails with
/// [`ConsistencyError::OutOfRange`] naming the first offending period.
///
/// [`demand`]: DemandModel::demand
/// [`forecast`]: DemandModel::forecast
/// [`ConsistencyError::OutOfRange`]: crate::error::ConsistencyError::OutOfRange
pub trait DemandModel: Debug + Send + Sync {
    fn generate(&mut self, seed: u64, start: Period, end: Period) -> SimResult<()>;

    /// Periods `[first, end)` that can be queried, or `None` before
    /// generation.
    fn queryable_range(&self) -> Option<(Period, Period)>;

    /// Realized integer demand for `[t, t + n)`.
    fn demand(&self, t: Period, n: usize) -> SimResult<Vec<u64>>;

    /// Forecast as of the start of period `as_of` for `[as_of, as_of + n)`.
    fn forecast(&self, as_of: Period, n: usize) -> SimResult<Forecast>;

    /// Seasonal mean demand for period `t`.
    fn baseline_mean(&self, t: Period) -> f64;

    fn periods_in_year(&self) -> usize;
}

/// Rescale a seasonal curve so that its peak is `seasonality` times its
/// trough while keeping the mean.
pub fn scale_seasonality(curve: &[f64], seasonality: f64) -> SimResult<Vec<f64>> {
    if seasonality < 1.0 {
        return Err(SimError::invalid(format!(
            "seasonality {seasonality:.2} cannot be less than 1.0"
        )));
    }
    if curve.is_empty() {
        return Ok(Vec::new());
    }

    let mean = curve.iter().sum::<f64>() / curve.len() as f64;
    let max = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = curve.iter().copied().fold(f64::INFINITY, f64::min);
    let denominator = max + (seasonality - 1.0) * mean - seasonality * min;
    if denominator.abs() < f64::EPSILON {
        // flat curve
        return Ok(curve.to_vec());
    }
    let alpha = (seasonality - 1.0) * mean / denominator;

    Ok(curve
        .iter()
        .map(|d| alpha * d + (1.0 - alpha) * mean)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasonality_sets_peak_to_trough_ratio() {
        let scaled = scale_seasonality(&[1.0, 2.0, 3.0], 2.0).unwrap();
        let max = scaled.iter().copied().fold(f64::MIN, f64::max);
        let min = scaled.iter().copied().fold(f64::MAX, f64::min);
        assert!((max / min - 2.0).abs() < 1e-12);
        let mean = scaled.iter().sum::<f64>() / 3.0;
        assert!((mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn seasonality_below_one_is_rejected() {
        assert!(scale_seasonality(&[1.0, 2.0], 0.5).is_err());
    }

    #[test]
    fn flat_curves_stay_flat() {
        assert_eq!(scale_seasonality(&[4.0; 3], 3.0).unwrap(), vec![4.0; 3]);
    }

    #[test]
    fn every_model_answers_the_same_window() {
        use crate::error::ConsistencyError;

        let models: Vec<Box<dyn DemandModel>> = vec![
            Box::new(ConstantDemand::new(3, 4).unwrap()),
            Box::new(
                MultMmfeDemand::new(vec![10.0; 4], vec![0.1, 0.1], vec![0.0, 1.0], 1).unwrap(),
            ),
        ];
        for mut model in models {
            assert_eq!(model.queryable_range(), None);
            model.generate(5, 0, 8).unwrap();
            let (first, end) = model.queryable_range().unwrap();
            assert!(first < 0, "{model:?}");
            assert_eq!(end, 8);

            assert!(model.demand(first, (end - first) as usize).is_ok());
            assert!(model.forecast(first, 1).is_ok());
            assert!(model.forecast(end - 1, 1).is_ok());
            for (t, n, bad) in [(first - 1, 2, first - 1), (end - 2, 3, end)] {
                match model.demand(t, n) {
                    Err(SimError::Consistency {
                        period,
                        kind: ConsistencyError::OutOfRange { start, end: e },
                    }) => assert_eq!((period, start, e), (bad, first, end), "{model:?}"),
                    other => panic!("unexpected {other:?}"),
                }
                assert!(model.forecast(t, n).is_err());
            }
        }
    }

    #[test]
    fn forecast_totals() {
        let f = Forecast {
            as_of: 2,
            mean: vec![1.0, 2.0],
            variance: vec![0.5, 0.25],
        };
        assert_eq!(f.total_mean(), 3.0);
        assert_eq!(f.total_variance(), 0.75);
        assert!(f.to_string().starts_with("Forecast at period 2"));
    }
}
