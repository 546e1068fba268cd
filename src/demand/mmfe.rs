// src/demand/mmfe.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::demand::{DemandModel, Forecast};
use crate::error::{ConfigError, ConsistencyError, SimError, SimResult};
use crate::model::PeriodArray;
use crate::Period;

/// Multiplicative martingale model of forecast evolution.
///
/// Demand in period `u` is `mean(u) * exp(sum of innovations)`. Each period
/// `v` in the forecast horizon `[u - M + 1, u]` contributes `K` normal
/// innovations, one per resolution level `k`, with variance
/// `(accuracy[k + 1] - accuracy[k]) * variance[u - v]` and mean equal to
/// minus half the variance, so every factor has expectation one.
///
/// A forecaster at `forecast_level = L` observes levels `k < L` of every
/// innovation dated before the forecast period. Levels `k >= L`, and
/// everything dated at or after the forecast period, stay hidden until the
/// demand is realized.
#[derive(Debug, Clone)]
pub struct MultMmfeDemand {
    mean: Vec<f64>,
    /// `variance[m]`: log-variance revealed `m` periods in advance.
    variance: Vec<f64>,
    accuracy: Vec<f64>,
    forecast_level: usize,
    /// `weight[k] = sqrt(accuracy[k + 1] - accuracy[k])`.
    weight: Vec<f64>,
    state: Option<Innovations>,
}

#[derive(Debug, Clone)]
struct Innovations {
    /// Queryable periods are `[start, end)`.
    start: Period,
    end: Period,
    /// Draws dated `v`, flattened as `m * K + k`.
    z: PeriodArray<Vec<f64>>,
    /// Uniform noise that turns fractional demand into integers.
    rounding: PeriodArray<f64>,
}

impl MultMmfeDemand {
    pub fn new(
        mean: Vec<f64>,
        variance: Vec<f64>,
        accuracy: Vec<f64>,
        forecast_level: usize,
    ) -> SimResult<Self> {
        if mean.is_empty() {
            return Err(SimError::invalid("demand mean curve is empty"));
        }
        if let Some(m) = mean.iter().find(|m| !m.is_finite() || **m < 0.0) {
            return Err(SimError::invalid(format!("demand mean {m} must be non-negative")));
        }
        if variance.is_empty() {
            return Err(SimError::invalid("forecast horizon must be at least one period"));
        }
        if let Some(v) = variance.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SimError::invalid(format!("forecast variance {v} must be non-negative")));
        }
        if accuracy.len() < 2 {
            return Err(SimError::invalid("forecast accuracy needs at least two points"));
        }
        let levels = accuracy.len() - 1;
        if accuracy[0] != 0.0 {
            return Err(ConfigError::AccuracyStart(accuracy[0]).into());
        }
        if accuracy[levels] != 1.0 {
            return Err(ConfigError::AccuracyEnd(accuracy[levels]).into());
        }
        if let Some(k) = (0..levels).find(|&k| accuracy[k + 1] < accuracy[k]) {
            return Err(ConfigError::AccuracyNotMonotone(k).into());
        }
        if forecast_level > levels {
            return Err(ConfigError::ForecastLevel {
                level: forecast_level,
                max: levels,
            }
            .into());
        }

        let weight = accuracy.windows(2).map(|w| (w[1] - w[0]).sqrt()).collect();

        Ok(Self {
            mean,
            variance,
            accuracy,
            forecast_level,
            weight,
            state: None,
        })
    }

    /// Forecast horizon `M` in periods.
    pub fn horizon(&self) -> usize {
        self.variance.len()
    }

    /// Number of resolution levels `K`.
    pub fn levels(&self) -> usize {
        self.weight.len()
    }

    pub fn forecast_level(&self) -> usize {
        self.forecast_level
    }

    pub fn accuracy(&self) -> &[f64] {
        &self.accuracy
    }

    fn stream_variance(&self, m: usize, k: usize) -> f64 {
        self.weight[k] * self.weight[k] * self.variance[m]
    }

    fn state(&self, t: Period) -> SimResult<&Innovations> {
        self.state.as_ref().ok_or_else(|| {
            SimError::consistency(t, ConsistencyError::NotGenerated("MMFE demand"))
        })
    }

    fn check_range(state: &Innovations, t: Period) -> SimResult<()> {
        if t < state.start || t >= state.end {
            return Err(SimError::consistency(
                t,
                ConsistencyError::OutOfRange {
                    start: state.start,
                    end: state.end,
                },
            ));
        }
        Ok(())
    }

    /// Log-mean of the observed innovations and log-variance of the hidden
    /// ones for target `u`, as seen at the start of `as_of` by a forecaster
    /// observing `observed` levels.
    fn log_moments(
        &self,
        state: &Innovations,
        as_of: Period,
        u: Period,
        observed: usize,
    ) -> SimResult<(f64, f64)> {
        let horizon = self.horizon() as Period;
        let levels = self.levels();
        let mut log_mean = 0.0;
        let mut log_var = 0.0;
        for v in (u - horizon + 1)..=u {
            let m = (u - v) as usize;
            if v < as_of {
                let draws = state.z.get(v)?;
                for k in 0..levels {
                    if k < observed {
                        log_mean += draws[m * levels + k];
                    } else {
                        log_var += self.stream_variance(m, k);
                    }
                }
            } else {
                log_var += self.variance[m];
            }
        }
        Ok((log_mean, log_var))
    }
}

impl DemandModel for MultMmfeDemand {
    fn generate(&mut self, seed: u64, start: Period, end: Period) -> SimResult<()> {
        let horizon = self.horizon() as Period;
        let levels = self.levels();

        let mut normals = Vec::with_capacity(self.horizon() * levels);
        for m in 0..self.horizon() {
            for k in 0..levels {
                let var = self.stream_variance(m, k);
                let normal = Normal::new(-var / 2.0, var.sqrt())
                    .map_err(|e| SimError::invalid(format!("innovation ({m}, {k}): {e}")))?;
                normals.push(normal);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let query_start = start - horizon;
        let z = PeriodArray::from_fn(query_start - horizon + 1, end, |_| {
            normals.iter().map(|n| n.sample(&mut rng)).collect()
        });
        let rounding = PeriodArray::from_fn(query_start, end, |_| rng.gen::<f64>());

        debug!(seed, start, end, horizon, levels, "generated MMFE innovations");
        self.state = Some(Innovations {
            start: query_start,
            end,
            z,
            rounding,
        });
        Ok(())
    }

    fn queryable_range(&self) -> Option<(Period, Period)> {
        self.state.as_ref().map(|s| (s.start, s.end))
    }

    fn demand(&self, t: Period, n: usize) -> SimResult<Vec<u64>> {
        let state = self.state(t)?;
        (t..t + n as Period)
            .map(|u| {
                Self::check_range(state, u)?;
                let (log_mean, _) = self.log_moments(state, u + 1, u, self.levels())?;
                let value = self.baseline_mean(u) * log_mean.exp() + state.rounding.value(u)?;
                Ok(value.floor() as u64)
            })
            .collect()
    }

    fn forecast(&self, as_of: Period, n: usize) -> SimResult<Forecast> {
        let state = self.state(as_of)?;

        let mut mean = Vec::with_capacity(n);
        let mut variance = Vec::with_capacity(n);
        for u in as_of..as_of + n as Period {
            Self::check_range(state, u)?;
            let (log_mean, log_var) =
                self.log_moments(state, as_of, u, self.forecast_level)?;
            let base = self.baseline_mean(u);
            mean.push(base * log_mean.exp());
            variance.push(base * base * (log_var.exp() - 1.0));
        }
        Ok(Forecast {
            as_of,
            mean,
            variance,
        })
    }

    fn baseline_mean(&self, t: Period) -> f64 {
        self.mean[t.rem_euclid(self.mean.len() as Period) as usize]
    }

    fn periods_in_year(&self) -> usize {
        self.mean.len()
    }
}
