// src/demand/constant.rs

use crate::demand::{DemandModel, Forecast};
use crate::error::{ConsistencyError, SimError, SimResult};
use crate::Period;

/// Periods before the simulation start that stay queryable.
const HORIZON: Period = 1;

/// Deterministic demand: the same quantity every period, forecast exactly.
#[derive(Debug, Clone)]
pub struct ConstantDemand {
    demand: u64,
    periods_in_year: usize,
    window: Option<(Period, Period)>,
}

impl ConstantDemand {
    pub fn new(demand: u64, periods_in_year: usize) -> SimResult<Self> {
        if periods_in_year == 0 {
            return Err(SimError::invalid("a year needs at least one period"));
        }
        Ok(Self {
            demand,
            periods_in_year,
            window: None,
        })
    }

    fn check(&self, t: Period, n: usize) -> SimResult<()> {
        let (start, end) = self
            .window
            .ok_or_else(|| SimError::consistency(t, ConsistencyError::NotGenerated("constant demand")))?;
        let last = t + n as Period;
        if n == 0 || (t >= start && last <= end) {
            return Ok(());
        }
        let period = if t < start { t } else { t.max(end) };
        Err(SimError::consistency(
            period,
            ConsistencyError::OutOfRange { start, end },
        ))
    }
}

impl DemandModel for ConstantDemand {
    fn generate(&mut self, _seed: u64, start: Period, end: Period) -> SimResult<()> {
        self.window = Some((start - HORIZON, end));
        Ok(())
    }

    fn queryable_range(&self) -> Option<(Period, Period)> {
        self.window
    }

    fn demand(&self, t: Period, n: usize) -> SimResult<Vec<u64>> {
        self.check(t, n)?;
        Ok(vec![self.demand; n])
    }

    fn forecast(&self, as_of: Period, n: usize) -> SimResult<Forecast> {
        self.check(as_of, n)?;
        Ok(Forecast {
            as_of,
            mean: vec![self.demand as f64; n],
            variance: vec![0.0; n],
        })
    }

    fn baseline_mean(&self, _t: Period) -> f64 {
        self.demand as f64
    }

    fn periods_in_year(&self) -> usize {
        self.periods_in_year
    }
}
