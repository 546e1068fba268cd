// src/model/period_array.rs

use crate::error::{ConsistencyError, SimError, SimResult};
use crate::Period;

/// A contiguous buffer addressed by absolute period over `[start, end)`.
///
/// The start may be negative so that warmup and history periods can be
/// stored next to the simulated horizon. Access outside the range fails
/// with [`ConsistencyError::OutOfRange`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodArray<T> {
    start: Period,
    values: Vec<T>,
}

impl<T: Clone> PeriodArray<T> {
    pub fn new(start: Period, end: Period, fill: T) -> Self {
        let len = (end - start).max(0) as usize;
        Self {
            start,
            values: vec![fill; len],
        }
    }
}

impl<T> PeriodArray<T> {
    pub fn from_fn(start: Period, end: Period, mut f: impl FnMut(Period) -> T) -> Self {
        let values = (start..end.max(start)).map(&mut f).collect();
        Self { start, values }
    }

    pub fn start(&self) -> Period {
        self.start
    }

    pub fn end(&self) -> Period {
        self.start + self.values.len() as Period
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, t: Period) -> bool {
        t >= self.start && t < self.end()
    }

    pub fn get(&self, t: Period) -> SimResult<&T> {
        let i = self.offset(t)?;
        Ok(&self.values[i])
    }

    pub fn get_mut(&mut self, t: Period) -> SimResult<&mut T> {
        let i = self.offset(t)?;
        Ok(&mut self.values[i])
    }

    pub fn set(&mut self, t: Period, value: T) -> SimResult<()> {
        *self.get_mut(t)? = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &T)> {
        let start = self.start;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (start + i as Period, v))
    }

    fn offset(&self, t: Period) -> SimResult<usize> {
        if self.contains(t) {
            Ok((t - self.start) as usize)
        } else {
            Err(SimError::consistency(
                t,
                ConsistencyError::OutOfRange {
                    start: self.start,
                    end: self.end(),
                },
            ))
        }
    }
}

impl<T: Copy> PeriodArray<T> {
    pub fn value(&self, t: Period) -> SimResult<T> {
        self.get(t).copied()
    }
}
