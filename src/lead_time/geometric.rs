// src/lead_time/geometric.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConsistencyError, NumericalError, SimError, SimResult};
use crate::lead_time::{LeadTimeModel, LeadTimePmf, Link, ShipmentCycle};
use crate::model::PeriodArray;
use crate::Period;

/// Remaining probability below which the tail is collapsed onto the next
/// accessible period.
const DUMP_THRESHOLD: f64 = 0.001;
const PMF_TOLERANCE: f64 = 1e-9;
/// Upper bound on the pmf sweep; reaching it means the link is effectively
/// unreachable.
const MAX_SWEEP_PERIODS: u32 = 1_000_000;

/// Geometric carrier visits with seasonal accessibility.
///
/// Every period the carrier serving retailer `r` visits with probability
/// `accessibility(r, t) / mean_secondary_lead_time[r]`. A shipment arrives at
/// the first visit after it has reached the district. The warehouse to
/// district leg is deterministic: `delay + primary_lead_time[d]`.
#[derive(Debug, Clone)]
pub struct GeometricLeadTime {
    cycle: ShipmentCycle,
    primary_lead_times: Vec<u32>,
    mean_secondary_lead_times: Vec<f64>,
    accessibility: Vec<Vec<f64>>,
    visit_probability: Vec<f64>,
    realized: Option<Realized>,
}

#[derive(Debug, Clone)]
struct Realized {
    total: Vec<PeriodArray<Option<u32>>>,
    secondary: Vec<PeriodArray<Option<u32>>>,
}

impl GeometricLeadTime {
    pub fn new(
        cycle: ShipmentCycle,
        primary_lead_times: Vec<u32>,
        mean_secondary_lead_times: Vec<f64>,
        accessibility: Vec<Vec<f64>>,
    ) -> SimResult<Self> {
        let retailers = cycle.num_retailers();
        if primary_lead_times.len() != cycle.num_districts() {
            return Err(ConfigError::LengthMismatch {
                what: "primary lead times",
                expected: cycle.num_districts(),
                got: primary_lead_times.len(),
            }
            .into());
        }
        if mean_secondary_lead_times.len() != retailers {
            return Err(ConfigError::LengthMismatch {
                what: "mean secondary lead times",
                expected: retailers,
                got: mean_secondary_lead_times.len(),
            }
            .into());
        }
        if accessibility.len() != retailers {
            return Err(ConfigError::LengthMismatch {
                what: "accessibility rows",
                expected: retailers,
                got: accessibility.len(),
            }
            .into());
        }
        let year = accessibility.first().map_or(0, Vec::len);
        if year == 0 {
            return Err(SimError::invalid("accessibility table has no periods"));
        }
        for row in &accessibility {
            if row.len() != year {
                return Err(ConfigError::LengthMismatch {
                    what: "accessibility row",
                    expected: year,
                    got: row.len(),
                }
                .into());
            }
            if let Some(a) = row.iter().find(|a| !(0.0..=1.0).contains(*a)) {
                return Err(SimError::invalid(format!("accessibility {a} outside [0, 1]")));
            }
        }
        // secondary hops always take at least one period, the primary hop
        // is fixed and may not be instant
        if let Some(d) = primary_lead_times
            .iter()
            .position(|&l| cycle.delay() + l == 0)
        {
            return Err(ConfigError::ZeroLeadTime {
                link: Link::WarehouseToDistrict(d),
            }
            .into());
        }
        if let Some(m) = mean_secondary_lead_times
            .iter()
            .find(|m| !m.is_finite() || **m < 1.0)
        {
            return Err(SimError::invalid(format!(
                "mean secondary lead time {m} must be at least one period"
            )));
        }

        let visit_probability = mean_secondary_lead_times.iter().map(|m| 1.0 / m).collect();

        Ok(Self {
            cycle,
            primary_lead_times,
            mean_secondary_lead_times,
            accessibility,
            visit_probability,
            realized: None,
        })
    }

    pub fn mean_secondary_lead_times(&self) -> &[f64] {
        &self.mean_secondary_lead_times
    }

    pub fn visit_probability(&self, retailer: usize) -> f64 {
        self.visit_probability[retailer]
    }

    /// Minimum total lead time before a visit can deliver: both delay hops,
    /// the primary leg, and one period since goods cannot leave the district
    /// in the period they reach it.
    fn first_total_arrival(&self, retailer: usize) -> u32 {
        let district = self.cycle.district_of(retailer);
        2 * self.cycle.delay() + self.primary_lead_times[district] + 1
    }

    fn first_secondary_arrival(&self) -> u32 {
        self.cycle.delay() + 1
    }

    fn realized(&self, t: Period) -> SimResult<&Realized> {
        self.realized.as_ref().ok_or_else(|| {
            SimError::consistency(t, ConsistencyError::NotGenerated("geometric lead time"))
        })
    }

    /// Sequential remaining-probability sweep from `first_lead` onwards.
    fn sweep_pmf(&self, retailer: usize, t: Period, first_lead: u32) -> SimResult<LeadTimePmf> {
        if self.mean_accessibility(retailer) <= 0.0 {
            return Err(NumericalError::Unreachable { retailer, period: t }.into());
        }

        let v = self.visit_probability[retailer];
        let mut probabilities = vec![0.0; first_lead as usize];
        let mut remaining = 1.0;
        let mut lead = first_lead;
        loop {
            let a = self.accessibility(retailer, t + lead as Period);
            if a > 0.0 && remaining < DUMP_THRESHOLD {
                probabilities.push(remaining);
                break;
            }
            let mass = remaining * v * a;
            probabilities.push(mass);
            remaining -= mass;
            if remaining <= 0.0 {
                break;
            }
            lead += 1;
            if lead - first_lead > MAX_SWEEP_PERIODS {
                return Err(NumericalError::Unreachable { retailer, period: t }.into());
            }
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PMF_TOLERANCE {
            return Err(NumericalError::PmfNotNormalized {
                retailer,
                period: t,
                sum,
            }
            .into());
        }
        Ok(LeadTimePmf::from_probabilities(probabilities))
    }
}

/// First visited period in `[from, end)`, as an offset from `sent`.
fn first_visit(visited: &PeriodArray<bool>, sent: Period, from: Period) -> Option<u32> {
    (from.max(visited.start())..visited.end())
        .find(|&y| visited.value(y).unwrap_or(false))
        .map(|y| (y - sent) as u32)
}

impl LeadTimeModel for GeometricLeadTime {
    fn cycle(&self) -> &ShipmentCycle {
        &self.cycle
    }

    fn periods_in_year(&self) -> usize {
        self.accessibility[0].len()
    }

    fn generate(&mut self, start: Period, end: Period, seed: u64) -> SimResult<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        let retailers = self.cycle.num_retailers();

        let visited: Vec<PeriodArray<bool>> = (0..retailers)
            .map(|r| {
                PeriodArray::from_fn(start, end, |t| {
                    rng.gen::<f64>() < self.visit_probability[r] * self.accessibility(r, t)
                })
            })
            .collect();

        let mut total = Vec::with_capacity(retailers);
        let mut secondary = Vec::with_capacity(retailers);
        for (r, visits) in visited.iter().enumerate() {
            let first_total = self.first_total_arrival(r) as Period;
            let first_secondary = self.first_secondary_arrival() as Period;
            total.push(PeriodArray::from_fn(start, end, |t| {
                if self.cycle.is_total_shipment_period(r, t) {
                    first_visit(visits, t, t + first_total)
                } else {
                    None
                }
            }));
            secondary.push(PeriodArray::from_fn(start, end, |t| {
                if self.cycle.is_secondary_shipment_period(r, t) {
                    first_visit(visits, t, t + first_secondary)
                } else {
                    None
                }
            }));
        }

        debug!(start, end, seed, retailers, "generated geometric lead times");
        self.realized = Some(Realized { total, secondary });
        Ok(())
    }

    fn primary_lead_time(&self, district: usize, t: Period) -> SimResult<Option<u32>> {
        Ok(self
            .cycle
            .is_primary_shipment_period(district, t)
            .then(|| self.cycle.delay() + self.primary_lead_times[district]))
    }

    fn secondary_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        if !self.cycle.is_secondary_shipment_period(retailer, t) {
            return Ok(None);
        }
        self.realized(t)?.secondary[retailer].value(t)
    }

    fn total_lead_time(&self, retailer: usize, t: Period) -> SimResult<Option<u32>> {
        if !self.cycle.is_total_shipment_period(retailer, t) {
            return Ok(None);
        }
        self.realized(t)?.total[retailer].value(t)
    }

    fn total_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf> {
        if !self.cycle.is_total_shipment_period(retailer, t) {
            return Ok(LeadTimePmf::default());
        }
        self.sweep_pmf(retailer, t, self.first_total_arrival(retailer))
    }

    fn secondary_lead_time_pmf(&self, retailer: usize, t: Period) -> SimResult<LeadTimePmf> {
        if !self.cycle.is_secondary_shipment_period(retailer, t) {
            return Ok(LeadTimePmf::default());
        }
        self.sweep_pmf(retailer, t, self.first_secondary_arrival())
    }

    fn accessibility(&self, retailer: usize, t: Period) -> f64 {
        let row = &self.accessibility[retailer];
        row[t.rem_euclid(row.len() as Period) as usize]
    }

    fn mean_accessibility(&self, retailer: usize) -> f64 {
        let row = &self.accessibility[retailer];
        row.iter().sum::<f64>() / row.len() as f64
    }
}

/// Collects the scenario tables for a [`GeometricLeadTime`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometricLeadTimeBuilder {
    cycle_length: u32,
    primary_offsets: Vec<u32>,
    secondary_offsets: Vec<u32>,
    delay: u32,
    retailer_to_district: Vec<usize>,
    primary_lead_times: Vec<u32>,
    mean_secondary_lead_times: Vec<f64>,
    accessibility: Vec<Vec<f64>>,
}

impl GeometricLeadTimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle_length(mut self, cycle_length: u32) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    pub fn primary_offsets(mut self, offsets: Vec<u32>) -> Self {
        self.primary_offsets = offsets;
        self
    }

    pub fn secondary_offsets(mut self, offsets: Vec<u32>) -> Self {
        self.secondary_offsets = offsets;
        self
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    pub fn retailer_to_district(mut self, mapping: Vec<usize>) -> Self {
        self.retailer_to_district = mapping;
        self
    }

    pub fn primary_lead_times(mut self, lead_times: Vec<u32>) -> Self {
        self.primary_lead_times = lead_times;
        self
    }

    pub fn mean_secondary_lead_times(mut self, lead_times: Vec<f64>) -> Self {
        self.mean_secondary_lead_times = lead_times;
        self
    }

    pub fn accessibility(mut self, accessibility: Vec<Vec<f64>>) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn get_accessibility(&self) -> &[Vec<f64>] {
        &self.accessibility
    }

    pub fn get_mean_secondary_lead_times(&self) -> &[f64] {
        &self.mean_secondary_lead_times
    }

    pub fn num_retailers(&self) -> usize {
        self.retailer_to_district.len()
    }

    pub fn build(&self) -> SimResult<GeometricLeadTime> {
        let cycle = ShipmentCycle::new(
            self.cycle_length,
            self.primary_offsets.clone(),
            self.secondary_offsets.clone(),
            self.delay,
            self.retailer_to_district.clone(),
        )?;
        GeometricLeadTime::new(
            cycle,
            self.primary_lead_times.clone(),
            self.mean_secondary_lead_times.clone(),
            self.accessibility.clone(),
        )
    }
}
