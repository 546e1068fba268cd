// src/lead_time/pmf.rs

/// Probability mass function of a shipment's lead time.
///
/// Entry `l` is the probability that a shipment arrives exactly `l` periods
/// after it was sent. An empty pmf means no delivery is possible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadTimePmf {
    probabilities: Vec<f64>,
}

impl LeadTimePmf {
    pub fn from_probabilities(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    pub fn point_mass(lead_time: u32) -> Self {
        let mut probabilities = vec![0.0; lead_time as usize + 1];
        probabilities[lead_time as usize] = 1.0;
        Self { probabilities }
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn probability(&self, lead_time: u32) -> f64 {
        self.probabilities
            .get(lead_time as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(l, p)| l as f64 * p)
            .sum()
    }

    /// Shortest lead time with positive probability.
    pub fn min_lead_time(&self) -> Option<u32> {
        self.probabilities
            .iter()
            .position(|&p| p > 0.0)
            .map(|l| l as u32)
    }

    /// Smallest lead time whose cumulative probability reaches `p`.
    pub fn quantile(&self, p: f64) -> Option<u32> {
        let target = p.clamp(0.0, 1.0);
        let mut cumulative = 0.0;
        for (l, &mass) in self.probabilities.iter().enumerate() {
            cumulative += mass;
            // Tolerate rounding in the running sum.
            if mass > 0.0 && cumulative >= target - 1e-12 {
                return Some(l as u32);
            }
        }
        self.probabilities
            .iter()
            .rposition(|&mass| mass > 0.0)
            .map(|l| l as u32)
    }

    /// Distribution of the lead time given it is at least `min_lead_time`,
    /// e.g. for a pipeline shipment that has not arrived yet.
    pub fn conditional(&self, min_lead_time: u32) -> Option<LeadTimePmf> {
        let cut = (min_lead_time as usize).min(self.probabilities.len());
        let remaining: f64 = self.probabilities[cut..].iter().sum();
        if remaining <= 0.0 {
            return None;
        }
        let probabilities = self
            .probabilities
            .iter()
            .enumerate()
            .map(|(l, &p)| if l < cut { 0.0 } else { p / remaining })
            .collect();
        Some(LeadTimePmf { probabilities })
    }
}
