// src/strategy/optimization.rs

//! Newsvendor helpers for sizing order-up-to levels from a demand forecast.

/// Target probability of not stocking out that balances holding cost
/// against the penalty for a lost sale.
///
/// Formula: CR = UnmetPenalty / (UnmetPenalty + HoldingCost)
pub fn critical_ratio(unmet_penalty: f64, holding_cost: f64) -> f64 {
    if unmet_penalty + holding_cost == 0.0 {
        return 0.0;
    }
    unmet_penalty / (unmet_penalty + holding_cost)
}

/// Rational approximation coefficients (Abramowitz and Stegun 26.2.23),
/// absolute error below 4.5e-4.
const NUMERATOR: [f64; 3] = [2.515517, 0.802853, 0.010328];
const DENOMINATOR: [f64; 4] = [1.0, 1.432788, 0.189269, 0.001308];

/// Service levels at or beyond these bounds map to +/- `Z_CAP`.
const Z_CAP: f64 = 5.0;

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Standard normal quantile, approximated.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p >= 1.0 {
        return Z_CAP;
    }
    if p <= 0.0 {
        return -Z_CAP;
    }
    if p == 0.5 {
        return 0.0;
    }

    let tail = p.min(1.0 - p);
    let w = (-2.0 * tail.ln()).sqrt();
    let z = w - polynomial(&NUMERATOR, w) / polynomial(&DENOMINATOR, w);
    if p < 0.5 {
        -z
    } else {
        z
    }
}

/// Order-up-to level covering a risk horizon whose total demand has the
/// given mean and variance.
///
/// # Formula
/// Level = Mean + Z * sqrt(Variance)
///
/// Where Z is the standard normal quantile of `service_level`.
pub fn order_up_to_level(mean: f64, variance: f64, service_level: f64) -> u64 {
    let z = inverse_normal_cdf(service_level);
    let level = mean + z * variance.max(0.0).sqrt();

    if level < 0.0 {
        0
    } else {
        level.round() as u64
    }
}
