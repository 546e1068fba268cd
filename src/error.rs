// src/error.rs

use thiserror::Error;

use crate::lead_time::Link;
use crate::model::FacilityKind;
use crate::Period;

/// Problems detected while building models, before any simulation runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("forecast accuracy curve must start at 0, got {0}")]
    AccuracyStart(f64),

    #[error("forecast accuracy curve must end at 1, got {0}")]
    AccuracyEnd(f64),

    #[error("forecast accuracy curve decreases at level {0}")]
    AccuracyNotMonotone(usize),

    #[error("forecast level {level} exceeds the {max} resolution levels")]
    ForecastLevel { level: usize, max: usize },

    #[error("{what} length {got} does not match expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("cycle offset {offset} of {what} {index} lies outside a cycle of {cycle} periods")]
    CycleOffset {
        what: &'static str,
        index: usize,
        offset: u32,
        cycle: u32,
    },

    #[error("{what} {index} does not exist, the network has {count}")]
    UnknownIndex {
        what: &'static str,
        index: usize,
        count: usize,
    },

    #[error("{link} has a minimum lead time of zero periods")]
    ZeroLeadTime { link: Link },

    #[error("invalid parameter: {0}")]
    Invalid(String),
}

/// Broken invariants discovered while a replication is running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyError {
    #[error("shipment on {link} requested outside its shipment cycle")]
    IneligibleShipment { link: Link },

    #[error("withdrawal of {requested} exceeds on-hand inventory {on_hand}")]
    InsufficientInventory { requested: u64, on_hand: u64 },

    #[error("period outside the recorded range [{start}, {end})")]
    OutOfRange { start: Period, end: Period },

    #[error("{0} queried before generate()")]
    NotGenerated(&'static str),

    #[error("shipment to {destination} sent in period {sent} is due in period {due}, not after it")]
    ArrivalNotAfterDispatch {
        destination: FacilityKind,
        sent: Period,
        due: Period,
    },

    #[error("policy returned {got} {what} quantities, expected {expected}")]
    DecisionLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Lead-time distributions that cannot be trusted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    #[error("lead-time pmf for retailer {retailer} sent in period {period} sums to {sum}")]
    PmfNotNormalized {
        retailer: usize,
        period: Period,
        sum: f64,
    },

    #[error("retailer {retailer} is never accessible, no delivery possible for period {period}")]
    Unreachable { retailer: usize, period: Period },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("period {period}: {kind}")]
    Consistency {
        period: Period,
        kind: ConsistencyError,
    },

    #[error("numerical error: {0}")]
    Numerical(#[from] NumericalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SimError {
    pub fn consistency(period: Period, kind: ConsistencyError) -> Self {
        SimError::Consistency { period, kind }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        SimError::Config(ConfigError::Invalid(message.into()))
    }
}

pub type SimResult<T> = Result<T, SimError>;
