// src/model/shipment.rs

use crate::lead_time::LeadTimePmf;
use crate::model::{FacilityKind, Inventory};
use crate::Period;

/// Goods in transit. Immutable once dispatched.
///
/// The shipment keeps its own copy of the lead-time distribution that was in
/// force when it left, so policies reading the pipeline see the uncertainty
/// of that moment and cannot alter it.
#[derive(Debug, Clone)]
pub struct Shipment {
    destination: FacilityKind,
    period_sent: Period,
    lead_time: Option<u32>,
    contents: Inventory,
    pmf: LeadTimePmf,
}

impl Shipment {
    pub fn new(
        destination: FacilityKind,
        period_sent: Period,
        lead_time: Option<u32>,
        contents: Inventory,
        pmf: LeadTimePmf,
    ) -> Self {
        Self {
            destination,
            period_sent,
            lead_time,
            contents,
            pmf,
        }
    }

    pub fn destination(&self) -> FacilityKind {
        self.destination
    }

    pub fn period_sent(&self) -> Period {
        self.period_sent
    }

    /// Realized lead time; `None` if the shipment never arrives.
    pub fn lead_time(&self) -> Option<u32> {
        self.lead_time
    }

    pub fn period_arrive(&self) -> Option<Period> {
        self.lead_time.map(|l| self.period_sent + l as Period)
    }

    pub fn quantity(&self) -> u64 {
        self.contents.level()
    }

    pub fn pmf(&self) -> &LeadTimePmf {
        &self.pmf
    }

    pub(crate) fn into_contents(self) -> Inventory {
        self.contents
    }
}
