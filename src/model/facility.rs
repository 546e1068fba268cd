// src/model/facility.rs

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{ConsistencyError, SimError, SimResult};
use crate::model::{Inventory, PeriodArray, Shipment};
use crate::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FacilityKind {
    Warehouse,
    District(usize),
    Retailer(usize),
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityKind::Warehouse => write!(f, "Warehouse"),
            FacilityKind::District(d) => write!(f, "District {d}"),
            FacilityKind::Retailer(r) => write!(f, "Retailer {r}"),
        }
    }
}

/// A stocking point: on-hand inventory, inbound pipeline and per-period
/// accounting.
///
/// Within period `t` the ledger satisfies
/// `ending(t) == starting(t) + received(t) - issued(t)`. Expired stock is
/// written off between periods and booked against the new period before its
/// starting snapshot.
#[derive(Debug, Clone)]
pub struct Facility {
    kind: FacilityKind,
    period: Period,
    inventory: Inventory,
    pipeline: Vec<Shipment>,
    expiry_enabled: bool,

    starting: PeriodArray<u64>,
    available: PeriodArray<u64>,
    ending: PeriodArray<u64>,
    received: PeriodArray<u64>,
    expired: PeriodArray<u64>,
    // These two reach `history` periods before the start.
    issued: PeriodArray<u64>,
    orders: PeriodArray<u64>,
}

impl Facility {
    pub fn new(
        kind: FacilityKind,
        start: Period,
        end: Period,
        history: usize,
        expiry_enabled: bool,
    ) -> Self {
        let history_start = start - history as Period;
        Self {
            kind,
            period: start,
            inventory: Inventory::new(),
            pipeline: Vec::new(),
            expiry_enabled,
            starting: PeriodArray::new(start, end, 0),
            available: PeriodArray::new(start, end, 0),
            ending: PeriodArray::new(start, end, 0),
            received: PeriodArray::new(start, end, 0),
            expired: PeriodArray::new(start, end, 0),
            issued: PeriodArray::new(history_start, end, 0),
            orders: PeriodArray::new(history_start, end, 0),
        }
    }

    pub fn kind(&self) -> FacilityKind {
        self.kind
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn start(&self) -> Period {
        self.starting.start()
    }

    pub fn end(&self) -> Period {
        self.starting.end()
    }

    /// Move every shipment due this period into stock.
    pub fn receive_shipments(&mut self) -> SimResult<u64> {
        let t = self.period;
        self.starting.set(t, self.inventory.level())?;

        let (arrived, in_transit): (Vec<_>, Vec<_>) = self
            .pipeline
            .drain(..)
            .partition(|s| s.period_arrive() == Some(t));
        self.pipeline = in_transit;

        let mut quantity = 0;
        for shipment in arrived {
            quantity += shipment.quantity();
            self.inventory.merge(shipment.into_contents());
        }
        self.received.set(t, quantity)?;
        self.available.set(t, self.inventory.level())?;
        Ok(quantity)
    }

    /// Book stock that enters from outside the network.
    pub fn receive_external(&mut self, stock: Inventory) -> SimResult<()> {
        let t = self.period;
        *self.received.get_mut(t)? += stock.level();
        self.inventory.merge(stock);
        self.available.set(t, self.inventory.level())?;
        Ok(())
    }

    /// Take `quantity` out of stock and record it as issued this period.
    pub fn withdraw(&mut self, quantity: u64) -> SimResult<Inventory> {
        let t = self.period;
        let taken = self
            .inventory
            .withdraw(quantity)
            .map_err(|kind| SimError::consistency(t, kind))?;
        *self.issued.get_mut(t)? += quantity;
        Ok(taken)
    }

    /// Put a shipment in transit. It must be due after the current period,
    /// since this period's receipts are already booked.
    pub fn add_shipment(&mut self, shipment: Shipment) -> SimResult<()> {
        if let Some(due) = shipment.period_arrive() {
            if due <= self.period {
                return Err(SimError::consistency(
                    self.period,
                    ConsistencyError::ArrivalNotAfterDispatch {
                        destination: shipment.destination(),
                        sent: shipment.period_sent(),
                        due,
                    },
                ));
            }
        }
        self.pipeline.push(shipment);
        Ok(())
    }

    pub fn add_order(&mut self, quantity: u64) -> SimResult<()> {
        *self.orders.get_mut(self.period)? += quantity;
        Ok(())
    }

    pub fn advance_to_next_period(&mut self) -> SimResult<()> {
        let t = self.period;
        self.ending.set(t, self.inventory.level())?;
        self.period = t + 1;

        if self.expiry_enabled && self.expired.contains(self.period) {
            let lost = self.inventory.expire(self.period);
            if lost > 0 {
                warn!(facility = %self.kind, period = self.period, lost, "stock expired");
            }
            self.expired.set(self.period, lost)?;
        }
        Ok(())
    }

    pub fn inventory_level(&self) -> u64 {
        self.inventory.level()
    }

    /// On-hand stock plus everything still in transit towards this facility.
    pub fn inventory_position(&self) -> u64 {
        self.inventory.level() + self.pipeline_quantity()
    }

    pub fn pipeline(&self) -> &[Shipment] {
        &self.pipeline
    }

    pub fn pipeline_quantity(&self) -> u64 {
        self.pipeline.iter().map(Shipment::quantity).sum()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Overwrite the issues of a history period.
    pub fn set_issues(&mut self, t: Period, quantity: u64) -> SimResult<()> {
        self.issued.set(t, quantity)
    }

    pub fn issues(&self, t: Period) -> SimResult<u64> {
        self.issued.value(t)
    }

    pub fn orders(&self, t: Period) -> SimResult<u64> {
        self.orders.value(t)
    }

    /// Stock on hand at the start of `t`, before receipts.
    pub fn starting_inventory(&self, t: Period) -> SimResult<u64> {
        self.starting.value(t)
    }

    /// Stock on hand in `t` after receipts.
    pub fn available_inventory(&self, t: Period) -> SimResult<u64> {
        self.available.value(t)
    }

    pub fn ending_inventory(&self, t: Period) -> SimResult<u64> {
        self.ending.value(t)
    }

    pub fn received(&self, t: Period) -> SimResult<u64> {
        self.received.value(t)
    }

    pub fn expired(&self, t: Period) -> SimResult<u64> {
        self.expired.value(t)
    }
}
