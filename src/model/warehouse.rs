// src/model/warehouse.rs

use crate::error::{SimError, SimResult};
use crate::model::{Facility, FacilityKind, Inventory};
use crate::Period;

/// The national warehouse, replenished from outside on a fixed yearly
/// schedule.
#[derive(Debug, Clone)]
pub struct Warehouse {
    facility: Facility,
    /// Quantity arriving in each period of the year.
    supply_schedule: Vec<u64>,
    shelf_life: Option<u32>,
    expiry_enabled: bool,
}

impl Warehouse {
    pub fn new(supply_schedule: Vec<u64>) -> SimResult<Self> {
        if supply_schedule.is_empty() {
            return Err(SimError::invalid("warehouse supply schedule is empty"));
        }
        Ok(Self {
            facility: Facility::new(FacilityKind::Warehouse, 0, 0, 0, false),
            supply_schedule,
            shelf_life: None,
            expiry_enabled: false,
        })
    }

    /// Periods a supplied lot stays usable once expiry is switched on.
    pub fn with_shelf_life(mut self, periods: u32) -> Self {
        self.shelf_life = Some(periods);
        self
    }

    pub fn periods_in_year(&self) -> usize {
        self.supply_schedule.len()
    }

    pub fn reset(&mut self, start: Period, end: Period, expiry_enabled: bool) {
        self.expiry_enabled = expiry_enabled;
        self.facility = Facility::new(
            FacilityKind::Warehouse,
            start,
            end,
            self.periods_in_year(),
            expiry_enabled,
        );
    }

    /// Receive in-network shipments, then this period's external supply.
    pub fn receive_shipments(&mut self) -> SimResult<u64> {
        let received = self.facility.receive_shipments()?;
        let t = self.facility.period();
        let quantity = self.supply(t);
        let expires = if self.expiry_enabled {
            self.shelf_life.map(|life| t + life as Period)
        } else {
            None
        };
        self.facility
            .receive_external(Inventory::with_lot(quantity, expires))?;
        Ok(received + quantity)
    }

    pub fn supply(&self, t: Period) -> u64 {
        let year = self.supply_schedule.len() as Period;
        self.supply_schedule[t.rem_euclid(year) as usize]
    }

    /// Scheduled external supply for `[t, t + n)`.
    pub fn supply_schedule(&self, t: Period, n: usize) -> Vec<u64> {
        (t..t + n as Period).map(|u| self.supply(u)).collect()
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn facility_mut(&mut self) -> &mut Facility {
        &mut self.facility
    }
}
