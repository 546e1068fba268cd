// src/model/inventory.rs

use std::collections::VecDeque;

use crate::error::ConsistencyError;
use crate::Period;

/// A quantity of stock that entered the system together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lot {
    pub quantity: u64,
    /// Last period in which the lot is still usable. `None` never expires.
    pub expires: Option<Period>,
}

/// FIFO ledger of on-hand stock.
///
/// Withdrawals consume the oldest lots first and hand the consumed lots back
/// as a new `Inventory`, so expiry dates travel with the stock through the
/// shipment pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    lots: VecDeque<Lot>,
    level: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lot(quantity: u64, expires: Option<Period>) -> Self {
        let mut inventory = Self::new();
        inventory.add(quantity, expires);
        inventory
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }

    pub fn add(&mut self, quantity: u64, expires: Option<Period>) {
        if quantity == 0 {
            return;
        }
        self.lots.push_back(Lot { quantity, expires });
        self.level += quantity;
    }

    /// Append every lot of `other` behind the current stock.
    pub fn merge(&mut self, other: Inventory) {
        self.level += other.level;
        self.lots.extend(other.lots);
    }

    /// Remove `quantity` units, oldest first.
    pub fn withdraw(&mut self, quantity: u64) -> Result<Inventory, ConsistencyError> {
        if quantity > self.level {
            return Err(ConsistencyError::InsufficientInventory {
                requested: quantity,
                on_hand: self.level,
            });
        }

        let mut taken = Inventory::new();
        let mut remaining = quantity;
        while remaining > 0 {
            let Some(mut lot) = self.lots.pop_front() else {
                break;
            };
            if lot.quantity > remaining {
                lot.quantity -= remaining;
                taken.add(remaining, lot.expires);
                self.lots.push_front(lot);
                remaining = 0;
            } else {
                remaining -= lot.quantity;
                taken.add(lot.quantity, lot.expires);
            }
        }
        self.level -= quantity;
        Ok(taken)
    }

    /// Drop every lot whose expiry precedes period `t`. Returns the quantity
    /// written off.
    pub fn expire(&mut self, t: Period) -> u64 {
        let before = self.level;
        self.lots
            .retain(|lot| lot.expires.map_or(true, |expires| expires >= t));
        self.level = self.lots.iter().map(|lot| lot.quantity).sum();
        before - self.level
    }
}
