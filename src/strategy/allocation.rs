// src/strategy/allocation.rs

//! Rationing of scarce supplier stock between competing orders.

use serde::{Deserialize, Serialize};

/// Shipments leave the warehouse in boxes of this many units.
pub const BOX_SIZE: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allocation {
    /// Serve orders in index order until stock runs out.
    Priority,
    /// Scale every order by the same fraction when stock is short.
    Proportional,
}

impl Allocation {
    pub fn allocate(&self, inventory: u64, orders: &[u64]) -> Vec<u64> {
        match self {
            Allocation::Priority => priority(inventory, orders),
            Allocation::Proportional => proportional(inventory, orders),
        }
    }
}

pub fn priority(mut inventory: u64, orders: &[u64]) -> Vec<u64> {
    orders
        .iter()
        .map(|&order| {
            let shipped = order.min(inventory);
            inventory -= shipped;
            shipped
        })
        .collect()
}

pub fn proportional(inventory: u64, orders: &[u64]) -> Vec<u64> {
    let total: u64 = orders.iter().sum();
    if total <= inventory {
        return orders.to_vec();
    }
    orders
        .iter()
        .map(|&order| (order as u128 * inventory as u128 / total as u128) as u64)
        .collect()
}

/// Round every shipment up to whole boxes while stock allows, otherwise
/// down. The result never exceeds `inventory` in total.
pub fn round_to_boxes(inventory: u64, shipments: &[u64], box_size: u64) -> Vec<u64> {
    if box_size == 0 {
        return shipments.to_vec();
    }
    let mut remaining = inventory;
    shipments
        .iter()
        .map(|&q| {
            let up = q.div_ceil(box_size) * box_size;
            let rounded = if up <= remaining {
                up
            } else {
                (q.min(remaining) / box_size) * box_size
            };
            remaining -= rounded;
            rounded
        })
        .collect()
}
