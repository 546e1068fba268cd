// src/lead_time/cycle.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimResult};
use crate::Period;

/// A transport link of the network, named by its downstream end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    /// Cross-dock delivery from the national warehouse to a retailer.
    WarehouseToRetailer(usize),
    WarehouseToDistrict(usize),
    DistrictToRetailer(usize),
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::WarehouseToRetailer(r) => write!(f, "warehouse -> retailer {r}"),
            Link::WarehouseToDistrict(d) => write!(f, "warehouse -> district {d}"),
            Link::DistrictToRetailer(r) => write!(f, "district -> retailer {r}"),
        }
    }
}

/// Which periods each link may dispatch in.
///
/// Orders travel upstream with a communication delay of `delay` periods, so
/// a link is eligible in period `t` when `(t + k * delay) mod cycle` equals
/// its offset, with `k = 1` for a single hop and `k = 2` for a warehouse to
/// retailer delivery that crosses two hops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentCycle {
    cycle_length: u32,
    primary_offsets: Vec<u32>,
    secondary_offsets: Vec<u32>,
    delay: u32,
    retailer_to_district: Vec<usize>,
}

impl ShipmentCycle {
    pub fn new(
        cycle_length: u32,
        primary_offsets: Vec<u32>,
        secondary_offsets: Vec<u32>,
        delay: u32,
        retailer_to_district: Vec<usize>,
    ) -> SimResult<Self> {
        if cycle_length == 0 {
            return Err(ConfigError::Invalid("cycle length must be positive".into()).into());
        }
        if secondary_offsets.len() != retailer_to_district.len() {
            return Err(ConfigError::LengthMismatch {
                what: "secondary cycle offsets",
                expected: retailer_to_district.len(),
                got: secondary_offsets.len(),
            }
            .into());
        }
        let districts = retailer_to_district.iter().max().map_or(0, |d| d + 1);
        if primary_offsets.len() != districts {
            return Err(ConfigError::LengthMismatch {
                what: "primary cycle offsets",
                expected: districts,
                got: primary_offsets.len(),
            }
            .into());
        }
        for (what, offsets) in [("district", &primary_offsets), ("retailer", &secondary_offsets)] {
            if let Some((index, &offset)) = offsets
                .iter()
                .enumerate()
                .find(|(_, &o)| o >= cycle_length)
            {
                return Err(ConfigError::CycleOffset {
                    what,
                    index,
                    offset,
                    cycle: cycle_length,
                }
                .into());
            }
        }

        Ok(Self {
            cycle_length,
            primary_offsets,
            secondary_offsets,
            delay,
            retailer_to_district,
        })
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn num_districts(&self) -> usize {
        self.primary_offsets.len()
    }

    pub fn num_retailers(&self) -> usize {
        self.retailer_to_district.len()
    }

    pub fn district_of(&self, retailer: usize) -> usize {
        self.retailer_to_district[retailer]
    }

    pub fn retailers_of(&self, district: usize) -> impl Iterator<Item = usize> + '_ {
        self.retailer_to_district
            .iter()
            .enumerate()
            .filter(move |(_, &d)| d == district)
            .map(|(r, _)| r)
    }

    pub fn is_primary_shipment_period(&self, district: usize, t: Period) -> bool {
        self.phase(t, 1) == self.primary_offsets[district]
    }

    pub fn is_secondary_shipment_period(&self, retailer: usize, t: Period) -> bool {
        self.phase(t, 1) == self.secondary_offsets[retailer]
    }

    pub fn is_total_shipment_period(&self, retailer: usize, t: Period) -> bool {
        self.phase(t, 2) == self.primary_offsets[self.district_of(retailer)]
    }

    pub fn is_shipment_period(&self, link: Link, t: Period) -> bool {
        match link {
            Link::WarehouseToRetailer(r) => self.is_total_shipment_period(r, t),
            Link::WarehouseToDistrict(d) => self.is_primary_shipment_period(d, t),
            Link::DistrictToRetailer(r) => self.is_secondary_shipment_period(r, t),
        }
    }

    fn phase(&self, t: Period, hops: i64) -> u32 {
        let shifted = t as i64 + hops * self.delay as i64;
        shifted.rem_euclid(self.cycle_length as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn cycle() -> ShipmentCycle {
        ShipmentCycle::new(4, vec![1, 3], vec![0, 2, 0], 1, vec![0, 0, 1]).unwrap()
    }

    #[test]
    fn single_hop_uses_one_delay() {
        let c = cycle();
        // (0 + 1) mod 4 == 1
        assert!(c.is_primary_shipment_period(0, 0));
        assert!(c.is_primary_shipment_period(0, 4));
        assert!(!c.is_primary_shipment_period(0, 1));
        assert!(c.is_secondary_shipment_period(1, 1));
        assert!(c.is_secondary_shipment_period(0, -1));
    }

    #[test]
    fn total_shipments_use_two_delays() {
        let c = cycle();
        // district 1 offset 3: (t + 2) mod 4 == 3 -> t = 1, 5, -3
        assert!(c.is_total_shipment_period(2, 1));
        assert!(c.is_total_shipment_period(2, -3));
        assert!(!c.is_total_shipment_period(2, 2));
        assert!(c.is_shipment_period(Link::WarehouseToRetailer(2), 5));
    }

    #[test]
    fn rejects_mismatched_topology() {
        let err = ShipmentCycle::new(4, vec![0], vec![0, 0], 0, vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::LengthMismatch { what: "primary cycle offsets", .. })
        ));
        let err = ShipmentCycle::new(4, vec![0], vec![0], 0, vec![0, 0]).unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::LengthMismatch { .. })));
    }

    #[test]
    fn rejects_offsets_outside_cycle() {
        let err = ShipmentCycle::new(3, vec![3], vec![0], 0, vec![0]).unwrap_err();
        assert!(matches!(
            err,
            SimError::Config(ConfigError::CycleOffset { offset: 3, cycle: 3, .. })
        ));
    }

    #[test]
    fn lists_retailers_of_district() {
        let c = cycle();
        assert_eq!(c.retailers_of(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(c.retailers_of(1).collect::<Vec<_>>(), vec![2]);
    }
}
