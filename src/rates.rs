// 💰 Rate Table
//
// Hourly rate per vehicle class, in abstract currency units.
// Pricing: started hours are billed in full (ceil), so a rental that is one
// nanosecond old already costs one hour.

use crate::entities::VehicleClass;
use serde::{Deserialize, Serialize};

pub const CAR_RATE: u64 = 3000;
pub const MOTORCYCLE_RATE: u64 = 1500;
pub const BICYCLE_RATE: u64 = 1000;

pub const NANOS_PER_HOUR: u64 = 3_600 * 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRate {
    pub class: VehicleClass,
    pub rate: u64,
}

pub struct RateTable;

impl RateTable {
    /// Hourly rate for a class. Unknown classes fall back to the bicycle rate.
    pub fn rate_for(class: &VehicleClass) -> u64 {
        match class {
            VehicleClass::Car => CAR_RATE,
            VehicleClass::Motorcycle => MOTORCYCLE_RATE,
            VehicleClass::Bicycle | VehicleClass::Unknown(_) => BICYCLE_RATE,
        }
    }

    /// The rate table as exposed to callers (known classes only)
    pub fn list() -> Vec<VehicleRate> {
        VehicleClass::KNOWN
            .into_iter()
            .map(|class| VehicleRate {
                rate: Self::rate_for(&class),
                class,
            })
            .collect()
    }

    /// Whole hours between start and end, rounded up. Zero if end <= start.
    pub fn billable_hours(start_ns: u64, end_ns: u64) -> u64 {
        end_ns.saturating_sub(start_ns).div_ceil(NANOS_PER_HOUR)
    }

    /// price = ceil(elapsed / 1h) * rate
    pub fn price(class: &VehicleClass, start_ns: u64, end_ns: u64) -> u64 {
        Self::billable_hours(start_ns, end_ns).saturating_mul(Self::rate_for(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: u64 = 60 * 1_000_000_000;

    #[test]
    fn test_rates() {
        assert_eq!(RateTable::rate_for(&VehicleClass::Car), 3000);
        assert_eq!(RateTable::rate_for(&VehicleClass::Motorcycle), 1500);
        assert_eq!(RateTable::rate_for(&VehicleClass::Bicycle), 1000);
    }

    #[test]
    fn test_unknown_class_falls_back_to_bicycle_rate() {
        let truck = VehicleClass::Unknown("truck".to_string());
        assert_eq!(RateTable::rate_for(&truck), BICYCLE_RATE);
    }

    #[test]
    fn test_list_contains_known_classes_only() {
        let rates = RateTable::list();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0], VehicleRate { class: VehicleClass::Car, rate: 3000 });
        assert_eq!(rates[1].class, VehicleClass::Motorcycle);
        assert_eq!(rates[2].class, VehicleClass::Bicycle);
        assert!(rates.iter().all(|r| r.class.is_known()));
    }

    #[test]
    fn test_billable_hours_round_up() {
        let start = 1_000;
        assert_eq!(RateTable::billable_hours(start, start), 0);
        assert_eq!(RateTable::billable_hours(start, start + 1), 1);
        assert_eq!(RateTable::billable_hours(start, start + 60 * MINUTE), 1);
        assert_eq!(RateTable::billable_hours(start, start + 60 * MINUTE + 1), 2);
        assert_eq!(RateTable::billable_hours(start, start + 90 * MINUTE), 2);
    }

    #[test]
    fn test_clock_going_backwards_bills_nothing() {
        assert_eq!(RateTable::billable_hours(5_000, 1_000), 0);
        assert_eq!(RateTable::price(&VehicleClass::Car, 5_000, 1_000), 0);
    }

    #[test]
    fn test_price_ninety_minutes_car() {
        assert_eq!(RateTable::price(&VehicleClass::Car, 0, 90 * MINUTE), 6000);
        assert_eq!(RateTable::price(&VehicleClass::Motorcycle, 0, 90 * MINUTE), 3000);
    }
}
