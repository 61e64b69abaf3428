// 🧾 Rental Record
//
// One occupancy session: opened by rent (price = None), closed by exit
// (price = Some). Slot and vehicle are snapshots taken at rent time, so later
// changes to the stored slot (availability flips) are not reflected here.

use super::{Slot, Vehicle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub id: String,

    /// Slot as it was when the rental opened
    pub slot: Slot,

    /// Vehicle as it was when the rental opened
    pub vehicle: Vehicle,

    /// Wall-clock start, nanoseconds since the Unix epoch
    pub start: u64,

    /// Set once, when the rental is closed
    #[serde(default)]
    pub price: Option<u64>,
}

impl RentalRecord {
    pub fn open(slot: Slot, vehicle: Vehicle, start: u64) -> Self {
        RentalRecord {
            id: uuid::Uuid::new_v4().to_string(),
            slot,
            vehicle,
            start,
            price: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.price.is_none()
    }

    /// Open record for this slot address and vehicle number?
    pub fn is_open_for(&self, block: &str, position: &str, vehicle_number: &str) -> bool {
        self.is_open() && self.slot.is_at(block, position) && self.vehicle.number == vehicle_number
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(i64::try_from(self.start).unwrap_or(i64::MAX))
    }
}
