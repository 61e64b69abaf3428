// 🅿️ Parking Area - slot storage and lookup by logical address
//
// Slots are stored by UUID. Lookup by (block, position) scans the store in
// insertion order and returns the first match, so if the grid was initialised
// twice the older slot wins.

use crate::entities::Slot;
use crate::error::{LedgerError, Result};
use crate::store::KeyValueStore;

pub struct ParkingArea {
    slots: Box<dyn KeyValueStore<Slot>>,
}

impl ParkingArea {
    pub fn new(slots: Box<dyn KeyValueStore<Slot>>) -> Self {
        ParkingArea { slots }
    }

    /// Store a slot as given (id, address and availability are not checked)
    pub fn add_slot(&self, slot: Slot) -> Result<Slot> {
        self.slots.insert(&slot.id, slot.clone())?;
        Ok(slot)
    }

    /// First slot at (block, position), or InvalidSlot
    pub fn find_slot(&self, block: &str, position: &str) -> Result<Slot> {
        self.slots
            .values()?
            .into_iter()
            .find(|slot| slot.is_at(block, position))
            .ok_or_else(|| LedgerError::invalid_slot(block, position))
    }

    /// Read-modify-write of the availability flag for a slot id
    pub fn set_availability(&self, id: &str, available: bool) -> Result<Slot> {
        let current = self
            .slots
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("slot {}", id)))?;

        let updated = current.with_availability(available);
        self.slots.insert(id, updated.clone())?;
        Ok(updated)
    }

    pub fn all_slots(&self) -> Result<Vec<Slot>> {
        self.slots.values()
    }

    pub fn count(&self) -> Result<usize> {
        self.slots.len()
    }

    pub fn available_slots(&self) -> Result<Vec<Slot>> {
        Ok(self
            .all_slots()?
            .into_iter()
            .filter(|slot| slot.available)
            .collect())
    }
}
