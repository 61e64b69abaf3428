// 🧾 Rental Ledger - slot allocation and rental lifecycle
//
// Per slot:    Available → Occupied → Available ...
// Per rental:  Open (price = None) → Closed (price = Some), terminal
//
// The ledger owns the three stores (slots, vehicles, rentals). Every public
// operation runs under one operation lock, so operations never interleave.
// There is no rollback: a step that already wrote to a store stays written
// when a later step fails.

use crate::clock::{Clock, SystemClock};
use crate::entities::{RentalRecord, Slot, Vehicle, VehicleClass};
use crate::error::{LedgerError, Result};
use crate::grid;
use crate::parking_area::ParkingArea;
use crate::rates::{RateTable, VehicleRate};
use crate::report;
use crate::store::{
    self, KeyValueStore, MemoryStore, SqliteStore, RENTALS_TABLE, SLOTS_TABLE, VEHICLES_TABLE,
};
use crate::vehicles::VehicleRegistry;
use rusqlite::Connection;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ParkingLedger {
    area: ParkingArea,
    vehicles: VehicleRegistry,
    rentals: Box<dyn KeyValueStore<RentalRecord>>,
    clock: Arc<dyn Clock>,
    op_lock: Mutex<()>,
}

impl ParkingLedger {
    pub fn new(
        slots: Box<dyn KeyValueStore<Slot>>,
        vehicles: Box<dyn KeyValueStore<Vehicle>>,
        rentals: Box<dyn KeyValueStore<RentalRecord>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ParkingLedger {
            area: ParkingArea::new(slots),
            vehicles: VehicleRegistry::new(vehicles),
            rentals,
            clock,
            op_lock: Mutex::new(()),
        }
    }

    /// Ledger backed by in-memory stores and the system clock
    pub fn in_memory() -> Self {
        Self::in_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Box::new(MemoryStore::<Slot>::new()),
            Box::new(MemoryStore::<Vehicle>::new()),
            Box::new(MemoryStore::<RentalRecord>::new()),
            clock,
        )
    }

    /// Ledger persisted in a SQLite database file
    pub fn open_sqlite(path: &Path) -> Result<Self> {
        let conn = store::open_database(path)?;
        tracing::info!(path = %path.display(), "ledger database opened");
        Ok(Self::from_shared_connection(conn, Arc::new(SystemClock)))
    }

    /// Ledger persisted through an already opened connection
    pub fn from_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self> {
        store::setup_database(&conn)?;
        Ok(Self::from_shared_connection(Arc::new(Mutex::new(conn)), clock))
    }

    fn from_shared_connection(conn: Arc<Mutex<Connection>>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Box::new(SqliteStore::<Slot>::new(conn.clone(), SLOTS_TABLE)),
            Box::new(SqliteStore::<Vehicle>::new(conn.clone(), VEHICLES_TABLE)),
            Box::new(SqliteStore::<RentalRecord>::new(conn, RENTALS_TABLE)),
            clock,
        )
    }

    fn serialize(&self) -> Result<MutexGuard<'_, ()>> {
        self.op_lock
            .lock()
            .map_err(|_| LedgerError::Poisoned("ledger operation lock"))
    }

    // ========================================================================
    // SLOTS
    // ========================================================================

    /// Append a full grid (45 slots). Not idempotent.
    pub fn initialize_grid(&self) -> Result<Vec<Slot>> {
        let _guard = self.serialize()?;
        grid::initialize_grid(&self.area)
    }

    pub fn list_slots(&self) -> Result<Vec<Slot>> {
        let _guard = self.serialize()?;
        self.area.all_slots()
    }

    pub fn list_available_slots(&self) -> Result<Vec<Slot>> {
        let _guard = self.serialize()?;
        self.area.available_slots()
    }

    pub fn add_slot(&self, slot: Slot) -> Result<Slot> {
        let _guard = self.serialize()?;
        tracing::info!(id = %slot.id, block = %slot.block, position = %slot.position, "slot added");
        self.area.add_slot(slot)
    }

    pub fn find_slot(&self, block: &str, position: &str) -> Result<Slot> {
        let _guard = self.serialize()?;
        self.area.find_slot(block, position)
    }

    // ========================================================================
    // VEHICLES & RATES
    // ========================================================================

    pub fn list_vehicle_rates(&self) -> Vec<VehicleRate> {
        RateTable::list()
    }

    pub fn register_vehicle(&self, number: &str, class: VehicleClass) -> Result<Vehicle> {
        let _guard = self.serialize()?;
        self.vehicles.register(number, class)
    }

    pub fn find_vehicle_by_number(&self, number: &str) -> Result<Vehicle> {
        let _guard = self.serialize()?;
        self.vehicles.find_by_number(number)
    }

    pub fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let _guard = self.serialize()?;
        self.vehicles.all_vehicles()
    }

    // ========================================================================
    // RENTALS
    // ========================================================================

    /// Open a rental on the slot at (block, position).
    ///
    /// The vehicle is registered before the availability check, so a rent
    /// rejected with `InvalidPayload` still leaves the new vehicle stored.
    pub fn rent(
        &self,
        block: &str,
        position: &str,
        vehicle_number: &str,
        vehicle_class: VehicleClass,
    ) -> Result<RentalRecord> {
        let _guard = self.serialize()?;

        let slot = self.area.find_slot(block, position).inspect_err(|_| {
            tracing::warn!(block, position, vehicle_number, "rent rejected: no such slot");
        })?;

        if !vehicle_class.is_known() {
            tracing::warn!(class = %vehicle_class, "unknown vehicle class, bicycle rate applies");
        }
        let vehicle = self.vehicles.register(vehicle_number, vehicle_class)?;

        if !slot.available {
            tracing::warn!(block, position, vehicle_number, "rent rejected: slot not available");
            return Err(LedgerError::InvalidPayload("slot not available".to_string()));
        }

        let rental = RentalRecord::open(slot.clone(), vehicle, self.clock.now_ns());
        self.rentals.insert(&rental.id, rental.clone())?;
        self.area.set_availability(&slot.id, false)?;

        tracing::info!(
            rental = %rental.id,
            block,
            position,
            vehicle_number,
            class = %rental.vehicle.class,
            "rental opened"
        );
        Ok(rental)
    }

    /// Close the open rental for (block, position, vehicle number) and price it.
    pub fn exit(&self, block: &str, position: &str, vehicle_number: &str) -> Result<RentalRecord> {
        let _guard = self.serialize()?;

        let slot = self.area.find_slot(block, position).inspect_err(|_| {
            tracing::warn!(block, position, vehicle_number, "exit rejected: no such slot");
        })?;

        // First vehicle on file with this number; its class sets the rate
        let vehicle = self.vehicles.find_by_number(vehicle_number).inspect_err(|_| {
            tracing::warn!(block, position, vehicle_number, "exit rejected: unknown vehicle");
        })?;

        if slot.available {
            tracing::warn!(block, position, vehicle_number, "exit rejected: slot not rented");
            return Err(LedgerError::InvalidPayload(
                "slot not currently rented".to_string(),
            ));
        }

        let mut rental = self
            .rentals
            .values()?
            .into_iter()
            .find(|rental| rental.is_open_for(block, position, vehicle_number))
            .ok_or_else(|| {
                LedgerError::NotFound(format!(
                    "open rental for {} at {}/{}",
                    vehicle_number, block, position
                ))
            })?;

        let end = self.clock.now_ns();
        let price = RateTable::price(&vehicle.class, rental.start, end);
        rental.price = Some(price);

        self.rentals.insert(&rental.id, rental.clone())?;
        self.area.set_availability(&slot.id, true)?;

        tracing::info!(
            rental = %rental.id,
            block,
            position,
            vehicle_number,
            hours = RateTable::billable_hours(rental.start, end),
            price,
            "rental closed"
        );
        Ok(rental)
    }

    pub fn get_rental(&self, id: &str) -> Result<RentalRecord> {
        let _guard = self.serialize()?;
        self.rentals
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("rental {}", id)))
    }

    pub fn list_rentals(&self) -> Result<Vec<RentalRecord>> {
        let _guard = self.serialize()?;
        self.rentals.values()
    }

    pub fn open_rentals(&self) -> Result<Vec<RentalRecord>> {
        Ok(self
            .list_rentals()?
            .into_iter()
            .filter(RentalRecord::is_open)
            .collect())
    }

    /// Write the whole rental ledger as CSV
    pub fn export_rentals_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rentals = self.list_rentals()?;
        let rows = report::write_rentals_csv(writer, &rentals)?;
        tracing::info!(rows, "rental ledger exported");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rates::NANOS_PER_HOUR;

    const T0: u64 = 1_700_000_000_000_000_000;

    fn ledger() -> (ParkingLedger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let ledger = ParkingLedger::in_memory_with_clock(clock.clone());
        ledger.initialize_grid().unwrap();
        (ledger, clock)
    }

    fn slot(ledger: &ParkingLedger, block: &str, position: &str) -> Slot {
        ledger.find_slot(block, position).unwrap()
    }

    #[test]
    fn test_initialized_grid_is_available() {
        let (ledger, _) = ledger();
        let slots = ledger.list_slots().unwrap();
        assert_eq!(slots.len(), 45);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_list_available_slots() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();

        let free = ledger.list_available_slots().unwrap();
        assert_eq!(free.len(), 44);
        assert!(free.iter().all(|s| !s.is_at("A1", "0")));
    }

    #[test]
    fn test_rent_occupies_slot() {
        let (ledger, _) = ledger();

        let rental = ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();

        assert!(rental.is_open());
        assert_eq!(rental.start, T0);
        assert_eq!(rental.vehicle.number, "XYZ-123");
        assert_eq!(rental.vehicle.class, VehicleClass::Car);
        assert!(!slot(&ledger, "A1", "0").available);
        assert_eq!(ledger.get_rental(&rental.id).unwrap(), rental);
    }

    #[test]
    fn test_rent_snapshot_is_slot_at_rent_time() {
        let (ledger, _) = ledger();
        let before = slot(&ledger, "B2", "3");

        let rental = ledger.rent("B2", "3", "BIKE-1", VehicleClass::Bicycle).unwrap();

        // Stored slot flipped, snapshot did not
        assert_eq!(rental.slot, before);
        assert!(rental.slot.available);
        assert!(!slot(&ledger, "B2", "3").available);

        let vehicle = ledger.find_vehicle_by_number("BIKE-1").unwrap();
        assert_eq!(rental.vehicle, vehicle);
    }

    #[test]
    fn test_rent_taken_slot_fails_and_leaves_orphan_vehicle() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();

        let err = ledger
            .rent("A1", "0", "ABC-999", VehicleClass::Motorcycle)
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidPayload(_)));
        assert!(!slot(&ledger, "A1", "0").available);
        assert_eq!(ledger.list_rentals().unwrap().len(), 1);

        // No rollback: the vehicle registered before the check stays
        let orphan = ledger.find_vehicle_by_number("ABC-999").unwrap();
        assert_eq!(orphan.class, VehicleClass::Motorcycle);
        assert_eq!(ledger.list_vehicles().unwrap().len(), 2);
    }

    #[test]
    fn test_rent_missing_slot() {
        let (ledger, _) = ledger();

        let err = ledger.rent("Z9", "9", "X1", VehicleClass::Car).unwrap_err();

        assert!(matches!(err, LedgerError::InvalidSlot { .. }));
        assert!(ledger.list_rentals().unwrap().is_empty());
        assert!(ledger.list_vehicles().unwrap().is_empty());
    }

    #[test]
    fn test_rent_exit_scenario() {
        let (ledger, clock) = ledger();

        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        assert!(!slot(&ledger, "A1", "0").available);

        let err = ledger
            .rent("A1", "0", "ABC-999", VehicleClass::Motorcycle)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPayload(_)));

        clock.advance_minutes(90);
        let closed = ledger.exit("A1", "0", "XYZ-123").unwrap();

        assert_eq!(closed.price, Some(6000));
        assert!(slot(&ledger, "A1", "0").available);
        assert_eq!(ledger.get_rental(&closed.id).unwrap().price, Some(6000));
    }

    #[test]
    fn test_exit_one_nanosecond_costs_full_hour() {
        let (ledger, clock) = ledger();
        ledger.rent("C1", "2", "MOTO-7", VehicleClass::Motorcycle).unwrap();

        clock.advance(1);
        let closed = ledger.exit("C1", "2", "MOTO-7").unwrap();
        assert_eq!(closed.price, Some(1500));
    }

    #[test]
    fn test_exit_exact_hours() {
        let (ledger, clock) = ledger();
        ledger.rent("C1", "2", "CAR-1", VehicleClass::Car).unwrap();

        clock.advance(3 * NANOS_PER_HOUR);
        let closed = ledger.exit("C1", "2", "CAR-1").unwrap();
        assert_eq!(closed.price, Some(9000));
    }

    #[test]
    fn test_unknown_class_billed_at_bicycle_rate() {
        let (ledger, clock) = ledger();
        ledger
            .rent("A2", "1", "TRUCK-1", VehicleClass::parse("truck"))
            .unwrap();

        clock.advance_minutes(30);
        let closed = ledger.exit("A2", "1", "TRUCK-1").unwrap();
        assert_eq!(closed.price, Some(1000));
    }

    #[test]
    fn test_exit_available_slot_fails() {
        let (ledger, _) = ledger();
        ledger.register_vehicle("XYZ-123", VehicleClass::Car).unwrap();

        let err = ledger.exit("A1", "0", "XYZ-123").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPayload(_)));
    }

    #[test]
    fn test_exit_unknown_vehicle_fails() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();

        let err = ledger.exit("A1", "0", "NOBODY").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert!(!slot(&ledger, "A1", "0").available);
    }

    #[test]
    fn test_exit_missing_slot_fails() {
        let (ledger, _) = ledger();
        let err = ledger.exit("Z9", "9", "XYZ-123").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSlot { .. }));
    }

    #[test]
    fn test_exit_wrong_vehicle_for_slot() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        ledger.rent("A1", "1", "ABC-999", VehicleClass::Car).unwrap();

        // ABC-999 exists but is parked elsewhere
        let err = ledger.exit("A1", "0", "ABC-999").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert!(!slot(&ledger, "A1", "0").available);
    }

    #[test]
    fn test_exit_twice_fails() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        ledger.exit("A1", "0", "XYZ-123").unwrap();

        let err = ledger.exit("A1", "0", "XYZ-123").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPayload(_)));
    }

    #[test]
    fn test_slot_cycles_and_price_is_kept() {
        let (ledger, clock) = ledger();

        let first = ledger.rent("B1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        clock.advance_minutes(10);
        ledger.exit("B1", "0", "XYZ-123").unwrap();

        // Same number rents again: a second vehicle entity is created
        let second = ledger.rent("B1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        assert_ne!(first.vehicle.id, second.vehicle.id);
        assert_eq!(ledger.list_vehicles().unwrap().len(), 2);

        clock.advance_minutes(130);
        let closed = ledger.exit("B1", "0", "XYZ-123").unwrap();
        assert_eq!(closed.id, second.id);
        assert_eq!(closed.price, Some(9000));

        // The first record's price is untouched
        assert_eq!(ledger.get_rental(&first.id).unwrap().price, Some(3000));
        assert!(ledger.open_rentals().unwrap().is_empty());
    }

    #[test]
    fn test_exit_rate_with_duplicate_number() {
        let (ledger, clock) = ledger();

        ledger.rent("B1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        ledger.exit("B1", "0", "XYZ-123").unwrap();

        let second = ledger
            .rent("B1", "0", "XYZ-123", VehicleClass::Motorcycle)
            .unwrap();
        assert_eq!(second.vehicle.class, VehicleClass::Motorcycle);

        clock.advance_minutes(30);
        let closed = ledger.exit("B1", "0", "XYZ-123").unwrap();

        // Rate follows the first vehicle registered under the number (Car)
        let on_file = ledger.find_vehicle_by_number("XYZ-123").unwrap();
        assert_eq!(on_file.class, VehicleClass::Car);
        assert_eq!(closed.id, second.id);
        assert_eq!(closed.price, Some(3000));
        // The snapshot still records what was parked
        assert_eq!(closed.vehicle.class, VehicleClass::Motorcycle);
    }

    #[test]
    fn test_open_rentals() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "ONE", VehicleClass::Car).unwrap();
        ledger.rent("A1", "1", "TWO", VehicleClass::Bicycle).unwrap();
        ledger.exit("A1", "0", "ONE").unwrap();

        let open = ledger.open_rentals().unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].vehicle.number, "TWO");
    }

    #[test]
    fn test_get_unknown_rental() {
        let (ledger, _) = ledger();
        let err = ledger.get_rental("missing").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn test_added_unavailable_slot_cannot_be_rented() {
        let clock = Arc::new(ManualClock::new(T0));
        let ledger = ParkingLedger::in_memory_with_clock(clock);
        ledger
            .add_slot(Slot {
                id: "d1-0".to_string(),
                block: "D1".to_string(),
                position: "0".to_string(),
                available: false,
            })
            .unwrap();

        let err = ledger.rent("D1", "0", "XYZ-123", VehicleClass::Car).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPayload(_)));
    }

    #[test]
    fn test_list_vehicle_rates() {
        let (ledger, _) = ledger();
        let rates = ledger.list_vehicle_rates();
        let pairs: Vec<(String, u64)> = rates
            .into_iter()
            .map(|r| (r.class.to_string(), r.rate))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Car".to_string(), 3000),
                ("Motorcycle".to_string(), 1500),
                ("Bicycle".to_string(), 1000),
            ]
        );
    }

    #[test]
    fn test_export_rentals_csv() {
        let (ledger, _) = ledger();
        ledger.rent("A1", "0", "ONE", VehicleClass::Car).unwrap();
        ledger.rent("A1", "1", "TWO", VehicleClass::Bicycle).unwrap();

        let mut out = Vec::new();
        assert_eq!(ledger.export_rentals_csv(&mut out).unwrap(), 2);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_sqlite_ledger_scenario() {
        let clock = Arc::new(ManualClock::new(T0));
        let conn = Connection::open_in_memory().unwrap();
        let ledger = ParkingLedger::from_connection(conn, clock.clone()).unwrap();
        ledger.initialize_grid().unwrap();

        let rental = ledger.rent("A1", "0", "XYZ-123", VehicleClass::Car).unwrap();
        assert!(!slot(&ledger, "A1", "0").available);

        clock.advance_minutes(90);
        let closed = ledger.exit("A1", "0", "XYZ-123").unwrap();

        assert_eq!(closed.id, rental.id);
        assert_eq!(closed.price, Some(6000));
        assert!(slot(&ledger, "A1", "0").available);
        assert_eq!(ledger.list_rentals().unwrap(), vec![closed]);
        // Slot order survives the availability upserts
        assert!(ledger.list_slots().unwrap()[0].is_at("A1", "0"));
    }
}
