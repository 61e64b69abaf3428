// Parking Ledger - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod logging;
pub mod parking_area;
pub mod rates;
pub mod report;
pub mod store;
pub mod vehicles;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use entities::{RentalRecord, Slot, Vehicle, VehicleClass};
pub use error::{LedgerError, Result};
pub use grid::{grid_layout, BLOCKS, GRID_SIZE, POSITIONS};
pub use ledger::ParkingLedger;
pub use parking_area::ParkingArea;
pub use rates::{RateTable, VehicleRate};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use vehicles::VehicleRegistry;
