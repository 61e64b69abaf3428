// Entity Models
//
// Each entity has a stable identity (UUID) and is stored by that id in its
// own key-value store. Rental records embed snapshots of the slot and vehicle.

pub mod slot;
pub mod vehicle;
pub mod rental;

pub use slot::Slot;
pub use vehicle::{Vehicle, VehicleClass};
pub use rental::RentalRecord;
