// 🚗 Vehicle Registry
//
// register() always creates a new vehicle, even for a number already on file.
// find_by_number() returns the first vehicle with that number in store order.

use crate::entities::{Vehicle, VehicleClass};
use crate::error::{LedgerError, Result};
use crate::store::KeyValueStore;

pub struct VehicleRegistry {
    vehicles: Box<dyn KeyValueStore<Vehicle>>,
}

impl VehicleRegistry {
    pub fn new(vehicles: Box<dyn KeyValueStore<Vehicle>>) -> Self {
        VehicleRegistry { vehicles }
    }

    pub fn register(&self, number: &str, class: VehicleClass) -> Result<Vehicle> {
        let vehicle = Vehicle::new(number, class);
        self.vehicles.insert(&vehicle.id, vehicle.clone())?;
        Ok(vehicle)
    }

    pub fn find_by_number(&self, number: &str) -> Result<Vehicle> {
        self.vehicles
            .values()?
            .into_iter()
            .find(|vehicle| vehicle.number == number)
            .ok_or_else(|| LedgerError::NotFound(format!("vehicle {}", number)))
    }

    pub fn all_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.vehicles.values()
    }
}
