// 🚗 Vehicle Entity
//
// A vehicle is created every time a rental is opened, even when the same
// number has been seen before. Lookups by number return the first vehicle in
// store order.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// VEHICLE CLASS
// ============================================================================

/// Closed set of vehicle classes, plus the raw value of anything unrecognised.
///
/// Unknown classes are accepted on rent and priced at the bicycle rate
/// (see `RateTable::rate_for`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bicycle,
    Unknown(String),
}

impl VehicleClass {
    /// All recognised classes, in rate-table order
    pub const KNOWN: [VehicleClass; 3] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Bicycle,
    ];

    /// Parse a class name, case-insensitive. Never fails.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "car" => VehicleClass::Car,
            "motorcycle" => VehicleClass::Motorcycle,
            "bicycle" => VehicleClass::Bicycle,
            _ => VehicleClass::Unknown(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VehicleClass::Car => "Car",
            VehicleClass::Motorcycle => "Motorcycle",
            VehicleClass::Bicycle => "Bicycle",
            VehicleClass::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VehicleClass::Unknown(_))
    }
}

impl From<String> for VehicleClass {
    fn from(value: String) -> Self {
        VehicleClass::parse(&value)
    }
}

impl From<&str> for VehicleClass {
    fn from(value: &str) -> Self {
        VehicleClass::parse(value)
    }
}

impl From<VehicleClass> for String {
    fn from(class: VehicleClass) -> Self {
        match class {
            VehicleClass::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// VEHICLE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Stable identity (UUID)
    pub id: String,

    /// External vehicle number (plate). Not unique.
    pub number: String,

    pub class: VehicleClass,
}

impl Vehicle {
    /// Create new vehicle entity with a fresh UUID
    pub fn new(number: &str, class: VehicleClass) -> Self {
        Vehicle {
            id: uuid::Uuid::new_v4().to_string(),
            number: number.to_string(),
            class,
        }
    }
}
