// 📄 Rental report - CSV export of the ledger
//
// One row per rental record, in ledger order. Open rentals have an empty
// price column.

use crate::entities::RentalRecord;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct RentalRow {
    #[serde(rename = "Rental_Id")]
    pub rental_id: String,

    #[serde(rename = "Block")]
    pub block: String,

    #[serde(rename = "Position")]
    pub position: String,

    #[serde(rename = "Vehicle_Number")]
    pub vehicle_number: String,

    #[serde(rename = "Vehicle_Class")]
    pub vehicle_class: String,

    #[serde(rename = "Start")]
    pub start: String,

    #[serde(rename = "Price")]
    pub price: Option<u64>,
}

impl From<&RentalRecord> for RentalRow {
    fn from(rental: &RentalRecord) -> Self {
        RentalRow {
            rental_id: rental.id.clone(),
            block: rental.slot.block.clone(),
            position: rental.slot.position.clone(),
            vehicle_number: rental.vehicle.number.clone(),
            vehicle_class: rental.vehicle.class.to_string(),
            start: rental.started_at().to_rfc3339(),
            price: rental.price,
        }
    }
}

/// Write rentals as CSV, returns the number of rows written
pub fn write_rentals_csv<W: Write>(writer: W, rentals: &[RentalRecord]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for rental in rentals {
        wtr.serialize(RentalRow::from(rental))?;
    }
    wtr.flush()?;

    Ok(rentals.len())
}
