// Grid Initializer
//
// Fills the parking area with blocks × positions, every slot available.
// Each call appends a complete new grid with fresh ids; calling it twice
// leaves two slots per address.

use crate::entities::Slot;
use crate::error::Result;
use crate::parking_area::ParkingArea;

pub const BLOCKS: [&str; 9] = ["A1", "A2", "A3", "B1", "B2", "B3", "C1", "C2", "C3"];
pub const POSITIONS: [&str; 5] = ["0", "1", "2", "3", "4"];

/// Number of slots created by one `initialize_grid` call
pub const GRID_SIZE: usize = BLOCKS.len() * POSITIONS.len();

/// Fresh slots for the whole grid, block-major order
pub fn grid_layout() -> Vec<Slot> {
    BLOCKS
        .iter()
        .flat_map(|block| POSITIONS.iter().map(move |position| Slot::new(block, position)))
        .collect()
}

pub fn initialize_grid(area: &ParkingArea) -> Result<Vec<Slot>> {
    let slots = grid_layout();
    for slot in &slots {
        area.add_slot(slot.clone())?;
    }

    tracing::info!(
        slots = slots.len(),
        total = area.count()?,
        "parking grid initialized"
    );
    Ok(slots)
}
