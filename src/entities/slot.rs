// 🅿️ Slot Entity
//
// Identity: UUID
// Logical address: (block, position). Expected unique, never enforced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub block: String,
    pub position: String,
    pub available: bool,
}

impl Slot {
    /// Create an available slot with a fresh UUID
    pub fn new(block: &str, position: &str) -> Self {
        Slot {
            id: uuid::Uuid::new_v4().to_string(),
            block: block.to_string(),
            position: position.to_string(),
            available: true,
        }
    }

    /// Check if this slot sits at the given logical address
    pub fn is_at(&self, block: &str, position: &str) -> bool {
        self.block == block && self.position == position
    }

    /// Copy of this slot with a different availability flag
    pub fn with_availability(&self, available: bool) -> Slot {
        Slot {
            available,
            ..self.clone()
        }
    }
}
