// Ledger errors
//
// Every ledger operation returns an explicit Result. Mutations applied before
// a failure are NOT rolled back (a vehicle registered by a rejected rent stays
// in the store).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entity absent (vehicle, open rental, rental id)
    #[error("not found: {0}")]
    NotFound(String),

    /// State precondition violated (slot availability mismatch)
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// No slot matches the given logical address
    #[error("invalid slot: block {block}, position {position}")]
    InvalidSlot { block: String, position: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl LedgerError {
    pub fn invalid_slot(block: &str, position: &str) -> Self {
        LedgerError::InvalidSlot {
            block: block.to_string(),
            position: position.to_string(),
        }
    }

    /// Short machine-readable kind, used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NotFound",
            LedgerError::InvalidPayload(_) => "InvalidPayload",
            LedgerError::InvalidSlot { .. } => "InvalidSlot",
            LedgerError::Storage(_) => "Storage",
            LedgerError::Serialization(_) => "Serialization",
            LedgerError::Csv(_) => "Csv",
            LedgerError::Io(_) => "Io",
            LedgerError::Poisoned(_) => "Poisoned",
        }
    }
}
