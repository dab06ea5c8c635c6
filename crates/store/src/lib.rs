//! Route and reservation inventory
//!
//! Single source of truth for bus routes and reservations. Routes are
//! read-only after startup; reservations are append-only. State lives in
//! memory, optionally mirrored to two flat JSON documents.

pub mod inventory;

pub use inventory::{InventoryStore, ROUTES_FILE, RESERVATIONS_FILE};

use thiserror::Error;

/// Store errors
///
/// Small on purpose: unreadable or corrupt data files are reseeded rather
/// than surfaced, so only the data directory itself can fail hard.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },
}

impl From<StoreError> for busgo_core::Error {
    fn from(err: StoreError) -> Self {
        busgo_core::Error::Store(err.to_string())
    }
}
