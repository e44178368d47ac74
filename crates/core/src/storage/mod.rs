//! Destinations for published generations
//!
//! The engine hands every generation to a [`Storage`] exactly once, tagged
//! with its generation number. Storages are shared between the engine's
//! writer thread and readers, so they take `&self` and synchronise
//! internally.

mod directory;
mod memory;

pub use directory::{DirectoryStorage, StoredRun};
pub use memory::InMemoryStorage;

use crate::core_types::Grid;
use std::sync::Arc;

/// Sink and lookup for grid snapshots keyed by generation
pub trait Storage: Send + Sync {
    /// Record a generation. Failures are the storage's own concern and are
    /// not reported back to the engine.
    fn put(&self, grid: Arc<Grid>, generation: u64);

    /// Snapshot of a generation, if it has been stored
    fn get(&self, generation: u64) -> Option<Arc<Grid>>;
}
