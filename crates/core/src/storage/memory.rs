//! Generations held in a shared in-process map

use super::Storage;
use crate::core_types::Grid;
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Keeps every generation in memory
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    grids: RwLock<FxHashMap<u64, Arc<Grid>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.grids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest stored generation and its grid
    pub fn latest(&self) -> Option<(u64, Arc<Grid>)> {
        let grids = self.grids.read().unwrap_or_else(PoisonError::into_inner);
        grids
            .iter()
            .max_by_key(|(generation, _)| **generation)
            .map(|(generation, grid)| (*generation, Arc::clone(grid)))
    }

    /// Stored generation numbers in ascending order
    pub fn generations(&self) -> Vec<u64> {
        let grids = self.grids.read().unwrap_or_else(PoisonError::into_inner);
        let mut generations: Vec<u64> = grids.keys().copied().collect();
        generations.sort_unstable();
        generations
    }
}

impl Storage for InMemoryStorage {
    fn put(&self, grid: Arc<Grid>, generation: u64) {
        self.grids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(generation, grid);
    }

    fn get(&self, generation: u64) -> Option<Arc<Grid>> {
        self.grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&generation)
            .cloned()
    }
}
