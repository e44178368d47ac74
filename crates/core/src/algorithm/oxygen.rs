//! Oxygen consumption
//!
//! Only fluid cells carry oxygen. A fluid cell that was burning in the
//! previous generation burns through [`OXYGEN_USAGE_IN_FIRE`] units per unit
//! time and never drops below zero. Every other cell passes its level through
//! unchanged. There is no replenishment.

use crate::core_types::Cell;

/// Oxygen burned per unit time by a burning fluid cell
pub const OXYGEN_USAGE_IN_FIRE: f64 = 2.0;

/// Oxygen bookkeeping for one cell
#[derive(Debug, Clone, Copy)]
pub struct OxygenPropagator {
    delta_time: f64,
}

impl OxygenPropagator {
    pub fn new(delta_time: f64) -> Self {
        Self { delta_time }
    }

    /// New oxygen level, judged by the cell's previous-generation fire state
    pub fn consume_oxygen(&self, cell: &Cell) -> f64 {
        if !cell.is_fluid() || !cell.is_burning() {
            return cell.oxygen_level;
        }
        (cell.oxygen_level - OXYGEN_USAGE_IN_FIRE * self.delta_time).max(0.0)
    }
}
