//! Smoke diffusion
//!
//! Smoke is a bounded quantity (`0..=100`) carried by fluid cells. Per unit
//! time a fluid cell:
//!
//! - gives the fluid cell above as much as it can take, damped when that cell
//!   is already smokier,
//! - receives what the fluid cell below gives upward by the same rule,
//! - exchanges a fifth of its spare smoke with each horizontal fluid neighbour,
//!   where "spare" is what remains after the upward give,
//! - gains the smoke coefficient of a burning solid directly below it.
//!
//! Solid cells never hold smoke and keep whatever value they carry.

use crate::core_types::index::{self, GridIndex};
use crate::core_types::{Cell, Grid, MAX_SMOKE};

/// Factor applied to the upward give when the cell above is smokier
pub const UPWARD_SMOKE_DAMPING: f64 = 0.5;

/// Share of its spare smoke a cell exchanges with each horizontal neighbour
pub const HORIZONTAL_SMOKE_SHARE: f64 = 0.2;

/// Smoke step for one cell
#[derive(Debug, Clone, Copy)]
pub struct SmokePropagator {
    delta_time: f64,
}

impl SmokePropagator {
    pub fn new(delta_time: f64) -> Self {
        Self { delta_time }
    }

    pub fn compute_smoke(&self, old: &Grid, index: &GridIndex, cell: &Cell) -> u8 {
        if !cell.is_fluid() {
            return cell.smoke_indicator;
        }

        let rate = diffusion(old, index, cell) + fire_source(old, index);
        let next = f64::from(cell.smoke_indicator) + self.delta_time * rate;
        // Clamped into 0..=MAX_SMOKE, so the cast cannot truncate
        next.round().clamp(0.0, f64::from(MAX_SMOKE)) as u8
    }
}

/// Net smoke flow into the cell per unit time, excluding the fire source
pub fn diffusion(old: &Grid, index: &GridIndex, cell: &Cell) -> f64 {
    let own = f64::from(cell.smoke_indicator);
    let up_give = upward_give(old, index, cell);
    let spare = (own - up_give).max(0.0);

    let mut net = -up_give;

    let below_index = index::down(index);
    if let Some(below) = old.try_get(&below_index).filter(|c| c.is_fluid()) {
        net += upward_give(old, &below_index, below);
    }

    for neighbour_index in index::horizontal_neighbours(index) {
        let Some(neighbour) = old.try_get(&neighbour_index).filter(|c| c.is_fluid()) else {
            continue;
        };
        let theirs = f64::from(neighbour.smoke_indicator);
        if theirs > own {
            let their_spare = (theirs - upward_give(old, &neighbour_index, neighbour)).max(0.0);
            net += their_spare * HORIZONTAL_SMOKE_SHARE;
        } else if theirs < own {
            let headroom = f64::from(MAX_SMOKE) - theirs;
            net -= (spare * HORIZONTAL_SMOKE_SHARE).min(headroom);
        }
    }

    net
}

/// Smoke a fluid cell pushes into the fluid cell above it per unit time
pub fn upward_give(old: &Grid, index: &GridIndex, cell: &Cell) -> f64 {
    let Some(above) = old.try_get(&index::up(index)).filter(|c| c.is_fluid()) else {
        return 0.0;
    };
    let own = f64::from(cell.smoke_indicator);
    let theirs = f64::from(above.smoke_indicator);
    let give = own.min(f64::from(MAX_SMOKE) - theirs).max(0.0);
    if theirs > own {
        give * UPWARD_SMOKE_DAMPING
    } else {
        give
    }
}

/// Smoke emitted by a burning solid directly below
fn fire_source(old: &Grid, index: &GridIndex) -> f64 {
    old.try_get(&index::down(index))
        .filter(|below| below.is_burning() && below.is_solid())
        .map_or(0.0, |below| below.material.properties().smoke_coefficient)
}
