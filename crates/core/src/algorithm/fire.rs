//! Ignition, burn-out and fire pillar propagation
//!
//! Solid fuel follows the [`FireState`](crate::core_types::FireState)
//! lifecycle: it ignites when hot enough and supplied with oxygen, burns for
//! `max_burning_time` ticks, and is then permanently inert.
//!
//! Air never burns on its own. Flame occupying open space is modelled as a
//! fire pillar budget that climbs from burning fuel, losing one unit per cell,
//! and spreads sideways under a ceiling. An air cell burns exactly while its
//! budget is positive.
//!
//! With `max_burning_time == 0` combustion is off: nothing ignites and air
//! carries no pillar, so no cell's burning time ever leaves zero.

use crate::core_types::index::{self, GridIndex};
use crate::core_types::{Cell, Grid, MatterState};

/// Ticks a horizontal neighbour must have been burning to catalyse ignition
/// at the lower ignition temperature
pub const REQUIRED_BURNING_TIME: u32 = 10;

/// Minimum summed oxygen level of fluid neighbours for a solid to ignite
pub const OXYGEN_REQUIRED_FOR_IGNITION: f64 = 15.0;

/// Combustion rules for one cell
#[derive(Debug, Clone, Copy)]
pub struct FirePropagator {
    max_burning_time: u32,
}

impl FirePropagator {
    pub fn new(max_burning_time: u32) -> Self {
        Self { max_burning_time }
    }

    #[inline]
    fn combustion_enabled(&self) -> bool {
        self.max_burning_time != 0
    }

    /// New burning time
    ///
    /// `new_temperature` is the post-exchange temperature of this tick and
    /// `new_fire_pillar` the result of [`Self::compute_fire_pillar`].
    pub fn compute_burning_time(
        &self,
        old: &Grid,
        index: &GridIndex,
        cell: &Cell,
        new_temperature: f64,
        new_fire_pillar: u32,
    ) -> u32 {
        if cell.material.is_combustible() {
            return self.solid_burning_time(old, index, cell, new_temperature);
        }
        match cell.matter_state() {
            MatterState::Fluid => u32::from(self.combustion_enabled() && new_fire_pillar > 0),
            MatterState::Solid => 0,
        }
    }

    fn solid_burning_time(&self, old: &Grid, index: &GridIndex, cell: &Cell, new_temperature: f64) -> u32 {
        if cell.is_burning() {
            // Burning -> Burning, or Burning -> Exhausted once past the limit
            cell.burning_time.saturating_add(1)
        } else if cell.burning_time > 0 {
            // Exhausted -> Inert
            0
        } else if self.ignites(old, index, cell, new_temperature) {
            1
        } else {
            0
        }
    }

    /// New flammable flag; once false it never becomes true again
    pub fn compute_flammable(&self, cell: &Cell, new_burning_time: u32) -> bool {
        if cell.material.is_combustible() {
            cell.flammable && new_burning_time <= self.max_burning_time
        } else {
            cell.flammable
        }
    }

    /// Whether an unburnt combustible cell catches fire this tick
    pub fn ignites(&self, old: &Grid, index: &GridIndex, cell: &Cell, new_temperature: f64) -> bool {
        if !self.combustion_enabled() || !cell.flammable || !cell.material.is_combustible() {
            return false;
        }
        if !has_oxygen_access(old, index) {
            return false;
        }
        let properties = cell.material.properties();
        new_temperature > properties.auto_ignition_temperature
            || (new_temperature > properties.ignition_temperature
                && has_established_fire_nearby(old, index))
    }

    /// New fire pillar budget
    ///
    /// Solid cells keep their budget. For air, a burning cell below passes on
    /// its budget minus one and takes precedence. Otherwise the tallest
    /// burning horizontal neighbour that has no open air above it passes on its
    /// budget minus one, provided its budget exceeds this cell's current one.
    /// Air holds no pillar at all while combustion is disabled.
    pub fn compute_fire_pillar(&self, old: &Grid, index: &GridIndex, cell: &Cell) -> u32 {
        if !cell.is_fluid() {
            return cell.remaining_fire_pillar;
        }
        if !self.combustion_enabled() {
            return 0;
        }

        if let Some(below) = old.try_get(&index::down(index)) {
            if below.is_burning() && below.remaining_fire_pillar > 1 {
                return below.remaining_fire_pillar - 1;
            }
        }

        let tallest = index::horizontal_neighbours(index)
            .iter()
            .filter_map(|n| {
                let neighbour = old.try_get(n)?;
                let feeds = neighbour.is_burning()
                    && neighbour.remaining_fire_pillar > 1
                    && !is_up_neighbour_air(old, n);
                feeds.then_some(neighbour.remaining_fire_pillar)
            })
            .max()
            .unwrap_or(0);

        if tallest > cell.remaining_fire_pillar {
            tallest - 1
        } else {
            0
        }
    }
}

/// Summed oxygen of the fluid face neighbours meets the ignition threshold
pub fn has_oxygen_access(old: &Grid, index: &GridIndex) -> bool {
    available_oxygen(old, index) >= OXYGEN_REQUIRED_FOR_IGNITION
}

pub fn available_oxygen(old: &Grid, index: &GridIndex) -> f64 {
    index::neighbours(index)
        .iter()
        .filter_map(|n| old.try_get(n))
        .filter(|c| c.is_fluid())
        .map(|c| c.oxygen_level)
        .sum()
}

/// A horizontal neighbour has been burning for longer than
/// [`REQUIRED_BURNING_TIME`]
fn has_established_fire_nearby(old: &Grid, index: &GridIndex) -> bool {
    index::horizontal_neighbours(index)
        .iter()
        .filter_map(|n| old.try_get(n))
        .any(|c| c.is_burning() && c.burning_time > REQUIRED_BURNING_TIME)
}

/// The cell above exists and is air, so flame there rises instead of spreading
pub fn is_up_neighbour_air(old: &Grid, index: &GridIndex) -> bool {
    old.try_get(&index::up(index)).is_some_and(Cell::is_fluid)
}
