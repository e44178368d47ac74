//! Temperature propagation
//!
//! Solids exchange heat by conduction with solid face neighbours, one axis at
//! a time. For an axis with neighbours `former` and `latter` around `middle`:
//!
//! ```text
//! Δ_axis = -( k(f,m)·(T_m − T_f) + k(l,m)·(T_m − T_l) )
//! ```
//!
//! A side that is missing or not solid is replaced by a virtual neighbour at
//! the cell's own temperature, so it contributes nothing (insulated boundary).
//!
//! Fluids only exchange heat vertically: a hotter fluid cell below warms the
//! cell, a colder fluid cell above draws heat out of it.
//!
//! Burning cells are pinned to their material's burning temperature once the
//! fire state for the new generation is known (see [`apply_fire`]).

use crate::core_types::index::{self, Axis};
use crate::core_types::{Cell, ConductionTable, Grid, GridIndex, MatterState};

/// Fraction of a vertical temperature difference moved per unit time in fluids
pub const CONVECTION_COEFFICIENT: f64 = 0.2;

/// Conduction / convection step for one cell
#[derive(Debug, Clone, Copy)]
pub struct TemperaturePropagator<'a> {
    conduction: &'a ConductionTable,
    delta_time: f64,
}

impl<'a> TemperaturePropagator<'a> {
    pub fn new(conduction: &'a ConductionTable, delta_time: f64) -> Self {
        Self {
            conduction,
            delta_time,
        }
    }

    /// Temperature after heat exchange, before fire is taken into account
    pub fn compute_temperature(&self, old: &Grid, index: &GridIndex, cell: &Cell) -> f64 {
        let rate = match cell.matter_state() {
            MatterState::Solid => self.conduction(old, index, cell),
            MatterState::Fluid => convection(old, index, cell),
        };
        cell.temperature + self.delta_time * rate
    }

    /// Sum of the per-axis conduction terms
    pub fn conduction(&self, old: &Grid, index: &GridIndex, middle: &Cell) -> f64 {
        Axis::ALL
            .iter()
            .map(|&axis| {
                let [former, latter] = index::axis_neighbours(index, axis);
                self.axis_conduction(
                    middle,
                    solid_neighbour(old, &former),
                    solid_neighbour(old, &latter),
                )
            })
            .sum()
    }

    fn axis_conduction(&self, middle: &Cell, former: Option<&Cell>, latter: Option<&Cell>) -> f64 {
        if former.is_none() && latter.is_none() {
            return 0.0;
        }
        let former = former.unwrap_or(middle);
        let latter = latter.unwrap_or(middle);
        -(self.conduction.coefficient(former.material, middle.material)
            * (middle.temperature - former.temperature)
            + self.conduction.coefficient(latter.material, middle.material)
                * (middle.temperature - latter.temperature))
    }
}

fn solid_neighbour<'g>(old: &'g Grid, index: &GridIndex) -> Option<&'g Cell> {
    old.try_get(index).filter(|cell| cell.is_solid())
}

/// Vertical convective exchange for a fluid cell
pub fn convection(old: &Grid, index: &GridIndex, cell: &Cell) -> f64 {
    let mut rate = 0.0;

    if let Some(below) = old.try_get(&index::down(index)).filter(|c| c.is_fluid()) {
        if below.temperature > cell.temperature {
            rate += CONVECTION_COEFFICIENT * (below.temperature - cell.temperature).abs();
        }
    }

    if let Some(above) = old.try_get(&index::up(index)).filter(|c| c.is_fluid()) {
        if above.temperature < cell.temperature {
            rate -= CONVECTION_COEFFICIENT * (cell.temperature - above.temperature).abs();
        }
    }

    rate
}

/// Fire dominates local temperature: a cell that is burning in the new
/// generation sits at its material's burning temperature
#[inline]
pub fn apply_fire(temperature: f64, next: &Cell) -> f64 {
    if next.is_burning() {
        next.material.properties().burning_temperature
    } else {
        temperature
    }
}
