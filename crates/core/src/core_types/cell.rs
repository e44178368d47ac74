//! Per-cell physical state

use crate::core_types::material::{Material, MatterState};
use serde::{Deserialize, Serialize};

/// Ambient temperature of freshly built cells (°C)
pub const AMBIENT_TEMPERATURE: f64 = 20.0;

/// Upper bound of `oxygen_level`; fresh air starts here
pub const MAX_OXYGEN_LEVEL: f64 = 100.0;

/// Upper bound of `smoke_indicator`
pub const MAX_SMOKE: u8 = 100;

/// Fire pillar budget given to wood when a grid is built
pub const WOOD_FIRE_PILLAR: u32 = 5;

/// Physical state of one grid position for one generation
///
/// Cells are plain values; every generation produces new ones.
///
/// The combustion state is stored compactly in `burning_time` and
/// `flammable`; see [`FireState`] for how the pair is read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// °C
    pub temperature: f64,
    /// Ticks spent burning, 0 when not burning
    pub burning_time: u32,
    pub flammable: bool,
    pub material: Material,
    /// How far flame can still extend into open air from here
    pub remaining_fire_pillar: u32,
    /// 0..=[`MAX_OXYGEN_LEVEL`]
    pub oxygen_level: f64,
    /// 0..=[`MAX_SMOKE`]
    pub smoke_indicator: u8,
}

/// Combustion lifecycle encoded by `(burning_time, flammable)`
///
/// ```text
/// Unburnt --ignite--> Burning --(burning_time > MAX)--> Exhausted --> Inert
/// (0, true)           (1..=MAX, true)                  (>MAX, false)  (0, false)
/// ```
///
/// Air cells are flammable and report `Burning` while a fire pillar passes
/// through them; they never become `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FireState {
    Unburnt,
    Burning,
    Exhausted,
    Inert,
}

impl Cell {
    /// Ambient cell of the given material
    pub fn of(material: Material) -> Self {
        match material {
            Material::Air => Cell {
                temperature: AMBIENT_TEMPERATURE,
                burning_time: 0,
                flammable: true,
                material,
                remaining_fire_pillar: 0,
                oxygen_level: MAX_OXYGEN_LEVEL,
                smoke_indicator: 0,
            },
            Material::Wood => Cell {
                temperature: AMBIENT_TEMPERATURE,
                burning_time: 0,
                flammable: true,
                material,
                remaining_fire_pillar: WOOD_FIRE_PILLAR,
                oxygen_level: 0.0,
                smoke_indicator: 0,
            },
            Material::CellularConcrete => Cell {
                temperature: AMBIENT_TEMPERATURE,
                burning_time: 0,
                flammable: false,
                material,
                remaining_fire_pillar: 0,
                oxygen_level: 0.0,
                smoke_indicator: 0,
            },
        }
    }

    pub fn air() -> Self {
        Self::of(Material::Air)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Same cell set on fire at its material's burning temperature
    pub fn ignited(mut self) -> Self {
        self.burning_time = self.burning_time.max(1);
        self.temperature = self.material.properties().burning_temperature;
        self
    }

    #[inline]
    pub fn is_burning(&self) -> bool {
        self.flammable && self.burning_time > 0
    }

    #[inline]
    pub fn matter_state(&self) -> MatterState {
        self.material.matter_state()
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.matter_state() == MatterState::Solid
    }

    #[inline]
    pub fn is_fluid(&self) -> bool {
        self.matter_state() == MatterState::Fluid
    }

    /// Decode the combustion state for a given burn-out limit
    pub fn fire_state(&self, max_burning_time: u32) -> FireState {
        match (self.burning_time, self.flammable) {
            (0, true) => FireState::Unburnt,
            (0, false) => FireState::Inert,
            (t, true) if t <= max_burning_time => FireState::Burning,
            // Air never burns out, so its counter never exceeds the limit
            (_, true) if self.is_fluid() => FireState::Burning,
            _ => FireState::Exhausted,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::air()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambient_defaults() {
        let air = Cell::air();
        assert!(air.is_fluid());
        assert!(air.flammable);
        assert_eq!(air.oxygen_level, MAX_OXYGEN_LEVEL);

        let wood = Cell::of(Material::Wood);
        assert!(wood.is_solid());
        assert_eq!(wood.remaining_fire_pillar, WOOD_FIRE_PILLAR);

        let concrete = Cell::of(Material::CellularConcrete);
        assert!(!concrete.flammable);
    }

    #[test]
    fn test_fire_state_decoding() {
        let wood = Cell::of(Material::Wood);
        assert_eq!(wood.fire_state(10), FireState::Unburnt);

        let burning = wood.ignited();
        assert_eq!(burning.burning_time, 1);
        assert_eq!(burning.temperature, 550.0);
        assert_eq!(burning.fire_state(10), FireState::Burning);

        let exhausted = Cell {
            burning_time: 11,
            flammable: false,
            ..wood
        };
        assert_eq!(exhausted.fire_state(10), FireState::Exhausted);
        assert!(!exhausted.is_burning());

        let inert = Cell {
            flammable: false,
            ..wood
        };
        assert_eq!(inert.fire_state(10), FireState::Inert);
    }
}
