//! Per-cell transition rules
//!
//! The next generation of a grid is a pure function of the previous one.
//! Every propagator reads only the old grid, so cells can be computed in any
//! order and in parallel.
//!
//! For one cell, [`BasicAlgorithm`] evaluates:
//!
//! 1. temperature from conduction / convection
//! 2. fire pillar budget
//! 3. burning time and flammable flag
//! 4. fire override of the temperature
//! 5. oxygen consumption
//! 6. smoke diffusion

pub mod fire;
pub mod oxygen;
pub mod smoke;
pub mod temperature;

pub use fire::{FirePropagator, OXYGEN_REQUIRED_FOR_IGNITION, REQUIRED_BURNING_TIME};
pub use oxygen::{OxygenPropagator, OXYGEN_USAGE_IN_FIRE};
pub use smoke::{SmokePropagator, HORIZONTAL_SMOKE_SHARE, UPWARD_SMOKE_DAMPING};
pub use temperature::{apply_fire, TemperaturePropagator, CONVECTION_COEFFICIENT};

use crate::config::SimulationConfig;
use crate::core_types::{Cell, Grid, GridIndex, MaterialCatalog};
use crate::error::KernelError;

/// Computes one cell of the next generation from the previous grid
///
/// Implementations must not depend on evaluation order or on anything other
/// than `old` and `index`.
pub trait Algorithm: Send + Sync {
    /// # Errors
    ///
    /// [`KernelError`] aborts the whole tick.
    fn compute(&self, old: &Grid, index: GridIndex) -> Result<Cell, KernelError>;
}

/// Standard composition of the temperature, fire, oxygen and smoke rules
#[derive(Debug, Clone)]
pub struct BasicAlgorithm {
    catalog: MaterialCatalog,
    config: SimulationConfig,
}

impl BasicAlgorithm {
    pub fn new(catalog: MaterialCatalog, config: SimulationConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }
}

impl Algorithm for BasicAlgorithm {
    fn compute(&self, old: &Grid, index: GridIndex) -> Result<Cell, KernelError> {
        let cell = old
            .try_get(&index)
            .ok_or(KernelError::IndexOutOfRange(index))?;
        let delta_time = self.config.delta_time;

        let temperature = TemperaturePropagator::new(self.catalog.conduction(), delta_time)
            .compute_temperature(old, &index, cell);

        let fire = FirePropagator::new(self.config.max_burning_time);
        let remaining_fire_pillar = fire.compute_fire_pillar(old, &index, cell);
        let burning_time =
            fire.compute_burning_time(old, &index, cell, temperature, remaining_fire_pillar);
        let flammable = fire.compute_flammable(cell, burning_time);

        let mut next = Cell {
            temperature,
            burning_time,
            flammable,
            material: cell.material,
            remaining_fire_pillar,
            oxygen_level: OxygenPropagator::new(delta_time).consume_oxygen(cell),
            smoke_indicator: SmokePropagator::new(delta_time).compute_smoke(old, &index, cell),
        };
        next.temperature = apply_fire(temperature, &next);

        if !next.temperature.is_finite() {
            return Err(KernelError::NonFiniteTemperature {
                index,
                value: next.temperature,
            });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{FireState, Material, SpaceSize, AMBIENT_TEMPERATURE};
    use approx::assert_relative_eq;

    fn algorithm(max_burning_time: u32) -> BasicAlgorithm {
        let config = SimulationConfig {
            max_burning_time,
            ..SimulationConfig::default()
        };
        BasicAlgorithm::new(MaterialCatalog::standard().unwrap(), config)
    }

    fn step(algorithm: &BasicAlgorithm, grid: &Grid) -> Grid {
        let cells = grid
            .indexed_cells()
            .map(|(index, _)| algorithm.compute(grid, index).unwrap())
            .collect();
        Grid::new(grid.space_size(), cells).unwrap()
    }

    fn hot_center_wood_cube() -> Grid {
        let size = SpaceSize::new(3, 3, 3);
        let mut cells = vec![Cell::of(Material::Wood); 27];
        cells[13] = Cell::of(Material::Wood).with_temperature(400.0);
        Grid::new(size, cells).unwrap()
    }

    #[test]
    fn test_wood_cube_conduction() {
        let grid = hot_center_wood_cube();
        let algorithm = algorithm(60);

        let center = algorithm.compute(&grid, GridIndex::new(1, 1, 1)).unwrap();
        // Three axes, two neighbours each, 0.2 * (400 - 20)
        assert_relative_eq!(center.temperature, 400.0 + 0.5 * 3.0 * -(2.0 * 0.2 * 380.0), epsilon = 1e-9);
        assert_relative_eq!(center.temperature, 172.0, epsilon = 1e-9);
        // Sealed wood has no oxygen to ignite with
        assert_eq!(center.burning_time, 0);
        assert!(center.flammable);

        let face = algorithm.compute(&grid, GridIndex::new(1, 1, 0)).unwrap();
        assert_relative_eq!(face.temperature, AMBIENT_TEMPERATURE + 0.5 * 0.2 * 380.0, epsilon = 1e-9);

        let corner = algorithm.compute(&grid, GridIndex::new(0, 0, 0)).unwrap();
        assert_relative_eq!(corner.temperature, AMBIENT_TEMPERATURE, epsilon = 1e-9);
    }

    #[test]
    fn test_compute_is_pure() {
        let grid = hot_center_wood_cube();
        let algorithm = algorithm(60);
        let before = grid.clone();
        let a = algorithm.compute(&grid, GridIndex::new(1, 1, 1)).unwrap();
        let b = algorithm.compute(&grid, GridIndex::new(1, 1, 1)).unwrap();
        assert_eq!(a, b);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_outside_index_is_an_error() {
        let grid = hot_center_wood_cube();
        let err = algorithm(60).compute(&grid, GridIndex::new(3, 0, 0)).unwrap_err();
        assert_eq!(err, KernelError::IndexOutOfRange(GridIndex::new(3, 0, 0)));
    }

    #[test]
    fn test_non_finite_temperature_is_an_error() {
        let grid = Grid::filled(
            SpaceSize::new(1, 1, 1),
            Cell::of(Material::Wood).with_temperature(f64::NAN),
        )
        .unwrap();
        let err = algorithm(60).compute(&grid, GridIndex::zeros()).unwrap_err();
        assert!(matches!(err, KernelError::NonFiniteTemperature { .. }));
    }

    #[test]
    fn test_air_without_fire_stays_unlit() {
        let grid = Grid::filled(SpaceSize::new(3, 4, 3), Cell::air().with_temperature(800.0)).unwrap();
        let algorithm = algorithm(60);
        let mut current = grid;
        for _ in 0..5 {
            current = step(&algorithm, &current);
            assert!(current.cells().iter().all(|c| c.burning_time == 0));
            assert!(current.cells().iter().all(|c| c.remaining_fire_pillar == 0));
        }
    }

    #[test]
    fn test_burning_wood_lights_air_above() {
        let size = SpaceSize::new(1, 3, 1);
        let cells = vec![Cell::of(Material::Wood).ignited(), Cell::air(), Cell::air()];
        let grid = Grid::new(size, cells).unwrap();
        let algorithm = algorithm(60);

        let next = step(&algorithm, &grid);
        let wood = next.cells()[0];
        assert_eq!(wood.burning_time, 2);
        assert_eq!(wood.temperature, 550.0);

        let flame = next.cells()[1];
        assert_eq!(flame.remaining_fire_pillar, 4);
        assert_eq!(flame.burning_time, 1);
        assert_eq!(flame.temperature, 900.0);
        // Oxygen is consumed from the next tick on
        assert_eq!(flame.oxygen_level, 100.0);
        assert_eq!(flame.smoke_indicator, 5);

        let next = step(&algorithm, &next);
        assert_eq!(next.cells()[1].oxygen_level, 99.0);
        assert_eq!(next.cells()[2].remaining_fire_pillar, 3);
    }

    #[test]
    fn test_kill_switch_disables_combustion() {
        let size = SpaceSize::new(1, 2, 1);
        let cells = vec![Cell::of(Material::Wood).with_temperature(1000.0), Cell::air()];
        let grid = Grid::new(size, cells).unwrap();
        let algorithm = algorithm(0);
        let next = step(&algorithm, &grid);
        assert_eq!(next.cells()[0].fire_state(0), FireState::Unburnt);

        // A cell that starts burning is exhausted on the first tick
        let cells = vec![Cell::of(Material::Wood).ignited(), Cell::air()];
        let grid = Grid::new(size, cells).unwrap();
        let next = step(&algorithm, &grid);
        assert_eq!(next.cells()[0].fire_state(0), FireState::Exhausted);
        let next = step(&algorithm, &next);
        assert_eq!(next.cells()[0].fire_state(0), FireState::Inert);
    }

    #[test]
    fn test_kill_switch_keeps_air_above_burning_wood_unlit() {
        let size = SpaceSize::new(1, 3, 1);
        let cells = vec![Cell::of(Material::Wood).ignited(), Cell::air(), Cell::air()];
        let mut grid = Grid::new(size, cells).unwrap();
        let algorithm = algorithm(0);

        for _ in 0..4 {
            let next = step(&algorithm, &grid);
            for air in &next.cells()[1..] {
                assert_eq!(air.burning_time, 0);
                assert_eq!(air.remaining_fire_pillar, 0);
                assert!(air.temperature < 900.0);
                assert_eq!(air.oxygen_level, 100.0);
            }
            grid = next;
        }
    }
}
