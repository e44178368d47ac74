//! Immutable grid snapshot of one generation

use crate::core_types::cell::Cell;
use crate::core_types::index::{self, GridIndex, SpaceSize};
use crate::error::GridError;
use serde::{Deserialize, Serialize};

/// All cells of one generation in flat storage order
///
/// A grid is never mutated once built. The engine produces a new one every
/// tick and hands out shared snapshots. Deserialisation goes through
/// [`Grid::new`], so a stored grid is checked like a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    space_size: SpaceSize,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct RawGrid {
    space_size: SpaceSize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Self::new(raw.space_size, raw.cells)
    }
}

fn invalid_space_size(space_size: &SpaceSize) -> GridError {
    GridError::InvalidSpaceSize {
        x: space_size.x,
        y: space_size.y,
        z: space_size.z,
    }
}

impl Grid {
    /// Wrap a cell sequence, checking it matches the space size
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidSpaceSize`] for a non-positive extent or a cell
    /// count that overflows `usize`, [`GridError::SizeMismatch`] when
    /// `cells.len() != x * y * z`.
    pub fn new(space_size: SpaceSize, cells: Vec<Cell>) -> Result<Self, GridError> {
        let expected = index::volume(&space_size).ok_or_else(|| invalid_space_size(&space_size))?;
        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { space_size, cells })
    }

    /// Grid with every cell set to `cell`
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidSpaceSize`] as for [`Grid::new`] and
    /// [`GridError::TooLarge`] when the cells cannot be allocated.
    pub fn filled(space_size: SpaceSize, cell: Cell) -> Result<Self, GridError> {
        let volume = index::volume(&space_size).ok_or_else(|| invalid_space_size(&space_size))?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(volume)
            .map_err(|_| GridError::TooLarge { cells: volume })?;
        cells.resize(volume, cell);
        Self::new(space_size, cells)
    }

    #[inline]
    pub fn space_size(&self) -> SpaceSize {
        self.space_size
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, index: &GridIndex) -> bool {
        index::is_in_space(index, &self.space_size)
    }

    /// Cell at a 3D index, `None` when the index lies outside the grid
    #[inline]
    pub fn try_get(&self, index: &GridIndex) -> Option<&Cell> {
        index::flatten(index, &self.space_size).and_then(|flat| self.cells.get(flat))
    }

    #[inline]
    pub fn get_flat(&self, flat: usize) -> Option<&Cell> {
        self.cells.get(flat)
    }

    #[inline]
    pub fn expand(&self, flat: usize) -> Option<GridIndex> {
        index::expand(flat, &self.space_size)
    }

    /// Iterate `(index, cell)` pairs in storage order
    pub fn indexed_cells(&self) -> impl Iterator<Item = (GridIndex, &Cell)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(flat, cell)| {
            index::expand(flat, &self.space_size).map(|index| (index, cell))
        })
    }

    /// Aggregate figures for reporting
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            burning_cells: 0,
            burnt_out_cells: 0,
            max_temperature: f64::NEG_INFINITY,
            mean_temperature: 0.0,
            total_smoke: 0,
            min_oxygen: f64::INFINITY,
        };
        let mut temperature_sum = 0.0;
        for cell in &self.cells {
            if cell.is_burning() {
                stats.burning_cells += 1;
            }
            if cell.material.is_combustible() && !cell.flammable {
                stats.burnt_out_cells += 1;
            }
            stats.max_temperature = stats.max_temperature.max(cell.temperature);
            temperature_sum += cell.temperature;
            stats.total_smoke += u64::from(cell.smoke_indicator);
            if cell.is_fluid() {
                stats.min_oxygen = stats.min_oxygen.min(cell.oxygen_level);
            }
        }
        stats.mean_temperature = temperature_sum / self.cells.len() as f64;
        stats
    }
}

/// Summary of a grid generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub burning_cells: usize,
    /// Combustible cells that have burned out
    pub burnt_out_cells: usize,
    pub max_temperature: f64,
    pub mean_temperature: f64,
    pub total_smoke: u64,
    /// Lowest oxygen level among fluid cells, `+inf` if there are none
    pub min_oxygen: f64,
}
