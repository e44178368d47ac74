//! Initial grid construction from placed elements
//!
//! A grid starts as ambient air and elements are stamped onto it in the order
//! they were added, so later elements overwrite earlier ones. Every element
//! is clipped to the grid; parts outside it are ignored.

use crate::core_types::index::{self, GridIndex, SpaceSize};
use crate::core_types::{Cell, Grid, Material};
use crate::error::{GridError, StorageError};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Horizontal (x, z) position or extent
pub type PlanVector = Vector2<i32>;

/// Something that can be placed into a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Box of fresh cells of one material
    Cuboid {
        position: GridIndex,
        size: SpaceSize,
        material: Material,
    },
    /// One-cell-thick wood slab on the ground (y = 0)
    Floor { position: PlanVector, size: PlanVector },
    /// Wood floor plus four wood walls, open at the top
    Room { position: PlanVector, size: SpaceSize },
    /// Sets every flammable cell in the box burning
    Ignition { position: GridIndex, size: SpaceSize },
}

impl Element {
    /// Stamp this element onto a flat cell buffer
    pub fn apply(&self, cells: &mut [Cell], space_size: &SpaceSize) {
        match self {
            Element::Cuboid {
                position,
                size,
                material,
            } => {
                for flat in clipped(position, size, space_size) {
                    cells[flat] = Cell::of(*material);
                }
            }
            Element::Floor { position, size } => {
                floor(*position, *size).apply(cells, space_size);
            }
            Element::Room { position, size } => {
                for part in room(*position, *size) {
                    part.apply(cells, space_size);
                }
            }
            Element::Ignition { position, size } => {
                for flat in clipped(position, size, space_size) {
                    if cells[flat].flammable {
                        cells[flat] = cells[flat].ignited();
                    }
                }
            }
        }
    }
}

fn floor(position: PlanVector, size: PlanVector) -> Element {
    Element::Cuboid {
        position: GridIndex::new(position.x, 0, position.y),
        size: SpaceSize::new(size.x, 1, size.y),
        material: Material::Wood,
    }
}

fn room(position: PlanVector, size: SpaceSize) -> [Element; 5] {
    let wall = |x: i32, z: i32, extent: SpaceSize| Element::Cuboid {
        position: GridIndex::new(x, 0, z),
        size: extent,
        material: Material::Wood,
    };
    let (x, z) = (position.x, position.y);
    [
        floor(position, PlanVector::new(size.x, size.z)),
        wall(x, z, SpaceSize::new(size.x, size.y, 1)),
        wall(x, z, SpaceSize::new(1, size.y, size.z)),
        wall(last(x, size.x), z, SpaceSize::new(1, size.y, size.z)),
        wall(x, last(z, size.z), SpaceSize::new(size.x, size.y, 1)),
    ]
}

/// Last coordinate covered by `extent` cells from `start`
///
/// Saturates instead of overflowing; a saturated end lies outside any grid
/// on the same side as the exact one, so clipping is unaffected.
fn last(start: i32, extent: i32) -> i32 {
    start.saturating_add(extent).saturating_sub(1)
}

/// Flat offsets of the part of a box that lies inside the grid
fn clipped<'a>(
    position: &GridIndex,
    size: &SpaceSize,
    space_size: &'a SpaceSize,
) -> impl Iterator<Item = usize> + 'a {
    let start = position.sup(&GridIndex::zeros());
    let end = position
        .zip_map(size, last)
        .inf(&space_size.map(|extent| extent.saturating_sub(1)));
    index::range(start, end).filter_map(move |index| index::flatten(&index, space_size))
}

/// Accumulates elements and renders them into a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridBuilder {
    space_size: SpaceSize,
    elements: Vec<Element>,
}

impl GridBuilder {
    pub fn new(space_size: SpaceSize) -> Self {
        Self {
            space_size,
            elements: Vec::new(),
        }
    }

    pub fn add(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn cuboid(self, position: GridIndex, size: SpaceSize, material: Material) -> Self {
        self.add(Element::Cuboid {
            position,
            size,
            material,
        })
    }

    pub fn floor(self, position: PlanVector, size: PlanVector) -> Self {
        self.add(Element::Floor { position, size })
    }

    pub fn room(self, position: PlanVector, size: SpaceSize) -> Self {
        self.add(Element::Room { position, size })
    }

    pub fn ignite(self, position: GridIndex, size: SpaceSize) -> Self {
        self.add(Element::Ignition { position, size })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// # Errors
    ///
    /// [`GridError::InvalidSpaceSize`] for a non-positive or oversized
    /// extent, [`GridError::TooLarge`] when the cells cannot be allocated.
    pub fn build(&self) -> Result<Grid, GridError> {
        let mut cells = Grid::filled(self.space_size, Cell::air())?.into_cells();
        for element in &self.elements {
            element.apply(&mut cells, &self.space_size);
        }
        Grid::new(self.space_size, cells)
    }
}

/// Serialisable description of an initial grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub space_size: SpaceSize,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Blueprint {
    /// # Errors
    ///
    /// [`StorageError::Io`] or [`StorageError::Serde`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StorageError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }

    /// # Errors
    ///
    /// As for [`GridBuilder::build`].
    pub fn build(&self) -> Result<Grid, GridError> {
        let builder = self
            .elements
            .iter()
            .cloned()
            .fold(GridBuilder::new(self.space_size), GridBuilder::add);
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::FireState;

    fn at<'g>(grid: &'g Grid, x: i32, y: i32, z: i32) -> &'g Cell {
        grid.try_get(&GridIndex::new(x, y, z)).unwrap()
    }

    #[test]
    fn test_empty_builder_is_air() {
        let grid = GridBuilder::new(SpaceSize::new(2, 3, 4)).build().unwrap();
        assert_eq!(grid.len(), 24);
        assert!(grid.cells().iter().all(|c| *c == Cell::air()));
    }

    #[test]
    fn test_cuboid_is_clipped() {
        let grid = GridBuilder::new(SpaceSize::new(3, 3, 3))
            .cuboid(GridIndex::new(2, -1, 2), SpaceSize::new(5, 2, 5), Material::CellularConcrete)
            .build()
            .unwrap();
        assert_eq!(at(&grid, 2, 0, 2).material, Material::CellularConcrete);
        assert_eq!(at(&grid, 2, 1, 2).material, Material::Air);
        assert_eq!(at(&grid, 1, 0, 2).material, Material::Air);
        let concrete = grid
            .cells()
            .iter()
            .filter(|c| c.material == Material::CellularConcrete)
            .count();
        assert_eq!(concrete, 1);
    }

    #[test]
    fn test_room_has_floor_and_walls() {
        let grid = GridBuilder::new(SpaceSize::new(5, 3, 5))
            .room(PlanVector::new(0, 0), SpaceSize::new(5, 3, 5))
            .build()
            .unwrap();
        assert_eq!(at(&grid, 2, 0, 2).material, Material::Wood);
        assert_eq!(at(&grid, 0, 2, 2).material, Material::Wood);
        assert_eq!(at(&grid, 4, 2, 2).material, Material::Wood);
        assert_eq!(at(&grid, 2, 2, 0).material, Material::Wood);
        assert_eq!(at(&grid, 2, 2, 4).material, Material::Wood);
        assert_eq!(at(&grid, 2, 1, 2).material, Material::Air);
    }

    #[test]
    fn test_ignition_only_touches_flammable_cells() {
        let grid = GridBuilder::new(SpaceSize::new(3, 1, 1))
            .cuboid(GridIndex::new(0, 0, 0), SpaceSize::new(1, 1, 1), Material::Wood)
            .cuboid(GridIndex::new(1, 0, 0), SpaceSize::new(1, 1, 1), Material::CellularConcrete)
            .ignite(GridIndex::new(0, 0, 0), SpaceSize::new(2, 1, 1))
            .build()
            .unwrap();
        assert_eq!(at(&grid, 0, 0, 0).fire_state(10), FireState::Burning);
        assert_eq!(at(&grid, 0, 0, 0).temperature, 550.0);
        assert_eq!(at(&grid, 1, 0, 0).fire_state(10), FireState::Inert);
        assert_eq!(at(&grid, 2, 0, 0).burning_time, 0);
    }

    #[test]
    fn test_elements_at_extreme_coordinates_are_clipped() {
        let grid = GridBuilder::new(SpaceSize::new(3, 2, 3))
            .cuboid(GridIndex::repeat(i32::MAX), SpaceSize::repeat(i32::MAX), Material::Wood)
            .cuboid(GridIndex::repeat(i32::MIN), SpaceSize::repeat(i32::MIN), Material::Wood)
            .cuboid(GridIndex::new(1, 0, 1), SpaceSize::repeat(i32::MAX), Material::CellularConcrete)
            .room(PlanVector::repeat(i32::MAX), SpaceSize::repeat(i32::MAX))
            .ignite(GridIndex::repeat(i32::MIN), SpaceSize::repeat(i32::MAX))
            .build()
            .unwrap();
        assert_eq!(at(&grid, 0, 0, 0).material, Material::Air);
        assert_eq!(at(&grid, 2, 1, 2).material, Material::CellularConcrete);
        assert!(grid.cells().iter().all(|c| c.material != Material::Wood));
    }

    #[test]
    fn test_oversized_blueprint_is_an_error() {
        let blueprint = Blueprint {
            space_size: SpaceSize::repeat(i32::MAX),
            elements: vec![Element::Floor {
                position: PlanVector::zeros(),
                size: PlanVector::repeat(i32::MAX),
            }],
        };
        assert!(matches!(
            blueprint.build(),
            Err(GridError::InvalidSpaceSize { .. })
        ));
    }

    #[test]
    fn test_blueprint_from_json() {
        let json = r#"{
            "space_size": [4, 3, 4],
            "elements": [
                { "type": "floor", "position": [0, 0], "size": [4, 4] },
                { "type": "ignition", "position": [1, 0, 1], "size": [1, 1, 1] }
            ]
        }"#;
        let blueprint: Blueprint = serde_json::from_str(json).unwrap();
        let grid = blueprint.build().unwrap();
        assert_eq!(at(&grid, 0, 0, 0).material, Material::Wood);
        assert!(at(&grid, 1, 0, 1).is_burning());
        assert!(!at(&grid, 0, 0, 0).is_burning());
        assert_eq!(at(&grid, 0, 1, 0).material, Material::Air);
    }
}
