//! Core types: materials, cells, grids and index arithmetic

pub mod cell;
pub mod grid;
pub mod index;
pub mod material;

pub use cell::{Cell, FireState, AMBIENT_TEMPERATURE, MAX_OXYGEN_LEVEL, MAX_SMOKE};
pub use grid::{Grid, GridStats};
pub use index::{Axis, GridIndex, SpaceSize};
pub use material::{
    ConductionTable, Material, MaterialCatalog, MaterialProperties, MatterState,
    UnorderedMaterialPair,
};
