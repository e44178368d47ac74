//! Firecell Simulation Core
//!
//! Cellular simulation of fire, heat, smoke and oxygen inside a discretised
//! 3D room. The space is a regular grid of cells, each made of one material.
//! Every tick the whole grid is recomputed from the previous generation:
//!
//! - heat conducts through solids and rises through air
//! - combustible solids ignite, burn for a fixed time and burn out for good
//! - flame climbs into open air above burning fuel and spreads under ceilings
//! - burning air consumes oxygen
//! - smoke rises and spreads sideways from burning fuel
//!
//! The [`Engine`] runs the loop on a worker thread, computing cells in
//! parallel, and publishes every generation to a [`Storage`].
//!
//! ```rust,ignore
//! use firecell_core::{Engine, GridBuilder, InMemoryStorage, MaterialCatalog, SimulationConfig};
//!
//! let grid = GridBuilder::new(SpaceSize::new(20, 8, 20))
//!     .room(PlanVector::new(0, 0), SpaceSize::new(20, 8, 20))
//!     .ignite(GridIndex::new(5, 0, 5), SpaceSize::new(2, 1, 2))
//!     .build()?;
//! let storage = Arc::new(InMemoryStorage::new());
//! let mut engine = Engine::new(SimulationConfig::default(), MaterialCatalog::standard()?, storage)?;
//! engine.run(grid)?;
//! let report = engine.stop()?;
//! ```

pub mod algorithm;
pub mod builder;
pub mod config;
pub mod core_types;
pub mod engine;
pub mod error;
pub mod storage;

pub use algorithm::{Algorithm, BasicAlgorithm};
pub use builder::{Blueprint, Element, GridBuilder, PlanVector};
pub use config::SimulationConfig;
pub use core_types::{
    Cell, FireState, Grid, GridIndex, GridStats, Material, MaterialCatalog, MatterState, SpaceSize,
};
pub use engine::{next_generation, Engine, EngineReport, EngineState};
pub use error::{CatalogError, ConfigError, EngineError, GridError, KernelError, StorageError};
pub use storage::{DirectoryStorage, InMemoryStorage, Storage, StoredRun};
