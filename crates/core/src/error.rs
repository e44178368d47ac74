//! Error types for the simulation kernel, engine and storage

use crate::core_types::{GridIndex, Material};
use thiserror::Error;

/// Material catalog misconfiguration, fatal at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("missing conduction coefficient for {a} / {b}")]
    MissingCoefficient { a: Material, b: Material },
    #[error("conduction coefficient for {a} / {b} is listed more than once")]
    DuplicateCoefficient { a: Material, b: Material },
    #[error("conduction table has {actual} entries, expected {expected}")]
    WrongCount { expected: usize, actual: usize },
}

/// Grid construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("space size {x}x{y}x{z} must be positive on every axis")]
    InvalidSpaceSize { x: i32, y: i32, z: i32 },
    #[error("grid of {expected} cells was given {actual} cells")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("cannot allocate a grid of {cells} cells")]
    TooLarge { cells: usize },
}

/// Failure while computing a cell; aborts the whole tick
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("cell index ({}, {}, {}) is outside the grid", .0.x, .0.y, .0.z)]
    IndexOutOfRange(GridIndex),
    #[error("temperature at ({}, {}, {}) became {value}", .index.x, .index.y, .index.z)]
    NonFiniteTemperature { index: GridIndex, value: f64 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Invalid simulation parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("delta time must be finite and positive, got {0}")]
    InvalidDeltaTime(f64),
}

/// Engine lifecycle and tick failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is {actual:?}, operation requires {expected:?}")]
    InvalidState {
        expected: crate::engine::EngineState,
        actual: crate::engine::EngineState,
    },
    #[error("tick {generation} failed: {source}")]
    Kernel {
        generation: u64,
        #[source]
        source: KernelError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("engine worker thread panicked")]
    WorkerPanicked,
}

/// Storage and blueprint I/O errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to (de)serialize {path}: {source}")]
    Serde {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
