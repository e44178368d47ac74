//! Generation loop
//!
//! The engine owns a worker thread that repeatedly publishes the current grid
//! and computes the next one. Every generation, starting with the initial
//! grid as generation 0, is handed to the storage exactly once and in order.
//!
//! Publishing goes through a channel to a dedicated writer thread, so a slow
//! storage never stalls the computation.
//!
//! ```text
//! Idle --run--> Running --stop/wait--> Stopped
//! ```

use crate::algorithm::{Algorithm, BasicAlgorithm};
use crate::config::SimulationConfig;
use crate::core_types::{Grid, MaterialCatalog};
use crate::error::{EngineError, KernelError};
use crate::storage::Storage;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

const ENGINE_THREAD: &str = "engine-thread";
const STORAGE_THREAD: &str = "storage-writer";

/// Engine lifecycle; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct EngineReport {
    /// Number of generations published, including generation 0
    pub generations: u64,
    /// Last published grid
    pub final_grid: Arc<Grid>,
}

/// Compute the next generation of `old`
///
/// Cells are evaluated in parallel; the grid only exists once every cell has
/// been computed.
///
/// # Errors
///
/// The first [`KernelError`] reported by the algorithm.
pub fn next_generation(old: &Grid, algorithm: &dyn Algorithm) -> Result<Grid, KernelError> {
    let cells = (0..old.len())
        .into_par_iter()
        .filter_map(|flat| old.expand(flat))
        .map(|index| algorithm.compute(old, index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Grid::new(old.space_size(), cells)?)
}

/// Drives an [`Algorithm`] over successive generations on a worker thread
pub struct Engine {
    config: SimulationConfig,
    algorithm: Arc<dyn Algorithm>,
    storage: Arc<dyn Storage>,
    state: EngineState,
    stop_requested: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<EngineReport, EngineError>>>,
}

impl Engine {
    /// Engine running the standard algorithm
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if the configuration is invalid.
    pub fn new(
        config: SimulationConfig,
        catalog: MaterialCatalog,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, EngineError> {
        let algorithm = Arc::new(BasicAlgorithm::new(catalog, config));
        Self::with_algorithm(config, algorithm, storage)
    }

    /// Engine running a caller-supplied algorithm
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if the configuration is invalid.
    pub fn with_algorithm(
        config: SimulationConfig,
        algorithm: Arc<dyn Algorithm>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            algorithm,
            storage,
            state: EngineState::Idle,
            stop_requested: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Whether the worker has exited, either by finishing or by failing
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_some_and(JoinHandle::is_finished)
    }

    /// Start the generation loop from `initial`
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidState`] unless the engine is idle, and
    /// [`EngineError::Spawn`] if the worker thread cannot be created.
    pub fn run(&mut self, initial: Grid) -> Result<(), EngineError> {
        self.expect_state(EngineState::Idle)?;

        let worker = GenerationLoop {
            algorithm: Arc::clone(&self.algorithm),
            storage: Arc::clone(&self.storage),
            stop_requested: Arc::clone(&self.stop_requested),
            max_generations: self.config.max_generations,
        };
        let handle = thread::Builder::new()
            .name(ENGINE_THREAD.to_string())
            .spawn(move || worker.run(initial))
            .map_err(|source| EngineError::Spawn {
                name: ENGINE_THREAD,
                source,
            })?;

        self.worker = Some(handle);
        self.state = EngineState::Running;
        info!(
            "Engine started (dt = {}, max burning time = {})",
            self.config.delta_time, self.config.max_burning_time
        );
        Ok(())
    }

    /// Ask the loop to stop after the tick in progress and wait for it
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidState`] unless running, or the error that ended
    /// the run, e.g. [`EngineError::Kernel`].
    pub fn stop(&mut self) -> Result<EngineReport, EngineError> {
        self.expect_state(EngineState::Running)?;
        self.stop_requested.store(true, Ordering::Release);
        self.join()
    }

    /// Wait for a run to end on its own
    ///
    /// Returns once generation `max_generations` has been published or a tick
    /// fails. Without a generation limit this blocks until another thread
    /// calls [`Engine::stop`], which is not possible while `&mut self` is
    /// held, so use [`Engine::stop`] for unbounded runs.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::stop`].
    pub fn wait(&mut self) -> Result<EngineReport, EngineError> {
        self.expect_state(EngineState::Running)?;
        self.join()
    }

    fn join(&mut self) -> Result<EngineReport, EngineError> {
        self.state = EngineState::Stopped;
        let handle = self.worker.take().ok_or(EngineError::WorkerPanicked)?;
        let result = handle.join().map_err(|_| EngineError::WorkerPanicked)?;
        match &result {
            Ok(report) => info!("Engine stopped after {} generations", report.generations),
            Err(e) => error!("Engine stopped with error: {}", e),
        }
        result
    }

    fn expect_state(&self, expected: EngineState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.stop_requested.store(true, Ordering::Release);
            if handle.join().is_err() {
                warn!("Engine worker panicked during shutdown");
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// State moved onto the worker thread
struct GenerationLoop {
    algorithm: Arc<dyn Algorithm>,
    storage: Arc<dyn Storage>,
    stop_requested: Arc<AtomicBool>,
    max_generations: Option<u64>,
}

impl GenerationLoop {
    fn run(self, initial: Grid) -> Result<EngineReport, EngineError> {
        let (sender, receiver) = mpsc::channel::<(u64, Arc<Grid>)>();
        let storage = Arc::clone(&self.storage);
        let writer = thread::Builder::new()
            .name(STORAGE_THREAD.to_string())
            .spawn(move || {
                for (generation, grid) in receiver {
                    storage.put(grid, generation);
                    debug!("Stored generation {}", generation);
                }
            })
            .map_err(|source| EngineError::Spawn {
                name: STORAGE_THREAD,
                source,
            })?;

        let mut current = Arc::new(initial);
        let mut generation = 0_u64;

        let outcome = loop {
            if sender.send((generation, Arc::clone(&current))).is_err() {
                warn!("Storage writer is gone, generation {} not stored", generation);
            }

            if self.stop_requested.load(Ordering::Acquire)
                || self.max_generations.is_some_and(|max| generation >= max)
            {
                break Ok(());
            }

            match next_generation(&current, self.algorithm.as_ref()) {
                Ok(next) => {
                    generation += 1;
                    if tracing::enabled!(tracing::Level::TRACE) {
                        let stats = next.stats();
                        trace!(
                            "Generation {}: {} burning, {} burnt out, max {:.1} °C, smoke {}",
                            generation,
                            stats.burning_cells,
                            stats.burnt_out_cells,
                            stats.max_temperature,
                            stats.total_smoke
                        );
                    }
                    current = Arc::new(next);
                }
                Err(source) => {
                    error!("Failed to compute generation {}: {}", generation + 1, source);
                    break Err(EngineError::Kernel {
                        generation: generation + 1,
                        source,
                    });
                }
            }
        };

        // Closing the channel lets the writer drain and exit
        drop(sender);
        if writer.join().is_err() {
            return Err(EngineError::WorkerPanicked);
        }

        outcome.map(|()| EngineReport {
            generations: generation + 1,
            final_grid: current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Cell, GridIndex, Material, SpaceSize};
    use crate::storage::InMemoryStorage;

    fn small_room() -> Grid {
        let size = SpaceSize::new(3, 3, 3);
        let mut cells = vec![Cell::air(); 27];
        cells[0] = Cell::of(Material::Wood).ignited();
        Grid::new(size, cells).unwrap()
    }

    #[test]
    fn test_next_generation_matches_sequential() {
        let grid = small_room();
        let algorithm = BasicAlgorithm::new(MaterialCatalog::standard().unwrap(), SimulationConfig::default());
        let parallel = next_generation(&grid, &algorithm).unwrap();
        for (index, cell) in parallel.indexed_cells() {
            assert_eq!(*cell, algorithm.compute(&grid, index).unwrap());
        }
    }

    #[test]
    fn test_bounded_run_publishes_every_generation() {
        let storage = Arc::new(InMemoryStorage::new());
        let config = SimulationConfig {
            max_generations: Some(5),
            ..SimulationConfig::default()
        };
        let mut engine = Engine::new(config, MaterialCatalog::standard().unwrap(), storage.clone()).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);

        engine.run(small_room()).unwrap();
        assert_eq!(engine.state(), EngineState::Running);

        let report = engine.wait().unwrap();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(report.generations, 6);
        assert_eq!(storage.generations(), (0..=5).collect::<Vec<_>>());
        assert_eq!(*storage.get(0).unwrap(), small_room());
        assert_eq!(storage.get(5).unwrap(), report.final_grid);
    }

    #[test]
    fn test_lifecycle_is_enforced() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut engine = Engine::new(
            SimulationConfig::default(),
            MaterialCatalog::standard().unwrap(),
            storage,
        )
        .unwrap();

        assert!(matches!(
            engine.stop(),
            Err(EngineError::InvalidState {
                expected: EngineState::Running,
                actual: EngineState::Idle
            })
        ));

        engine.run(small_room()).unwrap();
        assert!(matches!(engine.run(small_room()), Err(EngineError::InvalidState { .. })));
        engine.stop().unwrap();
        assert!(matches!(engine.run(small_room()), Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig {
            delta_time: 0.0,
            ..SimulationConfig::default()
        };
        let storage = Arc::new(InMemoryStorage::new());
        let err = Engine::new(config, MaterialCatalog::standard().unwrap(), storage).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    struct FailAt(GridIndex);

    impl Algorithm for FailAt {
        fn compute(&self, _old: &Grid, index: GridIndex) -> Result<Cell, KernelError> {
            if index == self.0 {
                Err(KernelError::IndexOutOfRange(index))
            } else {
                Ok(Cell::air())
            }
        }
    }

    #[test]
    fn test_kernel_error_is_fatal() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut engine = Engine::with_algorithm(
            SimulationConfig::default(),
            Arc::new(FailAt(GridIndex::new(1, 1, 1))),
            storage.clone(),
        )
        .unwrap();
        engine.run(small_room()).unwrap();

        let err = engine.wait().unwrap_err();
        assert!(matches!(err, EngineError::Kernel { generation: 1, .. }));
        // Only the initial grid made it out
        assert_eq!(storage.generations(), vec![0]);
    }
}
