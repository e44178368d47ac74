//! JSON files on disk, one per generation
//!
//! A run directory holds `config.json` with the parameters of the run and a
//! `generation-<n>.json` file for each published grid. Together they are
//! enough to find and replay a stored simulation.

use super::Storage;
use crate::config::SimulationConfig;
use crate::core_types::{Grid, SpaceSize};
use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const CONFIG_FILE: &str = "config.json";

/// Parameters of a stored run, written next to its generation files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub space_size: SpaceSize,
    pub config: SimulationConfig,
}

/// Writes each generation as a JSON file in a directory
///
/// Files are named `generation-<n>.json` with `n` zero-padded to eight
/// digits so a directory listing sorts in generation order.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Use `root`, creating it if needed
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.clone(),
            source,
        })?;
        info!("Storing generations in {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, generation: u64) -> PathBuf {
        self.root.join(format!("generation-{generation:08}.json"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Record the run parameters in `config.json`
    ///
    /// # Errors
    ///
    /// [`StorageError::Serde`] or [`StorageError::Io`].
    pub fn initialize(&self, config: &SimulationConfig, space_size: SpaceSize) -> Result<(), StorageError> {
        let run = StoredRun {
            space_size,
            config: *config,
        };
        write_json(&self.config_path(), &run)?;
        info!(
            "Stored run parameters: {}x{}x{}, delta time {}, max burning time {}",
            space_size.x, space_size.y, space_size.z, config.delta_time, config.max_burning_time
        );
        Ok(())
    }

    /// Read back the parameters written by [`Self::initialize`]
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] when the directory holds no run parameters,
    /// [`StorageError::Serde`] for malformed JSON.
    pub fn read_config(&self) -> Result<StoredRun, StorageError> {
        read_json(&self.config_path())
    }

    /// Serialise a grid to its generation file
    ///
    /// # Errors
    ///
    /// [`StorageError::Serde`] or [`StorageError::Io`].
    pub fn save(&self, grid: &Grid, generation: u64) -> Result<(), StorageError> {
        write_json(&self.path_for(generation), grid)
    }

    /// Read a generation file back
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] for a missing or unreadable file and
    /// [`StorageError::Serde`] for malformed JSON, including a cell count
    /// that does not match the stored space size.
    pub fn load(&self, generation: u64) -> Result<Grid, StorageError> {
        read_json(&self.path_for(generation))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let contents = serde_json::to_string(value).map_err(|source| StorageError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let contents = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StorageError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

impl Storage for DirectoryStorage {
    fn put(&self, grid: Arc<Grid>, generation: u64) {
        if let Err(e) = self.save(&grid, generation) {
            error!("Failed to store generation {}: {}", generation, e);
        }
    }

    fn get(&self, generation: u64) -> Option<Arc<Grid>> {
        match self.load(generation) {
            Ok(grid) => Some(Arc::new(grid)),
            Err(StorageError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read generation {}: {}", generation, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Cell, Material};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("firecell-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_and_load() {
        let dir = scratch_dir("save-load");
        let storage = DirectoryStorage::new(&dir).unwrap();

        let cells = vec![Cell::of(Material::Wood).ignited(), Cell::air()];
        let grid = Grid::new(SpaceSize::new(2, 1, 1), cells).unwrap();
        storage.put(Arc::new(grid.clone()), 3);

        assert!(storage.path_for(3).exists());
        let loaded = storage.get(3).unwrap();
        assert_eq!(*loaded, grid);
        assert!(storage.get(4).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_rejects_bad_shape() {
        let dir = scratch_dir("bad-shape");
        let storage = DirectoryStorage::new(&dir).unwrap();
        let grid = Grid::filled(SpaceSize::new(2, 1, 1), Cell::air()).unwrap();
        let mut json: serde_json::Value = serde_json::to_value(&grid).unwrap();
        json["space_size"] = serde_json::json!([3, 1, 1]);
        fs::write(storage.path_for(0), json.to_string()).unwrap();

        let err = storage.load(0).unwrap_err();
        assert!(matches!(err, StorageError::Serde { .. }));
        assert!(storage.get(0).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_run_parameters_round_trip() {
        let dir = scratch_dir("run-config");
        let storage = DirectoryStorage::new(&dir).unwrap();
        assert!(matches!(storage.read_config(), Err(StorageError::Io { .. })));

        let config = SimulationConfig {
            delta_time: 0.25,
            max_burning_time: 17,
            max_generations: Some(40),
        };
        storage.initialize(&config, SpaceSize::new(8, 6, 8)).unwrap();

        assert!(storage.config_path().exists());
        let run = storage.read_config().unwrap();
        assert_eq!(run.space_size, SpaceSize::new(8, 6, 8));
        assert_eq!(run.config, config);

        let _ = fs::remove_dir_all(&dir);
    }
}
