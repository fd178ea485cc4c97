//! Repository adapters for persistence layer

use std::path::{Path, PathBuf};

use plategate_domain::repository::{AccessLogSink, RegistryProvider};
use plategate_infra::{CsvAccessLog, FileRegistryProvider};
use plategate_store::{StoreRegistryProvider, VehicleStore};
use plategate_types::Result;

use crate::config::Config;

/// Open the local vehicle store (the configured directory, or the data dir)
pub fn open_vehicle_store(config: &Config) -> Result<VehicleStore> {
    VehicleStore::open(&store_dir(config)?)
}

fn store_dir(config: &Config) -> Result<PathBuf> {
    match config.registry_path {
        Some(ref path) if path.is_dir() => Ok(path.clone()),
        _ => Config::data_dir(),
    }
}

/// Open the local vehicle store at a custom directory
pub fn open_vehicle_store_at(store_dir: &Path) -> Result<VehicleStore> {
    VehicleStore::open(store_dir)
}

/// Open the registry the gate reads from.
///
/// A configured file is read by extension; a directory or no setting means
/// the local vehicle store. Nothing is read until the first fetch.
pub fn open_registry(config: &Config) -> Result<Box<dyn RegistryProvider>> {
    open_registry_at(config.registry_path.clone(), config)
}

/// Same as [`open_registry`] with an explicit path override
pub fn open_registry_at(path: Option<PathBuf>, config: &Config) -> Result<Box<dyn RegistryProvider>> {
    match path {
        Some(path) if !path.is_dir() => Ok(Box::new(FileRegistryProvider::open(path)?)),
        Some(dir) => Ok(Box::new(StoreRegistryProvider::new(&dir))),
        None => Ok(Box::new(StoreRegistryProvider::new(&store_dir(config)?))),
    }
}

/// Open the access log, or `None` when logging is disabled
pub fn open_access_log(config: &Config) -> Result<Option<Box<dyn AccessLogSink>>> {
    if !config.logging_enabled {
        return Ok(None);
    }
    Ok(Some(Box::new(CsvAccessLog::new(config.access_log_path()?))))
}
