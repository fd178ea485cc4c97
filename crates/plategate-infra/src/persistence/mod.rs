//! Persistence implementations
//!
//! File-based implementations of the registry and access-log traits.

mod csv_access_log;
mod file_registry_provider;

pub use csv_access_log::CsvAccessLog;
pub use file_registry_provider::{FileRegistryProvider, RegistryFormat};
