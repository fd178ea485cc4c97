//! Infrastructure layer: registry file loaders and access-log persistence

pub mod persistence;
pub mod registry_csv;
pub mod registry_toml;

pub use persistence::{CsvAccessLog, FileRegistryProvider};
pub use registry_csv::{load_vehicles_from_csv, parse_vehicles_csv};
pub use registry_toml::{load_vehicles_from_toml, parse_vehicles_toml};
