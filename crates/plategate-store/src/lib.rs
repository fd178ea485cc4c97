//! Persistent store for the local vehicle registry

pub mod stats;
pub mod vehicles;

pub use stats::RegistryStats;
pub use vehicles::{StoreRegistryProvider, VehicleStore};
