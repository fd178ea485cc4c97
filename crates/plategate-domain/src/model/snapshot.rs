//! Immutable registry snapshot used for one access decision

use chrono::{DateTime, Utc};
use tracing::warn;

use plategate_types::VehicleRecord;

use crate::repository::RegistryProvider;

/// Copy of the registry taken at the start of a decision.
///
/// Iteration order is the provider's order, which is the order the matcher
/// scans in.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    vehicles: Vec<VehicleRecord>,
    fetched_at: DateTime<Utc>,
    degraded: bool,
}

impl RegistrySnapshot {
    pub fn new(vehicles: Vec<VehicleRecord>) -> Self {
        Self {
            vehicles,
            fetched_at: Utc::now(),
            degraded: false,
        }
    }

    /// Empty snapshot standing in for an unreachable registry
    pub fn unavailable() -> Self {
        Self {
            vehicles: Vec::new(),
            fetched_at: Utc::now(),
            degraded: true,
        }
    }

    /// Pull the full registry. A failed fetch yields an empty, degraded
    /// snapshot instead of an error.
    pub fn fetch(provider: &dyn RegistryProvider) -> Self {
        match provider.fetch_vehicles() {
            Ok(vehicles) => Self::new(vehicles),
            Err(e) => {
                warn!(error = %e, "registry fetch failed, continuing with empty registry");
                Self::unavailable()
            }
        }
    }

    pub fn vehicles(&self) -> &[VehicleRecord] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// True when the provider failed and this snapshot is a stand-in
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plategate_types::{Error, Result};

    struct Fixed(Vec<VehicleRecord>);

    impl RegistryProvider for Fixed {
        fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl RegistryProvider for Offline {
        fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>> {
            Err(Error::ExternalCommand("connection refused".to_string()))
        }
    }

    #[test]
    fn test_fetch_keeps_provider_order() {
        let provider = Fixed(vec![VehicleRecord::new("B2"), VehicleRecord::new("A1")]);
        let snapshot = RegistrySnapshot::fetch(&provider);
        assert!(!snapshot.is_degraded());
        let plates: Vec<_> = snapshot.vehicles().iter().map(|v| v.plate_number.as_str()).collect();
        assert_eq!(plates, vec!["B2", "A1"]);
    }

    #[test]
    fn test_failed_fetch_degrades_to_empty() {
        let snapshot = RegistrySnapshot::fetch(&Offline);
        assert!(snapshot.is_empty());
        assert!(snapshot.is_degraded());
    }
}
