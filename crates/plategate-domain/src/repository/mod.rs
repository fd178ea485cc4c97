//! Repository trait definitions for the registry and the access log

use plategate_types::{AccessAttempt, AttemptFilter, RegisteredVehicle, Result, VehicleRecord};

/// Source of the full vehicle registry, read wholesale per decision
pub trait RegistryProvider: Send + Sync {
    /// Fetch every registered vehicle in registry order
    fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>>;
}

/// Sink for access-attempt records
pub trait AccessLogSink: Send + Sync {
    /// Append one attempt
    fn record(&self, attempt: &AccessAttempt) -> Result<()>;

    /// Most recent attempts, newest last
    fn recent(&self, limit: usize) -> Result<Vec<AccessAttempt>>;

    /// The last `limit` attempts that pass `filter`, newest last
    fn recent_matching(&self, limit: usize, filter: AttemptFilter) -> Result<Vec<AccessAttempt>> {
        let mut attempts: Vec<_> = self
            .recent(usize::MAX)?
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        let skip = attempts.len().saturating_sub(limit);
        Ok(attempts.split_off(skip))
    }
}

/// Writable registry used for local vehicle administration
pub trait VehicleRepository {
    /// Save a vehicle, replacing one with the same id
    fn save(&mut self, vehicle: RegisteredVehicle) -> Result<()>;

    /// Remove a vehicle by id, returning whether one was removed
    fn remove(&mut self, id: &str) -> Result<bool>;

    /// Find a vehicle by plate (normalized comparison)
    fn find_by_plate(&self, plate: &str) -> Result<Option<RegisteredVehicle>>;

    /// All vehicles in registration order
    fn find_all(&self) -> Result<Vec<RegisteredVehicle>>;
}
