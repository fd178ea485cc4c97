//! Vehicle store for registered vehicles

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use plategate_domain::repository::{RegistryProvider, VehicleRepository};
use plategate_domain::service::normalize_registry_plate;
use plategate_types::{RegisteredVehicle, Result, StoreError, VehicleRecord};

const STORE_FILE: &str = "vehicles.json";

/// Persistent store for registered vehicles.
///
/// Vehicles are kept in registration order, which is the order the matcher
/// scans the registry in. Every mutation is written through to disk.
pub struct VehicleStore {
    store_path: PathBuf,
    vehicles: Vec<RegisteredVehicle>,
}

impl VehicleStore {
    /// Create or load a vehicle store in `store_dir`
    pub fn open(store_dir: &Path) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let store_path = store_dir.join(STORE_FILE);

        let vehicles = read_store_file(&store_path)?;

        Ok(Self {
            store_path,
            vehicles,
        })
    }

    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Save store to disk
    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.vehicles)?;
        debug!(path = %self.store_path.display(), count = self.vehicles.len(), "vehicle store saved");
        Ok(())
    }

    /// Register a vehicle and return its ID.
    ///
    /// The plate must be non-empty after normalization and must not collide
    /// with an already registered plate.
    pub fn add_vehicle(&mut self, record: VehicleRecord) -> Result<String> {
        let plate = normalize_registry_plate(&record.plate_number);
        if plate.is_empty() {
            return Err(StoreError::EmptyPlate.into());
        }
        if self.position_by_plate(&plate).is_some() {
            return Err(StoreError::DuplicatePlate(plate).into());
        }

        let vehicle = RegisteredVehicle::new(record);
        let id = vehicle.id.clone();
        self.vehicles.push(vehicle);
        self.persist()?;
        Ok(id)
    }

    /// Remove a vehicle by ID
    pub fn remove_vehicle(&mut self, id: &str) -> Result<bool> {
        match self.vehicles.iter().position(|v| v.id == id) {
            Some(index) => {
                self.vehicles.remove(index);
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a vehicle by plate (normalized comparison)
    pub fn remove_by_plate(&mut self, plate: &str) -> Result<bool> {
        match self.position_by_plate(&normalize_registry_plate(plate)) {
            Some(index) => {
                self.vehicles.remove(index);
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get a vehicle by ID
    pub fn get_vehicle(&self, id: &str) -> Option<&RegisteredVehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Find vehicle by license plate
    pub fn get_by_plate(&self, plate: &str) -> Option<&RegisteredVehicle> {
        self.position_by_plate(&normalize_registry_plate(plate))
            .map(|index| &self.vehicles[index])
    }

    /// All vehicles in registration order
    pub fn all_vehicles(&self) -> &[RegisteredVehicle] {
        &self.vehicles
    }

    /// Get total vehicle count
    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    /// Replace the vehicle with the same ID, keeping its position
    pub fn update_vehicle(&mut self, vehicle: RegisteredVehicle) -> Result<bool> {
        let plate = normalize_registry_plate(&vehicle.record.plate_number);
        if plate.is_empty() {
            return Err(StoreError::EmptyPlate.into());
        }
        let clash = self
            .vehicles
            .iter()
            .any(|v| v.id != vehicle.id && normalize_registry_plate(&v.record.plate_number) == plate);
        if clash {
            return Err(StoreError::DuplicatePlate(plate).into());
        }

        match self.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            Some(slot) => {
                *slot = vehicle;
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn position_by_plate(&self, normalized: &str) -> Option<usize> {
        self.vehicles
            .iter()
            .position(|v| normalize_registry_plate(&v.record.plate_number) == normalized)
    }
}

/// Load the vehicles in a store file; a missing file is an empty store
fn read_store_file(store_path: &Path) -> Result<Vec<RegisteredVehicle>> {
    if !store_path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(store_path)?);
    let vehicles = serde_json::from_reader(reader)
        .map_err(|e| StoreError::Corrupted(format!("{}: {}", store_path.display(), e)))?;
    Ok(vehicles)
}

/// Read-only registry view of a vehicle store directory.
///
/// `vehicles.json` is read again on every fetch. A missing file is an empty
/// registry; a damaged one is a fetch error.
#[derive(Debug, Clone)]
pub struct StoreRegistryProvider {
    store_path: PathBuf,
}

impl StoreRegistryProvider {
    pub fn new(store_dir: &Path) -> Self {
        Self {
            store_path: store_dir.join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.store_path
    }
}

impl RegistryProvider for StoreRegistryProvider {
    fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>> {
        let vehicles = read_store_file(&self.store_path)?;
        debug!(path = %self.store_path.display(), count = vehicles.len(), "registry read from store");
        Ok(vehicles.into_iter().map(|v| v.record).collect())
    }
}

impl VehicleRepository for VehicleStore {
    fn save(&mut self, vehicle: RegisteredVehicle) -> Result<()> {
        if self.get_vehicle(&vehicle.id).is_some() {
            self.update_vehicle(vehicle)?;
            return Ok(());
        }

        let plate = normalize_registry_plate(&vehicle.record.plate_number);
        if plate.is_empty() {
            return Err(StoreError::EmptyPlate.into());
        }
        if self.position_by_plate(&plate).is_some() {
            return Err(StoreError::DuplicatePlate(plate).into());
        }
        self.vehicles.push(vehicle);
        self.persist()
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        self.remove_vehicle(id)
    }

    fn find_by_plate(&self, plate: &str) -> Result<Option<RegisteredVehicle>> {
        Ok(self.get_by_plate(plate).cloned())
    }

    fn find_all(&self) -> Result<Vec<RegisteredVehicle>> {
        Ok(self.vehicles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plategate_types::Error;

    fn store() -> (tempfile::TempDir, VehicleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VehicleStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_add_keeps_registration_order() {
        let (_dir, mut store) = store();
        store.add_vehicle(VehicleRecord::new("ZZZ999")).unwrap();
        store.add_vehicle(VehicleRecord::new("AAA111")).unwrap();

        let plates: Vec<_> = store
            .all_vehicles()
            .iter()
            .map(|v| v.record.plate_number.as_str())
            .collect();
        assert_eq!(plates, vec!["ZZZ999", "AAA111"]);
    }

    #[test]
    fn test_duplicate_plate_rejected() {
        let (_dir, mut store) = store();
        store.add_vehicle(VehicleRecord::new("ABC 123")).unwrap();
        let err = store.add_vehicle(VehicleRecord::new("abc123")).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::DuplicatePlate(ref p)) if p == "ABC123"));
    }

    #[test]
    fn test_empty_plate_rejected() {
        let (_dir, mut store) = store();
        let err = store.add_vehicle(VehicleRecord::new("   ")).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::EmptyPlate)));
    }

    #[test]
    fn test_find_by_plate_is_normalized() {
        let (_dir, mut store) = store();
        store
            .add_vehicle(VehicleRecord::new("WSG 706").with_owner("Alice"))
            .unwrap();
        let found = store.get_by_plate("wsg706").unwrap();
        assert_eq!(found.record.owner_name, "Alice");
    }

    #[test]
    fn test_remove_by_id_and_plate() {
        let (_dir, mut store) = store();
        let id = store.add_vehicle(VehicleRecord::new("AAA111")).unwrap();
        store.add_vehicle(VehicleRecord::new("BBB222")).unwrap();

        assert!(store.remove_vehicle(&id).unwrap());
        assert!(!store.remove_vehicle(&id).unwrap());
        assert!(store.remove_by_plate("bbb 222").unwrap());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_update_keeps_position() {
        let (_dir, mut store) = store();
        let id = store.add_vehicle(VehicleRecord::new("AAA111")).unwrap();
        store.add_vehicle(VehicleRecord::new("BBB222")).unwrap();

        let mut vehicle = store.get_vehicle(&id).unwrap().clone();
        vehicle.record.color = "Red".to_string();
        assert!(store.update_vehicle(vehicle).unwrap());
        assert_eq!(store.all_vehicles()[0].record.color, "Red");
    }

    #[test]
    fn test_update_rejects_plate_clash() {
        let (_dir, mut store) = store();
        let id = store.add_vehicle(VehicleRecord::new("AAA111")).unwrap();
        store.add_vehicle(VehicleRecord::new("BBB222")).unwrap();

        let mut vehicle = store.get_vehicle(&id).unwrap().clone();
        vehicle.record.plate_number = "BBB222".to_string();
        assert!(store.update_vehicle(vehicle).is_err());
    }

    #[test]
    fn test_registry_provider_returns_records_in_order() {
        let (dir, mut store) = store();
        store.add_vehicle(VehicleRecord::new("ZZZ999")).unwrap();
        store.add_vehicle(VehicleRecord::new("AAA111")).unwrap();
        let records = StoreRegistryProvider::new(dir.path()).fetch_vehicles().unwrap();
        assert_eq!(records[0].plate_number, "ZZZ999");
        assert_eq!(records[1].plate_number, "AAA111");
    }

    #[test]
    fn test_registry_provider_sees_later_registrations() {
        let (dir, mut store) = store();
        let provider = StoreRegistryProvider::new(dir.path());
        assert!(provider.fetch_vehicles().unwrap().is_empty());

        store.add_vehicle(VehicleRecord::new("WSG706")).unwrap();
        assert_eq!(provider.fetch_vehicles().unwrap().len(), 1);
    }

    #[test]
    fn test_registry_provider_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StoreRegistryProvider::new(&dir.path().join("not-yet"));
        assert!(provider.fetch_vehicles().unwrap().is_empty());
    }

    #[test]
    fn test_registry_provider_reports_corruption_on_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StoreRegistryProvider::new(dir.path());
        std::fs::write(provider.path(), "{not json").unwrap();
        assert!(matches!(
            provider.fetch_vehicles(),
            Err(Error::Store(StoreError::Corrupted(_)))
        ));
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "{not json").unwrap();
        assert!(matches!(
            VehicleStore::open(dir.path()),
            Err(Error::Store(StoreError::Corrupted(_)))
        ));
    }
}
