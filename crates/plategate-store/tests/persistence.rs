use plategate_domain::repository::VehicleRepository;
use plategate_store::VehicleStore;
use plategate_types::{RegisteredVehicle, VehicleRecord};

#[test]
fn vehicles_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = VehicleStore::open(dir.path()).unwrap();
        store
            .add_vehicle(
                VehicleRecord::new("WSG706")
                    .with_color("Red")
                    .with_make_model("Toyota Corolla")
                    .with_owner("Alice"),
            )
            .unwrap();
        store.add_vehicle(VehicleRecord::new("KL55AB")).unwrap();
    }

    let store = VehicleStore::open(dir.path()).unwrap();
    assert_eq!(store.count(), 2);
    let first = &store.all_vehicles()[0];
    assert_eq!(first.record.plate_number, "WSG706");
    assert_eq!(first.record.make_model, "Toyota Corolla");
    assert_eq!(store.all_vehicles()[1].record.plate_number, "KL55AB");
}

#[test]
fn repository_save_inserts_then_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = VehicleStore::open(dir.path()).unwrap();

    let mut vehicle = RegisteredVehicle::new(VehicleRecord::new("AB12CD"));
    store.save(vehicle.clone()).unwrap();
    vehicle.record.owner_name = "Carol".to_string();
    store.save(vehicle.clone()).unwrap();

    let all = store.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].record.owner_name, "Carol");

    let found = store.find_by_plate("ab12cd").unwrap().unwrap();
    assert_eq!(found.id, vehicle.id);
    assert!(store.remove(&vehicle.id).unwrap());
    assert!(store.find_by_plate("AB12CD").unwrap().is_none());
}

#[test]
fn store_file_is_a_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = VehicleStore::open(dir.path()).unwrap();
    store.add_vehicle(VehicleRecord::new("XYZ789")).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["plate_number"], "XYZ789");
}
