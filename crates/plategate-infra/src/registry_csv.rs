//! CSV loader for registry files
//!
//! Expected columns: plate_number, color, make_model, owner_name. The header
//! row is optional; when present, columns are located by name so extra or
//! reordered columns are tolerated.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use plategate_types::{Error, Result, VehicleRecord};

#[derive(Debug, Clone, Copy)]
struct Columns {
    plate: usize,
    color: Option<usize>,
    make_model: Option<usize>,
    owner: Option<usize>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            plate: 0,
            color: Some(1),
            make_model: Some(2),
            owner: Some(3),
        }
    }
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |keys: &[&str]| {
            header.iter().position(|h| {
                let h = h.to_lowercase();
                keys.iter().any(|k| h.contains(k))
            })
        };
        Self {
            plate: find(&["plate"]).unwrap_or(0),
            color: find(&["color", "colour"]),
            make_model: find(&["make", "model"]),
            owner: find(&["owner", "name"]),
        }
    }
}

fn is_header(record: &StringRecord) -> bool {
    record.iter().any(|h| {
        let h = h.to_lowercase();
        h.contains("plate") || h.contains("owner") || h.contains("color") || h.contains("make")
    })
}

/// Load registry records from a CSV file
pub fn load_vehicles_from_csv(path: &Path) -> Result<Vec<VehicleRecord>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_vehicles_csv(&content)
}

/// Parse registry records from CSV text, keeping file order.
/// Rows without a plate are skipped.
pub fn parse_vehicles_csv(content: &str) -> Result<Vec<VehicleRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let mut vehicles = Vec::new();

    let columns = match records.next() {
        None => return Ok(vehicles),
        Some(first) => {
            let first = first?;
            if is_header(&first) {
                Columns::from_header(&first)
            } else {
                let columns = Columns::default();
                vehicles.extend(parse_row(&first, columns));
                columns
            }
        }
    };

    for row in records {
        vehicles.extend(parse_row(&row?, columns));
    }

    debug!(count = vehicles.len(), "parsed registry CSV");
    Ok(vehicles)
}

fn parse_row(row: &StringRecord, columns: Columns) -> Option<VehicleRecord> {
    let cell = |index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .map(str::to_string)
            .unwrap_or_default()
    };

    let plate_number = cell(Some(columns.plate));
    if plate_number.is_empty() {
        return None;
    }

    Some(VehicleRecord {
        plate_number,
        color: cell(columns.color),
        make_model: cell(columns.make_model),
        owner_name: cell(columns.owner),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_header() {
        let csv = "WSG706,Red,Toyota Corolla,Alice\nKL55AB,Blue,Honda Civic,Bob\n";
        let vehicles = parse_vehicles_csv(csv).unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].plate_number, "WSG706");
        assert_eq!(vehicles[1].owner_name, "Bob");
    }

    #[test]
    fn test_parse_with_reordered_header() {
        let csv = "owner_name,plate_number,make_model,color\nAlice,WSG 706,Toyota Corolla,Red\n";
        let vehicles = parse_vehicles_csv(csv).unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].plate_number, "WSG 706");
        assert_eq!(vehicles[0].color, "Red");
        assert_eq!(vehicles[0].make_model, "Toyota Corolla");
        assert_eq!(vehicles[0].owner_name, "Alice");
    }

    #[test]
    fn test_short_rows_default_to_empty() {
        let vehicles = parse_vehicles_csv("ABC123\nXYZ789,Silver\n").unwrap();
        assert_eq!(vehicles[0].color, "");
        assert_eq!(vehicles[1].color, "Silver");
        assert_eq!(vehicles[1].owner_name, "");
    }

    #[test]
    fn test_rows_without_plate_are_skipped() {
        let vehicles = parse_vehicles_csv("plate_number,color\n,Red\nABC123,Blue\n").unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].plate_number, "ABC123");
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_vehicles_csv("").unwrap().is_empty());
    }
}
