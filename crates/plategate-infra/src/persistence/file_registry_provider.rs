//! Read-only registry backed by a CSV, TOML or JSON file

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use plategate_domain::repository::RegistryProvider;
use plategate_types::{Error, Result, VehicleRecord};

use crate::registry_csv::load_vehicles_from_csv;
use crate::registry_toml::load_vehicles_from_toml;

/// Registry file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    Csv,
    Toml,
    Json,
}

impl RegistryFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// File-based implementation of RegistryProvider.
///
/// The file is re-read on every fetch so edits show up on the next decision.
/// A JSON file may be a plain array of records or a vehicle store file.
#[derive(Debug, Clone)]
pub struct FileRegistryProvider {
    path: PathBuf,
    format: RegistryFormat,
}

impl FileRegistryProvider {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = RegistryFormat::from_path(&path).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unsupported registry file (expected .csv, .toml or .json): {}",
                path.display()
            ))
        })?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RegistryFormat {
        self.format
    }
}

impl RegistryProvider for FileRegistryProvider {
    fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>> {
        if !self.path.exists() {
            return Err(Error::FileNotFound(self.path.display().to_string()));
        }

        let vehicles = match self.format {
            RegistryFormat::Csv => load_vehicles_from_csv(&self.path)?,
            RegistryFormat::Toml => load_vehicles_from_toml(&self.path)?,
            RegistryFormat::Json => {
                let reader = BufReader::new(File::open(&self.path)?);
                serde_json::from_reader(reader)?
            }
        };

        debug!(path = %self.path.display(), count = vehicles.len(), "registry loaded");
        Ok(vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RegistryFormat::from_path(Path::new("a/reg.CSV")), Some(RegistryFormat::Csv));
        assert_eq!(RegistryFormat::from_path(Path::new("reg.toml")), Some(RegistryFormat::Toml));
        assert_eq!(RegistryFormat::from_path(Path::new("vehicles.json")), Some(RegistryFormat::Json));
        assert_eq!(RegistryFormat::from_path(Path::new("reg.xlsx")), None);
        assert_eq!(RegistryFormat::from_path(Path::new("registry")), None);
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        assert!(FileRegistryProvider::open("registry.xlsx").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileRegistryProvider::open(dir.path().join("none.csv")).unwrap();
        assert!(matches!(provider.fetch_vehicles(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_json_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles.json");
        std::fs::write(
            &path,
            r#"[{"id": "1", "plate_number": "WSG706", "color": "Red", "make_model": null,
                 "owner_name": "Alice", "registered_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let vehicles = FileRegistryProvider::open(&path).unwrap().fetch_vehicles().unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].plate_number, "WSG706");
        assert_eq!(vehicles[0].make_model, "");
    }
}
