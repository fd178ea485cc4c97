//! Registry loader from TOML
//!
//! ```toml
//! [[vehicles]]
//! plate_number = "WSG706"
//! color = "Red"
//! make_model = "Toyota Corolla"
//! owner_name = "Alice"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use plategate_types::{ConfigError, Error, Result, VehicleRecord};

/// Container for parsing a registry TOML file
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    vehicles: Vec<VehicleRecord>,
}

/// Load registry records from a TOML file
pub fn load_vehicles_from_toml(path: &Path) -> Result<Vec<VehicleRecord>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to read registry file {}: {}",
            path.display(),
            e
        )))
    })?;

    parse_vehicles_toml(&content)
}

/// Parse registry records from TOML text
pub fn parse_vehicles_toml(toml_content: &str) -> Result<Vec<VehicleRecord>> {
    let file: RegistryFile = toml::from_str(toml_content).map_err(|e| {
        Error::Config(ConfigError::ParseError(format!(
            "Failed to parse registry TOML: {}",
            e
        )))
    })?;

    Ok(file.vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TOML: &str = r#"
[[vehicles]]
plate_number = "WSG706"
color = "Red"
make_model = "Toyota Corolla"
owner_name = "Alice"

[[vehicles]]
plate_number = "KL55AB"
"#;

    #[test]
    fn test_parse_keeps_order() {
        let vehicles = parse_vehicles_toml(TEST_TOML).unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].owner_name, "Alice");
        assert_eq!(vehicles[1].plate_number, "KL55AB");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let vehicles = parse_vehicles_toml(TEST_TOML).unwrap();
        assert_eq!(vehicles[1].color, "");
        assert_eq!(vehicles[1].make_model, "");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_vehicles_toml("[[vehicles]\nplate").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_no_vehicles_table() {
        assert!(parse_vehicles_toml("").unwrap().is_empty());
    }
}
