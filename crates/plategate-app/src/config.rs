//! Configuration management for plategate
//!
//! Config stored at: ~/.config/plategate/config.json

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use plategate_domain::service::FUZZY_MATCH_THRESHOLD;
use plategate_types::{ConfigError, OutputFormat, Result};
use plategate_vision::LOW_CONFIDENCE_THRESHOLD;

const APP_DIR: &str = "plategate";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Registry file (.csv, .toml, .json) or vehicle store directory.
    /// Defaults to the local vehicle store.
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Access log CSV override
    #[serde(default)]
    pub access_log_path: Option<PathBuf>,

    /// OCR command line (prints recognized fragments as JSON)
    #[serde(default)]
    pub ocr_command: Option<String>,

    /// Plate detector command line; unset means the whole frame is the plate
    #[serde(default)]
    pub locator_command: Option<String>,

    /// Minimum detector confidence passed to the locator
    #[serde(default = "default_locator_min_conf")]
    pub locator_min_conf: f32,

    /// Color classifier command line
    #[serde(default)]
    pub color_command: Option<String>,

    /// Labels file for the color classifier
    #[serde(default)]
    pub color_labels: Option<PathBuf>,

    /// Make/model classifier command line
    #[serde(default)]
    pub make_command: Option<String>,

    /// Labels file for the make/model classifier
    #[serde(default)]
    pub make_labels: Option<PathBuf>,

    /// Fuzzy plate matches must score strictly above this
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Best OCR confidence under which the raw crop is recognized again
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,

    /// Run per-variant OCR calls concurrently
    #[serde(default)]
    pub parallel_ocr: bool,

    /// Record access attempts
    #[serde(default = "default_true")]
    pub logging_enabled: bool,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
}

fn default_locator_min_conf() -> f32 {
    0.3
}

fn default_fuzzy_threshold() -> f64 {
    FUZZY_MATCH_THRESHOLD
}

fn default_low_confidence_threshold() -> f64 {
    LOW_CONFIDENCE_THRESHOLD
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: None,
            access_log_path: None,
            ocr_command: None,
            locator_command: None,
            locator_min_conf: default_locator_min_conf(),
            color_command: None,
            color_labels: None,
            make_command: None,
            make_labels: None,
            fuzzy_threshold: default_fuzzy_threshold(),
            low_confidence_threshold: default_low_confidence_threshold(),
            parallel_ocr: false,
            logging_enabled: true,
            output_format: default_output_format(),
        }
    }
}

/// Keys accepted by [`Config::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "registry_path",
    "access_log_path",
    "ocr_command",
    "locator_command",
    "locator_min_conf",
    "color_command",
    "color_labels",
    "make_command",
    "make_labels",
    "fuzzy_threshold",
    "low_confidence_threshold",
    "parallel_ocr",
    "logging_enabled",
    "output_format",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Directory of the local vehicle store and the default access log
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(data_dir)
    }

    /// Get the access log path
    pub fn access_log_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.access_log_path {
            return Ok(path.clone());
        }
        Ok(Self::data_dir()?.join("access_log.csv"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_json(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Set one field from its string form. An empty value clears optional
    /// fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let optional_string = || {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let optional_path = || optional_string().map(PathBuf::from);
        let unit_interval = |v: f64| (0.0..=1.0).contains(&v).then_some(v);

        match key {
            "registry_path" => self.registry_path = optional_path(),
            "access_log_path" => self.access_log_path = optional_path(),
            "ocr_command" => self.ocr_command = optional_string(),
            "locator_command" => self.locator_command = optional_string(),
            "color_command" => self.color_command = optional_string(),
            "color_labels" => self.color_labels = optional_path(),
            "make_command" => self.make_command = optional_string(),
            "make_labels" => self.make_labels = optional_path(),
            "locator_min_conf" => {
                self.locator_min_conf = value
                    .parse::<f32>()
                    .ok()
                    .filter(|v| (0.0..=1.0).contains(v))
                    .ok_or_else(invalid)?;
            }
            "fuzzy_threshold" => {
                self.fuzzy_threshold = value
                    .parse::<f64>()
                    .ok()
                    .and_then(unit_interval)
                    .ok_or_else(invalid)?;
            }
            "low_confidence_threshold" => {
                self.low_confidence_threshold = value
                    .parse::<f64>()
                    .ok()
                    .and_then(unit_interval)
                    .ok_or_else(invalid)?;
            }
            "parallel_ocr" => self.parallel_ocr = value.parse().map_err(|_| invalid())?,
            "logging_enabled" => self.logging_enabled = value.parse().map_err(|_| invalid())?,
            "output_format" => {
                self.output_format = match value.to_lowercase().as_str() {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    _ => return Err(invalid().into()),
                };
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
        }
        Ok(())
    }
}

fn show_opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(not set)")
}

fn show_path(value: &Option<PathBuf>) -> String {
    value
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Plategate Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Registry:                 {}",
            self.registry_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(local vehicle store)".to_string())
        )?;
        writeln!(
            f,
            "Access log:               {}",
            self.access_log_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Logging enabled:          {}", self.logging_enabled)?;
        writeln!(f, "OCR command:              {}", show_opt(&self.ocr_command))?;
        writeln!(f, "Locator command:          {}", show_opt(&self.locator_command))?;
        writeln!(f, "Locator min confidence:   {}", self.locator_min_conf)?;
        writeln!(f, "Color command:            {}", show_opt(&self.color_command))?;
        writeln!(f, "Color labels:             {}", show_path(&self.color_labels))?;
        writeln!(f, "Make command:             {}", show_opt(&self.make_command))?;
        writeln!(f, "Make labels:              {}", show_path(&self.make_labels))?;
        writeln!(f, "Fuzzy threshold:          {}", self.fuzzy_threshold)?;
        writeln!(f, "Low confidence threshold: {}", self.low_confidence_threshold)?;
        writeln!(f, "Parallel OCR:             {}", self.parallel_ocr)?;
        writeln!(f, "Output format:            {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:              {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plategate_types::Error;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.fuzzy_threshold, 0.75);
        assert_eq!(config.low_confidence_threshold, 0.3);
        assert!(config.logging_enabled);
        assert!(!config.parallel_ocr);
        assert!(config.ocr_command.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::from_json(r#"{"ocr_command": "ocr-tool"}"#).unwrap();
        assert_eq!(config.ocr_command.as_deref(), Some("ocr-tool"));
        assert_eq!(config.fuzzy_threshold, 0.75);
        assert_eq!(config.output_format, OutputFormat::Table);
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        config.set("fuzzy_threshold", "0.8").unwrap();
        config.set("parallel_ocr", "true").unwrap();
        config.set("output_format", "JSON").unwrap();
        config.set("ocr_command", "python3 ocr.py").unwrap();
        assert_eq!(config.fuzzy_threshold, 0.8);
        assert!(config.parallel_ocr);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.ocr_command.as_deref(), Some("python3 ocr.py"));

        config.set("ocr_command", "").unwrap();
        assert!(config.ocr_command.is_none());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("fuzzy_threshold", "1.5"),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            config.set("backend", "x"),
            Err(Error::Config(ConfigError::UnknownKey(_)))
        ));
    }

    #[test]
    fn test_every_key_is_settable() {
        for key in CONFIG_KEYS {
            let value = match *key {
                "locator_min_conf" | "fuzzy_threshold" | "low_confidence_threshold" => "0.5",
                "parallel_ocr" | "logging_enabled" => "false",
                "output_format" => "json",
                _ => "value",
            };
            Config::default().set(key, value).unwrap();
        }
    }
}
