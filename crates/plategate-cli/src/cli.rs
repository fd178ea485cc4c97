//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use plategate_types::OutputFormat;

#[derive(Parser)]
#[command(name = "plategate")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "License plate recognition and registry-based gate access control")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Registry file (.csv, .toml, .json) or vehicle store directory
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full gate pipeline on one image
    Check {
        /// Path to image file
        image: PathBuf,

        /// Plate to use when OCR cannot read one
        #[arg(long, short = 'p')]
        plate: Option<String>,

        /// Image is already a plate crop; skip plate detection
        #[arg(long)]
        crop: bool,

        /// Write every preprocessing variant to this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,

        /// Do not record the attempt in the access log
        #[arg(long)]
        no_log: bool,
    },

    /// Decide for a known plate without any image processing
    Decide {
        /// Plate number
        plate: String,

        /// Detected color
        #[arg(long, default_value = "")]
        color: String,

        /// Detected make/model
        #[arg(long, default_value = "")]
        make: String,

        /// Do not record the attempt in the access log
        #[arg(long)]
        no_log: bool,
    },

    /// Read the plate on an image (OCR consensus only)
    Recognize {
        /// Path to image file
        image: PathBuf,

        /// Image is already a plate crop; skip plate detection
        #[arg(long)]
        crop: bool,

        /// Write every preprocessing variant to this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },

    /// Run the gate pipeline on every image in a folder
    Batch {
        /// Path to folder containing images
        folder: PathBuf,

        /// Output file for results
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Number of parallel workers. 0 = auto (CPU count). Uses 4 if not specified.
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Do not record attempts in the access log
        #[arg(long)]
        no_log: bool,
    },

    /// Manage the local vehicle registry
    Vehicle {
        #[command(subcommand)]
        action: VehicleAction,
    },

    /// List the confusable variants of a plate
    Variants {
        /// Plate text
        plate: String,
    },

    /// OCR-aware similarity of two plates
    Similarity {
        /// Detected plate
        detected: String,

        /// Registered plate
        registered: String,
    },

    /// Normalize a reading and check its plausibility
    Validate {
        /// Raw OCR text
        text: String,
    },

    /// Show recent access attempts
    Logs {
        /// Limit number of entries shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,

        /// Only denied attempts
        #[arg(long, conflicts_with = "granted")]
        denied: bool,

        /// Only granted attempts
        #[arg(long)]
        granted: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set a value, e.g. --set ocr_command="python3 ocr.py"
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum VehicleAction {
    /// Register a vehicle
    Add {
        /// Plate number
        plate: String,

        #[arg(long, default_value = "")]
        color: String,

        /// Make and model, e.g. "Toyota Corolla"
        #[arg(long, default_value = "")]
        make: String,

        #[arg(long, default_value = "")]
        owner: String,
    },

    /// List registered vehicles
    List,

    /// Counts by color and make, registration activity, newest vehicles
    Stats,

    /// Remove a vehicle by ID or plate
    Remove {
        /// Vehicle ID or plate number
        target: String,
    },

    /// Import vehicles from a CSV, TOML or JSON registry file
    Import {
        /// Registry file
        file: PathBuf,

        /// Show what would be imported without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "plategate",
            "check",
            "gate.jpg",
            "--plate",
            "wsg706",
            "-f",
            "json",
            "--registry",
            "reg.csv",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.registry, Some(PathBuf::from("reg.csv")));
        match cli.command {
            Commands::Check { plate, crop, .. } => {
                assert_eq!(plate.as_deref(), Some("wsg706"));
                assert!(!crop);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_vehicle_add() {
        let cli = Cli::try_parse_from([
            "plategate", "vehicle", "add", "KL55AB", "--make", "Honda Civic", "--owner", "Bob",
        ])
        .unwrap();
        match cli.command {
            Commands::Vehicle {
                action: VehicleAction::Add { plate, make, color, owner },
            } => {
                assert_eq!(plate, "KL55AB");
                assert_eq!(make, "Honda Civic");
                assert_eq!(color, "");
                assert_eq!(owner, "Bob");
            }
            _ => panic!("expected vehicle add"),
        }
    }

    #[test]
    fn test_logs_filters() {
        let cli = Cli::try_parse_from(["plategate", "logs", "--denied", "-n", "5"]).unwrap();
        match cli.command {
            Commands::Logs { limit, denied, granted } => {
                assert_eq!(limit, 5);
                assert!(denied);
                assert!(!granted);
            }
            _ => panic!("expected logs"),
        }

        assert!(Cli::try_parse_from(["plategate", "logs", "--denied", "--granted"]).is_err());
    }

    #[test]
    fn test_vehicle_stats() {
        let cli = Cli::try_parse_from(["plategate", "vehicle", "stats"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Vehicle {
                action: VehicleAction::Stats
            }
        ));
    }

    #[test]
    fn test_config_set_is_repeatable() {
        let cli = Cli::try_parse_from([
            "plategate",
            "config",
            "--set",
            "parallel_ocr=true",
            "--set",
            "fuzzy_threshold=0.8",
        ])
        .unwrap();
        match cli.command {
            Commands::Config { set, .. } => assert_eq!(set.len(), 2),
            _ => panic!("expected config"),
        }
    }
}
