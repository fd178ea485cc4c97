//! Color and make/model classification of the full frame

use std::ffi::OsString;
use std::path::Path;

use image::DynamicImage;
use serde::Deserialize;
use tracing::warn;

use plategate_types::{AttributePrediction, Result};

use crate::command::{scratch_path, ExternalCommand};

/// Predicts one vehicle attribute. Never fails; problems yield "Unknown".
pub trait AttributeClassifier: Send + Sync {
    fn classify(&self, frame: &DynamicImage) -> AttributePrediction;
}

/// Classifier used when none is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownClassifier;

impl AttributeClassifier for UnknownClassifier {
    fn classify(&self, _frame: &DynamicImage) -> AttributePrediction {
        AttributePrediction::unknown()
    }
}

#[derive(Debug, Deserialize)]
struct ClassifierResponse {
    label: Option<String>,
    index: Option<usize>,
    #[serde(default)]
    confidence: f64,
}

/// Classifier run as a subprocess: `<command> --image <frame>`.
///
/// The tool prints `{"label": .., "confidence": ..}` or, for models that only
/// know class indices, `{"index": .., "confidence": ..}` resolved against a
/// labels file.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    command: ExternalCommand,
    labels: Vec<String>,
}

impl CommandClassifier {
    pub fn new(command_line: &str) -> Result<Self> {
        Ok(Self {
            command: ExternalCommand::parse(command_line)?,
            labels: Vec::new(),
        })
    }

    /// Load class labels, one per line
    pub fn with_labels_file(mut self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        self.labels = parse_labels(&content);
        Ok(self)
    }

    fn resolve(&self, response: ClassifierResponse) -> AttributePrediction {
        let label = match (response.label, response.index) {
            (Some(label), _) => label,
            (None, Some(index)) => self
                .labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("Index {}", index)),
            (None, None) => return AttributePrediction::unknown(),
        };
        AttributePrediction::new(label, response.confidence)
    }
}

impl AttributeClassifier for CommandClassifier {
    fn classify(&self, frame: &DynamicImage) -> AttributePrediction {
        let path = scratch_path("plategate_attr", "png");
        if let Err(err) = frame.save_with_format(&path, image::ImageFormat::Png) {
            warn!(error = %err, "could not write frame for classifier");
            return AttributePrediction::unknown();
        }

        let args = [OsString::from("--image"), path.clone().into_os_string()];
        let response = self.command.run_json::<ClassifierResponse>(&args);
        let _ = std::fs::remove_file(&path);

        match response {
            Ok(response) => self.resolve(response),
            Err(err) => {
                warn!(program = %self.command.program(), error = %err, "classifier failed");
                AttributePrediction::unknown()
            }
        }
    }
}

/// Labels exported as `"0 ClassName"` lose their leading index.
pub fn parse_labels(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((index, name)) if index.chars().all(|c| c.is_ascii_digit()) => name.trim().to_string(),
            _ => line.to_string(),
        })
        .collect()
}
