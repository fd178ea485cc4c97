//! Builds the external collaborators named in the config

use std::path::PathBuf;

use plategate_types::Result;
use plategate_vision::{
    AttributeClassifier, CommandClassifier, CommandPlateLocator, CommandRecognizer,
    ConsensusSelector, PlateLocator, TextRecognizer, UnavailableRecognizer, UnknownClassifier,
    WholeFrameLocator,
};

use crate::config::Config;

/// Subprocess detector, or the whole frame when none is configured
pub fn locator_from_config(config: &Config) -> Result<Box<dyn PlateLocator>> {
    Ok(match config.locator_command {
        Some(ref cmd) => Box::new(CommandPlateLocator::new(cmd, config.locator_min_conf)?),
        None => Box::new(WholeFrameLocator),
    })
}

/// Subprocess OCR engine. Without one every recognition call fails, which
/// ends in a manual-entry outcome.
pub fn recognizer_from_config(config: &Config) -> Result<Box<dyn TextRecognizer>> {
    Ok(match config.ocr_command {
        Some(ref cmd) => Box::new(CommandRecognizer::new(cmd)?),
        None => Box::new(UnavailableRecognizer),
    })
}

pub fn color_classifier_from_config(config: &Config) -> Result<Box<dyn AttributeClassifier>> {
    classifier(&config.color_command, &config.color_labels)
}

pub fn make_classifier_from_config(config: &Config) -> Result<Box<dyn AttributeClassifier>> {
    classifier(&config.make_command, &config.make_labels)
}

fn classifier(
    command: &Option<String>,
    labels: &Option<PathBuf>,
) -> Result<Box<dyn AttributeClassifier>> {
    let Some(cmd) = command else {
        return Ok(Box::new(UnknownClassifier));
    };
    let mut classifier = CommandClassifier::new(cmd)?;
    if let Some(labels) = labels {
        classifier = classifier.with_labels_file(labels)?;
    }
    Ok(Box::new(classifier))
}

pub fn selector_from_config(config: &Config) -> ConsensusSelector {
    ConsensusSelector::new()
        .with_parallel(config.parallel_ocr)
        .with_low_confidence_threshold(config.low_confidence_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage};

    #[test]
    fn test_unconfigured_collaborators() {
        let config = Config::default();
        let frame = DynamicImage::ImageLuma8(GrayImage::new(10, 4));

        let crop = locator_from_config(&config).unwrap().locate(&frame).unwrap();
        assert_eq!(crop.unwrap().width(), 10);

        let prediction = color_classifier_from_config(&config).unwrap().classify(&frame);
        assert_eq!(prediction.label, "Unknown");
        assert_eq!(prediction.confidence, 0.0);
    }

    #[test]
    fn test_missing_labels_file_is_an_error() {
        let config = Config {
            make_command: Some("classify-make".to_string()),
            make_labels: Some(PathBuf::from("/nonexistent/labels.txt")),
            ..Config::default()
        };
        assert!(make_classifier_from_config(&config).is_err());
    }
}
