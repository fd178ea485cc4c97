//! Text recognition adapter contract and its subprocess implementation

use std::ffi::OsString;

use serde::Deserialize;

use plategate_types::{Error, RecognitionFragment, Result};

use crate::command::{scratch_path, ExternalCommand};
use crate::crop::PlateCrop;

/// OCR engine: one call per image, zero or more fragments in detector order.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &PlateCrop) -> Result<Vec<RecognitionFragment>>;
}

/// Stand-in used when no OCR engine is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _image: &PlateCrop) -> Result<Vec<RecognitionFragment>> {
        Err(Error::Recognition("no OCR command configured".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RawFragment {
    text: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OcrResponse {
    Wrapped {
        #[serde(default)]
        fragments: Vec<RawFragment>,
        #[serde(default)]
        error: Option<String>,
    },
    Bare(Vec<RawFragment>),
}

/// OCR engine run as a subprocess.
///
/// The image is written to a scratch PNG and passed as `--image <path>`. The
/// tool prints either `{"fragments": [{"text", "confidence"}, ...]}` or a bare
/// array of fragments.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    command: ExternalCommand,
}

impl CommandRecognizer {
    pub fn new(command_line: &str) -> Result<Self> {
        Ok(Self {
            command: ExternalCommand::parse(command_line)?,
        })
    }
}

impl TextRecognizer for CommandRecognizer {
    fn recognize(&self, image: &PlateCrop) -> Result<Vec<RecognitionFragment>> {
        let path = scratch_path("plategate_ocr", "png");
        image.save_png(&path)?;

        let args = [OsString::from("--image"), path.clone().into_os_string()];
        let response = self.command.run_json::<OcrResponse>(&args);
        let _ = std::fs::remove_file(&path);

        let raw = match response? {
            OcrResponse::Wrapped {
                error: Some(error), ..
            } => return Err(Error::Recognition(error)),
            OcrResponse::Wrapped { fragments, .. } => fragments,
            OcrResponse::Bare(fragments) => fragments,
        };

        Ok(raw
            .into_iter()
            .map(|f| RecognitionFragment::new(f.text, f.confidence))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_response() {
        let json = r#"{"fragments": [{"text": "WSG", "confidence": 0.9}, {"text": "706", "confidence": 0.8}]}"#;
        let parsed: OcrResponse = serde_json::from_str(json).unwrap();
        match parsed {
            OcrResponse::Wrapped { fragments, error } => {
                assert_eq!(fragments.len(), 2);
                assert!(error.is_none());
            }
            OcrResponse::Bare(_) => panic!("expected wrapped response"),
        }
    }

    #[test]
    fn test_bare_response() {
        let json = r#"[{"text": "WSG706"}]"#;
        let parsed: OcrResponse = serde_json::from_str(json).unwrap();
        match parsed {
            OcrResponse::Bare(fragments) => assert_eq!(fragments[0].confidence, 0.0),
            OcrResponse::Wrapped { .. } => panic!("expected bare response"),
        }
    }

    #[test]
    fn test_unavailable_recognizer_fails() {
        let crop = PlateCrop::from_gray(image::GrayImage::new(4, 4));
        assert!(UnavailableRecognizer.recognize(&crop).is_err());
    }
}
