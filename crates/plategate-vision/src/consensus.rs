//! OCR consensus across preprocessing variants
//!
//! Each variant is recognized once, in the order of [`PREPROCESSING_VARIANTS`].
//! The running best is replaced only by a strictly more confident reading whose
//! normalized text has at least [`MIN_CANDIDATE_LEN`] characters, so on a tie
//! the earlier variant stays. When nothing qualifies or the best confidence is
//! under the low-confidence threshold, the unprocessed crop is recognized once
//! more and a long enough raw reading replaces the result outright.

use tracing::{debug, warn};

use plategate_domain::service::normalize_candidate;
use plategate_types::{CandidateReading, CandidateSource, RecognitionFragment, RecognitionResult, Result};

use crate::crop::PlateCrop;
use crate::observer::RecognitionObserver;
use crate::preprocess::{PreprocessingVariant, PREPROCESSING_VARIANTS};
use crate::recognizer::TextRecognizer;

/// Shortest normalized reading accepted as a candidate
pub const MIN_CANDIDATE_LEN: usize = 3;

/// Below this best confidence the raw crop gets a second chance
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

const RAW_SOURCE_NAME: &str = "raw";

#[derive(Debug, Clone)]
pub struct ConsensusSelector {
    variants: Vec<PreprocessingVariant>,
    low_confidence_threshold: f64,
    parallel: bool,
}

impl Default for ConsensusSelector {
    fn default() -> Self {
        Self {
            variants: PREPROCESSING_VARIANTS.to_vec(),
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            parallel: false,
        }
    }
}

impl ConsensusSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the OCR calls of all variants concurrently. Selection still follows
    /// variant order, so the result matches the sequential pass.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    pub fn variants(&self) -> &[PreprocessingVariant] {
        &self.variants
    }

    /// Pick the single best reading for a crop. An empty crop or a pass where
    /// nothing qualifies yields [`CandidateReading::empty`].
    pub fn select(
        &self,
        crop: &PlateCrop,
        recognizer: &dyn TextRecognizer,
        observer: &dyn RecognitionObserver,
    ) -> CandidateReading {
        if crop.is_empty() {
            debug!("empty plate crop, nothing to recognize");
            return CandidateReading::empty();
        }
        observer.crop_received(crop);

        let prepared: Vec<(&'static str, PlateCrop)> = self
            .variants
            .iter()
            .map(|variant| {
                let image = variant.apply(crop);
                observer.variant_prepared(variant.name, &image);
                (variant.name, image)
            })
            .collect();

        let outcomes: Vec<Result<Vec<RecognitionFragment>>> = if self.parallel {
            recognize_parallel(&prepared, recognizer)
        } else {
            prepared
                .iter()
                .map(|(_, image)| recognizer.recognize(image))
                .collect()
        };

        let mut best = CandidateReading::empty();
        for ((name, _), outcome) in prepared.iter().zip(outcomes) {
            let fragments = match outcome {
                Ok(fragments) => fragments,
                Err(err) => {
                    warn!(variant = name, error = %err, "recognition failed for variant");
                    observer.variant_failed(name, &err);
                    continue;
                }
            };
            let Some(result) = RecognitionResult::from_fragments(name, &fragments) else {
                debug!(variant = name, "no text found");
                continue;
            };

            let normalized = normalize_candidate(&result.concatenated_text);
            debug!(
                variant = name,
                text = %normalized,
                confidence = result.average_confidence,
                "variant recognized"
            );
            observer.variant_recognized(&result, &normalized);

            if result.average_confidence > best.confidence && normalized.chars().count() >= MIN_CANDIDATE_LEN {
                best = CandidateReading {
                    text: normalized,
                    confidence: result.average_confidence,
                    source: CandidateSource::Variant(name.to_string()),
                };
            }
        }

        if best.is_empty() || best.confidence < self.low_confidence_threshold {
            observer.raw_fallback(best.confidence);
            debug!(best_confidence = best.confidence, "falling back to the raw crop");
            if let Some(raw) = self.recognize_raw(crop, recognizer, observer) {
                best = raw;
            }
        }

        if best.is_empty() {
            debug!("no candidate qualified");
        } else {
            debug!(text = %best.text, confidence = best.confidence, source = %best.source, "candidate selected");
        }
        observer.candidate_selected(&best);
        best
    }

    fn recognize_raw(
        &self,
        crop: &PlateCrop,
        recognizer: &dyn TextRecognizer,
        observer: &dyn RecognitionObserver,
    ) -> Option<CandidateReading> {
        let fragments = match recognizer.recognize(crop) {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!(error = %err, "recognition failed on the raw crop");
                observer.variant_failed(RAW_SOURCE_NAME, &err);
                return None;
            }
        };
        let result = RecognitionResult::from_fragments(RAW_SOURCE_NAME, &fragments)?;
        let normalized = normalize_candidate(&result.concatenated_text);
        observer.variant_recognized(&result, &normalized);

        if normalized.chars().count() < MIN_CANDIDATE_LEN {
            return None;
        }
        Some(CandidateReading {
            text: normalized,
            confidence: result.average_confidence,
            source: CandidateSource::Raw,
        })
    }
}

fn recognize_parallel(
    prepared: &[(&'static str, PlateCrop)],
    recognizer: &dyn TextRecognizer,
) -> Vec<Result<Vec<RecognitionFragment>>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = prepared
            .iter()
            .map(|(_, image)| scope.spawn(move || recognizer.recognize(image)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(plategate_types::Error::Recognition(
                        "recognizer thread panicked".to_string(),
                    ))
                })
            })
            .collect()
    })
}
