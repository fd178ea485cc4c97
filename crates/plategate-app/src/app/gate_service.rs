//! Access Gate Service - Core Use Case for one detection event
//!
//! This service orchestrates the gate workflow:
//! 1. Locate the plate in the frame
//! 2. Read it through the OCR consensus pass
//! 3. Validate the reading; fall back to an operator-supplied plate
//! 4. Classify color and make/model on the full frame
//! 5. Refresh the registry snapshot and decide
//! 6. Record the attempt in the access log

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use plategate_domain::model::RegistrySnapshot;
use plategate_domain::repository::{AccessLogSink, RegistryProvider};
use plategate_domain::service::{is_plausible_plate, normalize_manual_entry, AccessPolicy};
use plategate_types::{
    AccessAttempt, AccessDecision, AttributePrediction, CandidateReading, ConfigError, Error,
};
use plategate_vision::{
    AttributeClassifier, ConsensusSelector, NoopObserver, PlateCrop, PlateLocator,
    RecognitionObserver, TextRecognizer, UnavailableRecognizer, UnknownClassifier,
    WholeFrameLocator,
};

use crate::app::collaborators::{
    color_classifier_from_config, locator_from_config, make_classifier_from_config,
    recognizer_from_config, selector_from_config,
};
use crate::config::Config;
use crate::repository::{open_access_log, open_registry};

/// Errors specific to the gate service
#[derive(Debug, Error)]
pub enum GateServiceError {
    #[error("Image validation failed: {0}")]
    InvalidImage(String),

    #[error("Plate detection failed: {0}")]
    DetectionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),
}

impl From<Error> for GateServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::FileNotFound(msg) | Error::InvalidImageFormat(msg) => {
                GateServiceError::InvalidImage(msg)
            }
            Error::Image(e) => GateServiceError::InvalidImage(e.to_string()),
            Error::Config(e) => GateServiceError::ConfigError(e.to_string()),
            Error::Store(e) => GateServiceError::RegistryError(e.to_string()),
            Error::InvalidInput(msg) => GateServiceError::ConfigError(msg),
            _ => GateServiceError::DetectionFailed(err.to_string()),
        }
    }
}

impl From<GateServiceError> for Error {
    fn from(err: GateServiceError) -> Self {
        match err {
            GateServiceError::InvalidImage(msg) => Error::InvalidImageFormat(msg),
            GateServiceError::DetectionFailed(msg) => Error::Recognition(msg),
            GateServiceError::ConfigError(msg) => ConfigError::InvalidSetup(msg).into(),
            GateServiceError::RegistryError(msg) => Error::Registry(msg),
        }
    }
}

/// Where the plate used for the decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateOrigin {
    Ocr,
    Manual,
}

/// Everything known about one decided detection event
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    /// Plate text handed to the matcher
    pub plate: String,
    pub origin: PlateOrigin,
    /// OCR consensus output, when OCR ran
    pub candidate: Option<CandidateReading>,
    /// Advisory plausibility of the OCR reading
    pub plausible: bool,
    pub color: AttributePrediction,
    pub make: AttributePrediction,
    pub decision: AccessDecision,
    /// Registry could not be read; the decision ran on an empty registry
    pub registry_degraded: bool,
    /// Access attempt written to the log
    pub logged: bool,
}

/// Result of one detection event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    /// The locator found no plate in the frame
    NoPlateDetected,
    /// OCR produced nothing usable and no manual plate was supplied
    ManualEntryRequired { candidate: CandidateReading },
    Decided(Box<GateReport>),
}

impl GateOutcome {
    pub fn report(&self) -> Option<&GateReport> {
        match self {
            GateOutcome::Decided(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.report().map(|r| r.decision.granted).unwrap_or(false)
    }
}

/// One gate: collaborators plus the matching policy
pub struct AccessGate {
    locator: Box<dyn PlateLocator>,
    recognizer: Box<dyn TextRecognizer>,
    color_classifier: Box<dyn AttributeClassifier>,
    make_classifier: Box<dyn AttributeClassifier>,
    registry: Box<dyn RegistryProvider>,
    access_log: Option<Box<dyn AccessLogSink>>,
    observer: Box<dyn RecognitionObserver>,
    selector: ConsensusSelector,
    policy: AccessPolicy,
}

impl AccessGate {
    /// Gate with no external tools: the whole frame is the plate, OCR is
    /// unavailable, attributes are "Unknown" and nothing is logged.
    pub fn new(registry: Box<dyn RegistryProvider>) -> Self {
        Self {
            locator: Box::new(WholeFrameLocator),
            recognizer: Box::new(UnavailableRecognizer),
            color_classifier: Box::new(UnknownClassifier),
            make_classifier: Box::new(UnknownClassifier),
            registry,
            access_log: None,
            observer: Box::new(NoopObserver),
            selector: ConsensusSelector::default(),
            policy: AccessPolicy::default(),
        }
    }

    /// Build a gate from the configured command lines and stores
    pub fn from_config(config: &Config) -> std::result::Result<Self, GateServiceError> {
        let gate = Self {
            locator: locator_from_config(config)?,
            recognizer: recognizer_from_config(config)?,
            color_classifier: color_classifier_from_config(config)?,
            make_classifier: make_classifier_from_config(config)?,
            registry: open_registry(config)?,
            access_log: open_access_log(config)?,
            observer: Box::new(NoopObserver),
            selector: selector_from_config(config),
            policy: AccessPolicy::default().with_fuzzy_threshold(config.fuzzy_threshold),
        };
        Ok(gate)
    }

    pub fn with_locator(mut self, locator: Box<dyn PlateLocator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_color_classifier(mut self, classifier: Box<dyn AttributeClassifier>) -> Self {
        self.color_classifier = classifier;
        self
    }

    pub fn with_make_classifier(mut self, classifier: Box<dyn AttributeClassifier>) -> Self {
        self.make_classifier = classifier;
        self
    }

    pub fn with_access_log(mut self, access_log: Box<dyn AccessLogSink>) -> Self {
        self.access_log = Some(access_log);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn RecognitionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_selector(mut self, selector: ConsensusSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Locate the plate in a full frame, then run [`Self::process_crop`].
    ///
    /// `manual_plate` is only used when OCR yields nothing plausible.
    pub fn process_frame(
        &self,
        frame: &DynamicImage,
        manual_plate: Option<&str>,
    ) -> std::result::Result<GateOutcome, GateServiceError> {
        let Some(crop) = self.locator.locate(frame)? else {
            info!("no plate detected");
            return Ok(GateOutcome::NoPlateDetected);
        };
        debug!(width = crop.width(), height = crop.height(), "plate crop");
        Ok(self.process_crop(&crop, frame, manual_plate))
    }

    /// Read an already located plate and decide. Attributes are classified on
    /// `frame`.
    pub fn process_crop(
        &self,
        crop: &PlateCrop,
        frame: &DynamicImage,
        manual_plate: Option<&str>,
    ) -> GateOutcome {
        let candidate = self.selector.select(crop, self.recognizer.as_ref(), self.observer.as_ref());
        let plausible = is_plausible_plate(&candidate.text);
        debug!(text = %candidate.text, plausible, "OCR reading");

        let manual = manual_plate
            .map(normalize_manual_entry)
            .filter(|plate| !plate.is_empty());

        let (plate, origin) = match (plausible, manual) {
            (true, _) => (candidate.text.clone(), PlateOrigin::Ocr),
            (false, Some(plate)) => {
                info!(plate = %plate, "using manually entered plate");
                (plate, PlateOrigin::Manual)
            }
            (false, None) => {
                info!(text = %candidate.text, "plate unreadable, manual entry required");
                return GateOutcome::ManualEntryRequired { candidate };
            }
        };

        let color = self.color_classifier.classify(frame);
        let make = self.make_classifier.classify(frame);

        let mut report = self.decide(&plate, &color.label, &make.label);
        report.origin = origin;
        report.candidate = Some(candidate);
        report.plausible = plausible;
        report.color = color;
        report.make = make;
        GateOutcome::Decided(Box::new(report))
    }

    /// Decide for a known plate and attribute labels, then log the attempt.
    /// Registry and log failures degrade; they never fail the call.
    pub fn decide(&self, plate: &str, color: &str, make: &str) -> GateReport {
        let snapshot = RegistrySnapshot::fetch(self.registry.as_ref());
        let decision = self.policy.decide(plate, color, make, &snapshot);

        info!(
            plate = %plate,
            granted = decision.granted,
            reason = %decision.reason,
            "access decision"
        );

        let logged = self.log_attempt(plate, color, make, &decision);

        GateReport {
            plate: plate.to_string(),
            origin: PlateOrigin::Manual,
            candidate: None,
            plausible: is_plausible_plate(plate),
            color: AttributePrediction::new(color, 0.0),
            make: AttributePrediction::new(make, 0.0),
            decision,
            registry_degraded: snapshot.is_degraded(),
            logged,
        }
    }

    fn log_attempt(&self, plate: &str, color: &str, make: &str, decision: &AccessDecision) -> bool {
        let Some(ref sink) = self.access_log else {
            return false;
        };
        let attempt = AccessAttempt::from_decision(plate, color, make, decision);
        match sink.record(&attempt) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to record access attempt");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plategate_types::StoreError;

    #[test]
    fn test_registry_failure_keeps_its_category() {
        let err: Error = GateServiceError::from(Error::Store(StoreError::Corrupted("x".into()))).into();
        assert!(matches!(err, Error::Registry(_)));
        assert!(err.to_string().starts_with("Registry error:"));
    }

    #[test]
    fn test_config_failure_keeps_its_category() {
        let err: Error = GateServiceError::from(Error::InvalidInput("command line is empty".into())).into();
        assert!(matches!(err, Error::Config(ConfigError::InvalidSetup(ref m)) if m == "command line is empty"));
    }

    #[test]
    fn test_image_failure_keeps_its_category() {
        let err: Error = GateServiceError::InvalidImage("bad.png".into()).into();
        assert!(matches!(err, Error::InvalidImageFormat(_)));
    }
}
