//! Data model shared by the resolution engine, the registry and the gate service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize null as default value
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// A vehicle as the registry knows it.
///
/// Missing or null fields resolve to an empty string when the record is read,
/// so the matcher never sees an absent attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "null_to_default")]
    pub plate_number: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub make_model: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub owner_name: String,
}

impl VehicleRecord {
    pub fn new(plate_number: impl Into<String>) -> Self {
        Self {
            plate_number: plate_number.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_make_model(mut self, make_model: impl Into<String>) -> Self {
        self.make_model = make_model.into();
        self
    }

    pub fn with_owner(mut self, owner_name: impl Into<String>) -> Self {
        self.owner_name = owner_name.into();
        self
    }
}

/// Registered vehicle as persisted by the local registry store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredVehicle {
    /// Unique identifier
    pub id: String,
    #[serde(flatten)]
    pub record: VehicleRecord,
    /// When registered
    pub registered_at: DateTime<Utc>,
}

impl RegisteredVehicle {
    pub fn new(record: VehicleRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record,
            registered_at: Utc::now(),
        }
    }
}

/// One text fragment returned by the OCR engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionFragment {
    pub text: String,
    pub confidence: f64,
}

impl RecognitionFragment {
    /// Confidence is clamped into [0, 1]; NaN becomes 0.
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Fragments of one OCR call folded into a single reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub variant_name: String,
    pub concatenated_text: String,
    pub average_confidence: f64,
}

impl RecognitionResult {
    /// Concatenate fragment texts in detector order and average their
    /// confidences. An empty call yields `None`, never a zero-confidence result.
    pub fn from_fragments(variant_name: &str, fragments: &[RecognitionFragment]) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }

        let concatenated_text: String = fragments.iter().map(|f| f.text.as_str()).collect();
        let total: f64 = fragments.iter().map(|f| f.confidence).sum();

        Some(Self {
            variant_name: variant_name.to_string(),
            concatenated_text,
            average_confidence: total / fragments.len() as f64,
        })
    }
}

/// Where the chosen candidate came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum CandidateSource {
    /// A named preprocessing variant
    Variant(String),
    /// The unprocessed crop (fallback pass)
    Raw,
    /// Nothing qualified
    None,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSource::Variant(name) => write!(f, "{}", name),
            CandidateSource::Raw => write!(f, "raw"),
            CandidateSource::None => write!(f, "-"),
        }
    }
}

/// The engine's single chosen reading for a crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReading {
    pub text: String,
    pub confidence: f64,
    pub source: CandidateSource,
}

impl CandidateReading {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            source: CandidateSource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Label produced by an attribute classifier (color or make/model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePrediction {
    pub label: String,
    pub confidence: f64,
}

impl AttributePrediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn unknown() -> Self {
        Self::new("Unknown", 0.0)
    }
}

/// Final gate decision for one detection event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub reason: String,
    pub color_warning: bool,
    pub matched_plate: Option<String>,
    pub match_score: f64,
    /// Informational color containment result; never affects the decision
    pub color_compatible: Option<bool>,
}

impl AccessDecision {
    pub fn not_registered() -> Self {
        Self {
            granted: false,
            reason: "Vehicle Not Registered".to_string(),
            color_warning: false,
            matched_plate: None,
            match_score: 0.0,
            color_compatible: None,
        }
    }
}

/// Row handed to the access-log sink after every decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessAttempt {
    pub timestamp: DateTime<Utc>,
    pub plate_number: String,
    pub detected_color: String,
    pub detected_model: String,
    pub plate_matched: bool,
    pub color_matched: bool,
}

impl AccessAttempt {
    pub fn from_decision(
        plate_number: &str,
        detected_color: &str,
        detected_model: &str,
        decision: &AccessDecision,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            plate_number: plate_number.to_string(),
            detected_color: detected_color.to_string(),
            detected_model: detected_model.to_string(),
            plate_matched: decision.granted,
            color_matched: !decision.color_warning,
        }
    }
}

/// Selects access attempts by outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptFilter {
    #[default]
    All,
    /// Plate not granted: unknown vehicle or attribute mismatch
    Denied,
    Granted,
}

impl AttemptFilter {
    pub fn matches(&self, attempt: &AccessAttempt) -> bool {
        match self {
            AttemptFilter::All => true,
            AttemptFilter::Denied => !attempt.plate_matched,
            AttemptFilter::Granted => attempt.plate_matched,
        }
    }
}
