//! Vision module - turns a cropped plate image into a single normalized reading
//!
//! The crop is expanded into a fixed, ordered list of preprocessing variants,
//! each variant goes through the OCR engine, and the consensus selector picks
//! one candidate. Plate localization, OCR and attribute classification are
//! external collaborators behind traits; the `Command*` types drive them as
//! subprocesses that print JSON.

pub mod classifier;
pub mod command;
pub mod consensus;
pub mod crop;
pub mod filters;
pub mod locator;
pub mod observer;
pub mod preprocess;
pub mod recognizer;

pub use classifier::{AttributeClassifier, CommandClassifier, UnknownClassifier};
pub use command::{extract_json_from_response, ExternalCommand};
pub use consensus::{ConsensusSelector, LOW_CONFIDENCE_THRESHOLD, MIN_CANDIDATE_LEN};
pub use crop::PlateCrop;
pub use locator::{CommandPlateLocator, PlateLocator, WholeFrameLocator};
pub use observer::{DebugDumpObserver, NoopObserver, RecognitionObserver};
pub use preprocess::{PreprocessingVariant, PREPROCESSING_VARIANTS};
pub use recognizer::{CommandRecognizer, TextRecognizer, UnavailableRecognizer};
