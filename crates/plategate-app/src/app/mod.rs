//! Application use cases

pub mod collaborators;
pub mod gate_service;

pub use collaborators::{
    color_classifier_from_config, locator_from_config, make_classifier_from_config,
    recognizer_from_config, selector_from_config,
};
pub use gate_service::{AccessGate, GateOutcome, GateReport, GateServiceError, PlateOrigin};
