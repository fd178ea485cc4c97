//! Registry matching and the gate access policy
//!
//! Matching runs in two phases over a [`RegistrySnapshot`]:
//! 1. exact: any confusable variant of the detected plate equals a stored plate
//! 2. fuzzy: OCR-aware similarity above the threshold, best score wins
//!
//! A matched vehicle is then checked for make/model compatibility. Color is
//! compared too but only reported; it never denies access.

use serde::Serialize;
use tracing::debug;

use plategate_types::{AccessDecision, VehicleRecord};

use crate::model::RegistrySnapshot;
use crate::service::normalize::{clean_detected_plate, normalize_registry_plate};
use crate::service::similarity::similarity;
use crate::service::variants::expand_variants;

/// Fuzzy matches must score strictly above this
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.75;

const DEFAULT_OWNER: &str = "Driver";

/// Which search phase selected the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    Exact,
    Fuzzy,
}

/// Registry vehicle selected for a detected plate
#[derive(Debug, Clone, PartialEq)]
pub struct PlateMatch<'a> {
    pub vehicle: &'a VehicleRecord,
    pub score: f64,
    pub phase: MatchPhase,
}

/// Access policy parameters
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    pub fuzzy_threshold: f64,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: FUZZY_MATCH_THRESHOLD,
        }
    }
}

impl AccessPolicy {
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Find the registry vehicle for a detected plate.
    ///
    /// Exact phase: the first vehicle (snapshot order) whose normalized plate
    /// equals any variant of the cleaned detection wins with score 1.0.
    /// Vehicles whose plate normalizes to nothing are skipped here only.
    /// Fuzzy phase: `similarity(detected, registered)` must be strictly above
    /// the threshold and strictly above the best so far, so ties keep the
    /// earlier vehicle.
    pub fn find_match<'a>(
        &self,
        plate_text: &str,
        snapshot: &'a RegistrySnapshot,
    ) -> Option<PlateMatch<'a>> {
        let detected = clean_detected_plate(plate_text);
        let variants = expand_variants(&detected);

        for vehicle in snapshot.vehicles() {
            let registered = normalize_registry_plate(&vehicle.plate_number);
            // blank stored plate would equal a blank detection
            if registered.is_empty() {
                continue;
            }
            if variants.contains(&registered) {
                debug!(detected = %detected, registered = %registered, "exact plate match");
                return Some(PlateMatch {
                    vehicle,
                    score: 1.0,
                    phase: MatchPhase::Exact,
                });
            }
        }

        let mut best: Option<PlateMatch<'a>> = None;
        let mut best_score = 0.0;

        for vehicle in snapshot.vehicles() {
            let registered = normalize_registry_plate(&vehicle.plate_number);
            let score = similarity(&detected, &registered);

            if score > self.fuzzy_threshold && score > best_score {
                debug!(
                    detected = %detected,
                    registered = %registered,
                    score,
                    "fuzzy plate match"
                );
                best_score = score;
                best = Some(PlateMatch {
                    vehicle,
                    score,
                    phase: MatchPhase::Fuzzy,
                });
            }
        }

        best
    }

    /// Decide whether a detected vehicle may pass.
    pub fn decide(
        &self,
        plate_text: &str,
        detected_color: &str,
        detected_make: &str,
        snapshot: &RegistrySnapshot,
    ) -> AccessDecision {
        let Some(found) = self.find_match(plate_text, snapshot) else {
            debug!(plate = %plate_text, vehicles = snapshot.len(), "no registry match");
            return AccessDecision::not_registered();
        };

        let vehicle = found.vehicle;
        let color_compatible = attributes_compatible(detected_color, &vehicle.color);
        let make_compatible = attributes_compatible(detected_make, &vehicle.make_model);

        debug!(
            plate = %plate_text,
            registered = %vehicle.plate_number,
            score = found.score,
            phase = ?found.phase,
            color_compatible,
            make_compatible,
            "registry vehicle selected"
        );

        if !make_compatible {
            return AccessDecision {
                granted: false,
                reason: format!(
                    "Make mismatch ({} vs {})",
                    vehicle.make_model.to_lowercase(),
                    detected_make.to_lowercase()
                ),
                color_warning: false,
                matched_plate: Some(vehicle.plate_number.clone()),
                match_score: found.score,
                color_compatible: Some(color_compatible),
            };
        }

        let owner = if vehicle.owner_name.is_empty() {
            DEFAULT_OWNER
        } else {
            vehicle.owner_name.as_str()
        };

        // Color mismatch never warns under the current gate policy.
        AccessDecision {
            granted: true,
            reason: format!("Welcome {}", owner),
            color_warning: false,
            matched_plate: Some(vehicle.plate_number.clone()),
            match_score: found.score,
            color_compatible: Some(color_compatible),
        }
    }
}

/// Case-insensitive containment in either direction.
pub fn attributes_compatible(detected: &str, registered: &str) -> bool {
    let detected = detected.to_lowercase();
    let registered = registered.to_lowercase();
    registered.contains(&detected) || detected.contains(&registered)
}

/// Decide access with the default policy.
pub fn check_vehicle_access(
    plate_text: &str,
    detected_color: &str,
    detected_make: &str,
    snapshot: &RegistrySnapshot,
) -> AccessDecision {
    AccessPolicy::default().decide(plate_text, detected_color, detected_make, snapshot)
}
