//! Domain services

pub mod access_checker;
pub mod normalize;
pub mod similarity;
pub mod variants;

pub use access_checker::{
    attributes_compatible, check_vehicle_access, AccessPolicy, MatchPhase, PlateMatch,
    FUZZY_MATCH_THRESHOLD,
};
pub use normalize::{
    clean_detected_plate, is_plausible_plate, normalize_candidate, normalize_manual_entry,
    normalize_registry_plate,
};
pub use similarity::similarity;
pub use variants::{expand_variants, PlateVariantSet};
