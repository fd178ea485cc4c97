//! Domain model types

pub mod confusion;
pub mod snapshot;
pub mod substitution;

pub use confusion::{chars_similar, CONFUSION_GROUPS};
pub use snapshot::RegistrySnapshot;
pub use substitution::{SubstitutionRule, COMPOUND_CHAIN, SUBSTITUTION_RULES};
