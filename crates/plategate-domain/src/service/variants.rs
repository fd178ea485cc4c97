//! Alternate readings of a plate under OCR-typical confusions

use std::collections::BTreeSet;

use crate::model::{COMPOUND_CHAIN, SUBSTITUTION_RULES};

/// Deduplicated set of readings derived from one plate, original included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateVariantSet {
    original: String,
    variants: BTreeSet<String>,
}

impl PlateVariantSet {
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn contains(&self, plate: &str) -> bool {
        self.variants.contains(plate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Expand a cleaned plate into its plausible alternate readings.
///
/// One reading per substitution rule whose source character occurs (every
/// occurrence replaced), plus one compound reading built by chaining
/// `5->S, 6->G, 7->T, O->0, 0->O` when it differs from the input.
pub fn expand_variants(plate: &str) -> PlateVariantSet {
    let mut variants = BTreeSet::new();
    variants.insert(plate.to_string());

    for rule in SUBSTITUTION_RULES {
        if let Some(variant) = rule.apply(plate) {
            variants.insert(variant);
        }
    }

    let mut compound = plate.to_string();
    for rule in COMPOUND_CHAIN {
        if let Some(next) = rule.apply(&compound) {
            compound = next;
        }
    }
    if compound != plate {
        variants.insert(compound);
    }

    PlateVariantSet {
        original: plate.to_string(),
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_always_present() {
        let set = expand_variants("XYZ");
        assert!(set.contains("XYZ"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.original(), "XYZ");
    }

    #[test]
    fn test_whole_string_replacement() {
        let set = expand_variants("ABC123");
        assert!(set.contains("ABC123"));
        assert!(set.contains("4BC123"));
        assert!(set.contains("A8C123"));
        assert!(set.contains("ABCI23"));
        assert!(set.contains("ABC1Z3"));
        assert!(set.contains("ABC12E"));
        assert_eq!(set.iter().filter(|v| *v == "ABC123").count(), 1);
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let set = expand_variants("W55W");
        assert!(set.contains("WSSW"));
        assert!(set.contains("M55M"));
        assert!(!set.contains("WS5W"));
    }

    #[test]
    fn test_compound_variant() {
        // 5->S, 6->G, 7->T, then O->0, then 0->O undoes the O step
        let set = expand_variants("W567O6");
        assert!(set.contains("WSGTOG"));
    }

    #[test]
    fn test_compound_skipped_when_unchanged() {
        // O->0 then 0->O round-trips back to the input
        let set = expand_variants("OX");
        let expected: BTreeSet<String> = ["OX", "0X", "QX"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set.iter().map(str::to_string).collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_one_directional_rules_not_reversed() {
        let set = expand_variants("10");
        assert!(set.contains("I0"));
        assert!(set.contains("1O"));
        assert!(!set.contains("L0"));
        assert!(!set.contains("1D"));
    }
}
