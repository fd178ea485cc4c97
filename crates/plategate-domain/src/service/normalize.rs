//! Plate text normalization and plausibility checks

/// Uppercase and drop everything outside `[A-Z0-9]`.
///
/// No character substitution happens here; confusable characters are dealt
/// with by the variant expander and the similarity scorer.
pub fn normalize_candidate(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Clean a detected plate before matching: strip spaces, CR and LF, uppercase.
pub fn clean_detected_plate(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\r' | '\n'))
        .collect::<String>()
        .to_uppercase()
}

/// Normalize a plate stored in the registry: strip spaces, uppercase.
pub fn normalize_registry_plate(text: &str) -> String {
    text.replace(' ', "").to_uppercase()
}

/// Normalize a plate typed in by an operator.
pub fn normalize_manual_entry(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Syntactic plausibility of a normalized reading: 2 to 10 characters with at
/// least one letter and one digit. Advisory only; the matcher never calls it.
pub fn is_plausible_plate(text: &str) -> bool {
    let len = text.chars().count();
    if !(2..=10).contains(&len) {
        return false;
    }

    let has_letter = text.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    has_letter && has_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_uppercases() {
        assert_eq!(normalize_candidate("wsg-706 "), "WSG706");
        assert_eq!(normalize_candidate("a.b|c\n1"), "ABC1");
    }

    #[test]
    fn test_normalize_does_not_substitute() {
        assert_eq!(normalize_candidate("O0I1"), "O0I1");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize_candidate("熊本130ら1122"), "1301122");
    }

    #[test]
    fn test_clean_detected_plate() {
        assert_eq!(clean_detected_plate(" abc 123\r\n"), "ABC123");
        assert_eq!(clean_detected_plate("ab-12"), "AB-12");
    }

    #[test]
    fn test_registry_plate() {
        assert_eq!(normalize_registry_plate("abc 123"), "ABC123");
    }

    #[test]
    fn test_plausible_plate() {
        assert!(is_plausible_plate("W1"));
        assert!(is_plausible_plate("WSG706"));
        assert!(is_plausible_plate("ABCDEFGHI1"));
    }

    #[test]
    fn test_implausible_plate() {
        assert!(!is_plausible_plate(""));
        assert!(!is_plausible_plate("A"));
        assert!(!is_plausible_plate("ABCDEF"));
        assert!(!is_plausible_plate("123456"));
        assert!(!is_plausible_plate("ABCDEFGHIJ1"));
    }

    #[test]
    fn test_manual_entry() {
        assert_eq!(normalize_manual_entry("  wsg 706 "), "WSG 706");
    }
}
