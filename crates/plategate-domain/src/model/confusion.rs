//! Characters an OCR engine cannot reliably tell apart
//!
//! Used for scoring only. Nothing rewrites a plate using these groups.

/// Sets of mutually confusable characters
pub const CONFUSION_GROUPS: &[&[char]] = &[
    &['O', '0', 'Q', 'D'],
    &['I', '1', 'L', '|'],
    &['S', '5'],
    &['G', '6'],
    &['B', '8'],
    &['Z', '2'],
    &['M', 'W'],
    &['T', '7'],
    &['A', '4'],
    &['E', '3'],
];

/// True when the characters are identical or share a confusion group.
pub fn chars_similar(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    CONFUSION_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_similar() {
        assert!(chars_similar('X', 'X'));
        assert!(chars_similar(' ', ' '));
    }

    #[test]
    fn test_group_members_are_similar() {
        assert!(chars_similar('O', 'D'));
        assert!(chars_similar('Q', '0'));
        assert!(chars_similar('|', 'L'));
        assert!(chars_similar('W', 'M'));
    }

    #[test]
    fn test_cross_group_not_similar() {
        assert!(!chars_similar('S', '6'));
        assert!(!chars_similar('O', '1'));
    }

    #[test]
    fn test_space_never_matches_real_char() {
        for group in CONFUSION_GROUPS {
            for &c in group.iter() {
                assert!(!chars_similar(' ', c));
            }
        }
    }
}
