//! Directed rewrites used to generate alternate plate readings

/// A directed character rewrite `from -> to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub from: char,
    pub to: char,
}

const fn rule(from: char, to: char) -> SubstitutionRule {
    SubstitutionRule { from, to }
}

/// Fixed substitution table, both directions listed where they apply.
/// `L -> 1` and `D -> 0` have no reverse entry.
pub const SUBSTITUTION_RULES: &[SubstitutionRule] = &[
    rule('M', 'W'),
    rule('W', 'M'),
    rule('O', '0'),
    rule('0', 'O'),
    rule('I', '1'),
    rule('1', 'I'),
    rule('L', '1'),
    rule('S', '5'),
    rule('5', 'S'),
    rule('Z', '2'),
    rule('2', 'Z'),
    rule('B', '8'),
    rule('8', 'B'),
    rule('G', '6'),
    rule('6', 'G'),
    rule('Q', 'O'),
    rule('O', 'Q'),
    rule('D', '0'),
    rule('T', '7'),
    rule('7', 'T'),
    rule('A', '4'),
    rule('4', 'A'),
    rule('E', '3'),
    rule('3', 'E'),
];

/// Rewrites applied one after another to build the compound reading
pub const COMPOUND_CHAIN: &[SubstitutionRule] = &[
    rule('5', 'S'),
    rule('6', 'G'),
    rule('7', 'T'),
    rule('O', '0'),
    rule('0', 'O'),
];

impl SubstitutionRule {
    /// Replace every occurrence of `from`, or `None` when it does not occur.
    pub fn apply(&self, text: &str) -> Option<String> {
        if text.contains(self.from) {
            Some(text.replace(self.from, &self.to.to_string()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let r = rule('O', '0');
        assert_eq!(r.apply("OO1O").as_deref(), Some("0010"));
    }

    #[test]
    fn test_apply_absent_source() {
        assert_eq!(rule('Z', '2').apply("ABC123"), None);
    }

    #[test]
    fn test_one_directional_rules() {
        assert!(SUBSTITUTION_RULES.contains(&rule('L', '1')));
        assert!(!SUBSTITUTION_RULES.contains(&rule('1', 'L')));
        assert!(SUBSTITUTION_RULES.contains(&rule('D', '0')));
        assert!(!SUBSTITUTION_RULES.contains(&rule('0', 'D')));
    }
}
