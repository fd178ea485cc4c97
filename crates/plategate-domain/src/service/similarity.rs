//! OCR-aware string similarity

use crate::model::chars_similar;

const LENGTH_PENALTY_PER_CHAR: f64 = 0.2;

/// Similarity in [0, 1] that treats confusable characters as matches.
///
/// The shorter input is padded with trailing spaces, positions are compared
/// pairwise, and every missing character costs an extra 0.2. Callers in the
/// matcher always pass `(detected, registered)`.
pub fn similarity(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = s1.to_uppercase().chars().collect();
    let b: Vec<char> = s2.to_uppercase().chars().collect();

    if a == b {
        return 1.0;
    }

    let max_len = a.len().max(b.len());
    let min_len = a.len().min(b.len());

    let padded = |chars: &[char], i: usize| chars.get(i).copied().unwrap_or(' ');
    let matches = (0..max_len)
        .filter(|&i| chars_similar(padded(&a, i), padded(&b, i)))
        .count();

    let len_penalty = (max_len - min_len) as f64 * LENGTH_PENALTY_PER_CHAR;
    let score = (matches as f64 - len_penalty) / max_len as f64;
    score.max(0.0)
}
