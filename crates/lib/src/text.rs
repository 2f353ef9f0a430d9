//! Small text utilities shared across the training pipeline.

/// Truncates a string to at most `max_chars` characters.
///
/// The cutoff is hard, not sentence-aware, and always lands on a character
/// boundary so multi-byte input never panics.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}
