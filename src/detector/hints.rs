//! Cheap content hints used to re-prioritize patterns.
//!
//! Hints only reorder the table for one detection round, which changes which
//! pattern wins a confidence tie. They never alter a confidence value.

use crate::patterns::{PatternKind, PATTERNS};

/// Likely pattern kinds for a piece of content, strongest hint first
pub fn content_hints(content: &str, depth: usize) -> Vec<PatternKind> {
    let trimmed = content.trim();
    let mut hints = Vec::new();
    if trimmed.is_empty() {
        return hints;
    }

    let len = trimmed.len();
    let all = |f: fn(&u8) -> bool| trimmed.bytes().all(|b| f(&b));

    if all(u8::is_ascii_hexdigit) && len % 2 == 0 {
        hints.push(PatternKind::HashSignature);
        hints.push(PatternKind::Hex);
    }
    if trimmed.bytes().all(|b| matches!(b, b'0' | b'1' | b' ')) {
        hints.push(PatternKind::Binary);
    }
    if trimmed.starts_with("eyJ") && trimmed.matches('.').count() == 2 {
        hints.push(PatternKind::Jwt);
    }
    if trimmed.starts_with("<~") {
        hints.push(PatternKind::Ascii85);
    }
    if trimmed
        .bytes()
        .all(|b| matches!(b, b'.' | b'-' | b'/' | b' '))
    {
        hints.push(PatternKind::Morse);
    }
    if len % 4 == 0
        && all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        && trimmed.bytes().any(|b| b.is_ascii_lowercase())
    {
        hints.push(PatternKind::Base64);
        hints.push(PatternKind::UrlEncoding);
    }
    if trimmed.contains('%') {
        hints.push(PatternKind::UrlEncoding);
    }
    if trimmed.contains('&') && trimmed.contains(';') {
        hints.push(PatternKind::HtmlEntities);
    }
    if trimmed.contains("\\u") || trimmed.contains("\\x") {
        hints.push(PatternKind::UnicodeEscape);
    }

    // Once something has been peeled off, readable-looking letters are
    // more often a classical cipher than another encoding
    if depth >= 1 && mostly_letters(trimmed) {
        hints.extend([
            PatternKind::Rot13,
            PatternKind::Caesar,
            PatternKind::Atbash,
            PatternKind::Rot47,
            PatternKind::Reversed,
        ]);
    }

    let mut seen = Vec::with_capacity(hints.len());
    hints.retain(|kind| {
        let fresh = !seen.contains(kind);
        seen.push(*kind);
        fresh
    });
    hints
}

fn mostly_letters(text: &str) -> bool {
    let total = text.chars().count();
    let letters_or_spaces = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .count();
    total > 0 && letters_or_spaces * 10 >= total * 8
}

/// Registry indices with hinted kinds first, each group in priority order
pub fn prioritized(hints: &[PatternKind]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..PATTERNS.len()).collect();
    // Stable: unhinted patterns keep registry order
    order.sort_by_key(|&i| !hints.contains(&PATTERNS[i].kind));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_hint() {
        let hints = content_hints("VXJ5eWIgSmJleXE=", 0);
        assert_eq!(hints[0], PatternKind::Base64);
        assert!(!hints.contains(&PatternKind::Rot13));
    }

    #[test]
    fn test_classical_hints_only_after_first_layer() {
        assert!(!content_hints("Uryyb Jbeyq", 0).contains(&PatternKind::Rot13));
        assert!(content_hints("Uryyb Jbeyq", 1).contains(&PatternKind::Rot13));
    }

    #[test]
    fn test_hex_hint() {
        let hints = content_hints("48656c6c6f", 0);
        assert_eq!(&hints[..2], &[PatternKind::HashSignature, PatternKind::Hex]);
    }

    #[test]
    fn test_prioritized_is_stable_permutation() {
        let order = prioritized(&[PatternKind::Base64]);
        assert_eq!(order.len(), PATTERNS.len());
        assert_eq!(PATTERNS[order[0]].kind, PatternKind::Base64);
        // Everything else keeps its relative order
        let rest: Vec<usize> = order[1..].to_vec();
        assert!(rest.windows(2).all(|w| w[0] < w[1]));

        let unhinted = prioritized(&[]);
        assert_eq!(unhinted, (0..PATTERNS.len()).collect::<Vec<_>>());
    }
}
