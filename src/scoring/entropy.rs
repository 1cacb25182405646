//! Shannon entropy over byte and character distributions.

use std::collections::HashMap;

/// Shannon entropy of a byte slice in bits/symbol.
///
/// Returns 0.0 for empty input. The maximum is `log2(min(len, 256))`, so
/// short inputs can never look fully random.
pub fn entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut counts = [0u32; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    shannon(counts.iter().copied().filter(|&c| c > 0), data.len())
}

/// Shannon entropy over Unicode scalar values.
///
/// ASCII input takes the byte path; anything else is counted per `char` so a
/// multi-byte code point contributes one symbol, not several.
pub fn char_entropy(text: &str) -> f64 {
    if text.is_ascii() {
        return entropy(text.as_bytes());
    }

    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    shannon(counts.into_values(), total)
}

fn shannon(counts: impl Iterator<Item = u32>, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .map(|c| {
            let p = f64::from(c) / total;
            -p * p.log2()
        })
        .sum()
}

/// Number of distinct byte values present
pub fn distinct_bytes(data: &[u8]) -> usize {
    let mut seen = [false; 256];
    for &byte in data {
        seen[byte as usize] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(entropy(&[]), 0.0);
        assert_eq!(char_entropy(""), 0.0);
    }

    #[test]
    fn test_single_symbol_is_zero() {
        assert_eq!(entropy(b"aaaaaaaa"), 0.0);
    }

    #[test]
    fn test_uniform_distribution() {
        let data: Vec<u8> = (0..=255u8).collect();
        assert!((entropy(&data) - 8.0).abs() < 1e-9);

        assert!((entropy(b"abcd") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_char_entropy_counts_code_points() {
        // Four distinct code points, each multi-byte in UTF-8
        assert!((char_entropy("äöüß") - 2.0).abs() < 1e-9);
        // Byte entropy sees more symbols than there are characters
        assert!(entropy("äöüß".as_bytes()) > 2.0);
    }

    #[test]
    fn test_distinct_bytes() {
        assert_eq!(distinct_bytes(b"hello"), 4);
        assert_eq!(distinct_bytes(b""), 0);
    }
}
