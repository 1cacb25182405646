//! Advisory pre-scan of large inputs.
//!
//! The input is split into chunks at character boundaries and each chunk is
//! hinted independently. The tally only reorders patterns; the authoritative
//! decode always runs on the full input.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::detector::content_hints;
use crate::patterns::{PatternKind, PATTERNS};

/// Split `input` into pieces of at most `chunk_size` bytes, never inside a
/// character
pub fn split_chunks(input: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(4);
    let mut chunks = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let mut cut = chunk_size.min(rest.len());
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

/// Pattern kinds hinted by the most chunks, most frequent first (ties in
/// registry order)
pub fn prescan(input: &str, chunk_size: usize, parallel: bool) -> Vec<PatternKind> {
    let chunks = split_chunks(input, chunk_size);
    let per_chunk: Vec<Vec<PatternKind>> = if parallel {
        chunks.par_iter().map(|c| content_hints(c, 0)).collect()
    } else {
        chunks.iter().map(|c| content_hints(c, 0)).collect()
    };

    let mut tally: HashMap<PatternKind, usize> = HashMap::new();
    for kind in per_chunk.into_iter().flatten() {
        *tally.entry(kind).or_insert(0) += 1;
    }

    let mut ranked: Vec<(usize, PatternKind, usize)> = PATTERNS
        .iter()
        .enumerate()
        .filter_map(|(i, p)| tally.get(&p.kind).map(|&n| (i, p.kind, n)))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(_, kind, _)| kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_char_boundaries() {
        let text = "ééééé"; // 2 bytes each
        let chunks = split_chunks(text, 5);
        assert!(chunks.iter().all(|c| c.len() <= 5));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_chunks("", 16).is_empty());
    }

    #[test]
    fn test_prescan_finds_hex() {
        let input = "48656c6c6f".repeat(40);
        let kinds = prescan(&input, 100, true);
        assert!(kinds.contains(&PatternKind::Hex));
        assert_eq!(kinds, prescan(&input, 100, false));
    }
}
