//! Transposition ciphers: columnar and rail fence.
//!
//! Both operate on characters as-is (spaces and punctuation included) and
//! are searched exhaustively over small parameter ranges.

use crate::scoring::language_breakdown;

/// Longest text searched; transposition keys do not survive sampling
pub const MAX_TRANSPOSITION_CHARS: usize = 10_000;

const SCORE_TIE: f64 = 1e-9;

/// Best transposition decryption
#[derive(Debug, Clone, PartialEq)]
pub struct TranspositionSolution {
    /// Column read order (columnar) or `[rails]` (rail fence)
    pub key: Vec<usize>,
    /// Recovered plaintext
    pub plaintext: String,
    /// Language score of the plaintext
    pub language_score: f64,
    /// Common-word hits, the tie-breaker between rotated plaintexts
    pub word_hits: usize,
}

impl TranspositionSolution {
    fn candidate(key: Vec<usize>, plaintext: String) -> Self {
        let breakdown = language_breakdown(&plaintext);
        Self {
            key,
            plaintext,
            language_score: breakdown.total,
            word_hits: breakdown.word_hits,
        }
    }

    fn beats(&self, other: Option<&Self>) -> bool {
        other.map_or(true, |b| {
            let delta = self.language_score - b.language_score;
            delta > SCORE_TIE || (delta.abs() <= SCORE_TIE && self.word_hits > b.word_hits)
        })
    }
}

// ---------------------------------------------------------------------------
// Columnar
// ---------------------------------------------------------------------------

/// Write row-wise into `order.len()` columns, read columns in `order`
pub fn columnar_encrypt(text: &str, order: &[usize]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let columns = order.len();
    let mut out = String::with_capacity(text.len());
    for &col in order {
        out.extend(chars.iter().skip(col).step_by(columns));
    }
    out
}

/// Inverse of [`columnar_encrypt`]
pub fn columnar_decrypt(text: &str, order: &[usize]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let columns = order.len();
    if columns == 0 {
        return text.to_string();
    }
    let rows = chars.len() / columns;
    let long_columns = chars.len() % columns;

    let mut grid: Vec<Vec<char>> = vec![Vec::new(); columns];
    let mut pos = 0;
    for &col in order {
        let len = rows + usize::from(col < long_columns);
        grid[col] = chars[pos..pos + len].to_vec();
        pos += len;
    }

    let mut out = String::with_capacity(text.len());
    for row in 0..=rows {
        for column in &grid {
            if let Some(&c) = column.get(row) {
                out.push(c);
            }
        }
    }
    out
}

/// Advance to the next lexicographic permutation; false after the last one
fn next_permutation(perm: &mut [usize]) -> bool {
    let Some(i) = (1..perm.len()).rev().find(|&i| perm[i - 1] < perm[i]) else {
        return false;
    };
    let pivot = i - 1;
    let Some(j) = (i..perm.len()).rev().find(|&j| perm[j] > perm[pivot]) else {
        return false;
    };
    perm.swap(pivot, j);
    perm[i..].reverse();
    true
}

/// Try every column order for 2..=`max_columns` columns
pub fn crack_columnar(text: &str, max_columns: usize) -> Option<TranspositionSolution> {
    let len = text.chars().count();
    if len < 4 || len > MAX_TRANSPOSITION_CHARS {
        return None;
    }

    let mut best: Option<TranspositionSolution> = None;
    for columns in 2..=max_columns.min(len / 2) {
        let mut order: Vec<usize> = (0..columns).collect();
        loop {
            let plaintext = columnar_decrypt(text, &order);
            if plaintext != text {
                let candidate = TranspositionSolution::candidate(order.clone(), plaintext);
                if candidate.beats(best.as_ref()) {
                    best = Some(candidate);
                }
            }
            if !next_permutation(&mut order) {
                break;
            }
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Rail fence
// ---------------------------------------------------------------------------

/// Rail index of every position along the zigzag
fn zigzag(len: usize, rails: usize) -> Vec<usize> {
    let cycle = 2 * (rails - 1);
    (0..len)
        .map(|i| {
            let p = i % cycle;
            if p < rails {
                p
            } else {
                cycle - p
            }
        })
        .collect()
}

/// Rail fence encryption with `rails` rails
pub fn rail_fence_encrypt(text: &str, rails: usize) -> String {
    if rails < 2 {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let pattern = zigzag(chars.len(), rails);
    let mut out = String::with_capacity(text.len());
    for rail in 0..rails {
        out.extend(
            chars
                .iter()
                .zip(&pattern)
                .filter(|(_, &r)| r == rail)
                .map(|(&c, _)| c),
        );
    }
    out
}

/// Inverse of [`rail_fence_encrypt`]
pub fn rail_fence_decrypt(text: &str, rails: usize) -> String {
    if rails < 2 {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let pattern = zigzag(chars.len(), rails);

    // Slice the ciphertext into rails, then walk the zigzag
    let mut rail_chars: Vec<std::vec::IntoIter<char>> = Vec::with_capacity(rails);
    let mut pos = 0;
    for rail in 0..rails {
        let len = pattern.iter().filter(|&&r| r == rail).count();
        rail_chars.push(chars[pos..pos + len].to_vec().into_iter());
        pos += len;
    }

    pattern
        .iter()
        .filter_map(|&rail| rail_chars[rail].next())
        .collect()
}

/// Try 2..=`max_rails` rails
pub fn crack_rail_fence(text: &str, max_rails: usize) -> Option<TranspositionSolution> {
    let len = text.chars().count();
    if len < 4 || len > MAX_TRANSPOSITION_CHARS {
        return None;
    }

    let mut best: Option<TranspositionSolution> = None;
    for rails in 2..=max_rails.min(len - 1) {
        let plaintext = rail_fence_decrypt(text, rails);
        if plaintext == text {
            continue;
        }
        let candidate = TranspositionSolution::candidate(vec![rails], plaintext);
        if candidate.beats(best.as_ref()) {
            best = Some(candidate);
        }
    }
    best
}
