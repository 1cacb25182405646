//! Simple (monoalphabetic) substitution solver.
//!
//! Deterministic hill climb over the 26-letter key: starting from the
//! identity key and from a frequency-rank key, try every pair swap and keep
//! swaps that raise the language score, until a pass makes no progress or
//! the pass budget runs out. Long ciphertexts are scored on a prefix sample;
//! the final key is applied to the whole text.

use crate::scoring::{language_score, letter_counts, ENGLISH_FREQ_ORDER};

/// Characters of ciphertext scored during the climb
const SAMPLE_CHARS: usize = 2000;

/// Result of the hill climb
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionSolution {
    /// Plaintext alphabet indexed by ciphertext letter (`key[0]` is what `a` maps to)
    pub key: String,
    /// Recovered plaintext
    pub plaintext: String,
    /// Language score of the plaintext
    pub language_score: f64,
}

/// Apply a cipher→plain key, preserving case
pub fn apply_key(text: &str, key: &[u8; 26]) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => key[(c as u8 - b'a') as usize] as char,
            'A'..='Z' => key[(c as u8 - b'A') as usize].to_ascii_uppercase() as char,
            _ => c,
        })
        .collect()
}

fn identity_key() -> [u8; 26] {
    let mut key = [0u8; 26];
    for (i, k) in key.iter_mut().enumerate() {
        *k = b'a' + i as u8;
    }
    key
}

/// Map the n-th most frequent ciphertext letter to the n-th most frequent English letter
fn frequency_key(text: &str) -> [u8; 26] {
    let counts = letter_counts(text);
    let mut rank: Vec<usize> = (0..26).collect();
    rank.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));

    let mut key = [0u8; 26];
    for (position, &cipher_letter) in rank.iter().enumerate() {
        key[cipher_letter] = ENGLISH_FREQ_ORDER[position];
    }
    key
}

fn climb(sample: &str, mut key: [u8; 26], max_passes: usize) -> ([u8; 26], f64) {
    let mut best = language_score(&apply_key(sample, &key));
    for _ in 0..max_passes {
        let mut improved = false;
        for i in 0..26 {
            for j in (i + 1)..26 {
                key.swap(i, j);
                let score = language_score(&apply_key(sample, &key));
                if score > best {
                    best = score;
                    improved = true;
                } else {
                    key.swap(i, j);
                }
            }
        }
        if !improved {
            break;
        }
    }
    (key, best)
}

fn sample_of(text: &str) -> &str {
    match text.char_indices().nth(SAMPLE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Solve a substitution cipher
pub fn crack(text: &str, max_passes: usize) -> Option<SubstitutionSolution> {
    if !text.bytes().any(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let sample = sample_of(text);

    let (key_a, score_a) = climb(sample, identity_key(), max_passes);
    let (key_b, score_b) = climb(sample, frequency_key(sample), max_passes);
    let key = if score_b > score_a { key_b } else { key_a };

    let plaintext = apply_key(text, &key);
    Some(SubstitutionSolution {
        key: key.iter().map(|&b| b as char).collect(),
        language_score: language_score(&plaintext),
        plaintext,
    })
}
