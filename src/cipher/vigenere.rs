//! Vigenère key recovery.
//!
//! 1. Rank key lengths 2..=max by the average index of coincidence of the
//!    interleaved columns (English columns sit near 0.066).
//! 2. For the best few lengths, solve each column as an independent Caesar
//!    shift by maximizing the letter-frequency fit.
//! 3. Collapse periodic keys (`LEMONLEMON` → `LEMON`) and keep the key whose
//!    plaintext has the highest language score. Shorter keys are tried first
//!    and a longer key must beat them by a clear margin.
//!
//! Non-letters pass through unchanged and do not advance the key.

use crate::scoring::{frequency_fit, ic_from_counts, language_score};

/// Letters needed before key-length statistics mean anything
const MIN_LETTERS: usize = 20;

/// Lengths within this share of the best IC count as equally likely
const IC_NEAR_BEST: f64 = 0.9;

/// Key lengths solved in full
const TOP_LENGTHS: usize = 3;

/// Score a longer key must add over a shorter one; longer keys overfit
const LONGER_KEY_MARGIN: f64 = 3.0;

/// Recovered Vigenère key and plaintext
#[derive(Debug, Clone, PartialEq)]
pub struct VigenereSolution {
    /// Uppercase key
    pub key: String,
    /// Recovered plaintext
    pub plaintext: String,
    /// Language score of the plaintext
    pub language_score: f64,
    /// Average column IC at the chosen key length
    pub average_ic: f64,
}

fn letter_indices(text: &str) -> Vec<u8> {
    text.bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_lowercase() - b'a')
        .collect()
}

fn apply(text: &str, key: &[u8], decrypt: bool) -> String {
    if key.is_empty() {
        return text.to_string();
    }
    let mut j = 0usize;
    text.chars()
        .map(|c| {
            let base = match c {
                'a'..='z' => b'a',
                'A'..='Z' => b'A',
                _ => return c,
            };
            let k = key[j % key.len()] % 26;
            j += 1;
            let offset = if decrypt { 26 - k } else { k };
            ((c as u8 - base + offset) % 26 + base) as char
        })
        .collect()
}

/// Encrypt with a letter key (non-letters in the key are ignored)
pub fn encrypt(text: &str, key: &str) -> String {
    apply(text, &letter_indices(key), false)
}

/// Decrypt with a letter key (non-letters in the key are ignored)
pub fn decrypt(text: &str, key: &str) -> String {
    apply(text, &letter_indices(key), true)
}

/// Average column IC for each key length, best first
pub fn rank_key_lengths(text: &str, max_len: usize) -> Vec<(usize, f64)> {
    let letters = letter_indices(text);
    let upper = max_len.min(letters.len() / 2);

    let mut ranked: Vec<(usize, f64)> = (2..=upper)
        .map(|len| (len, average_column_ic(&letters, len)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

fn column_counts(letters: &[u8], len: usize, column: usize, shift: u8) -> [usize; 26] {
    let mut counts = [0usize; 26];
    for &l in letters.iter().skip(column).step_by(len) {
        counts[((l + 26 - shift) % 26) as usize] += 1;
    }
    counts
}

fn average_column_ic(letters: &[u8], len: usize) -> f64 {
    let ics: Vec<f64> = (0..len)
        .map(|col| column_counts(letters, len, col, 0))
        .filter(|counts| counts.iter().sum::<usize>() > 1)
        .map(|counts| ic_from_counts(&counts))
        .collect();
    if ics.is_empty() {
        0.0
    } else {
        ics.iter().sum::<f64>() / ics.len() as f64
    }
}

/// Per-column shift with the best chi-squared letter fit.
///
/// A column holds every `len`-th letter, so it has no words to score; whole
/// keys are ranked by language score in [`crack`].
fn solve_key(letters: &[u8], len: usize) -> Vec<u8> {
    (0..len)
        .map(|col| {
            let mut best_shift = 0u8;
            let mut best_fit = f64::MIN;
            for shift in 0..26u8 {
                let fit = frequency_fit(&column_counts(letters, len, col, shift));
                if fit > best_fit {
                    best_fit = fit;
                    best_shift = shift;
                }
            }
            best_shift
        })
        .collect()
}

/// Shortest period of a key
fn collapse_key(key: &[u8]) -> &[u8] {
    let n = key.len();
    for period in 1..n {
        if n % period == 0 && key.chunks(period).all(|chunk| chunk == &key[..period]) {
            return &key[..period];
        }
    }
    key
}

/// Recover the most likely key of length 2..=`max_key_len`.
///
/// Candidate keys come from the best IC periods and compete on the language
/// score of their plaintext; a longer key must win by `LONGER_KEY_MARGIN`.
pub fn crack(text: &str, max_key_len: usize) -> Option<VigenereSolution> {
    let letters = letter_indices(text);
    if letters.len() < MIN_LETTERS {
        return None;
    }

    let ranked = rank_key_lengths(text, max_key_len);
    let best_ic = ranked.first()?.1;

    let mut lengths: Vec<usize> = ranked.iter().take(TOP_LENGTHS).map(|&(len, _)| len).collect();
    // Multiples of the true period score as well as the period itself
    if let Some(&(shortest, _)) = ranked
        .iter()
        .filter(|&&(_, ic)| ic >= best_ic * IC_NEAR_BEST)
        .min_by_key(|&&(len, _)| len)
    {
        if !lengths.contains(&shortest) {
            lengths.push(shortest);
        }
    }
    lengths.sort_unstable();

    let mut best: Option<VigenereSolution> = None;
    for len in lengths {
        let key = solve_key(&letters, len);
        let key = collapse_key(&key);
        let plaintext = apply(text, key, true);
        let score = language_score(&plaintext);

        if best
            .as_ref()
            .map_or(true, |b| score > b.language_score + LONGER_KEY_MARGIN)
        {
            best = Some(VigenereSolution {
                key: key.iter().map(|&k| (b'A' + k) as char).collect(),
                plaintext,
                language_score: score,
                average_ic: average_column_ic(&letters, len),
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "It was the best of times, it was the worst of times, it was the age \
        of wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch \
        of incredulity, it was the season of light, it was the season of darkness, it was the \
        spring of hope, it was the winter of despair.";

    #[test]
    fn test_encrypt_decrypt() {
        let ct = encrypt("Attack at dawn!", "LEMON");
        assert_eq!(ct, "Lxfopv ef rnhr!");
        assert_eq!(decrypt(&ct, "lemon"), "Attack at dawn!");
    }

    #[test]
    fn test_crack_recovers_key() {
        let ct = encrypt(PLAIN, "LEMON");
        let solution = crack(&ct, 15).unwrap();
        assert_eq!(solution.key, "LEMON");
        assert_eq!(solution.plaintext, PLAIN);
    }

    #[test]
    fn test_crack_short_key() {
        let ct = encrypt(PLAIN, "KEY");
        let solution = crack(&ct, 15).unwrap();
        assert_eq!(solution.key, "KEY");
    }

    #[test]
    fn test_key_choice_follows_language_score() {
        let ct = encrypt(PLAIN, "LEMON");
        let letters = letter_indices(&ct);
        let solution = crack(&ct, 15).unwrap();
        assert!((solution.language_score - language_score(&solution.plaintext)).abs() < 1e-9);

        for len in 2..=15 {
            let key = solve_key(&letters, len);
            let other = language_score(&apply(&ct, collapse_key(&key), true));
            assert!(solution.language_score + LONGER_KEY_MARGIN >= other, "length {len}");
        }
    }

    #[test]
    fn test_collapse_key() {
        assert_eq!(collapse_key(&[1, 2, 1, 2]), &[1, 2]);
        assert_eq!(collapse_key(&[1, 2, 3]), &[1, 2, 3]);
        assert_eq!(collapse_key(&[4, 4, 4]), &[4]);
    }

    #[test]
    fn test_too_short() {
        assert!(crack("Lxfopv ef rnhr", 15).is_none());
    }

    #[test]
    fn test_true_period_ranks_high() {
        let ct = encrypt(PLAIN, "LEMON");
        let ranked = rank_key_lengths(&ct, 15);
        let top: Vec<usize> = ranked.iter().take(3).map(|r| r.0).collect();
        assert!(top.iter().all(|len| len % 5 == 0), "top lengths {top:?}");
    }
}
