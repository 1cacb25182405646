//! Heuristic English-likelihood score.
//!
//! The score is a weighted sum of four signals, each on a 0-100 scale:
//!
//! | Signal            | Weight | Measures                                         |
//! |-------------------|--------|--------------------------------------------------|
//! | `frequency_fit`   | 0.25   | Letter distribution vs. English (chi-squared)    |
//! | `word_score`      | 0.35   | Share of tokens that are common English words    |
//! | `ngram_score`     | 0.25   | Density of common bigrams and trigrams           |
//! | `structure_score` | 0.15   | Space ratio, vowel ratio, mean word length        |
//!
//! Common words dominate: a short input with no common word at all is damped
//! to a quarter of its raw score, however English its letters look.

use phf::{phf_set, Set};
use serde::Serialize;

use super::frequency::{frequency_fit, letter_counts, letter_words};

const WEIGHT_FREQUENCY: f64 = 0.25;
const WEIGHT_WORDS: f64 = 0.35;
const WEIGHT_NGRAMS: f64 = 0.25;
const WEIGHT_STRUCTURE: f64 = 0.15;

/// Inputs with fewer letters than this and no common word get damped
const SHORT_INPUT_LETTERS: usize = 20;
const SHORT_INPUT_DAMPING: f64 = 0.25;

/// Frequent English words (plus a few that dominate CTF plaintexts)
pub static COMMON_WORDS: Set<&'static str> = phf_set! {
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when",
    "make", "can", "like", "time", "no", "just", "him", "know", "take", "people", "into",
    "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now",
    "look", "only", "come", "its", "over", "think", "also", "back", "after", "use", "two",
    "how", "our", "work", "first", "well", "way", "even", "new", "want", "because", "any",
    "these", "give", "day", "most", "us", "is", "are", "was", "were", "been", "has", "had",
    "did", "said", "very", "here", "where", "more", "many", "must", "may", "should", "shall",
    "under", "again", "never", "always", "every", "each", "why", "let", "yes", "am", "too",
    "hello", "world", "flag", "secret", "message", "password", "key", "test", "data", "text",
    "attack", "dawn", "meet", "code", "hidden", "answer",
};

/// Frequent English bigrams
pub static COMMON_BIGRAMS: Set<&'static str> = phf_set! {
    "th", "he", "in", "er", "an", "re", "on", "at", "en", "nd", "ti", "es", "or", "te", "of",
    "ed", "is", "it", "al", "ar", "st", "to", "nt", "ng", "se", "ha", "as", "ou", "io", "le",
    "ve", "co", "me", "de", "hi", "ri", "ro", "ic", "ne", "ea", "ra", "ce", "li", "ch", "ll",
    "be", "ma", "si", "om", "ur",
};

/// Frequent English trigrams
pub static COMMON_TRIGRAMS: Set<&'static str> = phf_set! {
    "the", "and", "ing", "her", "hat", "his", "tha", "ere", "for", "ent", "ion", "ter", "was",
    "you", "ith", "ver", "all", "wit", "thi", "tio", "nde", "has", "nce", "edt", "tis", "oft",
    "sth", "men", "ers", "are", "con", "ess", "not", "ive", "hin", "ati", "our", "est", "rea",
    "ell", "int", "ome", "one", "ted", "ave", "hou", "eve", "ine", "ate", "res",
};

/// Per-signal breakdown of a language score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LanguageBreakdown {
    /// Letter-frequency fit (0-100)
    pub frequency_fit: f64,
    /// Common-word hit score (0-100)
    pub word_score: f64,
    /// Bigram/trigram density score (0-100)
    pub ngram_score: f64,
    /// Structural plausibility (0-100)
    pub structure_score: f64,
    /// Number of whitespace-delimited tokens
    pub tokens: usize,
    /// Tokens found in [`COMMON_WORDS`]
    pub word_hits: usize,
    /// Weighted total after damping (0-100)
    pub total: f64,
}

/// Language score in [0, 100]
pub fn language_score(text: &str) -> f64 {
    language_breakdown(text).total
}

/// Full breakdown of the language score
pub fn language_breakdown(text: &str) -> LanguageBreakdown {
    let counts = letter_counts(text);
    let letters: usize = counts.iter().sum();
    if letters == 0 {
        return LanguageBreakdown::default();
    }

    let frequency_fit = frequency_fit(&counts);
    let (word_score, tokens, word_hits) = word_score(text);
    let ngram_score = ngram_score(text);
    let structure_score = structure_score(text, letters, &counts);

    let mut total = WEIGHT_FREQUENCY * frequency_fit
        + WEIGHT_WORDS * word_score
        + WEIGHT_NGRAMS * ngram_score
        + WEIGHT_STRUCTURE * structure_score;

    if word_hits == 0 && letters < SHORT_INPUT_LETTERS {
        total *= SHORT_INPUT_DAMPING;
    }

    LanguageBreakdown {
        frequency_fit,
        word_score,
        ngram_score,
        structure_score,
        tokens,
        word_hits,
        total: total.clamp(0.0, 100.0),
    }
}

fn word_score(text: &str) -> (f64, usize, usize) {
    let mut tokens = 0usize;
    let mut hits = 0usize;
    for raw in text.split_whitespace() {
        let token = raw
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_lowercase();
        if token.is_empty() {
            continue;
        }
        tokens += 1;
        if COMMON_WORDS.contains(token.as_str()) {
            hits += 1;
        }
    }
    if tokens == 0 {
        return (0.0, 0, 0);
    }
    let rate = hits as f64 / tokens as f64;
    ((rate * 200.0).min(100.0), tokens, hits)
}

fn ngram_score(text: &str) -> f64 {
    let mut bigrams = 0usize;
    let mut bigram_hits = 0usize;
    let mut trigrams = 0usize;
    let mut trigram_hits = 0usize;

    for word in letter_words(text) {
        let bytes = word.as_bytes();
        for w in bytes.windows(2) {
            bigrams += 1;
            // Words are ASCII letters only, so the slice is valid UTF-8
            if std::str::from_utf8(w).is_ok_and(|g| COMMON_BIGRAMS.contains(g)) {
                bigram_hits += 1;
            }
        }
        for w in bytes.windows(3) {
            trigrams += 1;
            if std::str::from_utf8(w).is_ok_and(|g| COMMON_TRIGRAMS.contains(g)) {
                trigram_hits += 1;
            }
        }
    }

    let bigram_ratio = ratio(bigram_hits, bigrams);
    let trigram_ratio = ratio(trigram_hits, trigrams);
    (bigram_ratio * 120.0 + trigram_ratio * 200.0).min(100.0)
}

fn structure_score(text: &str, letters: usize, counts: &[usize; 26]) -> f64 {
    let chars = text.chars().count();
    let spaces = text.chars().filter(|c| c.is_whitespace()).count();
    let vowels = [0usize, 4, 8, 14, 20].iter().map(|&i| counts[i]).sum::<usize>();

    let words: Vec<String> = letter_words(text).collect();
    let mean_word_len = if words.is_empty() {
        0.0
    } else {
        letters as f64 / words.len() as f64
    };

    let space_fit = band_fit(ratio(spaces, chars), 0.12, 0.25, 0.12);
    let vowel_fit = band_fit(ratio(vowels, letters), 0.30, 0.45, 0.15);
    let length_fit = band_fit(mean_word_len, 3.5, 6.5, 3.0);

    (space_fit + vowel_fit + length_fit) * 100.0 / 3.0
}

/// 1.0 inside `[lo, hi]`, decaying linearly to 0.0 at `width` outside
fn band_fit(value: f64, lo: f64, hi: f64, width: f64) -> f64 {
    let distance = if value < lo {
        lo - value
    } else if value > hi {
        value - hi
    } else {
        0.0
    };
    (1.0 - distance / width).max(0.0)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_scores_high() {
        let score = language_score("The quick brown fox jumps over the lazy dog");
        assert!(score > 50.0, "score was {score}");
    }

    #[test]
    fn test_caesar_shifted_scores_low() {
        let score = language_score("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj");
        assert!(score < 30.0, "score was {score}");
    }

    #[test]
    fn test_short_without_common_words_is_damped() {
        let breakdown = language_breakdown("Uryyb Jbeyq");
        assert_eq!(breakdown.word_hits, 0);
        assert!(breakdown.total < 10.0, "score was {}", breakdown.total);

        let readable = language_score("Hello World");
        assert!(readable > breakdown.total + 30.0, "readable was {readable}");
    }

    #[test]
    fn test_no_letters_is_zero() {
        assert_eq!(language_score(""), 0.0);
        assert_eq!(language_score("1234 5678 !!"), 0.0);
    }

    #[test]
    fn test_bounds() {
        for text in [
            "the the the the the the",
            "zzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
            "SGVsbG8gV29ybGQh",
            "a",
        ] {
            let score = language_score(text);
            assert!((0.0..=100.0).contains(&score), "{text}: {score}");
        }
    }

    #[test]
    fn test_band_fit() {
        assert_eq!(band_fit(0.2, 0.12, 0.25, 0.12), 1.0);
        assert_eq!(band_fit(0.5, 0.12, 0.25, 0.12), 0.0);
        assert!((band_fit(0.06, 0.12, 0.25, 0.12) - 0.5).abs() < 1e-9);
    }
}
