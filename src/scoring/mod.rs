//! Scoring library: the statistics every other component ranks with.
//!
//! # Metrics
//!
//! | Function                  | Range      | Meaning                                      |
//! |---------------------------|------------|----------------------------------------------|
//! | [`entropy`]               | 0-8 bits   | Shannon entropy over bytes                   |
//! | [`char_entropy`]          | 0+ bits    | Shannon entropy over Unicode scalar values   |
//! | [`index_of_coincidence`]  | 0-1        | ~0.066 English, ~0.038 random/polyalphabetic |
//! | [`language_score`]        | 0-100      | English likelihood                           |
//! | [`confidence`]            | 0-100      | Composite confidence (single authority)      |
//!
//! All functions are pure and allocation-light; they are called once per
//! candidate, so the detector fan-out is dominated by decoding, not scoring.

mod confidence;
mod entropy;
mod frequency;
mod language;

pub use confidence::{
    confidence, entropy_points, in_natural_band, is_valid_text, NATURAL_ENTROPY_MAX,
    NATURAL_ENTROPY_MIN, NOISE_ENTROPY,
};
pub use entropy::{char_entropy, distinct_bytes, entropy};
pub use frequency::{
    chi_squared, frequency_fit, ic_from_counts, index_of_coincidence, letter_counts,
    FrequencyAnalysis, LetterFrequency, ENGLISH_FREQ_ORDER, ENGLISH_IC, ENGLISH_LETTER_FREQ,
    RANDOM_IC,
};
pub use language::{
    language_breakdown, language_score, LanguageBreakdown, COMMON_BIGRAMS, COMMON_TRIGRAMS,
    COMMON_WORDS,
};

use serde::Serialize;

/// Derived per-candidate scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreProfile {
    /// Shannon entropy in bits/symbol
    pub entropy: f64,
    /// Language score (0-100)
    pub language_score: f64,
    /// Output is well-formed printable text
    pub is_valid_text: bool,
    /// Composite confidence (0-100)
    pub confidence: f64,
}

impl ScoreProfile {
    /// Score decoded bytes.
    ///
    /// Valid UTF-8 is measured per character; anything else per byte.
    pub fn evaluate(bytes: &[u8], pattern_matched: bool) -> Self {
        let is_valid_text = is_valid_text(bytes);
        let (entropy, language_score) = match std::str::from_utf8(bytes) {
            Ok(text) => (char_entropy(text), language_score(text)),
            Err(_) => (
                entropy(bytes),
                language_score(&String::from_utf8_lossy(bytes)),
            ),
        };

        Self {
            entropy,
            language_score,
            is_valid_text,
            confidence: confidence(is_valid_text, entropy, language_score, pattern_matched),
        }
    }

    /// Score a text
    pub fn of_text(text: &str, pattern_matched: bool) -> Self {
        Self::evaluate(text.as_bytes(), pattern_matched)
    }

    /// Same measurements with a different confidence
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 100.0);
        self
    }
}
