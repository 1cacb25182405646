//! Composite confidence function.
//!
//! This is the only place confidences are computed. Detectors, the cipher
//! module and the ensemble all route through [`confidence`] so scores stay
//! comparable across components.
//!
//! | Component                                   | Points        |
//! |---------------------------------------------|---------------|
//! | Pattern matched                             | +40           |
//! | Output is valid text                        | +30           |
//! | Entropy in [3.5, 5.5] bits/symbol           | +25           |
//! | Entropy in [2.5, 3.5) or (5.5, 6.5]         | +15           |
//! | Entropy in [1.5, 2.5) or (6.5, 7.5]         | +5            |
//! | Language score                              | up to +15     |
//! | Valid text + natural entropy + language ≥ 50| +10 synergy   |
//! | Invalid text with entropy > 7.5             | −15 penalty   |
//!
//! The result is clamped to [0, 100].

/// Lower edge of the natural-language entropy band (bits/symbol)
pub const NATURAL_ENTROPY_MIN: f64 = 3.5;
/// Upper edge of the natural-language entropy band (bits/symbol)
pub const NATURAL_ENTROPY_MAX: f64 = 5.5;
/// Entropy above which invalid output is treated as noise
pub const NOISE_ENTROPY: f64 = 7.5;

const PATTERN_POINTS: f64 = 40.0;
const VALID_TEXT_POINTS: f64 = 30.0;
const LANGUAGE_POINTS: f64 = 15.0;
const SYNERGY_POINTS: f64 = 10.0;
const NOISE_PENALTY: f64 = 15.0;
const SYNERGY_LANGUAGE: f64 = 50.0;

/// Composite confidence in [0, 100]
pub fn confidence(
    is_valid_text: bool,
    entropy: f64,
    language_score: f64,
    pattern_matched: bool,
) -> f64 {
    let entropy = if entropy.is_finite() { entropy } else { 0.0 };
    let language_score = if language_score.is_finite() {
        language_score.clamp(0.0, 100.0)
    } else {
        0.0
    };

    let mut score = 0.0;
    if pattern_matched {
        score += PATTERN_POINTS;
    }
    if is_valid_text {
        score += VALID_TEXT_POINTS;
    }
    score += entropy_points(entropy);
    score += LANGUAGE_POINTS * language_score / 100.0;

    if is_valid_text && in_natural_band(entropy) && language_score >= SYNERGY_LANGUAGE {
        score += SYNERGY_POINTS;
    }
    if !is_valid_text && entropy > NOISE_ENTROPY {
        score -= NOISE_PENALTY;
    }

    score.clamp(0.0, 100.0)
}

/// Points awarded for how close entropy sits to natural language
pub fn entropy_points(entropy: f64) -> f64 {
    if in_natural_band(entropy) {
        25.0
    } else if (2.5..NATURAL_ENTROPY_MIN).contains(&entropy)
        || (entropy > NATURAL_ENTROPY_MAX && entropy <= 6.5)
    {
        15.0
    } else if (1.5..2.5).contains(&entropy) || (entropy > 6.5 && entropy <= NOISE_ENTROPY) {
        5.0
    } else {
        0.0
    }
}

/// Whether entropy falls in the natural-language band
pub fn in_natural_band(entropy: f64) -> bool {
    (NATURAL_ENTROPY_MIN..=NATURAL_ENTROPY_MAX).contains(&entropy)
}

/// Whether decoded bytes are well-formed, printable UTF-8 text.
///
/// At least 95% of characters must be printable; tab, newline and carriage
/// return count as printable. Replacement characters disqualify the text.
pub fn is_valid_text(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    if text.is_empty() {
        return false;
    }

    let mut total = 0usize;
    let mut printable = 0usize;
    for c in text.chars() {
        if c == char::REPLACEMENT_CHARACTER {
            return false;
        }
        total += 1;
        if !c.is_control() || matches!(c, '\t' | '\n' | '\r') {
            printable += 1;
        }
    }
    printable as f64 / total as f64 >= 0.95
}
