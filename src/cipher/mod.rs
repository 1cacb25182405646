//! Classical cipher cryptanalysis.
//!
//! Unlike registry patterns, these families need a key search. Each family
//! runs a bounded search and contributes at most its single best candidate:
//!
//! | Family                 | Search                                          |
//! |------------------------|-------------------------------------------------|
//! | Caesar                 | all 25 shifts                                   |
//! | ROT-N                  | ROT13, ROT5, ROT18, ROT47                       |
//! | Atbash                 | fixed                                           |
//! | Vigenère               | key lengths 2..=15 ranked by column IC          |
//! | Substitution           | pair-swap hill climb, two deterministic starts  |
//! | Columnar transposition | 2..=6 columns, every column order               |
//! | Rail fence             | 2..=10 rails                                    |
//!
//! Candidates whose language score falls below
//! [`CipherConfig::min_score`](crate::config::CipherConfig) are dropped.
//!
//! # Example
//!
//! ```
//! use decodex::cipher::{CipherBreaker, CipherKind};
//!
//! let breaker = CipherBreaker::default();
//! let results = breaker.analyze("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj");
//! assert_eq!(results[0].cipher_type, CipherKind::Caesar);
//! assert_eq!(results[0].key_candidate.as_deref(), Some("3"));
//! ```

pub mod caesar;
pub mod substitution;
pub mod transposition;
pub mod vigenere;

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::CipherConfig;
use crate::scoring::{char_entropy, confidence, is_valid_text, language_score, FrequencyAnalysis};

/// Classical cipher families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CipherKind {
    /// Fixed alphabet shift
    #[serde(rename = "Caesar")]
    Caesar,
    /// ROT13 / ROT5 / ROT18 / ROT47
    #[serde(rename = "ROT-N")]
    RotN,
    /// Mirrored alphabet
    #[serde(rename = "Atbash")]
    Atbash,
    /// Repeating-key polyalphabetic shift
    #[serde(rename = "Vigenere")]
    Vigenere,
    /// Monoalphabetic substitution
    #[serde(rename = "Substitution")]
    Substitution,
    /// Columnar transposition
    #[serde(rename = "Columnar Transposition")]
    Columnar,
    /// Rail fence transposition
    #[serde(rename = "Rail Fence")]
    RailFence,
}

impl CipherKind {
    /// Every family, in reporting order
    pub const ALL: [CipherKind; 7] = [
        CipherKind::Caesar,
        CipherKind::RotN,
        CipherKind::Atbash,
        CipherKind::Vigenere,
        CipherKind::Substitution,
        CipherKind::Columnar,
        CipherKind::RailFence,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            CipherKind::Caesar => "Caesar",
            CipherKind::RotN => "ROT-N",
            CipherKind::Atbash => "Atbash",
            CipherKind::Vigenere => "Vigenere",
            CipherKind::Substitution => "Substitution",
            CipherKind::Columnar => "Columnar Transposition",
            CipherKind::RailFence => "Rail Fence",
        }
    }
}

impl std::fmt::Display for CipherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One cryptanalysis candidate
#[derive(Debug, Clone, Serialize)]
pub struct CipherAnalysis {
    /// Cipher family
    pub cipher_type: CipherKind,
    /// Composite confidence (0-100)
    pub confidence: f64,
    /// How the key was found
    pub method: String,
    /// Recovered key, shift or parameters
    pub key_candidate: Option<String>,
    /// Recovered plaintext
    pub plaintext: String,
    /// Language score of the plaintext
    pub language_score: f64,
    /// Frequency tables of the plaintext
    pub frequency_analysis: FrequencyAnalysis,
}

impl CipherAnalysis {
    fn new(
        cipher_type: CipherKind,
        method: String,
        key_candidate: Option<String>,
        plaintext: String,
    ) -> Self {
        let language_score = language_score(&plaintext);
        let confidence = confidence(
            is_valid_text(plaintext.as_bytes()),
            char_entropy(&plaintext),
            language_score,
            true,
        );
        Self {
            cipher_type,
            confidence,
            method,
            key_candidate,
            frequency_analysis: FrequencyAnalysis::analyze(&plaintext),
            plaintext,
            language_score,
        }
    }
}

/// Runs every family's key search
#[derive(Debug, Clone, Default)]
pub struct CipherBreaker {
    config: CipherConfig,
}

impl CipherBreaker {
    /// Create a breaker with explicit limits
    pub fn new(config: CipherConfig) -> Self {
        Self { config }
    }

    /// Search limits in use
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Best candidate per family, highest confidence first.
    ///
    /// Candidates below the minimum language score, identical to the input,
    /// or duplicating a better candidate's plaintext are dropped.
    pub fn analyze(&self, text: &str) -> Vec<CipherAnalysis> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut results: Vec<CipherAnalysis> = CipherKind::ALL
            .iter()
            .filter_map(|&kind| self.break_family(kind, text))
            .filter(|c| c.plaintext != text && c.language_score >= self.config.min_score)
            .collect();

        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut seen = HashSet::new();
        results.retain(|c| seen.insert(c.plaintext.clone()));
        results
    }

    /// Best candidate of one family, before the score threshold
    pub fn break_family(&self, kind: CipherKind, text: &str) -> Option<CipherAnalysis> {
        let result = match kind {
            CipherKind::Caesar => caesar::crack(text).map(|s| {
                CipherAnalysis::new(
                    kind,
                    format!("brute force over 25 shifts, best shift {}", s.shift),
                    Some(s.shift.to_string()),
                    s.plaintext,
                )
            }),
            CipherKind::RotN => Self::best_rot(text),
            CipherKind::Atbash => text.bytes().any(|b| b.is_ascii_alphabetic()).then(|| {
                CipherAnalysis::new(kind, "alphabet reversal".to_string(), None, caesar::atbash(text))
            }),
            CipherKind::Vigenere => {
                vigenere::crack(text, self.config.vigenere_max_key_len).map(|s| {
                    CipherAnalysis::new(
                        kind,
                        format!(
                            "key length {} from column IC {:.3}, shifts solved per column",
                            s.key.len(),
                            s.average_ic
                        ),
                        Some(s.key),
                        s.plaintext,
                    )
                })
            },
            CipherKind::Substitution => {
                substitution::crack(text, self.config.substitution_max_passes).map(|s| {
                    CipherAnalysis::new(
                        kind,
                        "hill climb over letter swaps".to_string(),
                        Some(s.key),
                        s.plaintext,
                    )
                })
            },
            CipherKind::Columnar => {
                transposition::crack_columnar(text, self.config.columnar_max_columns).map(|s| {
                    CipherAnalysis::new(
                        kind,
                        format!("{} columns, exhaustive column order", s.key.len()),
                        Some(
                            s.key
                                .iter()
                                .map(|k| k.to_string())
                                .collect::<Vec<_>>()
                                .join(","),
                        ),
                        s.plaintext,
                    )
                })
            },
            CipherKind::RailFence => {
                transposition::crack_rail_fence(text, self.config.rail_fence_max_rails).map(|s| {
                    let rails = s.key.first().copied().unwrap_or_default();
                    CipherAnalysis::new(
                        kind,
                        format!("{rails} rails"),
                        Some(rails.to_string()),
                        s.plaintext,
                    )
                })
            },
        };

        if let Some(ref candidate) = result {
            debug!(
                family = kind.name(),
                language_score = candidate.language_score,
                confidence = candidate.confidence,
                "Cipher candidate"
            );
        }
        result
    }

    fn best_rot(text: &str) -> Option<CipherAnalysis> {
        let variants: [(&str, fn(&str) -> String); 4] = [
            ("ROT13", caesar::rot13),
            ("ROT5", caesar::rot5),
            ("ROT18", caesar::rot18),
            ("ROT47", caesar::rot47),
        ];

        variants
            .iter()
            .map(|&(name, transform)| (name, transform(text)))
            .filter(|(_, plaintext)| plaintext != text)
            .map(|(name, plaintext)| (name, language_score(&plaintext), plaintext))
            .fold(None, |best: Option<(&str, f64, String)>, candidate| match best {
                Some(ref b) if b.1 >= candidate.1 => best,
                _ => Some(candidate),
            })
            .map(|(name, _, plaintext)| {
                CipherAnalysis::new(
                    CipherKind::RotN,
                    format!("{name} rotation"),
                    Some(name.to_string()),
                    plaintext,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = "It was the best of times, it was the worst of times, it was the age \
        of wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch \
        of incredulity, it was the season of light, it was the season of darkness.";

    #[test]
    fn test_caesar_ranked_first() {
        let breaker = CipherBreaker::default();
        let results = breaker.analyze("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj");
        assert!(!results.is_empty());
        assert_eq!(results[0].cipher_type, CipherKind::Caesar);
        assert_eq!(
            results[0].plaintext,
            "The quick brown fox jumps over the lazy dog"
        );
    }

    #[test]
    fn test_rot13_family() {
        let breaker = CipherBreaker::default();
        let ciphertext = caesar::rot13(PLAIN);
        let rot = breaker.break_family(CipherKind::RotN, &ciphertext).unwrap();
        assert_eq!(rot.key_candidate.as_deref(), Some("ROT13"));
        assert_eq!(rot.plaintext, PLAIN);
    }

    #[test]
    fn test_vigenere_in_results() {
        let breaker = CipherBreaker::default();
        let ciphertext = vigenere::encrypt(PLAIN, "CIPHER");
        let results = breaker.analyze(&ciphertext);
        let vig = results
            .iter()
            .find(|r| r.cipher_type == CipherKind::Vigenere)
            .expect("vigenere candidate");
        assert_eq!(vig.key_candidate.as_deref(), Some("CIPHER"));
        assert_eq!(vig.plaintext, PLAIN);
    }

    #[test]
    fn test_sorted_and_bounded() {
        let breaker = CipherBreaker::default();
        let results = breaker.analyze(&caesar::shift(PLAIN, 11));
        for pair in results.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for r in &results {
            assert!((0.0..=100.0).contains(&r.confidence));
            assert!(r.language_score >= breaker.config().min_score);
        }
    }

    #[test]
    fn test_no_duplicate_plaintexts() {
        let breaker = CipherBreaker::default();
        let results = breaker.analyze(&caesar::rot13(PLAIN));
        let unique: HashSet<&str> = results.iter().map(|r| r.plaintext.as_str()).collect();
        assert_eq!(unique.len(), results.len());
    }

    #[test]
    fn test_empty_input() {
        assert!(CipherBreaker::default().analyze("   ").is_empty());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CipherKind::RailFence.to_string(), "Rail Fence");
        assert_eq!(
            serde_json::to_string(&CipherKind::RotN).unwrap(),
            "\"ROT-N\""
        );
    }
}
