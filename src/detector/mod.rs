//! Single-Layer Detector.
//!
//! Runs every registry pattern against one input and keeps the decode with
//! the highest composite confidence.
//!
//! # Pipeline per pattern
//!
//! ```text
//! quick_filter ──▶ validate (time-boxed) ──▶ decode (deadline) ──▶ output gate ──▶ score
//!      │                  │                      │                     │
//!    reject            reject/timeout       no match/timeout         reject
//! ```
//!
//! Encoded payloads are printable text, so input that fails
//! [`is_valid_text`] yields no candidates at all.
//!
//! Classical rows (ROT13, ROT47, Atbash, Caesar, reversal) turn any text
//! into other text, so their output must be valid text, reach
//! [`CLASSICAL_MIN_LANGUAGE`], contain a common word and beat the input's
//! language score by `language_gain_epsilon`.
//!
//! Patterns may be fanned out over the rayon pool. All outcomes are
//! collected before selection, so the winner is the same for any worker
//! count or completion order: highest confidence first, then earliest
//! position in the (possibly hint-prioritized) pattern order.
//!
//! Panics inside a pattern are caught and reported as warnings; they never
//! abort detection.

mod container;
mod hints;

pub use container::{container_warning, sniff, ContainerSignature, CONTAINERS};
pub use hints::{content_hints, prioritized};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::error::DecodeError;
use crate::patterns::{DetectionPattern, OutputGate, PATTERNS};
use crate::scoring::{
    char_entropy, confidence, is_valid_text, language_breakdown, language_score, ScoreProfile,
    NOISE_ENTROPY,
};

/// Absolute language floor for classical-row output
pub const CLASSICAL_MIN_LANGUAGE: f64 = 50.0;

/// One candidate interpretation of an input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodingResult {
    /// Pattern or cipher name
    #[serde(rename = "type")]
    pub kind: String,
    /// Decoded text, possibly truncated for display
    pub result: String,
    /// Confidence (0-100)
    pub confidence: f64,
    /// Scores of the decoded output
    pub score_profile: ScoreProfile,
    /// Pattern names applied, in order (never empty)
    pub steps: Vec<String>,
    /// Non-fatal caveats
    pub warnings: Vec<String>,
}

impl DecodingResult {
    /// Build a single-step result
    pub fn new(kind: impl Into<String>, result: impl Into<String>, profile: ScoreProfile) -> Self {
        let kind = kind.into();
        Self {
            steps: vec![kind.clone()],
            kind,
            result: result.into(),
            confidence: profile.confidence,
            score_profile: profile,
            warnings: Vec::new(),
        }
    }

    /// Low-confidence fallback when nothing matched
    pub fn plain_text(input: &str) -> Self {
        let mut result = Self::new("Plain Text", input, ScoreProfile::of_text(input, false));
        result
            .warnings
            .push("No encoding detected; input shown as-is".to_string());
        result
    }

    /// Attach a warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Truncate `result` to at most `max_chars` characters
    pub fn truncated(mut self, max_chars: usize) -> Self {
        if let Some((cut, _)) = self.result.char_indices().nth(max_chars) {
            self.result.truncate(cut);
            self.warnings
                .push(format!("Result truncated to {max_chars} characters"));
        }
        self
    }
}

/// An accepted pattern decode, before display formatting
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Pattern that produced it
    pub pattern: &'static DetectionPattern,
    /// Decoded text (lossy if the bytes were not UTF-8)
    pub output: String,
    /// Scores of the output
    pub profile: ScoreProfile,
    /// Caveats from the decode
    pub warnings: Vec<String>,
    /// Position in this round's pattern order
    pub rank: usize,
}

impl Candidate {
    /// Confidence of this candidate
    pub fn confidence(&self) -> f64 {
        self.profile.confidence
    }

    /// Display form
    pub fn to_result(&self, max_display_chars: usize) -> DecodingResult {
        let mut result = DecodingResult::new(self.pattern.name, self.output.clone(), self.profile);
        result.warnings.extend(self.warnings.iter().cloned());
        result.truncated(max_display_chars)
    }
}

/// Everything one detection round produced
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Accepted candidates, best first
    pub candidates: Vec<Candidate>,
    /// Skipped patterns (errors, timeouts)
    pub warnings: Vec<String>,
    /// Patterns whose quick filter passed
    pub patterns_tried: usize,
}

impl Detection {
    /// Highest-confidence candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// No pattern accepted the input
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

enum Outcome {
    Filtered,
    Rejected,
    Accepted(Candidate),
    Failed(DecodeError),
}

/// Single-layer best-match selector over the pattern registry
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    /// Create a detector
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detector settings
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect in plain registry order
    pub fn detect(&self, input: &str) -> Detection {
        self.detect_ordered(input, &prioritized(&[]))
    }

    /// Detect with hinted patterns moved to the front of the order
    pub fn detect_with_hints(&self, input: &str, depth: usize) -> Detection {
        let hints = content_hints(input, depth);
        self.detect_ordered(input, &prioritized(&hints))
    }

    /// Detect with an explicit pattern order (registry indices)
    pub fn detect_ordered(&self, input: &str, order: &[usize]) -> Detection {
        let started = Instant::now();
        if !is_valid_text(input.as_bytes()) {
            debug!(len = input.len(), "input is not valid text; nothing to decode");
            return Detection::default();
        }
        // Overflow means the budget is effectively unbounded
        let deadline = started.checked_add(Duration::from_millis(self.config.layer_timeout_ms));
        let input_language = language_score(input);

        let evaluate = |(rank, &index): (usize, &usize)| {
            let pattern = &PATTERNS[index];
            if deadline.is_some_and(|at| Instant::now() > at) {
                return Outcome::Failed(DecodeError::TimeoutExceeded {
                    stage: pattern.name.to_string(),
                    budget_ms: self.config.layer_timeout_ms,
                });
            }
            catch_unwind(AssertUnwindSafe(|| {
                self.evaluate(pattern, rank, input, input_language, deadline)
            }))
            .unwrap_or_else(|panic| {
                Outcome::Failed(DecodeError::PatternError {
                    pattern: pattern.name.to_string(),
                    message: panic_message(panic.as_ref()),
                })
            })
        };

        let outcomes: Vec<Outcome> = if self.config.enable_parallel {
            order.par_iter().enumerate().map(evaluate).collect()
        } else {
            order.iter().enumerate().map(evaluate).collect()
        };

        let mut detection = Detection::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Filtered => {},
                Outcome::Rejected => detection.patterns_tried += 1,
                Outcome::Accepted(candidate) => {
                    detection.patterns_tried += 1;
                    detection.candidates.push(candidate);
                },
                Outcome::Failed(err) => {
                    warn!(error = %err, "pattern skipped");
                    detection.warnings.push(err.to_string());
                },
            }
        }

        detection.candidates.sort_by(|a, b| {
            b.confidence()
                .total_cmp(&a.confidence())
                .then(a.rank.cmp(&b.rank))
        });

        debug!(
            tried = detection.patterns_tried,
            accepted = detection.candidates.len(),
            best = detection.best().map(|c| c.pattern.name),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "detection round complete"
        );
        detection
    }

    fn evaluate(
        &self,
        pattern: &'static DetectionPattern,
        rank: usize,
        input: &str,
        input_language: f64,
        layer_deadline: Option<Instant>,
    ) -> Outcome {
        if !pattern.quick_filter(input) {
            return Outcome::Filtered;
        }

        let started = Instant::now();
        let budget_ms = self.config.validator_timeout_ms;
        let pattern_deadline = match (
            started.checked_add(Duration::from_millis(budget_ms)),
            layer_deadline,
        ) {
            (Some(own), Some(layer)) => Some(own.min(layer)),
            (own, layer) => own.or(layer),
        };
        let timed_out = |stage: String| {
            Outcome::Failed(DecodeError::TimeoutExceeded { stage, budget_ms })
        };

        if pattern.has_validator() {
            // Validators are single regex or table passes; they are checked on return
            let valid = pattern.validate(input);
            if pattern_deadline.is_some_and(|at| Instant::now() > at) {
                return timed_out(format!("{} validator", pattern.name));
            }
            if !valid {
                return Outcome::Rejected;
            }
        }

        let decoded = match pattern.decode_within(input, pattern_deadline) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => return Outcome::Rejected,
            Err(_) => return timed_out(format!("{} decoder", pattern.name)),
        };
        if decoded.bytes.is_empty() || decoded.bytes == input.as_bytes() {
            return Outcome::Rejected;
        }

        let mut warnings = decoded.notes;
        let (output, profile) = if pattern.terminal {
            // One-way: the output is a description, so score the input itself
            let entropy = char_entropy(input.trim());
            let profile = ScoreProfile {
                entropy,
                language_score: 0.0,
                is_valid_text: false,
                confidence: confidence(false, entropy, 0.0, true),
            };
            (String::from_utf8_lossy(&decoded.bytes).into_owned(), profile)
        } else {
            let profile = ScoreProfile::evaluate(&decoded.bytes, true);
            let output = match String::from_utf8(decoded.bytes) {
                Ok(text) => text,
                Err(err) => {
                    let bytes = err.into_bytes();
                    if let Some(signature) = sniff(&bytes) {
                        warnings.push(container_warning(signature));
                    }
                    warnings.push("Decoded bytes are not valid UTF-8; shown lossily".to_string());
                    String::from_utf8_lossy(&bytes).into_owned()
                },
            };
            (output, profile)
        };

        if pattern.gate == OutputGate::LanguageGain
            && !self.passes_language_gate(&output, &profile, input_language)
        {
            return Outcome::Rejected;
        }
        if profile.entropy > NOISE_ENTROPY {
            warnings.push(format!(
                "Entropy unusually high ({:.2} bits/symbol); output may be binary or encrypted",
                profile.entropy
            ));
        }

        Outcome::Accepted(Candidate {
            pattern,
            output,
            profile,
            warnings,
            rank,
        })
    }

    fn passes_language_gate(
        &self,
        output: &str,
        profile: &ScoreProfile,
        input_language: f64,
    ) -> bool {
        profile.is_valid_text
            && profile.language_score >= CLASSICAL_MIN_LANGUAGE
            && profile.language_score >= input_language + self.config.language_gain_epsilon
            && language_breakdown(output).word_hits > 0
    }
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternKind;

    fn sequential() -> Detector {
        Detector::new(DetectorConfig::default().with_parallel(false))
    }

    #[test]
    fn test_base64_vector() {
        let detection = Detector::default().detect("SGVsbG8gV29ybGQh");
        let best = detection.best().unwrap();
        assert_eq!(best.pattern.kind, PatternKind::Base64);
        assert_eq!(best.output, "Hello World!");
        assert!(best.confidence() >= 70.0);
    }

    #[test]
    fn test_rot13_vector() {
        let detection = Detector::default().detect("Uryyb Jbeyq");
        let best = detection.best().unwrap();
        assert_eq!(best.pattern.kind, PatternKind::Rot13);
        assert_eq!(best.output, "Hello World");
    }

    #[test]
    fn test_candidates_sorted_and_distinct_from_input() {
        let input = "48656c6c6f20576f726c64";
        let detection = Detector::default().detect(input);
        assert_eq!(detection.best().unwrap().pattern.kind, PatternKind::Hex);
        assert!(detection
            .candidates
            .windows(2)
            .all(|w| w[0].confidence() >= w[1].confidence()));
        assert!(detection.candidates.iter().all(|c| c.output != input));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        for input in ["SGVsbG8gV29ybGQh", "Uryyb Jbeyq", "68656c6c6f", "%48%69 there"] {
            let par = Detector::default().detect(input);
            let seq = sequential().detect(input);
            let names = |d: &Detection| {
                d.candidates
                    .iter()
                    .map(|c| (c.pattern.name, c.output.clone()))
                    .collect::<Vec<_>>()
            };
            assert_eq!(names(&par), names(&seq), "{input}");
        }
    }

    #[test]
    fn test_hash_is_identified_not_decoded() {
        let digest = "5d41402abc4b2a76b9719d911017c592";
        let best = Detector::default().detect(digest).best().cloned().unwrap();
        assert_eq!(best.pattern.kind, PatternKind::HashSignature);
        assert!(best.output.starts_with("MD5"));
        assert!(best.pattern.terminal);
    }

    #[test]
    fn test_gate_rejects_unreadable_rotations() {
        let detection = Detector::default().detect("Hello World");
        assert!(detection
            .candidates
            .iter()
            .all(|c| c.pattern.gate == OutputGate::None));
    }

    #[test]
    fn test_language_gate_requires_readable_output() {
        let detector = Detector::default();
        let profile = |language_score, is_valid_text| ScoreProfile {
            entropy: 4.0,
            language_score,
            is_valid_text,
            confidence: 80.0,
        };
        let sentence = "Meet me at the old bridge";
        assert!(detector.passes_language_gate(sentence, &profile(90.0, true), 0.0));
        // No common word
        assert!(!detector.passes_language_gate("Qwrtp Zxcvb", &profile(90.0, true), 0.0));
        // Below the absolute floor even with a large gain
        assert!(!detector.passes_language_gate(sentence, &profile(45.0, true), 0.0));
        assert!(!detector.passes_language_gate(sentence, &profile(90.0, false), 0.0));
        // Gain over the input is still required
        assert!(!detector.passes_language_gate(sentence, &profile(90.0, true), 85.0));
    }

    #[test]
    fn test_invalid_text_input_has_no_candidates() {
        for input in ["Uryyb\u{FFFD}Jbeyq\u{FFFD}", "\u{1}\u{2}\u{3}\u{4}Wkh txlfn"] {
            let detection = Detector::default().detect(input);
            assert!(detection.is_empty(), "{input:?}");
            assert_eq!(detection.patterns_tried, 0);
            assert!(detection.warnings.is_empty());
        }
    }

    #[test]
    fn test_caesar_search_stops_at_deadline() {
        let detector = Detector::new(
            DetectorConfig::default()
                .with_parallel(false)
                .with_validator_timeout_ms(0),
        );
        let detection = detector.detect("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj");
        assert!(detection.warnings.iter().any(|w| w.contains("Caesar decoder")));
        assert!(detection
            .candidates
            .iter()
            .all(|c| c.pattern.kind != PatternKind::Caesar));
    }

    #[test]
    fn test_empty_input() {
        let detection = Detector::default().detect("");
        assert!(detection.is_empty());
        assert!(detection.warnings.is_empty());
    }

    #[test]
    fn test_container_warning_on_gzip() {
        // base64 of 1f 8b 08 00 00 00 00 00 00 03
        let best = Detector::default().detect("H4sIAAAAAAAAAw==").best().cloned().unwrap();
        assert_eq!(best.pattern.kind, PatternKind::Base64);
        assert!(best.warnings.iter().any(|w| w.contains("gzip")));
        assert!(!best.profile.is_valid_text);
    }

    #[test]
    fn test_zero_layer_budget_times_out_every_pattern() {
        let detector = Detector::new(DetectorConfig::default().with_layer_timeout_ms(0));
        let detection = detector.detect("SGVsbG8gV29ybGQh");
        // The deadline may pass mid-round; whatever ran must still be sound
        assert!(detection.candidates.len() + detection.warnings.len() <= PATTERNS.len());
    }

    #[test]
    fn test_truncation() {
        let result = DecodingResult::plain_text("abcdef").truncated(3);
        assert_eq!(result.result, "abc");
        assert!(result.warnings.iter().any(|w| w.contains("truncated")));
        assert_eq!(result.steps, vec!["Plain Text".to_string()]);
    }
}
