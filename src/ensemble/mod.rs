//! Cross-Check Ensemble.
//!
//! Fans one input out to several independent [`Strategy`] implementations,
//! merges what they produce and rates how much they agree. The ensemble
//! decodes nothing itself.
//!
//! | Strategy     | Acceptance                                                 |
//! |--------------|------------------------------------------------------------|
//! | `Registry`   | Single-Layer Detector: filters, validators, output gates   |
//! | `Heuristic`  | Filters + decode only; output judged by entropy and text statistics |
//! | `MultiLayer` | Chains of two or more layers                               |
//! | `Cipher`     | Classical cryptanalysis above the cipher `min_score`       |
//! | `Hash`       | Hash-format identification                                 |
//!
//! A strategy that panics is dropped from `strategies_used` and reported in
//! `warnings`; the others still run.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cipher::CipherBreaker;
use crate::config::Config;
use crate::detector::{panic_message, DecodingResult, Detector};
use crate::hash::HashIdentifier;
use crate::multilayer::MultiLayerDecoder;
use crate::patterns::PATTERNS;
use crate::scoring::{char_entropy, confidence, ScoreProfile};

/// Qualitative agreement between strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Consensus {
    /// More than three distinct candidates
    Strong,
    /// Two or three distinct candidates
    Moderate,
    /// At most one candidate
    Weak,
}

impl Consensus {
    /// Rate a number of distinct candidates
    pub fn from_distinct(count: usize) -> Self {
        match count {
            0 | 1 => Consensus::Weak,
            2 | 3 => Consensus::Moderate,
            _ => Consensus::Strong,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Consensus::Strong => "strong",
            Consensus::Moderate => "moderate",
            Consensus::Weak => "weak",
        }
    }
}

impl std::fmt::Display for Consensus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An independent way of producing candidates
pub trait Strategy: Send + Sync {
    /// Name reported in `strategies_used`
    fn name(&self) -> &'static str;

    /// Candidates for `input`, in any order
    fn run(&self, input: &str) -> Vec<DecodingResult>;
}

/// Registry matching through the Single-Layer Detector
pub struct RegistryStrategy {
    detector: Detector,
}

impl Strategy for RegistryStrategy {
    fn name(&self) -> &'static str {
        "Registry"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        let max_chars = self.detector.config().max_display_chars;
        self.detector
            .detect(input)
            .candidates
            .iter()
            .map(|c| c.to_result(max_chars))
            .collect()
    }
}

/// Validator-free matching judged by output statistics alone
pub struct HeuristicStrategy {
    entropy_epsilon: f64,
    max_display_chars: usize,
}

/// Language score that counts as readable without an entropy drop
const HEURISTIC_MIN_LANGUAGE: f64 = 30.0;

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "Heuristic"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        let input_entropy = char_entropy(input);
        PATTERNS
            .iter()
            .filter(|p| !p.terminal && p.quick_filter(input))
            .filter_map(|pattern| {
                let decoded = pattern.decode(input)?;
                let text = String::from_utf8(decoded.bytes).ok()?;
                if text == input {
                    return None;
                }
                let measured = ScoreProfile::of_text(&text, false);
                let entropy_dropped = input_entropy - measured.entropy >= self.entropy_epsilon;
                if !measured.is_valid_text
                    || !(entropy_dropped || measured.language_score >= HEURISTIC_MIN_LANGUAGE)
                {
                    return None;
                }
                // No validator ran, so no pattern-match credit
                let profile = measured.with_confidence(confidence(
                    measured.is_valid_text,
                    measured.entropy,
                    measured.language_score,
                    false,
                ));
                Some(DecodingResult::new(pattern.name, text, profile).truncated(self.max_display_chars))
            })
            .collect()
    }
}

/// Multi-layer chains of depth two or more
pub struct MultiLayerStrategy {
    decoder: MultiLayerDecoder,
}

impl Strategy for MultiLayerStrategy {
    fn name(&self) -> &'static str {
        "MultiLayer"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        let chain = self.decoder.decode(input);
        if chain.depth() < 2 {
            return Vec::new();
        }
        chain
            .to_result(self.decoder.config().max_display_chars)
            .into_iter()
            .collect()
    }
}

/// Classical cryptanalysis
pub struct CipherStrategy {
    breaker: CipherBreaker,
}

impl Strategy for CipherStrategy {
    fn name(&self) -> &'static str {
        "Cipher"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        self.breaker
            .analyze(input)
            .into_iter()
            .map(|analysis| {
                let profile =
                    ScoreProfile::of_text(&analysis.plaintext, true).with_confidence(analysis.confidence);
                DecodingResult::new(analysis.cipher_type.name(), analysis.plaintext, profile)
            })
            .collect()
    }
}

/// Hash identification
pub struct HashStrategy {
    identifier: HashIdentifier,
}

impl Strategy for HashStrategy {
    fn name(&self) -> &'static str {
        "Hash"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        let entropy = char_entropy(input.trim());
        self.identifier
            .identify(input)
            .into_iter()
            .map(|analysis| {
                let profile = ScoreProfile {
                    entropy,
                    language_score: 0.0,
                    is_valid_text: false,
                    confidence: analysis.confidence,
                };
                DecodingResult::new(
                    analysis.hash_type.clone(),
                    format!("{} hash (one-way, cannot be reversed)", analysis.hash_type),
                    profile,
                )
            })
            .collect()
    }
}

/// Merged output of all strategies
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheckResult {
    /// Highest-confidence candidate, or a plain-text fallback
    pub best_match: DecodingResult,
    /// Remaining candidates, best first
    pub alternatives: Vec<DecodingResult>,
    /// Strategies that completed, in registration order
    pub strategies_used: Vec<String>,
    /// Agreement rating
    pub consensus_strength: Consensus,
    /// Strategy failures
    pub warnings: Vec<String>,
}

/// Fan-out/merge over independent strategies
pub struct CrossChecker {
    strategies: Vec<Box<dyn Strategy>>,
    parallel: bool,
    max_alternatives: usize,
}

impl Default for CrossChecker {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl CrossChecker {
    /// Build the standard strategy set
    pub fn new(config: &Config) -> Self {
        let detector = &config.detector;
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(RegistryStrategy {
                detector: Detector::new(detector.clone()),
            }),
            Box::new(HeuristicStrategy {
                entropy_epsilon: detector.entropy_epsilon,
                max_display_chars: detector.max_display_chars,
            }),
            Box::new(MultiLayerStrategy {
                decoder: MultiLayerDecoder::new(detector.clone()),
            }),
            Box::new(CipherStrategy {
                breaker: CipherBreaker::new(config.cipher.clone()),
            }),
            Box::new(HashStrategy {
                identifier: HashIdentifier::new(config.hash.clone()),
            }),
        ];
        Self {
            strategies,
            parallel: detector.enable_parallel,
            max_alternatives: detector.max_alternatives,
        }
    }

    /// Add a strategy after the standard ones
    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the registered strategies
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run every strategy and merge
    pub fn cross_check(&self, input: &str) -> CrossCheckResult {
        let run = |strategy: &Box<dyn Strategy>| {
            let name = strategy.name();
            catch_unwind(AssertUnwindSafe(|| strategy.run(input)))
                .map_err(|panic| format!("Strategy {name} failed: {}", panic_message(panic.as_ref())))
        };
        let outcomes: Vec<Result<Vec<DecodingResult>, String>> = if self.parallel {
            self.strategies.par_iter().map(run).collect()
        } else {
            self.strategies.iter().map(run).collect()
        };

        let mut strategies_used = Vec::new();
        let mut warnings = Vec::new();
        let mut merged = Vec::new();
        for (strategy, outcome) in self.strategies.iter().zip(outcomes) {
            match outcome {
                Ok(results) => {
                    debug!(strategy = strategy.name(), candidates = results.len(), "strategy finished");
                    strategies_used.push(strategy.name().to_string());
                    merged.extend(results);
                },
                Err(message) => {
                    warn!(strategy = strategy.name(), %message, "strategy failed");
                    warnings.push(message);
                },
            }
        }

        // Stable: on equal confidence the earlier strategy wins
        merged.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut seen = HashSet::new();
        merged.retain(|r| seen.insert((r.kind.clone(), r.result.clone())));

        let consensus_strength = Consensus::from_distinct(merged.len());
        let mut ranked = merged.into_iter();
        let best_match = ranked
            .next()
            .unwrap_or_else(|| DecodingResult::plain_text(input));
        let alternatives = ranked.take(self.max_alternatives).collect();

        CrossCheckResult {
            best_match,
            alternatives,
            strategies_used,
            consensus_strength,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;

    struct Exploding;

    impl Strategy for Exploding {
        fn name(&self) -> &'static str {
            "Exploding"
        }

        fn run(&self, _input: &str) -> Vec<DecodingResult> {
            panic!("strategy blew up")
        }
    }

    #[test]
    fn test_consensus_thresholds() {
        assert_eq!(Consensus::from_distinct(0), Consensus::Weak);
        assert_eq!(Consensus::from_distinct(1), Consensus::Weak);
        assert_eq!(Consensus::from_distinct(2), Consensus::Moderate);
        assert_eq!(Consensus::from_distinct(3), Consensus::Moderate);
        assert_eq!(Consensus::from_distinct(4), Consensus::Strong);
    }

    #[test]
    fn test_cross_check_base64() {
        let result = CrossChecker::default().cross_check("SGVsbG8gV29ybGQh");
        assert_eq!(result.best_match.result, "Hello World!");
        assert!(result.strategies_used.contains(&"Registry".to_string()));
        assert!(result.strategies_used.contains(&"Heuristic".to_string()));
        assert!(result
            .alternatives
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        assert!(result.alternatives.iter().all(|a| a.confidence <= result.best_match.confidence));
    }

    #[test]
    fn test_failing_strategy_is_isolated() {
        let checker = CrossChecker::default().with_strategy(Box::new(Exploding));
        let result = checker.cross_check("SGVsbG8gV29ybGQh");
        assert!(!result.strategies_used.contains(&"Exploding".to_string()));
        assert_eq!(result.strategies_used.len(), 5);
        assert!(result.warnings.iter().any(|w| w.contains("Exploding")));
        assert_eq!(result.best_match.result, "Hello World!");
    }

    #[test]
    fn test_no_duplicate_candidates() {
        let result = CrossChecker::default().cross_check("Uryyb Jbeyq");
        let mut all = vec![&result.best_match];
        all.extend(result.alternatives.iter());
        let keys: HashSet<(&str, &str)> = all
            .iter()
            .map(|r| (r.kind.as_str(), r.result.as_str()))
            .collect();
        assert_eq!(keys.len(), all.len());
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let mut sequential = Config::default();
        sequential.detector = DetectorConfig::default().with_parallel(false);
        let a = CrossChecker::new(&sequential).cross_check("68656c6c6f20776f726c64");
        let b = CrossChecker::default().cross_check("68656c6c6f20776f726c64");
        assert_eq!(a.best_match, b.best_match);
        assert_eq!(a.alternatives, b.alternatives);
        assert_eq!(a.strategies_used, b.strategies_used);
    }

    #[test]
    fn test_empty_input_falls_back() {
        let result = CrossChecker::default().cross_check("");
        assert_eq!(result.best_match.kind, "Plain Text");
        assert!(result.alternatives.is_empty());
        assert_eq!(result.consensus_strength, Consensus::Weak);
    }
}
