//! Multi-Layer Recursive Decoder.
//!
//! An explicit loop over the Single-Layer Detector, feeding each layer's
//! output back in as the next layer's input. The chain is an owned vector of
//! [`LayerAnalysis`] records; depth is bounded structurally by `max_depth`.
//!
//! # Stopping rules
//!
//! A round's best candidate is appended only if all of these hold:
//!
//! | Rule                         | Stop reason                 |
//! |------------------------------|-----------------------------|
//! | some pattern matched         | [`StopReason::NoCandidate`] |
//! | pattern is not one-way       | [`StopReason::Terminal`]    |
//! | confidence ≥ `min_confidence`| [`StopReason::LowConfidence`] |
//! | output ≥ `min_layer_bytes`   | [`StopReason::TooShort`]    |
//! | name differs from last layer | [`StopReason::Cycle`]       |
//! | the layer made progress      | [`StopReason::NoProgress`]  |
//!
//! Progress is an entropy drop of `entropy_epsilon` or a language score gain
//! of `language_gain_epsilon`. Decoders without an output gate also progress
//! when they shrink the content to at most [`SHRINK_RATIO`] of its length and
//! the result is still valid text: Hex over Base64 raises entropy while
//! peeling a real layer. Classical layers never progress from content that is
//! not valid text.
//!
//! A layer whose language score exceeds `readable_stop_score` is appended and
//! ends the chain ([`StopReason::Readable`]).
//!
//! # Example
//!
//! ```
//! use decodex::multilayer::MultiLayerDecoder;
//!
//! // Base64(ROT13("Hello World"))
//! let chain = MultiLayerDecoder::default().decode("VXJ5eWIgSmJleXE=");
//! assert_eq!(chain.steps(), vec!["Base64", "ROT13"]);
//! assert_eq!(chain.final_content(), Some("Hello World"));
//! ```

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::detector::{DecodingResult, Detector};
use crate::patterns::OutputGate;
use crate::scoring::ScoreProfile;

/// Largest output/input length ratio that counts as peeling a layer
pub const SHRINK_RATIO: f64 = 0.8;

/// One accepted step inside a chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerAnalysis {
    /// 1-based layer number, strictly increasing
    pub depth: usize,
    /// Pattern applied at this layer
    pub encoding: String,
    /// Scores of this layer's output
    pub score_profile: ScoreProfile,
    /// Output of this layer
    pub decoded_content: String,
    /// Output size in bytes
    pub byte_size: usize,
}

/// Why a chain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No pattern accepted the current content
    NoCandidate,
    /// Best candidate below `min_confidence`
    LowConfidence,
    /// Neither entropy nor language score improved
    NoProgress,
    /// Readable content reached
    Readable,
    /// Same encoding twice in a row
    Cycle,
    /// Output shorter than `min_layer_bytes`
    TooShort,
    /// `max_depth` layers accepted
    MaxDepth,
    /// Content identified by a one-way pattern (hash)
    Terminal,
}

impl StopReason {
    /// Human-readable reason
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::NoCandidate => "no further encoding detected",
            StopReason::LowConfidence => "next layer below confidence threshold",
            StopReason::NoProgress => "next layer did not reduce entropy or improve readability",
            StopReason::Readable => "readable content reached",
            StopReason::Cycle => "same encoding repeated",
            StopReason::TooShort => "next layer too short",
            StopReason::MaxDepth => "maximum depth reached",
            StopReason::Terminal => "content is a one-way hash",
        }
    }
}

/// Result of a multi-layer decode
#[derive(Debug, Clone, Serialize)]
pub struct LayerChain {
    /// Accepted layers, outermost first
    pub layers: Vec<LayerAnalysis>,
    /// Why decoding stopped
    pub stop_reason: StopReason,
    /// Identification that ended the chain, if one-way
    pub terminal: Option<String>,
    /// Skipped patterns and layer timeouts
    pub warnings: Vec<String>,
}

impl LayerChain {
    /// Number of accepted layers
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Pattern names in application order
    pub fn steps(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.encoding.as_str()).collect()
    }

    /// Output of the innermost layer
    pub fn final_content(&self) -> Option<&str> {
        self.layers.last().map(|l| l.decoded_content.as_str())
    }

    /// Exponentially weighted mean of layer confidences (weight 2^i,
    /// deeper layers count more)
    pub fn confidence(&self) -> f64 {
        let (weighted, total) = self.layers.iter().enumerate().fold(
            (0.0, 0.0),
            |(weighted, total), (i, layer)| {
                let weight = 2f64.powi(i as i32);
                (
                    weighted + weight * layer.score_profile.confidence,
                    total + weight,
                )
            },
        );
        if total == 0.0 {
            0.0
        } else {
            (weighted / total).clamp(0.0, 100.0)
        }
    }

    /// Chain as a single result named "Multi-Layer"; `None` for an empty chain
    pub fn to_result(&self, max_display_chars: usize) -> Option<DecodingResult> {
        let last = self.layers.last()?;
        let profile = last.score_profile.with_confidence(self.confidence());
        let mut result = DecodingResult::new("Multi-Layer", last.decoded_content.clone(), profile);
        result.steps = self.layers.iter().map(|l| l.encoding.clone()).collect();
        if let Some(identified) = &self.terminal {
            result.warnings.push(format!("Final content identified as {identified}"));
        }
        result.warnings.extend(self.warnings.iter().cloned());
        Some(result.truncated(max_display_chars))
    }
}

/// Depth-bounded recursive decoder
#[derive(Debug, Clone, Default)]
pub struct MultiLayerDecoder {
    detector: Detector,
}

impl MultiLayerDecoder {
    /// Create a decoder
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            detector: Detector::new(config),
        }
    }

    /// Decoder settings
    pub fn config(&self) -> &DetectorConfig {
        self.detector.config()
    }

    /// Peel layers off `input` until a stopping rule fires
    pub fn decode(&self, input: &str) -> LayerChain {
        let config = self.detector.config();
        let mut chain = LayerChain {
            layers: Vec::new(),
            stop_reason: StopReason::MaxDepth,
            terminal: None,
            warnings: Vec::new(),
        };

        let mut current = input.to_string();
        let mut previous = ScoreProfile::of_text(input, false);

        while chain.layers.len() < config.max_depth {
            let depth = chain.layers.len();
            let started = Instant::now();
            let detection = self.detector.detect_with_hints(&current, depth);
            for warning in detection.warnings.iter() {
                if !chain.warnings.contains(warning) {
                    chain.warnings.push(warning.clone());
                }
            }
            if started.elapsed().as_millis() as u64 > config.layer_timeout_ms {
                chain.warnings.push(format!(
                    "Layer {} exceeded its {} ms budget; remaining patterns skipped",
                    depth + 1,
                    config.layer_timeout_ms
                ));
            }

            let Some(best) = detection.best() else {
                chain.stop_reason = StopReason::NoCandidate;
                break;
            };

            let stop = if best.pattern.terminal {
                chain.terminal = Some(best.output.clone());
                Some(StopReason::Terminal)
            } else if best.confidence() < config.min_confidence {
                Some(StopReason::LowConfidence)
            } else if best.output.len() < config.min_layer_bytes {
                Some(StopReason::TooShort)
            } else if chain.layers.last().map(|l| l.encoding.as_str()) == Some(best.pattern.name) {
                Some(StopReason::Cycle)
            } else if !made_progress(
                config,
                &previous,
                current.len(),
                best.pattern.gate,
                &best.profile,
                best.output.len(),
            ) {
                Some(StopReason::NoProgress)
            } else {
                None
            };
            if let Some(reason) = stop {
                debug!(
                    depth,
                    candidate = best.pattern.name,
                    reason = reason.describe(),
                    "chain stopped"
                );
                chain.stop_reason = reason;
                break;
            }

            debug!(
                depth = depth + 1,
                encoding = best.pattern.name,
                confidence = best.confidence(),
                "layer accepted"
            );
            chain.layers.push(LayerAnalysis {
                depth: depth + 1,
                encoding: best.pattern.name.to_string(),
                score_profile: best.profile,
                decoded_content: best.output.clone(),
                byte_size: best.output.len(),
            });

            if best.profile.language_score > config.readable_stop_score {
                chain.stop_reason = StopReason::Readable;
                break;
            }
            previous = best.profile;
            current = best.output.clone();
        }

        info!(
            layers = chain.layers.len(),
            reason = chain.stop_reason.describe(),
            "multi-layer decode finished"
        );
        chain
    }
}

/// Whether a candidate layer improves on the content it was decoded from
fn made_progress(
    config: &DetectorConfig,
    previous: &ScoreProfile,
    previous_len: usize,
    gate: OutputGate,
    next: &ScoreProfile,
    next_len: usize,
) -> bool {
    if gate == OutputGate::LanguageGain && !previous.is_valid_text {
        return false;
    }
    let entropy_dropped = previous.entropy - next.entropy >= config.entropy_epsilon;
    let language_gained =
        next.language_score - previous.language_score >= config.language_gain_epsilon;
    let shrank_to_text = gate == OutputGate::None
        && next.is_valid_text
        && (next_len as f64) <= SHRINK_RATIO * previous_len as f64;
    entropy_dropped || language_gained || shrank_to_text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{PatternKind, PatternRegistry};

    fn encode(kind: PatternKind, text: &str) -> String {
        PatternRegistry::global()
            .by_kind(kind)
            .encode(text.as_bytes())
            .unwrap()
    }

    #[test]
    fn test_base64_over_rot13() {
        let input = encode(PatternKind::Base64, &encode(PatternKind::Rot13, "Hello World"));
        assert_eq!(input, "VXJ5eWIgSmJleXE=");

        let chain = MultiLayerDecoder::default().decode(&input);
        assert_eq!(chain.steps(), vec!["Base64", "ROT13"]);
        assert_eq!(chain.final_content(), Some("Hello World"));
        assert_eq!(chain.layers[0].depth, 1);
        assert_eq!(chain.layers[1].depth, 2);
        assert!(chain.confidence() >= 70.0);
    }

    #[test]
    fn test_depths_strictly_increase_and_no_repeats() {
        let sentence = "Meet me at the old bridge after the rain stops tonight";
        let input = encode(
            PatternKind::Base64,
            &encode(PatternKind::UrlEncoding, sentence),
        );
        let chain = MultiLayerDecoder::default().decode(&input);
        assert_eq!(chain.steps(), vec!["Base64", "URL Encoding"]);
        assert_eq!(chain.final_content(), Some(sentence));
        assert_eq!(chain.stop_reason, StopReason::Readable);
        assert!(chain.layers.windows(2).all(|w| w[0].depth < w[1].depth));
        assert!(chain.layers.windows(2).all(|w| w[0].encoding != w[1].encoding));
    }

    #[test]
    fn test_hex_over_base64_peels_both_layers() {
        // The hex layer raises entropy but halves the content
        let sentence = "Meet me at the old bridge after the rain stops tonight";
        let input = encode(PatternKind::Hex, &encode(PatternKind::Base64, sentence));
        let chain = MultiLayerDecoder::default().decode(&input);
        assert_eq!(chain.steps(), vec!["Hexadecimal", "Base64"]);
        assert_eq!(chain.final_content(), Some(sentence));
        assert_eq!(chain.stop_reason, StopReason::Readable);
        assert!(chain.layers[0].score_profile.entropy > ScoreProfile::of_text(&input, false).entropy);
    }

    #[test]
    fn test_double_base64_stops_at_cycle_guard() {
        let pangram = "The quick brown fox jumps over the lazy dog";
        let once = encode(PatternKind::Base64, pangram);
        let input = encode(PatternKind::Base64, &once);
        let chain = MultiLayerDecoder::default().decode(&input);
        assert_eq!(chain.steps(), vec!["Base64"]);
        assert_eq!(chain.final_content(), Some(once.as_str()));
        assert_eq!(chain.stop_reason, StopReason::Cycle);
    }

    #[test]
    fn test_progress_rules() {
        let config = DetectorConfig::default();
        let profile = |entropy, language_score, is_valid_text| ScoreProfile {
            entropy,
            language_score,
            is_valid_text,
            confidence: 90.0,
        };
        let encoded = profile(4.9, 10.0, true);
        let noise = profile(7.0, 0.0, false);
        let (plain, classical) = (OutputGate::None, OutputGate::LanguageGain);

        // Entropy drop alone
        let lower = profile(4.2, 12.0, true);
        assert!(made_progress(&config, &encoded, 60, plain, &lower, 60));
        // Language gain alone
        let readable = profile(5.0, 40.0, true);
        assert!(made_progress(&config, &encoded, 60, plain, &readable, 60));

        // Shrinking into valid text, but not into bytes that are not text
        let shrunk = profile(5.2, 10.0, true);
        let binary = profile(5.2, 10.0, false);
        assert!(made_progress(&config, &encoded, 100, plain, &shrunk, 50));
        assert!(!made_progress(&config, &encoded, 100, plain, &binary, 50));
        assert!(!made_progress(&config, &encoded, 100, plain, &shrunk, 90));
        // Classical layers cannot progress by length
        assert!(!made_progress(&config, &encoded, 100, classical, &shrunk, 50));

        // Nor at all from content that is not text
        let english = profile(4.0, 60.0, true);
        assert!(!made_progress(&config, &noise, 60, classical, &english, 60));
        assert!(made_progress(&config, &noise, 60, plain, &english, 60));
    }

    #[test]
    fn test_max_depth_bounds_chain() {
        let input = encode(PatternKind::Base64, &encode(PatternKind::Rot13, "Hello World"));
        let decoder = MultiLayerDecoder::new(DetectorConfig::default().with_max_depth(1));
        let chain = decoder.decode(&input);
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.stop_reason, StopReason::MaxDepth);
    }

    #[test]
    fn test_plain_text_has_no_layers() {
        let chain = MultiLayerDecoder::default().decode("Hello World");
        assert_eq!(chain.depth(), 0);
        assert!(chain.to_result(100).is_none());
        assert_eq!(chain.confidence(), 0.0);
    }

    #[test]
    fn test_hash_ends_chain() {
        let chain = MultiLayerDecoder::default().decode("5d41402abc4b2a76b9719d911017c592");
        assert_eq!(chain.depth(), 0);
        assert_eq!(chain.stop_reason, StopReason::Terminal);
        assert!(chain.terminal.as_deref().unwrap().starts_with("MD5"));
    }

    #[test]
    fn test_chain_confidence_favors_deeper_layers() {
        let layer = |depth, confidence| LayerAnalysis {
            depth,
            encoding: format!("L{depth}"),
            score_profile: ScoreProfile::of_text("x", false).with_confidence(confidence),
            decoded_content: String::new(),
            byte_size: 0,
        };
        let chain = LayerChain {
            layers: vec![layer(1, 40.0), layer(2, 100.0)],
            stop_reason: StopReason::NoCandidate,
            terminal: None,
            warnings: Vec::new(),
        };
        // (1*40 + 2*100) / 3
        assert!((chain.confidence() - 80.0).abs() < 1e-9);
        let result = chain.to_result(100).unwrap();
        assert_eq!(result.kind, "Multi-Layer");
        assert_eq!(result.steps, vec!["L1".to_string(), "L2".to_string()]);
    }
}
