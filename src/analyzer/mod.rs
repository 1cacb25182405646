//! Entry points.
//!
//! [`Analyzer`] owns one configuration and exposes everything a front end
//! needs:
//!
//! | Method                     | Returns                        |
//! |----------------------------|--------------------------------|
//! | [`Analyzer::detect`]       | best match, alternatives, input statistics, layers |
//! | [`Analyzer::detect_cached`]| same, through a caller-owned [`AnalysisCache`] |
//! | [`Analyzer::cross_check`]  | ensemble result with consensus |
//! | [`Analyzer::analyze_cipher`] | classical cipher candidates  |
//! | [`Analyzer::analyze_hash`] | hash identifications           |
//!
//! Only the size pre-checks fail a call. Everything that goes wrong inside
//! detection becomes a warning on the result.
//!
//! # Example
//!
//! ```
//! use decodex::Analyzer;
//!
//! let analyzer = Analyzer::default();
//! let result = analyzer.detect("SGVsbG8gV29ybGQh").unwrap();
//! assert_eq!(result.best_match.kind, "Base64");
//! assert_eq!(result.best_match.result, "Hello World!");
//! ```

mod chunk;

pub use chunk::{prescan, split_chunks};

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::AnalysisCache;
use crate::cipher::{CipherAnalysis, CipherBreaker};
use crate::config::Config;
use crate::detector::{content_hints, prioritized, DecodingResult, Detector};
use crate::ensemble::{CrossCheckResult, CrossChecker};
use crate::error::{DecodeError, Result};
use crate::hash::{HashAnalysis, HashIdentifier};
use crate::multilayer::{LayerAnalysis, MultiLayerDecoder, StopReason};
use crate::patterns::{PatternKind, PatternRegistry};
use crate::scoring::{char_entropy, index_of_coincidence, language_score};

/// Coarse alphabet of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharsetClass {
    /// No characters
    Empty,
    /// Only 0 and 1 (and spaces)
    Binary,
    /// Only hex digits
    Hex,
    /// Only decimal digits and separators
    Numeric,
    /// Base64 alphabet with padding
    Base64,
    /// Letters and whitespace
    Alphabetic,
    /// Printable ASCII
    Ascii,
    /// Non-ASCII text
    Unicode,
    /// Contains control characters
    Control,
}

impl CharsetClass {
    /// Classify a text
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return CharsetClass::Empty;
        }
        let all = |f: fn(char) -> bool| text.chars().all(f);
        if all(|c| matches!(c, '0' | '1' | ' ')) {
            CharsetClass::Binary
        } else if all(|c| c.is_ascii_digit() || matches!(c, ' ' | ',' | ';')) {
            CharsetClass::Numeric
        } else if all(|c| c.is_ascii_hexdigit()) {
            CharsetClass::Hex
        } else if all(|c| c.is_ascii_alphabetic() || c.is_whitespace()) {
            CharsetClass::Alphabetic
        } else if all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')) {
            CharsetClass::Base64
        } else if text.chars().any(|c| c.is_control() && !c.is_whitespace()) {
            CharsetClass::Control
        } else if text.is_ascii() {
            CharsetClass::Ascii
        } else {
            CharsetClass::Unicode
        }
    }
}

/// Statistics of the raw input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAnalysis {
    /// Length in bytes
    pub length: usize,
    /// Length in characters
    pub char_count: usize,
    /// Shannon entropy (bits/char)
    pub entropy: f64,
    /// Language score (0-100)
    pub language_score: f64,
    /// Index of coincidence over letters
    pub index_of_coincidence: f64,
    /// Alphabet class
    pub charset: CharsetClass,
    /// No control characters other than whitespace
    pub printable: bool,
    /// Pattern names suggested by content hints and the chunk pre-scan
    pub likely_encodings: Vec<String>,
}

/// Outcome of [`Analyzer::detect`]
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Highest-confidence interpretation
    pub best_match: DecodingResult,
    /// Other interpretations, best first
    pub alternatives: Vec<DecodingResult>,
    /// Input statistics
    pub input_analysis: InputAnalysis,
    /// Multi-layer chain (empty in single-layer mode)
    pub layers: Vec<LayerAnalysis>,
    /// Why the chain stopped, in multi-layer mode
    pub stop_reason: Option<StopReason>,
    /// Skipped patterns, timeouts and other caveats
    pub warnings: Vec<String>,
}

/// Progress milestones reported by [`Analyzer::detect_with_progress`]
pub mod milestone {
    /// Size checks
    pub const VALIDATING: (u8, &str) = (5, "Validating input");
    /// Input statistics and pre-scan
    pub const SCANNING: (u8, &str) = (20, "Scanning input");
    /// Pattern matching and chaining
    pub const DECODING: (u8, &str) = (50, "Decoding");
    /// Ranking and formatting
    pub const FINALIZING: (u8, &str) = (90, "Finalizing");
    /// Done
    pub const COMPLETE: (u8, &str) = (100, "Complete");
}

/// Front door to detection, cross-checking and cryptanalysis
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
    multi_layer: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Analyzer {
    /// Create an analyzer (multi-layer decoding on)
    pub fn new(config: Config) -> Self {
        Self {
            config,
            multi_layer: true,
        }
    }

    /// Enable or disable multi-layer decoding
    pub fn with_multi_layer(mut self, enabled: bool) -> Self {
        self.multi_layer = enabled;
        self
    }

    /// Set the maximum chain depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.detector = self.config.detector.with_max_depth(depth);
        self
    }

    /// Set the minimum layer confidence
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.config.detector = self.config.detector.with_min_confidence(confidence);
        self
    }

    /// Set the maximum input size
    pub fn with_max_input_size(mut self, bytes: usize) -> Self {
        self.config.detector = self.config.detector.with_max_input_size(bytes);
        self
    }

    /// Enable or disable parallel fan-out
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.config.detector = self.config.detector.with_parallel(enabled);
        self
    }

    /// Enable or disable the chunk pre-scan
    pub fn with_chunking(mut self, enabled: bool, chunk_size: usize) -> Self {
        self.config.detector = self.config.detector.with_chunking(enabled, chunk_size);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether multi-layer decoding is on
    pub fn multi_layer(&self) -> bool {
        self.multi_layer
    }

    /// Reject inputs over the configured limits
    pub fn check_input(&self, input: &str) -> Result<()> {
        let detector = &self.config.detector;
        let size = input.len();
        if size > detector.hard_size_ceiling {
            return Err(DecodeError::SecurityRejected(format!(
                "input of {size} bytes exceeds the hard ceiling of {} bytes",
                detector.hard_size_ceiling
            )));
        }
        if size > detector.max_input_size {
            return Err(DecodeError::InputTooLarge {
                size,
                limit: detector.max_input_size,
            });
        }
        Ok(())
    }

    /// Detect the encoding of `input`
    pub fn detect(&self, input: &str) -> Result<AnalysisResult> {
        self.detect_with_progress(input, |_, _| {})
    }

    /// Raw bytes: UTF-8 is analyzed as text, anything else lossily with a warning
    pub fn detect_bytes(&self, bytes: &[u8]) -> Result<AnalysisResult> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.detect(text),
            Err(_) => {
                let text = String::from_utf8_lossy(bytes);
                let mut result = self.detect(&text)?;
                result
                    .warnings
                    .push("Input is not valid UTF-8; invalid sequences were replaced".to_string());
                Ok(result)
            },
        }
    }

    /// [`detect`](Self::detect), reporting `(percent, status)` at coarse milestones
    pub fn detect_with_progress<F>(&self, input: &str, mut progress: F) -> Result<AnalysisResult>
    where
        F: FnMut(u8, &str),
    {
        let detector_config = &self.config.detector;

        report(&mut progress, milestone::VALIDATING);
        self.check_input(input)?;

        report(&mut progress, milestone::SCANNING);
        let (input_analysis, hints) = self.scan(input);

        report(&mut progress, milestone::DECODING);
        let detector = Detector::new(detector_config.clone());
        let detection = detector.detect_ordered(input, &prioritized(&hints));
        let mut warnings = detection.warnings.clone();

        let max_chars = detector_config.max_display_chars;
        let mut ranked: Vec<DecodingResult> = detection
            .candidates
            .iter()
            .map(|c| c.to_result(max_chars))
            .collect();

        let mut layers = Vec::new();
        let mut stop_reason = None;
        if self.multi_layer {
            let chain = MultiLayerDecoder::new(detector_config.clone()).decode(input);
            for warning in &chain.warnings {
                if !warnings.contains(warning) {
                    warnings.push(warning.clone());
                }
            }
            if chain.depth() >= 2 {
                if let Some(result) = chain.to_result(max_chars) {
                    ranked.insert(0, result);
                }
            }
            stop_reason = Some(chain.stop_reason);
            layers = chain.layers;
        }

        report(&mut progress, milestone::FINALIZING);
        let mut ranked = ranked.into_iter();
        let best_match = ranked
            .next()
            .unwrap_or_else(|| DecodingResult::plain_text(input).truncated(max_chars));
        let alternatives: Vec<DecodingResult> =
            ranked.take(detector_config.max_alternatives).collect();

        info!(
            best = %best_match.kind,
            confidence = best_match.confidence,
            alternatives = alternatives.len(),
            layers = layers.len(),
            "detection complete"
        );
        report(&mut progress, milestone::COMPLETE);

        Ok(AnalysisResult {
            best_match,
            alternatives,
            input_analysis,
            layers,
            stop_reason,
            warnings,
        })
    }

    /// [`detect`](Self::detect) through a caller-owned cache
    pub fn detect_cached(&self, input: &str, cache: &mut AnalysisCache) -> Result<AnalysisResult> {
        self.check_input(input)?;
        let options = self.options_fingerprint();
        if let Some(hit) = cache.get(input, options) {
            return Ok(hit);
        }
        let result = self.detect(input)?;
        cache.insert(input, options, result.clone());
        Ok(result)
    }

    /// Run the cross-check ensemble
    pub fn cross_check(&self, input: &str) -> Result<CrossCheckResult> {
        self.check_input(input)?;
        Ok(CrossChecker::new(&self.config).cross_check(input))
    }

    /// Classical cipher candidates, best first
    pub fn analyze_cipher(&self, input: &str) -> Result<Vec<CipherAnalysis>> {
        self.check_input(input)?;
        Ok(CipherBreaker::new(self.config.cipher.clone()).analyze(input))
    }

    /// Hash identifications, best first
    pub fn analyze_hash(&self, input: &str) -> Result<Vec<HashAnalysis>> {
        self.check_input(input)?;
        Ok(HashIdentifier::new(self.config.hash.clone()).identify(input))
    }

    /// Input statistics without decoding
    pub fn analyze_input(&self, input: &str) -> InputAnalysis {
        self.scan(input).0
    }

    fn scan(&self, input: &str) -> (InputAnalysis, Vec<PatternKind>) {
        let detector = &self.config.detector;
        let mut hints = content_hints(input, 0);
        if detector.enable_chunking && input.len() > detector.chunk_size {
            let chunked = prescan(input, detector.chunk_size, detector.enable_parallel);
            debug!(hinted = chunked.len(), "chunk pre-scan");
            for kind in chunked {
                if !hints.contains(&kind) {
                    hints.push(kind);
                }
            }
        }

        let registry = PatternRegistry::global();
        let analysis = InputAnalysis {
            length: input.len(),
            char_count: input.chars().count(),
            entropy: char_entropy(input),
            language_score: language_score(input),
            index_of_coincidence: index_of_coincidence(input),
            charset: CharsetClass::classify(input),
            printable: !input.chars().any(|c| c.is_control() && !c.is_whitespace()),
            likely_encodings: hints
                .iter()
                .map(|&kind| registry.by_kind(kind).name.to_string())
                .collect(),
        };
        (analysis, hints)
    }

    fn options_fingerprint(&self) -> u32 {
        let encoded = serde_json::to_vec(&self.config).unwrap_or_default();
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&encoded);
        hasher.update(&[u8::from(self.multi_layer)]);
        hasher.finalize()
    }
}

fn report<F: FnMut(u8, &str)>(progress: &mut F, (percent, status): (u8, &'static str)) {
    progress(percent, status);
}
