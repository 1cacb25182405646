//! # Decodex - Identify and Reverse Unknown Encodings
//!
//! Paste an unknown blob, get ranked hypotheses about how it was produced:
//! encodings are decoded, classical ciphers are broken by key search, and
//! hashes are identified (never reversed).
//!
//! ## Features
//!
//! - **Pattern registry**: 21 numbered detectors, most specific first
//! - **Scoring library**: entropy, index of coincidence, language score, one composite confidence
//! - **Multi-layer decoding**: peels nested encodings with explicit stopping rules
//! - **Cross-check ensemble**: independent strategies merged into a consensus
//! - **Cryptanalysis**: Caesar, ROT-N, Atbash, Vigenère, substitution, columnar, rail fence
//! - **Hash recognition**: 70+ digest and crypt formats with security guidance
//!
//! ## Architecture
//!
//! ```text
//! input ──▶ scoring ──▶ patterns / cipher / hash ──▶ multilayer ──▶ ensemble ──▶ caller
//!             │              (candidate decodes)      (chains)      (consensus)
//!             └──────── confidence() is the single scoring authority ────────┘
//! ```
//!
//! ### Detection Round
//!
//! ```text
//!   for each pattern (registry order, optionally in parallel):
//!       quick_filter ─▶ validate ─▶ decode ─▶ output != input ─▶ gate ─▶ score
//!   collect all ─▶ sort by (confidence desc, order asc) ─▶ best
//! ```
//!
//! ### Multi-Layer State Machine
//!
//! ```text
//!     [Detect] ── best accepted ──▶ [Append layer] ── depth < max ──▶ [Detect]
//!        │                               │
//!        │ stop rule fired               │ readable / max depth
//!        v                               v
//!     [Done] <───────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use decodex::Analyzer;
//!
//! let analyzer = Analyzer::default();
//!
//! // Base64(ROT13("Hello World"))
//! let result = analyzer.detect("VXJ5eWIgSmJleXE=").unwrap();
//! assert_eq!(result.best_match.result, "Hello World");
//! assert_eq!(result.best_match.steps, vec!["Base64", "ROT13"]);
//! ```
//!
//! ### Cross-Check
//!
//! ```
//! use decodex::Analyzer;
//!
//! let result = Analyzer::default().cross_check("SGVsbG8gV29ybGQh").unwrap();
//! assert_eq!(result.best_match.result, "Hello World!");
//! println!("consensus: {}", result.consensus_strength);
//! ```
//!
//! ### Cipher Breaking
//!
//! ```
//! use decodex::Analyzer;
//!
//! let candidates = Analyzer::default()
//!     .analyze_cipher("Wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj")
//!     .unwrap();
//! assert_eq!(candidates[0].key_candidate.as_deref(), Some("3"));
//! ```
//!
//! ## Modules
//!
//! - [`scoring`]: Entropy, frequency analysis, language score, confidence
//! - [`patterns`]: Numbered pattern registry and codecs
//! - [`detector`]: Single-layer best-match selection
//! - [`multilayer`]: Depth-bounded recursive decoding
//! - [`ensemble`]: Cross-check strategies and consensus
//! - [`cipher`]: Classical cryptanalysis
//! - [`hash`]: Hash format recognition
//! - [`cache`]: Caller-owned LRU cache
//! - [`analyzer`]: Entry points
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod analyzer;
pub mod cache;
pub mod cipher;
pub mod config;
pub mod detector;
pub mod ensemble;
pub mod error;
pub mod hash;
pub mod multilayer;
pub mod patterns;
pub mod scoring;

// Re-exports for convenience
pub use analyzer::{AnalysisResult, Analyzer, CharsetClass, InputAnalysis};
pub use cache::AnalysisCache;
pub use cipher::{CipherAnalysis, CipherBreaker, CipherKind};
pub use config::{CipherConfig, Config, DetectorConfig, HashConfig};
pub use detector::{DecodingResult, Detector};
pub use ensemble::{Consensus, CrossCheckResult, CrossChecker, Strategy};
pub use error::{DeadlineExceeded, DecodeError, Result};
pub use hash::{HashAnalysis, HashIdentifier};
pub use multilayer::{LayerAnalysis, LayerChain, MultiLayerDecoder, StopReason};
pub use patterns::{DetectionPattern, PatternKind, PatternRegistry, PATTERNS};
pub use scoring::{confidence, entropy, index_of_coincidence, language_score, ScoreProfile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Detect with default settings
pub fn detect(input: &str) -> Result<AnalysisResult> {
    Analyzer::default().detect(input)
}

/// Cross-check with default settings
pub fn cross_check(input: &str) -> Result<CrossCheckResult> {
    Analyzer::default().cross_check(input)
}
