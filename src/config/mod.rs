//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`DECODEX_*`)
//! - The per-user default location (`<config_dir>/decodex/config.toml`)
//!
//! Every field has a sane default, so an empty file or no file at all is a
//! valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Detection and multi-layer decoding
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Classical cipher cryptanalysis
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Hash recognition
    #[serde(default)]
    pub hash: HashConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| DecodeError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("decodex").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse("DECODEX_MAX_INPUT_SIZE") {
            config.detector.max_input_size = val;
        }
        if let Some(val) = env_parse("DECODEX_MAX_DEPTH") {
            config.detector.max_depth = val;
        }
        if let Some(val) = env_parse("DECODEX_MIN_CONFIDENCE") {
            config.detector.min_confidence = val;
        }
        if let Some(val) = env_parse("DECODEX_ENABLE_CHUNKING") {
            config.detector.enable_chunking = val;
        }
        if let Some(val) = env_parse("DECODEX_ENABLE_PARALLEL") {
            config.detector.enable_parallel = val;
        }
        if let Some(val) = env_parse("DECODEX_LAYER_TIMEOUT_MS") {
            config.detector.layer_timeout_ms = val;
        }
        if let Some(val) = env_parse("DECODEX_CIPHER_MIN_SCORE") {
            config.cipher.min_score = val;
        }

        config
    }

    /// Check that all values are in range
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.cipher.validate()?;
        if !(0.0..=100.0).contains(&self.hash.min_confidence) {
            return Err(DecodeError::Config(format!(
                "hash.min_confidence must be within 0-100, got {}",
                self.hash.min_confidence
            )));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Longest accepted per-pattern budget (one minute)
pub const MAX_VALIDATOR_TIMEOUT_MS: u64 = 60_000;

/// Longest accepted per-layer budget (ten minutes)
pub const MAX_LAYER_TIMEOUT_MS: u64 = 600_000;

/// Detection, chaining and resource limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum accepted input size in bytes (`InputTooLarge` above it)
    pub max_input_size: usize,

    /// Absolute ceiling in bytes (`SecurityRejected` above it)
    pub hard_size_ceiling: usize,

    /// Maximum number of layers in a multi-layer chain
    pub max_depth: usize,

    /// Minimum confidence (0-100) for a layer to be accepted
    pub min_confidence: f64,

    /// Required entropy drop (bits/symbol) between layers
    pub entropy_epsilon: f64,

    /// Alternative progress signal: required language score gain
    pub language_gain_epsilon: f64,

    /// Language score at which content is considered readable
    pub readable_stop_score: f64,

    /// Decoded layers shorter than this are rejected
    pub min_layer_bytes: usize,

    /// Split large inputs for an advisory pre-scan
    pub enable_chunking: bool,

    /// Chunk size in bytes for the pre-scan
    pub chunk_size: usize,

    /// Fan patterns out over the worker pool
    pub enable_parallel: bool,

    /// Per-pattern time budget in milliseconds (validator plus decoder search)
    pub validator_timeout_ms: u64,

    /// Per-layer time budget in milliseconds; at least `validator_timeout_ms`
    pub layer_timeout_ms: u64,

    /// Results longer than this are truncated for display
    pub max_display_chars: usize,

    /// Maximum number of alternatives returned
    pub max_alternatives: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_input_size: 10 * 1024 * 1024,    // 10 MiB
            hard_size_ceiling: 64 * 1024 * 1024, // 64 MiB
            max_depth: 15,
            min_confidence: 70.0,
            entropy_epsilon: 0.5,
            language_gain_epsilon: 10.0,
            readable_stop_score: 80.0,
            min_layer_bytes: 10,
            enable_chunking: true,
            chunk_size: 1024 * 1024, // 1 MiB
            enable_parallel: true,
            validator_timeout_ms: 250,
            layer_timeout_ms: 5000,
            max_display_chars: 10_000,
            max_alternatives: 10,
        }
    }
}

impl DetectorConfig {
    /// Set maximum chain depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum layer confidence
    pub fn with_min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = confidence.clamp(0.0, 100.0);
        self
    }

    /// Set maximum input size
    pub fn with_max_input_size(mut self, bytes: usize) -> Self {
        self.max_input_size = bytes;
        self
    }

    /// Enable or disable parallel pattern fan-out
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.enable_parallel = enabled;
        self
    }

    /// Enable or disable the chunk pre-scan
    pub fn with_chunking(mut self, enabled: bool, chunk_size: usize) -> Self {
        self.enable_chunking = enabled;
        self.chunk_size = chunk_size;
        self
    }

    /// Set the per-layer time budget
    pub fn with_layer_timeout_ms(mut self, ms: u64) -> Self {
        self.layer_timeout_ms = ms;
        self
    }

    /// Set the per-pattern time budget
    pub fn with_validator_timeout_ms(mut self, ms: u64) -> Self {
        self.validator_timeout_ms = ms;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_VALIDATOR_TIMEOUT_MS).contains(&self.validator_timeout_ms) {
            return Err(DecodeError::Config(format!(
                "detector.validator_timeout_ms must be within 1-{MAX_VALIDATOR_TIMEOUT_MS}, got {}",
                self.validator_timeout_ms
            )));
        }
        if !(self.validator_timeout_ms..=MAX_LAYER_TIMEOUT_MS).contains(&self.layer_timeout_ms) {
            return Err(DecodeError::Config(format!(
                "detector.layer_timeout_ms must be within {}-{MAX_LAYER_TIMEOUT_MS}, got {}",
                self.validator_timeout_ms, self.layer_timeout_ms
            )));
        }
        if self.max_depth == 0 {
            return Err(DecodeError::Config("detector.max_depth must be >= 1".into()));
        }
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(DecodeError::Config(format!(
                "detector.min_confidence must be within 0-100, got {}",
                self.min_confidence
            )));
        }
        if self.max_input_size > self.hard_size_ceiling {
            return Err(DecodeError::Config(format!(
                "detector.max_input_size ({}) exceeds hard_size_ceiling ({})",
                self.max_input_size, self.hard_size_ceiling
            )));
        }
        if self.chunk_size == 0 {
            return Err(DecodeError::Config("detector.chunk_size must be > 0".into()));
        }
        Ok(())
    }
}

/// Classical cipher search bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Minimum composite score (0-100) for a candidate to be surfaced
    pub min_score: f64,

    /// Longest Vigenère key tried
    pub vigenere_max_key_len: usize,

    /// Most rails tried for rail fence
    pub rail_fence_max_rails: usize,

    /// Widest columnar transposition tried (all column orders)
    pub columnar_max_columns: usize,

    /// Hill-climbing passes for simple substitution
    pub substitution_max_passes: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            min_score: 40.0,
            vigenere_max_key_len: 15,
            rail_fence_max_rails: 10,
            columnar_max_columns: 6,
            substitution_max_passes: 12,
        }
    }
}

impl CipherConfig {
    fn validate(&self) -> Result<()> {
        if self.vigenere_max_key_len < 2 {
            return Err(DecodeError::Config(
                "cipher.vigenere_max_key_len must be >= 2".into(),
            ));
        }
        // 8! column orders is already too many to score per call
        if self.columnar_max_columns > 7 {
            return Err(DecodeError::Config(
                "cipher.columnar_max_columns must be <= 7".into(),
            ));
        }
        Ok(())
    }
}

/// Hash recognition limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Candidates below this confidence are dropped
    pub min_confidence: f64,

    /// Maximum number of candidates returned
    pub max_candidates: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            min_confidence: 30.0,
            max_candidates: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.max_depth, 15);
        assert!((config.detector.min_confidence - 70.0).abs() < f64::EPSILON);
        assert!((config.cipher.min_score - 40.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [detector]
            max_depth = 4
            min_confidence = 60.0
            enable_parallel = false

            [cipher]
            rail_fence_max_rails = 6
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.detector.max_depth, 4);
        assert!(!config.detector.enable_parallel);
        // Unspecified fields keep their defaults
        assert_eq!(config.detector.min_layer_bytes, 10);
        assert_eq!(config.cipher.rail_fence_max_rails, 6);
        assert_eq!(config.cipher.vigenere_max_key_len, 15);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.detector.max_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detector.max_input_size = config.detector.hard_size_ceiling + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cipher.columnar_max_columns = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_timeouts() {
        let check = |detector: DetectorConfig| Config { detector, ..Config::default() }.validate();

        assert!(check(DetectorConfig::default()).is_ok());
        assert!(check(DetectorConfig::default().with_layer_timeout_ms(0)).is_err());
        assert!(check(DetectorConfig::default().with_layer_timeout_ms(u64::MAX)).is_err());
        assert!(check(DetectorConfig::default().with_validator_timeout_ms(0)).is_err());
        assert!(check(DetectorConfig::default().with_validator_timeout_ms(u64::MAX)).is_err());

        // A layer cannot be shorter than one pattern
        let inverted = DetectorConfig::default()
            .with_validator_timeout_ms(2_000)
            .with_layer_timeout_ms(1_000);
        assert!(check(inverted).is_err());

        let edges = DetectorConfig::default()
            .with_validator_timeout_ms(MAX_VALIDATOR_TIMEOUT_MS)
            .with_layer_timeout_ms(MAX_LAYER_TIMEOUT_MS);
        assert!(check(edges).is_ok());
    }

    #[test]
    fn test_builders_clamp() {
        let config = DetectorConfig::default()
            .with_min_confidence(150.0)
            .with_max_depth(3);
        assert!((config.min_confidence - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.max_depth, 3);
    }
}
