//! Hash format recognition.
//!
//! Hashes are one-way, so nothing is decoded: the identifier filters
//! [`SIGNATURES`] by shape and ranks the survivors.
//!
//! # Scoring
//!
//! | Component                                    | Points      |
//! |----------------------------------------------|-------------|
//! | Shape match (length + charset, or regex)     | 30          |
//! | Entropy closeness to [3.8, 4.2] bits/char     | up to 20    |
//! | Character balance (digit/letter mix)         | up to 15    |
//! | Structured prefix (`$2b$`, `{SSHA}`, ...)     | per row     |
//! | Commonality (SHA-256 > SHA3-256 > ...)       | per row     |
//!
//! # Example
//!
//! ```
//! use decodex::hash::HashIdentifier;
//!
//! let id = HashIdentifier::default();
//! let results = id.identify("5d41402abc4b2a76b9719d911017c592");
//! assert_eq!(results[0].hash_type, "MD5");
//! ```

mod signatures;

pub use signatures::{
    vulnerabilities, Charset, HashSignature, ParamStyle, Strength, SIGNATURES, VULNERABILITIES,
};

use serde::Serialize;
use tracing::debug;

use crate::config::HashConfig;
use crate::scoring::char_entropy;

const SHAPE_POINTS: f64 = 30.0;
const ENTROPY_POINTS: f64 = 20.0;
const BALANCE_POINTS: f64 = 15.0;
const IDEAL_ENTROPY_MIN: f64 = 3.8;
const IDEAL_ENTROPY_MAX: f64 = 4.2;
/// Mixed-case hex is not how digests are printed
const MIXED_CASE_PENALTY: f64 = 10.0;
/// Share of hex digits that are 0-9 in a uniform digest
const EXPECTED_DIGIT_RATIO: f64 = 10.0 / 16.0;
/// No known format is longer
const MAX_HASH_LEN: usize = 512;

/// Observable properties of a hash string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashCharacteristics {
    /// Length in characters
    pub length: usize,
    /// Alphabet
    pub charset: Charset,
    /// Format prefix such as `$2b$` or `{SSHA}`
    pub prefix: Option<String>,
    /// Whether the format embeds a salt
    pub salted: bool,
    /// Salt text, when it can be isolated
    pub salt: Option<String>,
    /// Iterations, rounds or cost
    pub rounds: Option<u64>,
    /// Other tuning parameters (Argon2 memory/parallelism)
    pub parameters: Option<String>,
}

/// Static security guidance for an algorithm
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityAssessment {
    /// Strength tier
    pub strength: Strength,
    /// Known weaknesses
    pub vulnerabilities: Vec<String>,
    /// Migration advice
    pub recommendations: Vec<String>,
}

/// One identification candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashAnalysis {
    /// Algorithm name
    pub hash_type: String,
    /// Identification confidence (0-100)
    pub confidence: f64,
    /// Observable properties
    pub characteristics: HashCharacteristics,
    /// Security guidance
    pub security_assessment: SecurityAssessment,
}

/// Ranks hash-format candidates for a string
#[derive(Debug, Clone, Default)]
pub struct HashIdentifier {
    config: HashConfig,
}

impl HashIdentifier {
    /// Create an identifier with explicit thresholds
    pub fn new(config: HashConfig) -> Self {
        Self { config }
    }

    /// Cheap shape check: does any signature match at all?
    pub fn quick_match(input: &str) -> bool {
        let input = input.trim();
        !input.is_empty()
            && input.len() <= MAX_HASH_LEN
            && !input.contains(char::is_whitespace)
            && (0..SIGNATURES.len()).any(|i| signatures::matches(i, input))
    }

    /// Ranked candidates, best first, above `min_confidence`
    pub fn identify(&self, input: &str) -> Vec<HashAnalysis> {
        let input = input.trim();
        if input.is_empty() || input.len() > MAX_HASH_LEN || input.contains(char::is_whitespace) {
            return Vec::new();
        }

        let entropy = char_entropy(input);
        let mut results: Vec<HashAnalysis> = SIGNATURES
            .iter()
            .enumerate()
            .filter(|&(i, _)| signatures::matches(i, input))
            .map(|(_, sig)| HashAnalysis {
                hash_type: sig.name.to_string(),
                confidence: score(sig, input, entropy),
                characteristics: characteristics(sig, input),
                security_assessment: assess(sig),
            })
            .filter(|a| a.confidence >= self.config.min_confidence)
            .collect();

        // Stable: table order breaks ties
        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        results.truncate(self.config.max_candidates);

        debug!(
            candidates = results.len(),
            top = results.first().map(|r| r.hash_type.as_str()),
            "Hash identification"
        );
        results
    }
}

fn score(sig: &HashSignature, input: &str, entropy: f64) -> f64 {
    let mut points = SHAPE_POINTS + sig.bonus;

    let distance = if entropy < IDEAL_ENTROPY_MIN {
        IDEAL_ENTROPY_MIN - entropy
    } else if entropy > IDEAL_ENTROPY_MAX {
        entropy - IDEAL_ENTROPY_MAX
    } else {
        0.0
    };
    points += ENTROPY_POINTS * (1.0 - distance).max(0.0);
    points += balance(sig.charset, input);

    points.clamp(0.0, 100.0)
}

fn balance(charset: Charset, input: &str) -> f64 {
    let digits = input.bytes().filter(u8::is_ascii_digit).count();
    let upper = input.bytes().any(|b| b.is_ascii_uppercase());
    let lower = input.bytes().any(|b| b.is_ascii_lowercase());

    match charset {
        Charset::Hex => {
            let ratio = digits as f64 / input.len().max(1) as f64;
            let fit = (1.0 - (ratio - EXPECTED_DIGIT_RATIO).abs() / EXPECTED_DIGIT_RATIO).max(0.0);
            let penalty = if upper && lower { MIXED_CASE_PENALTY } else { 0.0 };
            BALANCE_POINTS * fit - penalty
        },
        Charset::Base64 | Charset::Structured => {
            let classes = [digits > 0, upper, lower].iter().filter(|&&c| c).count();
            BALANCE_POINTS * classes as f64 / 3.0
        },
    }
}

fn assess(sig: &HashSignature) -> SecurityAssessment {
    SecurityAssessment {
        strength: sig.strength,
        vulnerabilities: vulnerabilities(sig.advisory)
            .iter()
            .map(|v| v.to_string())
            .collect(),
        recommendations: sig
            .strength
            .recommendations()
            .iter()
            .map(|r| r.to_string())
            .collect(),
    }
}

fn characteristics(sig: &HashSignature, input: &str) -> HashCharacteristics {
    let mut c = HashCharacteristics {
        length: input.len(),
        charset: sig.charset,
        prefix: prefix_of(input),
        salted: false,
        salt: None,
        rounds: None,
        parameters: None,
    };

    // "$id$a$b$c" → ["", "id", "a", "b", "c"]
    let fields: Vec<&str> = input.split('$').collect();
    match sig.params {
        ParamStyle::None => {},
        ParamStyle::CryptSalt => {
            c.salted = true;
            c.salt = fields.get(2).map(|s| s.to_string());
        },
        ParamStyle::Bcrypt => {
            c.salted = true;
            c.rounds = fields.get(2).and_then(|cost| cost.parse().ok());
            c.salt = fields.get(3).and_then(|rest| rest.get(..22)).map(str::to_string);
        },
        ParamStyle::ShaCrypt => {
            c.salted = true;
            match fields.get(2).and_then(|f| f.strip_prefix("rounds=")) {
                Some(rounds) => {
                    c.rounds = rounds.parse().ok();
                    c.salt = fields.get(3).map(|s| s.to_string());
                },
                None => {
                    c.rounds = Some(5000);
                    c.salt = fields.get(2).map(|s| s.to_string());
                },
            }
        },
        ParamStyle::Argon2 => {
            c.salted = true;
            if let Some(params) = fields.get(3) {
                c.parameters = Some(params.to_string());
                c.rounds = params
                    .split(',')
                    .find_map(|kv| kv.strip_prefix("t="))
                    .and_then(|t| t.parse().ok());
            }
            c.salt = fields.get(4).map(|s| s.to_string());
        },
        ParamStyle::Iterations => {
            c.salted = true;
            // "$pbkdf2-sha256$N$salt$hash" or "pbkdf2_sha256$N$salt$hash"
            let offset = usize::from(input.starts_with('$'));
            c.rounds = fields.get(1 + offset).and_then(|n| n.parse().ok());
            c.salt = fields.get(2 + offset).map(|s| s.to_string());
        },
        ParamStyle::SaltedBase64 => c.salted = true,
    }
    c
}

fn prefix_of(input: &str) -> Option<String> {
    if let Some(rest) = input.strip_prefix('$') {
        let end = rest.find('$')?;
        return Some(format!("${}$", &rest[..end]));
    }
    if input.starts_with('{') {
        let end = input.find('}')?;
        return Some(input[..=end].to_string());
    }
    for known in ["0x0100", "0x0200", "S:", "md5", "pbkdf2_sha256$", "*", "_"] {
        if input.starts_with(known) && input.len() > known.len() + 12 {
            return Some(known.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_ranked_first() {
        let id = HashIdentifier::default();
        let digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        let results = id.identify(digest);
        assert_eq!(results[0].hash_type, "SHA-256");
        assert!(results[0].confidence > 45.0);
        assert!(results.iter().any(|r| r.hash_type == "SHA3-256"));
        assert_eq!(results[0].security_assessment.strength, Strength::Moderate);
    }

    #[test]
    fn test_sha1_and_md5() {
        let id = HashIdentifier::default();
        let sha1 = id.identify("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(sha1[0].hash_type, "SHA-1");
        let md5 = id.identify("5d41402abc4b2a76b9719d911017c592");
        assert_eq!(md5[0].hash_type, "MD5");
        assert!(md5.iter().any(|r| r.hash_type == "NTLM"));
    }

    #[test]
    fn test_bcrypt_characteristics() {
        let id = HashIdentifier::default();
        let hash = "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";
        let results = id.identify(hash);
        assert_eq!(results[0].hash_type, "bcrypt");
        let c = &results[0].characteristics;
        assert_eq!(c.prefix.as_deref(), Some("$2b$"));
        assert_eq!(c.rounds, Some(12));
        assert_eq!(c.salt.as_deref(), Some("R9h/cIPz0gi.URNNX3kh2O"));
        assert!(c.salted);
        assert_eq!(results[0].security_assessment.strength, Strength::Strong);
    }

    #[test]
    fn test_sha512crypt_rounds() {
        let id = HashIdentifier::default();
        let hash = format!("$6$rounds=656000$saltsalt${}", "a".repeat(86));
        let results = id.identify(&hash);
        assert_eq!(results[0].hash_type, "sha512crypt");
        assert_eq!(results[0].characteristics.rounds, Some(656_000));
        assert_eq!(results[0].characteristics.salt.as_deref(), Some("saltsalt"));
    }

    #[test]
    fn test_argon2_parameters() {
        let id = HashIdentifier::default();
        let hash = "$argon2id$v=19$m=65536,t=3,p=4$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";
        let results = id.identify(hash);
        assert_eq!(results[0].hash_type, "Argon2");
        assert_eq!(results[0].characteristics.rounds, Some(3));
        assert_eq!(
            results[0].characteristics.parameters.as_deref(),
            Some("m=65536,t=3,p=4")
        );
    }

    #[test]
    fn test_weak_hash_has_vulnerabilities() {
        let id = HashIdentifier::default();
        let results = id.identify("5d41402abc4b2a76b9719d911017c592");
        let md5 = &results[0];
        assert_eq!(md5.security_assessment.strength, Strength::Broken);
        assert!(!md5.security_assessment.vulnerabilities.is_empty());
        assert!(!md5.security_assessment.recommendations.is_empty());
    }

    #[test]
    fn test_rejects_non_hashes() {
        let id = HashIdentifier::default();
        assert!(id.identify("").is_empty());
        assert!(id.identify("hello world").is_empty());
        assert!(!HashIdentifier::quick_match("not a hash at all"));
        assert!(HashIdentifier::quick_match("5d41402abc4b2a76b9719d911017c592"));
    }

    #[test]
    fn test_confidence_bounded_and_sorted() {
        let id = HashIdentifier::default();
        let results = id.identify(&"ab12".repeat(16));
        for pair in results.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for r in &results {
            assert!((0.0..=100.0).contains(&r.confidence));
        }
    }
}
