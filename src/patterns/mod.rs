//! Pattern Registry: the numbered, priority-ordered table of detectors.
//!
//! Every pattern pairs a cheap `quick_filter`, an optional stricter
//! `validate` and a pure `decode`. The table order is the primary
//! disambiguation between overlapping alphabets and is fixed at compile time:
//!
//! | #  | Pattern           | Family     | Notes                                 |
//! |----|-------------------|------------|---------------------------------------|
//! | 1  | Hash Signature    | hash       | identification only, ends a chain     |
//! | 2  | JWT               | structured | header + payload, signature unchecked |
//! | 3  | Hexadecimal       | base-n     | yields digest-shaped input to #1      |
//! | 4  | Binary            | numeric    |                                       |
//! | 5  | Octal             | numeric    |                                       |
//! | 6  | Decimal           | numeric    | code points                           |
//! | 7  | Morse Code        | classical  |                                       |
//! | 8  | Base32            | base-n     |                                       |
//! | 9  | Base58            | base-n     | Bitcoin alphabet                      |
//! | 10 | Ascii85           | base-n     |                                       |
//! | 11 | Base64URL         | base-n     | requires `-` or `_`                   |
//! | 12 | Base64            | base-n     | last base-n; carries negative checks  |
//! | 13 | URL Encoding      | web        |                                       |
//! | 14 | HTML Entities     | web        |                                       |
//! | 15 | Unicode Escape    | web        |                                       |
//! | 16 | Quoted-Printable  | web        |                                       |
//! | 17 | ROT13             | classical  | language gate                         |
//! | 18 | ROT47             | classical  | language gate                         |
//! | 19 | Atbash            | classical  | language gate                         |
//! | 20 | Caesar            | classical  | language gate, 25-shift search        |
//! | 21 | Reversed Text     | classical  | language gate                         |
//!
//! The registry is read-only: there is no runtime registration.

mod base;
mod classical;
mod web;

use std::collections::HashMap;
use std::time::Instant;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::cipher::caesar;
use crate::error::{DeadlineExceeded, DecodeError, Result};
use crate::hash::HashIdentifier;

pub(crate) use base::printable_ratio;

/// Hash identifications below this confidence are not claimed by the registry
const HASH_PATTERN_MIN_CONFIDENCE: f64 = 50.0;

/// Pattern identity, one variant per table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PatternKind {
    /// Hash format identification
    HashSignature,
    /// JSON Web Token
    Jwt,
    /// Hexadecimal bytes
    Hex,
    /// 8-bit binary groups
    Binary,
    /// Octal byte values
    Octal,
    /// Decimal code points
    Decimal,
    /// International Morse code
    Morse,
    /// RFC 4648 Base32
    Base32,
    /// Bitcoin Base58
    Base58,
    /// Adobe Ascii85
    Ascii85,
    /// URL-safe Base64
    Base64Url,
    /// Standard Base64
    Base64,
    /// Percent encoding
    UrlEncoding,
    /// HTML character references
    HtmlEntities,
    /// `\uXXXX` / `\xHH` escapes
    UnicodeEscape,
    /// MIME Quoted-Printable
    QuotedPrintable,
    /// ROT13
    Rot13,
    /// ROT47
    Rot47,
    /// Atbash
    Atbash,
    /// Caesar shift with unknown key
    Caesar,
    /// Character order reversed
    Reversed,
}

/// Coarse grouping for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternFamily {
    /// Hash identification
    Hash,
    /// Structured tokens
    Structured,
    /// Base-N alphabets
    BaseN,
    /// Numeric radix encodings
    Numeric,
    /// Web and escape encodings
    Web,
    /// Keyless classical transforms
    Classical,
}

impl PatternFamily {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            PatternFamily::Hash => "hash",
            PatternFamily::Structured => "structured",
            PatternFamily::BaseN => "base-n",
            PatternFamily::Numeric => "numeric",
            PatternFamily::Web => "web",
            PatternFamily::Classical => "classical",
        }
    }
}

/// Extra acceptance test applied to a pattern's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputGate {
    /// Any output that differs from the input
    None,
    /// Output must be readable English and read better than the input
    LanguageGain,
}

/// Output of a pattern decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded bytes
    pub bytes: Vec<u8>,
    /// Caveats to surface as warnings
    pub notes: Vec<String>,
}

impl Decoded {
    fn plain(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            notes: Vec::new(),
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Immutable pattern descriptor
#[derive(Debug, Clone, Serialize)]
pub struct DetectionPattern {
    /// 1-based priority (lower runs first and wins ties)
    pub priority: u8,
    /// Identity
    pub kind: PatternKind,
    /// Unique display name
    pub name: &'static str,
    /// Family
    pub family: PatternFamily,
    /// One-line description
    pub description: &'static str,
    /// Output acceptance gate
    pub gate: OutputGate,
    /// Identification-only: ends a multi-layer chain
    pub terminal: bool,
}

const fn row(
    priority: u8,
    kind: PatternKind,
    name: &'static str,
    family: PatternFamily,
    description: &'static str,
) -> DetectionPattern {
    DetectionPattern {
        priority,
        kind,
        name,
        family,
        description,
        gate: OutputGate::None,
        terminal: false,
    }
}

const fn gated(
    priority: u8,
    kind: PatternKind,
    name: &'static str,
    description: &'static str,
) -> DetectionPattern {
    DetectionPattern {
        priority,
        kind,
        name,
        family: PatternFamily::Classical,
        description,
        gate: OutputGate::LanguageGain,
        terminal: false,
    }
}

/// The registry table, in priority order
pub static PATTERNS: &[DetectionPattern] = &[
    DetectionPattern {
        priority: 1,
        kind: PatternKind::HashSignature,
        name: "Hash Signature",
        family: PatternFamily::Hash,
        description: "Fixed-length digest or crypt-format hash (identified, not reversed)",
        gate: OutputGate::None,
        terminal: true,
    },
    row(2, PatternKind::Jwt, "JWT", PatternFamily::Structured, "JSON Web Token"),
    row(3, PatternKind::Hex, "Hexadecimal", PatternFamily::BaseN, "Base16 byte pairs, optional 0x and separators"),
    row(4, PatternKind::Binary, "Binary", PatternFamily::Numeric, "8-bit groups of 0 and 1"),
    row(5, PatternKind::Octal, "Octal", PatternFamily::Numeric, "Three-digit octal byte values"),
    row(6, PatternKind::Decimal, "Decimal", PatternFamily::Numeric, "Decimal character codes"),
    row(7, PatternKind::Morse, "Morse Code", PatternFamily::Classical, "Dots and dashes, / between words"),
    row(8, PatternKind::Base32, "Base32", PatternFamily::BaseN, "RFC 4648 A-Z 2-7 alphabet"),
    row(9, PatternKind::Base58, "Base58", PatternFamily::BaseN, "Bitcoin alphabet without 0 O I l"),
    row(10, PatternKind::Ascii85, "Ascii85", PatternFamily::BaseN, "Adobe Ascii85, optionally <~ ~> wrapped"),
    row(11, PatternKind::Base64Url, "Base64URL", PatternFamily::BaseN, "URL-safe Base64 (- and _)"),
    row(12, PatternKind::Base64, "Base64", PatternFamily::BaseN, "Standard Base64, padded or not"),
    row(13, PatternKind::UrlEncoding, "URL Encoding", PatternFamily::Web, "Percent-encoded bytes"),
    row(14, PatternKind::HtmlEntities, "HTML Entities", PatternFamily::Web, "Named and numeric character references"),
    row(15, PatternKind::UnicodeEscape, "Unicode Escape", PatternFamily::Web, "\\uXXXX, \\u{...}, \\xHH escapes"),
    row(16, PatternKind::QuotedPrintable, "Quoted-Printable", PatternFamily::Web, "MIME =XX escapes and soft breaks"),
    gated(17, PatternKind::Rot13, "ROT13", "Letters rotated by 13"),
    gated(18, PatternKind::Rot47, "ROT47", "Printable ASCII rotated by 47"),
    gated(19, PatternKind::Atbash, "Atbash", "Mirrored alphabet"),
    gated(20, PatternKind::Caesar, "Caesar", "Letters shifted by an unknown key"),
    gated(21, PatternKind::Reversed, "Reversed Text", "Characters in reverse order"),
];

impl DetectionPattern {
    /// Cheap structural test
    pub fn quick_filter(&self, input: &str) -> bool {
        match self.kind {
            PatternKind::HashSignature => HashIdentifier::quick_match(input),
            PatternKind::Jwt => web::jwt_filter(input),
            PatternKind::Hex => base::hex_filter(input),
            PatternKind::Binary => base::binary_filter(input),
            PatternKind::Octal => base::octal_filter(input),
            PatternKind::Decimal => base::decimal_filter(input),
            PatternKind::Morse => classical::morse_filter(input),
            PatternKind::Base32 => base::base32_filter(input),
            PatternKind::Base58 => base::base58_filter(input),
            PatternKind::Ascii85 => base::ascii85_filter(input),
            PatternKind::Base64Url => base::base64url_filter(input),
            PatternKind::Base64 => base::base64_filter(input),
            PatternKind::UrlEncoding => web::url_filter(input),
            PatternKind::HtmlEntities => web::html_filter(input),
            PatternKind::UnicodeEscape => web::unicode_filter(input),
            PatternKind::QuotedPrintable => web::qp_filter(input),
            PatternKind::Rot13 | PatternKind::Atbash => classical::letters_filter(input),
            PatternKind::Rot47 => classical::rot47_filter(input),
            PatternKind::Caesar => classical::caesar_filter(input),
            PatternKind::Reversed => classical::reversed_filter(input),
        }
    }

    /// Whether the pattern has a validator beyond its filter
    pub fn has_validator(&self) -> bool {
        matches!(
            self.kind,
            PatternKind::HashSignature
                | PatternKind::Jwt
                | PatternKind::Hex
                | PatternKind::Octal
                | PatternKind::Decimal
                | PatternKind::Base32
                | PatternKind::Base58
                | PatternKind::Ascii85
                | PatternKind::Base64
                | PatternKind::QuotedPrintable
        )
    }

    /// Stricter acceptance test; `true` for patterns without one
    pub fn validate(&self, input: &str) -> bool {
        match self.kind {
            PatternKind::HashSignature => validate_hash(input),
            PatternKind::Jwt => web::jwt_validate(input),
            PatternKind::Hex => base::hex_validate(input),
            PatternKind::Octal => base::octal_validate(input),
            PatternKind::Decimal => base::decimal_validate(input),
            PatternKind::Base32 => base::base32_validate(input),
            PatternKind::Base58 => base::base58_validate(input),
            PatternKind::Ascii85 => base::ascii85_validate(input),
            PatternKind::Base64 => base::base64_validate(input),
            PatternKind::QuotedPrintable => web::qp_validate(input),
            _ => true,
        }
    }

    /// Pure decode; `None` means no match
    pub fn decode(&self, input: &str) -> Option<Decoded> {
        self.decode_within(input, None).unwrap_or(None)
    }

    /// [`decode`](Self::decode) bounded by a deadline.
    ///
    /// Only searching decoders (Caesar) can run long; they stop with
    /// [`DeadlineExceeded`] once `deadline` passes.
    pub fn decode_within(
        &self,
        input: &str,
        deadline: Option<Instant>,
    ) -> std::result::Result<Option<Decoded>, DeadlineExceeded> {
        let bytes = match self.kind {
            PatternKind::HashSignature => return Ok(decode_hash(input)),
            PatternKind::Jwt => {
                return Ok(web::jwt_decode(input)
                    .map(|b| Decoded::plain(b).with_note("JWT signature not verified")))
            },
            PatternKind::Caesar => {
                return Ok(caesar::crack_within(input, deadline)?.map(|s| {
                    Decoded::plain(s.plaintext.into_bytes())
                        .with_note(format!("Caesar shift {} recovered by brute force", s.shift))
                }))
            },
            PatternKind::Hex => base::hex_decode(input),
            PatternKind::Binary => base::binary_decode(input),
            PatternKind::Octal => base::octal_decode(input),
            PatternKind::Decimal => base::decimal_decode(input),
            PatternKind::Morse => classical::morse_decode(input),
            PatternKind::Base32 => base::base32_decode(input),
            PatternKind::Base58 => base::base58_decode(input),
            PatternKind::Ascii85 => base::ascii85_decode(input),
            PatternKind::Base64Url => base::base64url_decode(input),
            PatternKind::Base64 => base::base64_decode(input),
            PatternKind::UrlEncoding => web::url_decode(input),
            PatternKind::HtmlEntities => web::html_decode(input),
            PatternKind::UnicodeEscape => web::unicode_decode(input),
            PatternKind::QuotedPrintable => web::qp_decode(input),
            PatternKind::Rot13 => Some(caesar::rot13(input).into_bytes()),
            PatternKind::Rot47 => Some(caesar::rot47(input).into_bytes()),
            PatternKind::Atbash => Some(caesar::atbash(input).into_bytes()),
            PatternKind::Reversed => Some(classical::reverse(input).into_bytes()),
        };
        Ok(bytes.map(Decoded::plain))
    }

    /// Inverse transform, where one exists
    pub fn encode(&self, data: &[u8]) -> Option<String> {
        let text = || String::from_utf8_lossy(data);
        let encoded = match self.kind {
            PatternKind::Hex => base::hex_encode(data),
            PatternKind::Binary => base::binary_encode(data),
            PatternKind::Octal => base::octal_encode(data),
            PatternKind::Decimal => base::decimal_encode(data),
            PatternKind::Morse => classical::morse_encode(data),
            PatternKind::Base32 => base::base32_encode(data),
            PatternKind::Base58 => base::base58_encode(data),
            PatternKind::Ascii85 => base::ascii85_encode(data),
            PatternKind::Base64Url => base::base64url_encode(data),
            PatternKind::Base64 => base::base64_encode(data),
            PatternKind::UrlEncoding => web::url_encode(data),
            PatternKind::HtmlEntities => web::html_encode(data),
            PatternKind::UnicodeEscape => web::unicode_encode(data),
            PatternKind::QuotedPrintable => web::qp_encode(data),
            PatternKind::Rot13 => caesar::rot13(&text()),
            PatternKind::Rot47 => caesar::rot47(&text()),
            PatternKind::Atbash => caesar::atbash(&text()),
            PatternKind::Reversed => classical::reverse(&text()),
            PatternKind::HashSignature | PatternKind::Jwt | PatternKind::Caesar => return None,
        };
        Some(encoded)
    }

    /// Whether [`encode`](Self::encode) is available
    pub fn can_encode(&self) -> bool {
        !matches!(
            self.kind,
            PatternKind::HashSignature | PatternKind::Jwt | PatternKind::Caesar
        )
    }
}

impl std::fmt::Display for DetectionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_hash(input: &str) -> bool {
    let input = input.trim();
    // Hex that spells out text is an encoding, not a digest
    if input.bytes().all(|b| b.is_ascii_hexdigit()) {
        if let Ok(bytes) = hex::decode(input) {
            if printable_ratio(&bytes) >= 0.9 {
                return false;
            }
        }
    }
    HashIdentifier::default()
        .identify(input)
        .first()
        .is_some_and(|top| top.confidence >= HASH_PATTERN_MIN_CONFIDENCE)
}

fn decode_hash(input: &str) -> Option<Decoded> {
    let candidates = HashIdentifier::default().identify(input);
    let top = candidates.first()?;

    let mut decoded = Decoded::plain(
        format!("{} hash (one-way, cannot be reversed)", top.hash_type).into_bytes(),
    )
    .with_note("Hash identified; no plaintext can be recovered");

    let alternatives: Vec<&str> = candidates
        .iter()
        .skip(1)
        .take(4)
        .map(|c| c.hash_type.as_str())
        .collect();
    if !alternatives.is_empty() {
        decoded = decoded.with_note(format!("Also consistent with: {}", alternatives.join(", ")));
    }
    Some(decoded)
}

/// Lookup key: lowercase alphanumerics only ("Base64URL" → "base64url")
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Short names accepted besides the display name
fn aliases(kind: PatternKind) -> &'static [&'static str] {
    match kind {
        PatternKind::HashSignature => &["hash"],
        PatternKind::Hex => &["hex", "base16"],
        PatternKind::Base64 => &["b64"],
        PatternKind::Base64Url => &["b64url", "base64urlsafe"],
        PatternKind::Morse => &["morse"],
        PatternKind::UrlEncoding => &["url", "percent"],
        PatternKind::HtmlEntities => &["html"],
        PatternKind::UnicodeEscape => &["unicode", "escape"],
        PatternKind::QuotedPrintable => &["qp"],
        PatternKind::Reversed => &["reverse"],
        PatternKind::Ascii85 => &["base85", "a85"],
        _ => &[],
    }
}

/// Name → pattern lookup over [`PATTERNS`]
///
/// # Example
/// ```
/// use decodex::patterns::PatternRegistry;
///
/// let registry = PatternRegistry::global();
/// let base64 = registry.get("base64").unwrap();
/// let decoded = base64.decode("SGVsbG8gV29ybGQh").unwrap();
/// assert_eq!(decoded.bytes, b"Hello World!");
/// ```
#[derive(Debug)]
pub struct PatternRegistry {
    by_name: HashMap<String, usize>,
}

lazy_static! {
    static ref REGISTRY: PatternRegistry = PatternRegistry::new();
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRegistry {
    /// Build the name index
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        for (index, pattern) in PATTERNS.iter().enumerate() {
            by_name.insert(normalize_name(pattern.name), index);
            for alias in aliases(pattern.kind) {
                by_name.insert(normalize_name(alias), index);
            }
        }
        Self { by_name }
    }

    /// Process-wide instance (read-only)
    pub fn global() -> &'static PatternRegistry {
        &REGISTRY
    }

    /// All patterns in priority order
    pub fn patterns(&self) -> &'static [DetectionPattern] {
        PATTERNS
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        PATTERNS.len()
    }

    /// Always false; the table is never empty
    pub fn is_empty(&self) -> bool {
        PATTERNS.is_empty()
    }

    /// Look up by display name or alias, case and punctuation insensitive
    pub fn get(&self, name: &str) -> Option<&'static DetectionPattern> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&index| &PATTERNS[index])
    }

    /// Look up by kind
    pub fn by_kind(&self, kind: PatternKind) -> &'static DetectionPattern {
        PATTERNS
            .iter()
            .find(|p| p.kind == kind)
            .unwrap_or(&PATTERNS[0])
    }

    /// Look up or fail with [`DecodeError::UnknownPattern`]
    pub fn require(&self, name: &str) -> Result<&'static DetectionPattern> {
        self.get(name)
            .ok_or_else(|| DecodeError::UnknownPattern(name.to_string()))
    }

    /// Encode with a named pattern
    pub fn encode(&self, name: &str, data: &[u8]) -> Result<String> {
        let pattern = self.require(name)?;
        pattern.encode(data).ok_or_else(|| {
            DecodeError::InvalidInput(format!("{} has no encoder", pattern.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priorities_are_numbered_in_order() {
        for (i, pattern) in PATTERNS.iter().enumerate() {
            assert_eq!(pattern.priority as usize, i + 1, "{}", pattern.name);
        }
    }

    #[test]
    fn test_hash_before_base_n_and_base64_last_base_n() {
        let position = |kind| PATTERNS.iter().position(|p| p.kind == kind).unwrap();
        let hash = position(PatternKind::HashSignature);
        let base64 = position(PatternKind::Base64);
        for p in PATTERNS.iter().filter(|p| p.family == PatternFamily::BaseN) {
            assert!(hash < position(p.kind));
            assert!(position(p.kind) <= base64, "{} after Base64", p.name);
        }
    }

    #[test]
    fn test_names_unique() {
        let registry = PatternRegistry::new();
        for pattern in PATTERNS {
            assert_eq!(registry.get(pattern.name).unwrap().kind, pattern.kind);
        }
    }

    #[test]
    fn test_lookup_aliases() {
        let registry = PatternRegistry::global();
        assert_eq!(registry.get("b64").unwrap().kind, PatternKind::Base64);
        assert_eq!(registry.get("BASE64-URL").unwrap().kind, PatternKind::Base64Url);
        assert_eq!(registry.get("rot13").unwrap().kind, PatternKind::Rot13);
        assert!(registry.get("enigma").is_none());
        assert!(matches!(
            registry.require("enigma"),
            Err(DecodeError::UnknownPattern(_))
        ));
    }

    #[test]
    fn test_known_vectors() {
        let registry = PatternRegistry::global();
        let base64 = registry.by_kind(PatternKind::Base64);
        assert_eq!(
            base64.decode("SGVsbG8gV29ybGQh").unwrap().bytes,
            b"Hello World!".to_vec()
        );
        let rot13 = registry.by_kind(PatternKind::Rot13);
        assert_eq!(rot13.decode("Uryyb Jbeyq").unwrap().bytes, b"Hello World".to_vec());
    }

    #[test]
    fn test_hash_pattern_claims_digest_not_hex_text() {
        let hash = PatternRegistry::global().by_kind(PatternKind::HashSignature);
        let digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert!(hash.quick_filter(digest));
        assert!(hash.validate(digest));
        let decoded = hash.decode(digest).unwrap();
        assert!(String::from_utf8(decoded.bytes).unwrap().starts_with("SHA-256"));

        let hex_text = hex::encode("A sentence of 32 characters long");
        assert_eq!(hex_text.len(), 64);
        assert!(!hash.validate(&hex_text));
    }

    #[test]
    fn test_encode_availability() {
        let registry = PatternRegistry::global();
        assert!(registry.encode("Caesar", b"x").is_err());
        assert_eq!(registry.encode("hex", b"Hi").unwrap(), "4869");
        for pattern in PATTERNS {
            assert_eq!(pattern.can_encode(), pattern.encode(b"abc").is_some());
        }
    }

    #[test]
    fn test_decode_within_expired_deadline() {
        let registry = PatternRegistry::global();
        let now = Some(Instant::now());
        let caesar = registry.by_kind(PatternKind::Caesar);
        assert_eq!(
            caesar.decode_within("Wkh txlfn eurzq ira", now).unwrap_err(),
            DeadlineExceeded
        );
        // Single-pass decoders finish regardless of the deadline
        let base64 = registry.by_kind(PatternKind::Base64);
        let decoded = base64.decode_within("SGVsbG8gV29ybGQh", now).unwrap().unwrap();
        assert_eq!(decoded.bytes, b"Hello World!".to_vec());
    }
}
