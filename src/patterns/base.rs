//! Base-N and numeric-radix codecs.
//!
//! Each family has a cheap `*_filter` (alphabet/length check), an optional
//! `*_validate` (stricter, bounded), and a pure decode/encode pair. Base64's
//! validator carries the explicit negative checks that keep it from
//! swallowing hex, binary, Base32 and Base58 inputs.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Standard alphabet, padding optional on decode, trailing bits tolerated
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58 decoding is quadratic; longer inputs are not Base58 in practice
const BASE58_MAX_LEN: usize = 1024;

/// Lengths (in hex digits) of common digests
const DIGEST_HEX_LENGTHS: &[usize] = &[8, 16, 32, 40, 48, 56, 64, 96, 128];

// ---------------------------------------------------------------------------
// Hexadecimal
// ---------------------------------------------------------------------------

/// Strip `0x` prefixes and `:`/`,`/whitespace separators
pub(crate) fn normalize_hex(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.strip_prefix("0x")
                .or_else(|| t.strip_prefix("0X"))
                .unwrap_or(t)
        })
        .collect()
}

pub(crate) fn hex_filter(input: &str) -> bool {
    let digits = normalize_hex(input);
    digits.len() >= 2 && digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn hex_validate(input: &str) -> bool {
    let digits = normalize_hex(input);

    // Short all-letter strings like "cafe" or "bead" are words, not hex
    if digits.len() < 8 && digits.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }

    // Bare digest-length strings that do not decode to text belong to the
    // hash recognizer, which runs first
    let bare = !input.trim().contains(|c: char| c.is_whitespace() || c == ':' || c == ',');
    if bare && DIGEST_HEX_LENGTHS.contains(&digits.len()) {
        if let Ok(bytes) = hex::decode(&digits) {
            return printable_ratio(&bytes) >= 0.6;
        }
    }
    true
}

pub(crate) fn hex_decode(input: &str) -> Option<Vec<u8>> {
    hex::decode(normalize_hex(input)).ok()
}

pub(crate) fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Share of bytes that are printable ASCII or common whitespace
pub(crate) fn printable_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let printable = bytes
        .iter()
        .filter(|&&b| (0x20..0x7f).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
        .count();
    printable as f64 / bytes.len() as f64
}

// ---------------------------------------------------------------------------
// Binary / Octal / Decimal
// ---------------------------------------------------------------------------

pub(crate) fn binary_filter(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c == '0' || c == '1' || c.is_whitespace()) {
        return false;
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() > 1 {
        tokens.iter().all(|t| (7..=8).contains(&t.len()))
    } else {
        trimmed.len() >= 8 && trimmed.len() % 8 == 0
    }
}

pub(crate) fn binary_decode(input: &str) -> Option<Vec<u8>> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.len() > 1 {
        tokens
            .iter()
            .map(|t| u8::from_str_radix(t, 2).ok())
            .collect()
    } else {
        let digits = tokens.first()?.as_bytes();
        digits
            .chunks(8)
            .map(|chunk| u8::from_str_radix(std::str::from_utf8(chunk).ok()?, 2).ok())
            .collect()
    }
}

pub(crate) fn binary_encode(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:08b}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn numeric_tokens(input: &str) -> Vec<&str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|t| !t.is_empty())
        .collect()
}

pub(crate) fn octal_filter(input: &str) -> bool {
    let tokens = numeric_tokens(input);
    tokens.len() >= 2
        && tokens
            .iter()
            .all(|t| (1..=3).contains(&t.len()) && t.bytes().all(|b| (b'0'..=b'7').contains(&b)))
}

pub(crate) fn octal_validate(input: &str) -> bool {
    let tokens = numeric_tokens(input);
    // Octal-encoded text is mostly three-digit groups of 040-176
    let three_digit = tokens.iter().filter(|t| t.len() == 3).count();
    three_digit * 2 >= tokens.len() && tokens.iter().any(|t| t.bytes().any(|b| b > b'1'))
}

pub(crate) fn octal_decode(input: &str) -> Option<Vec<u8>> {
    numeric_tokens(input)
        .iter()
        .map(|t| u8::from_str_radix(t, 8).ok())
        .collect()
}

pub(crate) fn octal_encode(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:03o}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn decimal_filter(input: &str) -> bool {
    let tokens = numeric_tokens(input);
    tokens.len() >= 2
        && tokens
            .iter()
            .all(|t| (1..=7).contains(&t.len()) && t.bytes().all(|b| b.is_ascii_digit()))
}

pub(crate) fn decimal_validate(input: &str) -> bool {
    let tokens = numeric_tokens(input);
    // Zero-padded 8-digit tokens of 0/1 are binary, not code points
    !tokens.iter().all(|t| t.bytes().all(|b| b == b'0' || b == b'1') && t.len() >= 7)
}

pub(crate) fn decimal_decode(input: &str) -> Option<Vec<u8>> {
    let text: Option<String> = numeric_tokens(input)
        .iter()
        .map(|t| t.parse::<u32>().ok().and_then(char::from_u32))
        .collect();
    text.map(String::into_bytes)
}

pub(crate) fn decimal_encode(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .chars()
        .map(|c| u32::from(c).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Base32
// ---------------------------------------------------------------------------

fn strip_line_breaks(input: &str) -> String {
    input.trim().chars().filter(|&c| c != '\n' && c != '\r').collect()
}

pub(crate) fn base32_filter(input: &str) -> bool {
    let body = strip_line_breaks(input);
    let unpadded = body.trim_end_matches('=');
    if unpadded.len() < 8 || !unpadded.bytes().all(|b| BASE32_ALPHABET.contains(&b)) {
        return false;
    }
    if body.len() != unpadded.len() {
        body.len() % 8 == 0 && body.len() - unpadded.len() <= 6
    } else {
        matches!(unpadded.len() % 8, 0 | 2 | 4 | 5 | 7)
    }
}

pub(crate) fn base32_validate(input: &str) -> bool {
    let body = strip_line_breaks(input);
    body.contains('=') || body.bytes().any(|b| (b'2'..=b'7').contains(&b)) || body.len() >= 16
}

pub(crate) fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let body = strip_line_breaks(input);
    let trimmed = body.trim_end_matches('=');
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0u32;

    for c in trimmed.bytes() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | u64::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1u64 << bits) - 1;
        }
    }
    Some(out)
}

pub(crate) fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1u32 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    while out.len() % 8 != 0 {
        out.push('=');
    }
    out
}

// ---------------------------------------------------------------------------
// Base58
// ---------------------------------------------------------------------------

fn is_base58_char(b: u8) -> bool {
    BASE58_ALPHABET.contains(&b)
}

pub(crate) fn base58_filter(input: &str) -> bool {
    let body = input.trim();
    (6..=BASE58_MAX_LEN).contains(&body.len()) && body.bytes().all(is_base58_char)
}

pub(crate) fn base58_validate(input: &str) -> bool {
    let body = input.trim();
    if body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let has_digit = body.bytes().any(|b| b.is_ascii_digit());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    has_digit && (has_upper || has_lower) || (has_upper && has_lower && body.len() >= 20)
}

pub(crate) fn base58_decode(input: &str) -> Option<Vec<u8>> {
    let body = input.trim();
    if body.len() > BASE58_MAX_LEN {
        return None;
    }

    // Little-endian base-256 accumulator
    let mut bytes: Vec<u8> = Vec::with_capacity(body.len());
    for c in body.bytes() {
        let mut carry = BASE58_ALPHABET.iter().position(|&a| a == c)? as u32;
        for b in &mut bytes {
            carry += u32::from(*b) * 58;
            *b = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let leading = body.bytes().take_while(|&c| c == b'1').count();
    let mut out = vec![0u8; leading];
    out.extend(bytes.iter().rev());
    Some(out)
}

pub(crate) fn base58_encode(data: &[u8]) -> String {
    // Little-endian base-58 digits
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in data {
        let mut carry = u32::from(byte);
        for d in &mut digits {
            carry += u32::from(*d) << 8;
            *d = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let leading = data.iter().take_while(|&&b| b == 0).count();
    let mut out = "1".repeat(leading);
    out.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    out
}

// ---------------------------------------------------------------------------
// Ascii85
// ---------------------------------------------------------------------------

fn ascii85_body(input: &str) -> &str {
    let body = input.trim();
    let body = body.strip_prefix("<~").unwrap_or(body);
    body.strip_suffix("~>").unwrap_or(body)
}

pub(crate) fn ascii85_filter(input: &str) -> bool {
    let trimmed = input.trim();
    let body = ascii85_body(trimmed);
    body.len() >= 5
        && body
            .bytes()
            .all(|b| (b'!'..=b'u').contains(&b) || b == b'z' || b == b'\n' || b == b'\r')
}

pub(crate) fn ascii85_validate(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.starts_with("<~") && trimmed.ends_with("~>") {
        return true;
    }
    // Unwrapped Ascii85 should use symbols Base64 never produces
    let body = ascii85_body(trimmed);
    let symbols = body
        .bytes()
        .filter(|b| !b.is_ascii_alphanumeric() && !matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r'))
        .count();
    body.len() >= 10 && symbols * 10 >= body.len() && !body.contains('%')
}

pub(crate) fn ascii85_decode(input: &str) -> Option<Vec<u8>> {
    let body = ascii85_body(input);
    let mut out = Vec::with_capacity(body.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut n = 0usize;

    for c in body.bytes() {
        match c {
            b'\n' | b'\r' | b' ' | b'\t' => continue,
            b'z' if n == 0 => out.extend_from_slice(&[0u8; 4]),
            b'!'..=b'u' => {
                group[n] = c - b'!';
                n += 1;
                if n == 5 {
                    push_ascii85_group(&mut out, &group, 4)?;
                    n = 0;
                }
            },
            _ => return None,
        }
    }

    match n {
        0 => {},
        1 => return None,
        _ => {
            for g in group.iter_mut().skip(n) {
                *g = 84;
            }
            push_ascii85_group(&mut out, &group, n - 1)?;
        },
    }
    Some(out)
}

fn push_ascii85_group(out: &mut Vec<u8>, group: &[u8; 5], count: usize) -> Option<()> {
    let value = group
        .iter()
        .fold(0u64, |acc, &g| acc * 85 + u64::from(g));
    let value = u32::try_from(value).ok()?;
    out.extend_from_slice(&value.to_be_bytes()[..count]);
    Some(())
}

pub(crate) fn ascii85_encode(data: &[u8]) -> String {
    let mut out = String::from("<~");
    for chunk in data.chunks(4) {
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(buf);
        if chunk.len() == 4 && value == 0 {
            out.push('z');
            continue;
        }
        let mut digits = [0u8; 5];
        for d in digits.iter_mut().rev() {
            *d = (value % 85) as u8;
            value /= 85;
        }
        for &d in &digits[..=chunk.len()] {
            out.push((d + b'!') as char);
        }
    }
    out.push_str("~>");
    out
}

// ---------------------------------------------------------------------------
// Base64 / Base64URL
// ---------------------------------------------------------------------------

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}

pub(crate) fn base64_filter(input: &str) -> bool {
    let body = strip_line_breaks(input);
    let unpadded = body.trim_end_matches('=');
    let padding = body.len() - unpadded.len();
    if unpadded.len() < 4 || padding > 2 || !unpadded.bytes().all(is_base64_char) {
        return false;
    }
    if padding > 0 {
        body.len() % 4 == 0
    } else {
        unpadded.len() % 4 != 1
    }
}

/// Negative checks: more restrictive alphabets win over Base64
pub(crate) fn base64_validate(input: &str) -> bool {
    let body = strip_line_breaks(input);
    let unpadded = body.trim_end_matches('=');

    // Looks like hex, not Base64
    if unpadded.len() % 2 == 0 && unpadded.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    // Looks like binary, not Base64
    if unpadded.bytes().all(|b| b == b'0' || b == b'1') {
        return false;
    }
    // Looks like Base32, not Base64
    if body.len() % 8 == 0 && body.bytes().all(|b| BASE32_ALPHABET.contains(&b) || b == b'=') {
        return false;
    }
    // Looks like Base58, not Base64
    if body.len() == unpadded.len()
        && unpadded.len() % 4 != 0
        && unpadded.bytes().all(is_base58_char)
    {
        return false;
    }
    // Plain single-case words are not Base64
    let has_marker = unpadded
        .bytes()
        .any(|b| b.is_ascii_digit() || b == b'+' || b == b'/')
        || body.len() != unpadded.len();
    let mixed_case = unpadded.bytes().any(|b| b.is_ascii_uppercase())
        && unpadded.bytes().any(|b| b.is_ascii_lowercase());
    has_marker || mixed_case
}

pub(crate) fn base64_decode(input: &str) -> Option<Vec<u8>> {
    BASE64_LENIENT.decode(strip_line_breaks(input)).ok()
}

pub(crate) fn base64_encode(data: &[u8]) -> String {
    BASE64_LENIENT.encode(data)
}

pub(crate) fn base64url_filter(input: &str) -> bool {
    let body = input.trim().trim_end_matches('=');
    body.len() >= 4
        && body.len() % 4 != 1
        && body.contains(['-', '_'])
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub(crate) fn base64url_decode(input: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input.trim().trim_end_matches('='))
        .ok()
}

pub(crate) fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_known_vector() {
        assert!(base64_filter("SGVsbG8gV29ybGQh"));
        assert!(base64_validate("SGVsbG8gV29ybGQh"));
        assert_eq!(
            base64_decode("SGVsbG8gV29ybGQh").unwrap(),
            b"Hello World!".to_vec()
        );
    }

    #[test]
    fn test_base64_negative_checks() {
        // hex
        assert!(!base64_validate("48656c6c6f21"));
        // binary
        assert!(!base64_validate("01001000"));
        // base32
        assert!(!base64_validate("JBSWY3DPEE======"));
        // lowercase word
        assert!(!base64_validate("test"));
    }

    #[test]
    fn test_base64_unpadded_and_mime() {
        assert_eq!(base64_decode("SGk").unwrap(), b"Hi".to_vec());
        assert_eq!(
            base64_decode("SGVsbG8g\nV29ybGQh").unwrap(),
            b"Hello World!".to_vec()
        );
    }

    #[test]
    fn test_base64url_requires_url_symbols() {
        assert!(!base64url_filter("SGVsbG8gV29ybGQh"));
        let encoded = base64url_encode(&[0xfb, 0xff, 0xfe, 0x41]);
        assert!(base64url_filter(&encoded));
        assert_eq!(base64url_decode(&encoded).unwrap(), vec![0xfb, 0xff, 0xfe, 0x41]);
    }

    #[test]
    fn test_hex_variants() {
        assert_eq!(hex_decode("48656c6c6f").unwrap(), b"Hello".to_vec());
        assert_eq!(hex_decode("0x48 0x65 0x6c").unwrap(), b"Hel".to_vec());
        assert_eq!(hex_decode("48:65:6c").unwrap(), b"Hel".to_vec());
        assert!(!hex_filter("48656"));
        assert!(!hex_validate("cafe"));
    }

    #[test]
    fn test_hex_yields_digests_to_hash_recognizer() {
        let digest = "5d41402abc4b2a76b9719d911017c592";
        assert!(hex_filter(digest));
        assert!(!hex_validate(digest));

        // 32 hex digits of ASCII text still decode
        let text = hex_encode(b"sixteen char txt");
        assert_eq!(text.len(), 32);
        assert!(hex_validate(&text));
    }

    #[test]
    fn test_binary_forms() {
        assert_eq!(binary_decode("01001000 01101001").unwrap(), b"Hi".to_vec());
        assert_eq!(binary_decode("0100100001101001").unwrap(), b"Hi".to_vec());
        assert!(binary_filter("1001000 1101001"));
        assert!(!binary_filter("0101"));
    }

    #[test]
    fn test_octal_and_decimal() {
        assert_eq!(octal_decode("110 151").unwrap(), b"Hi".to_vec());
        assert!(octal_validate("110 151"));
        assert_eq!(decimal_decode("72 105").unwrap(), b"Hi".to_vec());
        assert_eq!(decimal_decode("72,105").unwrap(), b"Hi".to_vec());
        assert!(!decimal_filter("72"));
        assert_eq!(decimal_encode("Hé".as_bytes()), "72 233");
    }

    #[test]
    fn test_base32_roundtrip() {
        assert_eq!(base32_encode(b"Hello!"), "JBSWY3DPEE======");
        assert_eq!(base32_decode("JBSWY3DPEE======").unwrap(), b"Hello!".to_vec());
        assert!(base32_filter("JBSWY3DPEE======"));
        assert!(base32_validate("JBSWY3DPEE======"));
        assert!(!base32_filter("jbswy3dpee======"));
    }

    #[test]
    fn test_base58_roundtrip() {
        assert_eq!(base58_encode(b"hello world"), "StV1DL6CwTryKyV");
        assert_eq!(
            base58_decode("StV1DL6CwTryKyV").unwrap(),
            b"hello world".to_vec()
        );
        assert_eq!(base58_encode(&[0, 0, 1]), "112");
        assert_eq!(base58_decode("112").unwrap(), vec![0, 0, 1]);
        assert!(base58_decode("0OIl").is_none());
    }

    #[test]
    fn test_ascii85_roundtrip() {
        let encoded = ascii85_encode(b"Hello World");
        assert_eq!(encoded, "<~87cURD]i,\"Ebo7~>");
        assert_eq!(ascii85_decode(&encoded).unwrap(), b"Hello World".to_vec());
        assert!(ascii85_validate(&encoded));
        assert_eq!(ascii85_decode("<~z~>").unwrap(), vec![0, 0, 0, 0]);
    }
}
