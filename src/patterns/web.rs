//! Web and text-escape encodings: URL, HTML entities, Unicode escapes,
//! Quoted-Printable and JWT.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PERCENT_ESCAPE: Regex = Regex::new(r"%[0-9A-Fa-f]{2}").unwrap();
    static ref HTML_ENTITY: Regex =
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});").unwrap();
    static ref UNICODE_ESCAPE: Regex = Regex::new(
        r"\\u[0-9A-Fa-f]{4}|\\u\{[0-9A-Fa-f]{1,6}\}|\\U[0-9A-Fa-f]{8}|\\x[0-9A-Fa-f]{2}"
    )
    .unwrap();
    static ref QP_ESCAPE: Regex = Regex::new(r"=[0-9A-F]{2}|=\r?\n").unwrap();
    static ref JWT_SHAPE: Regex =
        Regex::new(r"^eyJ[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$").unwrap();
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    Some(hex_value(hi)? << 4 | hex_value(lo)?)
}

// ---------------------------------------------------------------------------
// URL encoding
// ---------------------------------------------------------------------------

pub(crate) fn url_filter(input: &str) -> bool {
    PERCENT_ESCAPE.is_match(input)
}

pub(crate) fn url_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match hex_pair(bytes[i + 1], bytes[i + 2]) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                        continue;
                    },
                    None => out.push(b'%'),
                }
            },
            b'+' => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }
    Some(out)
}

/// Percent-encode everything outside the RFC 3986 unreserved set
pub(crate) fn url_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for &b in data {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// HTML entities
// ---------------------------------------------------------------------------

pub(crate) fn html_filter(input: &str) -> bool {
    HTML_ENTITY.is_match(input)
}

pub(crate) fn html_decode(input: &str) -> Option<Vec<u8>> {
    Some(html_escape::decode_html_entities(input).into_owned().into_bytes())
}

pub(crate) fn html_encode(data: &[u8]) -> String {
    html_escape::encode_safe(&String::from_utf8_lossy(data)).into_owned()
}

// ---------------------------------------------------------------------------
// Unicode escapes
// ---------------------------------------------------------------------------

pub(crate) fn unicode_filter(input: &str) -> bool {
    UNICODE_ESCAPE.is_match(input)
}

/// Decode `\uXXXX`, `\u{X..}`, `\UXXXXXXXX` and `\xHH` escapes.
///
/// `\x` escapes are raw bytes, so runs like `\xc3\xa9` decode to UTF-8.
/// Surrogate pairs are joined; lone surrogates become U+FFFD.
pub(crate) fn unicode_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            if let Some((value, len)) = parse_escape(&bytes[i..]) {
                match value {
                    Escape::Byte(b) => out.push(b),
                    Escape::Code(high @ 0xD800..=0xDBFF) => {
                        let low = parse_escape(&bytes[i + len..]).and_then(|(next, next_len)| {
                            match next {
                                Escape::Code(low @ 0xDC00..=0xDFFF) => Some((low, next_len)),
                                _ => None,
                            }
                        });
                        match low {
                            Some((low, next_len)) => {
                                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                                push_char(&mut out, char::from_u32(code));
                                i += len + next_len;
                                continue;
                            },
                            None => push_char(&mut out, None),
                        }
                    },
                    Escape::Code(code) => push_char(&mut out, char::from_u32(code)),
                }
                i += len;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Some(out)
}

enum Escape {
    Byte(u8),
    Code(u32),
}

fn parse_escape(bytes: &[u8]) -> Option<(Escape, usize)> {
    if bytes.len() < 2 || bytes[0] != b'\\' {
        return None;
    }
    let hex_run = |from: usize, len: usize| -> Option<u32> {
        let digits = bytes.get(from..from + len)?;
        let text = std::str::from_utf8(digits).ok()?;
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(text, 16).ok()
    };

    match bytes[1] {
        b'x' => hex_run(2, 2).map(|v| (Escape::Byte(v as u8), 4)),
        b'U' => hex_run(2, 8).map(|v| (Escape::Code(v), 10)),
        b'u' if bytes.get(2) == Some(&b'{') => {
            let close = bytes.iter().skip(3).take(7).position(|&b| b == b'}')?;
            hex_run(3, close).map(|v| (Escape::Code(v), close + 4))
        },
        b'u' => hex_run(2, 4).map(|v| (Escape::Code(v), 6)),
        _ => None,
    }
}

fn push_char(out: &mut Vec<u8>, c: Option<char>) {
    let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

pub(crate) fn unicode_encode(data: &[u8]) -> String {
    let mut out = String::new();
    for c in String::from_utf8_lossy(data).chars() {
        let code = u32::from(c);
        if code > 0xFFFF {
            out.push_str(&format!("\\u{{{code:x}}}"));
        } else {
            out.push_str(&format!("\\u{code:04x}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Quoted-Printable
// ---------------------------------------------------------------------------

pub(crate) fn qp_filter(input: &str) -> bool {
    QP_ESCAPE.is_match(input)
}

pub(crate) fn qp_validate(input: &str) -> bool {
    // URL-encoded data can contain "=XX" in query strings
    !PERCENT_ESCAPE.is_match(input)
}

pub(crate) fn qp_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' {
            // Soft line break
            if bytes.get(i + 1) == Some(&b'\n') {
                i += 2;
                continue;
            }
            if bytes.get(i + 1) == Some(&b'\r') && bytes.get(i + 2) == Some(&b'\n') {
                i += 3;
                continue;
            }
            if let (Some(&hi), Some(&lo)) = (bytes.get(i + 1), bytes.get(i + 2)) {
                if let Some(b) = hex_pair(hi, lo) {
                    out.push(b);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Some(out)
}

pub(crate) fn qp_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        if ((b'!'..=b'~').contains(&b) && b != b'=') || b == b' ' {
            out.push(b as char);
        } else {
            out.push_str(&format!("={b:02X}"));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JWT
// ---------------------------------------------------------------------------

pub(crate) fn jwt_filter(input: &str) -> bool {
    JWT_SHAPE.is_match(input.trim())
}

fn jwt_segment(segment: &str) -> Option<serde_json::Value> {
    let raw = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&raw).ok()
}

pub(crate) fn jwt_validate(input: &str) -> bool {
    let header = input.trim().split('.').next().and_then(jwt_segment);
    matches!(header, Some(serde_json::Value::Object(ref map)) if map.contains_key("alg"))
}

/// Header and payload as pretty JSON; the signature is not verified
pub(crate) fn jwt_decode(input: &str) -> Option<Vec<u8>> {
    let mut segments = input.trim().split('.');
    let header = jwt_segment(segments.next()?)?;
    let payload = jwt_segment(segments.next()?)?;
    let doc = serde_json::json!({ "header": header, "payload": payload });
    serde_json::to_vec_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JWT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
        eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
        SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("Hello%20World%21").unwrap(), b"Hello World!".to_vec());
        assert_eq!(url_decode("a+b").unwrap(), b"a b".to_vec());
        // Truncated escape is kept literally
        assert_eq!(url_decode("100%").unwrap(), b"100%".to_vec());
        assert_eq!(url_decode("%zz").unwrap(), b"%zz".to_vec());
    }

    #[test]
    fn test_url_encode_roundtrip() {
        let encoded = url_encode(b"a+b c/d");
        assert_eq!(encoded, "a%2Bb%20c%2Fd");
        assert_eq!(url_decode(&encoded).unwrap(), b"a+b c/d".to_vec());
    }

    #[test]
    fn test_html_entities() {
        assert!(html_filter("&lt;b&gt;"));
        assert!(!html_filter("fish & chips"));
        assert_eq!(html_decode("&lt;b&gt; &#65;&#x42;").unwrap(), b"<b> AB".to_vec());
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(unicode_decode(r"Hi").unwrap(), b"Hi".to_vec());
        assert_eq!(unicode_decode(r"\xc3\xa9").unwrap(), "é".as_bytes().to_vec());
        assert_eq!(unicode_decode(r"\u{1F600}").unwrap(), "😀".as_bytes().to_vec());
        assert_eq!(unicode_decode(r"😀").unwrap(), "😀".as_bytes().to_vec());
        assert_eq!(
            unicode_decode(r"\ud83d!").unwrap(),
            "\u{FFFD}!".as_bytes().to_vec()
        );
        assert_eq!(unicode_decode(&unicode_encode(b"Hi")).unwrap(), b"Hi".to_vec());
    }

    #[test]
    fn test_quoted_printable() {
        assert_eq!(qp_decode("caf=C3=A9").unwrap(), "café".as_bytes().to_vec());
        assert_eq!(qp_decode("long=\r\nline").unwrap(), b"longline".to_vec());
        assert_eq!(qp_decode(&qp_encode(b"a=b\n")).unwrap(), b"a=b\n".to_vec());
        assert!(!qp_validate("x=41%20"));
    }

    #[test]
    fn test_jwt() {
        assert!(jwt_filter(JWT));
        assert!(jwt_validate(JWT));
        let decoded = String::from_utf8(jwt_decode(JWT).unwrap()).unwrap();
        assert!(decoded.contains("\"alg\": \"HS256\""));
        assert!(decoded.contains("John Doe"));
    }

    #[test]
    fn test_jwt_requires_alg() {
        // {"typ":"JWT"}
        let token = "eyJ0eXAiOiJKV1QifQ.eyJhIjoxfQ.sig";
        assert!(jwt_filter(token));
        assert!(!jwt_validate(token));
    }
}
