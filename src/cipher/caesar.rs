//! Shift-family ciphers: Caesar, ROT13, ROT5, ROT18, ROT47 and Atbash.
//!
//! Every transform preserves case and leaves non-letters untouched (ROT5
//! touches digits only, ROT47 the whole printable ASCII range).

use std::time::Instant;

use crate::error::{check_deadline, DeadlineExceeded};
use crate::scoring::language_score;

/// Shift ASCII letters forward by `key` positions
pub fn shift(text: &str, key: u8) -> String {
    let k = key % 26;
    text.chars()
        .map(|c| match c {
            'a'..='z' => ((c as u8 - b'a' + k) % 26 + b'a') as char,
            'A'..='Z' => ((c as u8 - b'A' + k) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

/// Undo a forward shift of `key`
pub fn unshift(text: &str, key: u8) -> String {
    shift(text, 26 - key % 26)
}

/// ROT13 (self-inverse)
pub fn rot13(text: &str) -> String {
    shift(text, 13)
}

/// ROT5: rotate digits by five (self-inverse)
pub fn rot5(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '0'..='9' => ((c as u8 - b'0' + 5) % 10 + b'0') as char,
            _ => c,
        })
        .collect()
}

/// ROT18: ROT13 on letters plus ROT5 on digits
pub fn rot18(text: &str) -> String {
    rot5(&rot13(text))
}

/// ROT47 over the printable ASCII range `!`..=`~` (self-inverse)
pub fn rot47(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '!'..='~' => (b'!' + (c as u8 - b'!' + 47) % 94) as char,
            _ => c,
        })
        .collect()
}

/// Atbash: mirror the alphabet (self-inverse)
pub fn atbash(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (b'z' - (c as u8 - b'a')) as char,
            'A'..='Z' => (b'Z' - (c as u8 - b'A')) as char,
            _ => c,
        })
        .collect()
}

/// Best Caesar decryption of a ciphertext
#[derive(Debug, Clone, PartialEq)]
pub struct CaesarSolution {
    /// Forward shift that was applied to the plaintext (1-25)
    pub shift: u8,
    /// Recovered plaintext
    pub plaintext: String,
    /// Language score of the plaintext
    pub language_score: f64,
}

/// Try all 25 shifts and keep the most English-looking plaintext.
///
/// Ties go to the smaller shift. Returns `None` when the text has no letters.
pub fn crack(text: &str) -> Option<CaesarSolution> {
    crack_within(text, None).unwrap_or(None)
}

/// [`crack`] that gives up once `deadline` passes.
///
/// The deadline is checked before every shift, so one slow scoring pass is
/// the most it can overrun.
pub fn crack_within(
    text: &str,
    deadline: Option<Instant>,
) -> Result<Option<CaesarSolution>, DeadlineExceeded> {
    if !text.bytes().any(|b| b.is_ascii_alphabetic()) {
        return Ok(None);
    }

    let mut best: Option<CaesarSolution> = None;
    for key in 1..26u8 {
        check_deadline(deadline)?;
        let plaintext = unshift(text, key);
        let score = language_score(&plaintext);
        if best.as_ref().map_or(true, |b| score > b.language_score) {
            best = Some(CaesarSolution {
                shift: key,
                plaintext,
                language_score: score,
            });
        }
    }
    Ok(best)
}
