//! Morse code and the permutation-cipher patterns.
//!
//! ROT13, ROT47, Atbash, Caesar and reversal accept almost any text, so
//! their filters only bound the input. The detector's language gate decides
//! whether the output is readable: valid text, an absolute language floor,
//! at least one common word and a gain over the input.

/// Keyless permutation patterns skip inputs longer than this
pub(crate) const CLASSICAL_MAX_CHARS: usize = 100_000;

const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
];

fn morse_symbol(code: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|&(symbol, _)| symbol)
}

fn morse_code(symbol: char) -> Option<&'static str> {
    let upper = symbol.to_ascii_uppercase();
    MORSE_TABLE
        .iter()
        .find(|(s, _)| *s == upper)
        .map(|&(_, code)| code)
}

/// Word separators (`/`, `|`) become standalone tokens
fn morse_words(input: &str) -> impl Iterator<Item = &str> + '_ {
    input.split(['/', '|']).map(str::trim).filter(|w| !w.is_empty())
}

pub(crate) fn morse_filter(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed
        .chars()
        .all(|c| matches!(c, '.' | '-' | '_' | '/' | '|') || c.is_whitespace())
        && trimmed.contains(['.', '-', '_'])
        && trimmed.split_whitespace().filter(|t| *t != "/" && *t != "|").count() >= 2
}

pub(crate) fn morse_decode(input: &str) -> Option<Vec<u8>> {
    let normalized = input.replace('_', "-");
    let words: Option<Vec<String>> = morse_words(&normalized)
        .map(|word| word.split_whitespace().map(morse_symbol).collect())
        .collect();
    Some(words?.join(" ").into_bytes())
}

pub(crate) fn morse_encode(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter_map(morse_code)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

fn letter_count(input: &str) -> usize {
    input.bytes().filter(u8::is_ascii_alphabetic).count()
}

fn bounded(input: &str) -> bool {
    input.len() <= CLASSICAL_MAX_CHARS
}

pub(crate) fn letters_filter(input: &str) -> bool {
    bounded(input) && letter_count(input) >= 2
}

pub(crate) fn caesar_filter(input: &str) -> bool {
    bounded(input) && letter_count(input) >= 4
}

pub(crate) fn rot47_filter(input: &str) -> bool {
    bounded(input)
        && input.chars().all(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
        && input.chars().filter(char::is_ascii_graphic).count() >= 4
}

pub(crate) fn reversed_filter(input: &str) -> bool {
    bounded(input) && input.chars().count() >= 4 && letter_count(input) >= 2
}

pub(crate) fn reverse(input: &str) -> String {
    input.chars().rev().collect()
}
