//! Letter, bigram and trigram frequency analysis.
//!
//! All counting is over ASCII letters folded to lowercase; everything else is
//! ignored. N-grams never span a non-letter, so word boundaries are respected.

use std::collections::HashMap;

use serde::Serialize;

/// Reference English letter frequencies (a..z), proportions summing to ~1.0
pub const ENGLISH_LETTER_FREQ: [f64; 26] = [
    0.08167, 0.01492, 0.02782, 0.04253, 0.12702, 0.02228, 0.02015, 0.06094, 0.06966, 0.00153,
    0.00772, 0.04025, 0.02406, 0.06749, 0.07507, 0.01929, 0.00095, 0.05987, 0.06327, 0.09056,
    0.02758, 0.00978, 0.02360, 0.00150, 0.01974, 0.00074,
];

/// English letters ordered from most to least frequent
pub const ENGLISH_FREQ_ORDER: &[u8; 26] = b"etaoinshrdlcumwfgypbvkjxqz";

/// Expected index of coincidence for English plaintext
pub const ENGLISH_IC: f64 = 0.0667;

/// Expected index of coincidence for uniformly random letters
pub const RANDOM_IC: f64 = 1.0 / 26.0;

/// Count ASCII letters (case-folded) into a 26-slot table
pub fn letter_counts(text: &str) -> [usize; 26] {
    let mut counts = [0usize; 26];
    for b in text.bytes() {
        if b.is_ascii_alphabetic() {
            counts[(b.to_ascii_lowercase() - b'a') as usize] += 1;
        }
    }
    counts
}

/// Index of coincidence: Σ nᵢ(nᵢ−1) / (N(N−1)) over letter counts.
///
/// Returns 0.0 when fewer than two letters are present.
pub fn index_of_coincidence(text: &str) -> f64 {
    ic_from_counts(&letter_counts(text))
}

/// Index of coincidence from precomputed counts
pub fn ic_from_counts(counts: &[usize; 26]) -> f64 {
    let n: usize = counts.iter().sum();
    if n < 2 {
        return 0.0;
    }
    let numerator: usize = counts.iter().map(|&c| c * c.saturating_sub(1)).sum();
    numerator as f64 / (n * (n - 1)) as f64
}

/// Chi-squared statistic of observed counts against English frequencies
pub fn chi_squared(counts: &[usize; 26]) -> f64 {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    counts
        .iter()
        .zip(ENGLISH_LETTER_FREQ.iter())
        .map(|(&observed, &freq)| {
            let expected = n * freq;
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Letter-frequency fit on a 0-100 scale (100 = perfect English distribution).
///
/// This is the chi-squared component of the language score, normalised per
/// letter so short and long texts land on the same scale.
pub fn frequency_fit(counts: &[usize; 26]) -> f64 {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return 0.0;
    }
    100.0 / (1.0 + chi_squared(counts) / n as f64)
}

/// Lowercase alphabetic runs of `text`
pub(crate) fn letter_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
}

/// One row of the letter table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterFrequency {
    /// Lowercase letter
    pub letter: char,
    /// Occurrences
    pub count: usize,
    /// Share of all letters, in percent
    pub percent: f64,
}

/// Frequency tables and summary statistics for a text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyAnalysis {
    /// Total letters counted
    pub letter_count: usize,
    /// Letters sorted by count (descending), then alphabetically
    pub letters: Vec<LetterFrequency>,
    /// Most common bigrams
    pub bigrams: Vec<(String, usize)>,
    /// Most common trigrams
    pub trigrams: Vec<(String, usize)>,
    /// Index of coincidence
    pub index_of_coincidence: f64,
    /// Chi-squared against English
    pub chi_squared: f64,
}

impl FrequencyAnalysis {
    /// Number of n-grams kept in each table
    pub const TOP_NGRAMS: usize = 10;

    /// Analyze a text
    pub fn analyze(text: &str) -> Self {
        let counts = letter_counts(text);
        let letter_count: usize = counts.iter().sum();

        let mut letters: Vec<LetterFrequency> = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, &count)| LetterFrequency {
                letter: (b'a' + i as u8) as char,
                count,
                percent: count as f64 * 100.0 / letter_count as f64,
            })
            .collect();
        letters.sort_by(|a, b| b.count.cmp(&a.count).then(a.letter.cmp(&b.letter)));

        let mut bigrams: HashMap<String, usize> = HashMap::new();
        let mut trigrams: HashMap<String, usize> = HashMap::new();
        for word in letter_words(text) {
            let bytes = word.as_bytes();
            for w in bytes.windows(2) {
                *bigrams
                    .entry(String::from_utf8_lossy(w).into_owned())
                    .or_insert(0) += 1;
            }
            for w in bytes.windows(3) {
                *trigrams
                    .entry(String::from_utf8_lossy(w).into_owned())
                    .or_insert(0) += 1;
            }
        }

        Self {
            letter_count,
            letters,
            bigrams: top_n(bigrams, Self::TOP_NGRAMS),
            trigrams: top_n(trigrams, Self::TOP_NGRAMS),
            index_of_coincidence: ic_from_counts(&counts),
            chi_squared: chi_squared(&counts),
        }
    }

    /// High IC suggests a monoalphabetic cipher or plaintext
    pub fn looks_monoalphabetic(&self) -> bool {
        self.letter_count >= 20 && self.index_of_coincidence > 0.055
    }
}

fn top_n(table: HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = table.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "It was the best of times, it was the worst of times, it was the age \
        of wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch \
        of incredulity, it was the season of light, it was the season of darkness";

    #[test]
    fn test_reference_frequencies_sum_to_one() {
        let sum: f64 = ENGLISH_LETTER_FREQ.iter().sum();
        assert!((sum - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_letter_counts_fold_case() {
        let counts = letter_counts("AaB-b c!");
        assert_eq!(counts[0], 2);
        assert_eq!(counts[1], 2);
        assert_eq!(counts[2], 1);
    }

    #[test]
    fn test_ic_english_vs_flat() {
        let ic = index_of_coincidence(ENGLISH);
        assert!(ic > 0.055, "english IC was {ic}");

        let flat = "abcdefghijklmnopqrstuvwxyz".repeat(4);
        let ic_flat = index_of_coincidence(&flat);
        assert!(ic_flat < 0.04, "flat IC was {ic_flat}");
    }

    #[test]
    fn test_ic_short_input() {
        assert_eq!(index_of_coincidence("a"), 0.0);
        assert_eq!(index_of_coincidence("123"), 0.0);
    }

    #[test]
    fn test_frequency_fit_prefers_english() {
        let english = frequency_fit(&letter_counts(ENGLISH));
        let shifted: String = ENGLISH
            .bytes()
            .map(|b| {
                if b.is_ascii_lowercase() {
                    (((b - b'a' + 7) % 26) + b'a') as char
                } else {
                    b as char
                }
            })
            .collect();
        let scrambled = frequency_fit(&letter_counts(&shifted));
        assert!(english > scrambled);
        assert!(english <= 100.0);
    }

    #[test]
    fn test_analysis_tables() {
        let analysis = FrequencyAnalysis::analyze(ENGLISH);
        assert!(analysis.letter_count > 100);
        assert!(analysis.looks_monoalphabetic());
        // "it" and "was" dominate, so "wa"/"as"/"it" should be near the top
        assert!(analysis.bigrams.iter().any(|(g, _)| g == "wa"));
        assert!(analysis.trigrams.iter().any(|(g, _)| g == "was"));
        assert!(analysis.letters.len() <= 26);
        assert!(analysis.bigrams.len() <= FrequencyAnalysis::TOP_NGRAMS);
    }
}
