//! Cross-check ensemble tests.
//!
//! These tests verify strategy fan-out, merge ordering, consensus and
//! isolation of caller-supplied strategies.

use std::collections::HashSet;

use decodex::{Config, Consensus, CrossChecker, DecodingResult, ScoreProfile, Strategy};

/// A strategy that always claims one answer with full confidence
struct Oracle;

impl Strategy for Oracle {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn run(&self, _input: &str) -> Vec<DecodingResult> {
        let profile = ScoreProfile {
            entropy: 3.0,
            language_score: 0.0,
            is_valid_text: true,
            confidence: 100.0,
        };
        vec![DecodingResult::new("Oracle", "forty-two", profile)]
    }
}

/// A strategy that never finishes normally
struct Faulty;

impl Strategy for Faulty {
    fn name(&self) -> &'static str {
        "Faulty"
    }

    fn run(&self, input: &str) -> Vec<DecodingResult> {
        panic!("cannot handle {} bytes", input.len())
    }
}

/// Test the standard strategy set runs in registration order
#[test]
fn test_standard_strategies() {
    let checker = CrossChecker::default();
    assert_eq!(
        checker.strategy_names(),
        vec!["Registry", "Heuristic", "MultiLayer", "Cipher", "Hash"]
    );

    let result = checker.cross_check("SGVsbG8gV29ybGQh");
    assert_eq!(result.strategies_used, vec!["Registry", "Heuristic", "MultiLayer", "Cipher", "Hash"]);
    assert_eq!(result.best_match.result, "Hello World!");
    assert!(result.warnings.is_empty());
}

/// Test ROT13 is confirmed by several strategies
#[test]
fn test_rot13_consensus() {
    let result = CrossChecker::default().cross_check("Uryyb Jbeyq");
    assert_eq!(result.best_match.result, "Hello World");
    assert_ne!(result.consensus_strength, Consensus::Weak);

    let mut all = vec![&result.best_match];
    all.extend(result.alternatives.iter());
    let kinds: HashSet<&str> = all.iter().map(|r| r.kind.as_str()).collect();
    assert!(kinds.contains("ROT13"));
    assert!(kinds.contains("Caesar"));
}

/// Test hash formats from the hash strategy are surfaced by name
#[test]
fn test_hash_strategy_names_formats() {
    let result = CrossChecker::default().cross_check("5d41402abc4b2a76b9719d911017c592");
    let mut all = vec![&result.best_match];
    all.extend(result.alternatives.iter());
    assert!(all.iter().any(|r| r.kind == "MD5"));
    assert!(all.iter().any(|r| r.kind == "Hash Signature"));
}

/// Test a caller strategy participates in the merge
#[test]
fn test_custom_strategy_merged() {
    let checker = CrossChecker::default().with_strategy(Box::new(Oracle));
    let result = checker.cross_check("SGVsbG8gV29ybGQh");

    assert_eq!(result.best_match.kind, "Oracle");
    assert_eq!(result.strategies_used.last().map(String::as_str), Some("Oracle"));
    assert!(result.alternatives.iter().any(|a| a.result == "Hello World!"));
}

/// Test a panicking strategy is reported and the rest still answer
#[test]
fn test_faulty_strategy_isolated() {
    let checker = CrossChecker::default()
        .with_strategy(Box::new(Faulty))
        .with_strategy(Box::new(Oracle));
    let result = checker.cross_check("SGVsbG8gV29ybGQh");

    assert!(!result.strategies_used.iter().any(|s| s == "Faulty"));
    assert!(result.strategies_used.iter().any(|s| s == "Oracle"));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Faulty"));
    assert_eq!(result.best_match.kind, "Oracle");
}

/// Test merged candidates are unique, ordered and bounded
#[test]
fn test_merge_invariants() {
    let mut config = Config::default();
    config.detector.max_alternatives = 3;
    let result = CrossChecker::new(&config).cross_check("68656c6c6f20776f726c64");

    assert!(result.alternatives.len() <= 3);
    assert!(result
        .alternatives
        .iter()
        .all(|a| a.confidence <= result.best_match.confidence));
    assert!(result
        .alternatives
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));

    let mut all = vec![&result.best_match];
    all.extend(result.alternatives.iter());
    let keys: HashSet<(&str, &str)> = all.iter().map(|r| (r.kind.as_str(), r.result.as_str())).collect();
    assert_eq!(keys.len(), all.len());
}

/// Test JSON shape of a cross-check result
#[test]
fn test_result_serializes() {
    let result = CrossChecker::default().cross_check("SGVsbG8gV29ybGQh");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["best_match"]["type"], "Base64");
    assert!(json["consensus_strength"].is_string());
    assert!(json["strategies_used"].as_array().unwrap().len() == 5);
}
