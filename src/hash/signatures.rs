//! Hash format signature table.
//!
//! Plain digests are matched by exact length and charset; structured formats
//! (modular crypt, LDAP, database-specific) by an anchored regex. Each row
//! carries its strength tier, an advisory key into [`VULNERABILITIES`], and a
//! commonality bonus that ranks equally-shaped candidates (SHA-256 before
//! SHA3-256 before Keccak-256 for 64 hex digits).

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use serde::Serialize;

/// Alphabet a digest is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Charset {
    /// 0-9 a-f, either case
    Hex,
    /// Standard Base64 with padding
    Base64,
    /// Format-specific alphabet checked by the regex
    Structured,
}

impl Charset {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Hex => "hex",
            Charset::Base64 => "base64",
            Charset::Structured => "structured",
        }
    }
}

/// Strength tier of a hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Strength {
    /// Practical collisions or trivially reversible
    Broken,
    /// Fast and unsalted; unsuitable for passwords
    Weak,
    /// Sound digest, but fast; fine for integrity, not for passwords
    Moderate,
    /// Salted, tunable password hash
    Strong,
}

impl Strength {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Strength::Broken => "broken",
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
        }
    }

    /// Migration advice for this tier
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Strength::Broken | Strength::Weak => &[
                "Do not use for passwords or signatures",
                "Migrate passwords to Argon2id, scrypt or bcrypt",
                "Use SHA-256 or SHA-3 for integrity checks",
            ],
            Strength::Moderate => &[
                "Acceptable for integrity checks",
                "For passwords, use Argon2id, scrypt or bcrypt with a per-user salt",
            ],
            Strength::Strong => &[
                "Keep cost parameters current with hardware",
                "Prefer Argon2id for new deployments",
            ],
        }
    }
}

/// How to pull salt and cost parameters out of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// Nothing to extract
    None,
    /// `$id$salt$hash`
    CryptSalt,
    /// `$2b$cost$<22 salt><31 hash>`
    Bcrypt,
    /// `$5$[rounds=N$]salt$hash`
    ShaCrypt,
    /// `$argon2id$v=19$m=..,t=..,p=..$salt$hash`
    Argon2,
    /// `...$iterations$salt$hash`
    Iterations,
    /// Base64 payload with the salt appended to the digest
    SaltedBase64,
}

/// One recognisable hash format
#[derive(Debug, Clone)]
pub struct HashSignature {
    /// Algorithm name
    pub name: &'static str,
    /// Exact length for plain digests, 0 for structured formats
    pub length: usize,
    /// Alphabet
    pub charset: Charset,
    /// Anchored regex for structured formats
    pub pattern: Option<&'static str>,
    /// Ranking bonus among equally-shaped candidates
    pub bonus: f64,
    /// Strength tier
    pub strength: Strength,
    /// Key into [`VULNERABILITIES`]
    pub advisory: &'static str,
    /// Parameter extraction style
    pub params: ParamStyle,
}

const fn hex(
    name: &'static str,
    length: usize,
    bonus: f64,
    strength: Strength,
    advisory: &'static str,
) -> HashSignature {
    HashSignature {
        name,
        length,
        charset: Charset::Hex,
        pattern: None,
        bonus,
        strength,
        advisory,
        params: ParamStyle::None,
    }
}

const fn structured(
    name: &'static str,
    pattern: &'static str,
    bonus: f64,
    strength: Strength,
    advisory: &'static str,
    params: ParamStyle,
) -> HashSignature {
    HashSignature {
        name,
        length: 0,
        charset: Charset::Structured,
        pattern: Some(pattern),
        bonus,
        strength,
        advisory,
        params,
    }
}

const fn base64(
    name: &'static str,
    pattern: &'static str,
    bonus: f64,
    strength: Strength,
    advisory: &'static str,
) -> HashSignature {
    HashSignature {
        name,
        length: 0,
        charset: Charset::Base64,
        pattern: Some(pattern),
        bonus,
        strength,
        advisory,
        params: ParamStyle::None,
    }
}

use self::Strength::{Broken, Moderate, Strong, Weak};

/// All known signatures
pub static SIGNATURES: &[HashSignature] = &[
    // 8 hex
    hex("CRC32", 8, 10.0, Broken, "checksum"),
    hex("Adler-32", 8, 2.0, Broken, "checksum"),
    hex("FNV-1a-32", 8, 0.0, Broken, "checksum"),
    // 16 hex
    hex("MySQL323", 16, 8.0, Broken, "mysql323"),
    hex("CRC-64", 16, 4.0, Broken, "checksum"),
    hex("FNV-1a-64", 16, 2.0, Broken, "checksum"),
    hex("Half MD5", 16, 0.0, Broken, "md5"),
    // 32 hex
    hex("MD5", 32, 20.0, Broken, "md5"),
    hex("NTLM", 32, 10.0, Weak, "ntlm"),
    hex("MD4", 32, 3.0, Broken, "md4"),
    hex("LM", 32, 2.0, Broken, "lm"),
    hex("RIPEMD-128", 32, 1.0, Weak, "fast-digest"),
    hex("Tiger-128", 32, 0.0, Weak, "fast-digest"),
    hex("Haval-128", 32, 0.0, Broken, "haval"),
    hex("MD2", 32, 0.0, Broken, "md4"),
    hex("Snefru-128", 32, 0.0, Weak, "fast-digest"),
    hex("Domain Cached Credentials", 32, 0.0, Weak, "ntlm"),
    // 40 hex
    hex("SHA-1", 40, 20.0, Broken, "sha1"),
    hex("RIPEMD-160", 40, 5.0, Moderate, "fast-digest"),
    hex("Tiger-160", 40, 0.0, Weak, "fast-digest"),
    hex("Haval-160", 40, 0.0, Broken, "haval"),
    hex("HAS-160", 40, 0.0, Weak, "fast-digest"),
    // 48 hex
    hex("Tiger-192", 48, 2.0, Weak, "fast-digest"),
    hex("Haval-192", 48, 0.0, Broken, "haval"),
    // 56 hex
    hex("SHA-224", 56, 10.0, Moderate, "fast-sha2"),
    hex("SHA3-224", 56, 5.0, Moderate, "fast-sha3"),
    hex("SHA-512/224", 56, 2.0, Moderate, "fast-sha2"),
    hex("Keccak-224", 56, 1.0, Moderate, "fast-sha3"),
    hex("Haval-224", 56, 0.0, Broken, "haval"),
    // 64 hex
    hex("SHA-256", 64, 20.0, Moderate, "fast-sha2"),
    hex("SHA3-256", 64, 8.0, Moderate, "fast-sha3"),
    hex("Keccak-256", 64, 6.0, Moderate, "fast-sha3"),
    hex("BLAKE2s-256", 64, 4.0, Moderate, "fast-digest"),
    hex("BLAKE3", 64, 4.0, Moderate, "fast-digest"),
    hex("SHA-512/256", 64, 2.0, Moderate, "fast-sha2"),
    hex("RIPEMD-256", 64, 1.0, Weak, "fast-digest"),
    hex("GOST R 34.11-94", 64, 1.0, Weak, "fast-digest"),
    hex("Haval-256", 64, 0.0, Broken, "haval"),
    hex("Snefru-256", 64, 0.0, Weak, "fast-digest"),
    // 80 hex
    hex("RIPEMD-320", 80, 2.0, Weak, "fast-digest"),
    // 96 hex
    hex("SHA-384", 96, 15.0, Moderate, "fast-sha2"),
    hex("SHA3-384", 96, 5.0, Moderate, "fast-sha3"),
    hex("Keccak-384", 96, 2.0, Moderate, "fast-sha3"),
    // 128 hex
    hex("SHA-512", 128, 18.0, Moderate, "fast-sha2"),
    hex("SHA3-512", 128, 6.0, Moderate, "fast-sha3"),
    hex("BLAKE2b-512", 128, 5.0, Moderate, "fast-digest"),
    hex("Whirlpool", 128, 4.0, Moderate, "fast-digest"),
    hex("Keccak-512", 128, 2.0, Moderate, "fast-sha3"),
    hex("Skein-512", 128, 1.0, Moderate, "fast-digest"),
    // Modular crypt and friends
    structured(
        "bcrypt",
        r"^\$2[abxy]?\$\d{2}\$[./A-Za-z0-9]{53}$",
        25.0,
        Strong,
        "bcrypt",
        ParamStyle::Bcrypt,
    ),
    structured(
        "md5crypt",
        r"^\$1\$[./0-9A-Za-z]{0,8}\$[./0-9A-Za-z]{22}$",
        25.0,
        Weak,
        "md5crypt",
        ParamStyle::CryptSalt,
    ),
    structured(
        "Apache APR1",
        r"^\$apr1\$[./0-9A-Za-z]{0,8}\$[./0-9A-Za-z]{22}$",
        25.0,
        Weak,
        "md5crypt",
        ParamStyle::CryptSalt,
    ),
    structured(
        "sha256crypt",
        r"^\$5\$(rounds=\d+\$)?[./0-9A-Za-z]{0,16}\$[./0-9A-Za-z]{43}$",
        25.0,
        Strong,
        "shacrypt",
        ParamStyle::ShaCrypt,
    ),
    structured(
        "sha512crypt",
        r"^\$6\$(rounds=\d+\$)?[./0-9A-Za-z]{0,16}\$[./0-9A-Za-z]{86}$",
        25.0,
        Strong,
        "shacrypt",
        ParamStyle::ShaCrypt,
    ),
    structured(
        "Argon2",
        r"^\$argon2(id|i|d)\$v=\d+\$m=\d+,t=\d+,p=\d+\$[A-Za-z0-9+/]+\$[A-Za-z0-9+/]+$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::Argon2,
    ),
    structured(
        "scrypt",
        r"^\$7\$[./A-Za-z0-9]{11,}\$[./A-Za-z0-9]{43}$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::None,
    ),
    structured(
        "yescrypt",
        r"^\$y\$[./A-Za-z0-9]+\$[./A-Za-z0-9]*\$[./A-Za-z0-9]{43}$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::None,
    ),
    structured(
        "PBKDF2-SHA256",
        r"^\$pbkdf2-sha256\$\d+\$[./A-Za-z0-9+]+\$[./A-Za-z0-9+]+$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::Iterations,
    ),
    structured(
        "Django PBKDF2-SHA256",
        r"^pbkdf2_sha256\$\d+\$[^$]+\$[A-Za-z0-9+/=]{44}$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::Iterations,
    ),
    structured(
        "PHPass",
        r"^\$[PH]\$[./0-9A-Za-z]{31}$",
        25.0,
        Weak,
        "md5crypt",
        ParamStyle::None,
    ),
    structured(
        "Drupal 7",
        r"^\$S\$[./0-9A-Za-z]{52}$",
        25.0,
        Moderate,
        "fast-sha2",
        ParamStyle::None,
    ),
    structured(
        "Cisco Type 8",
        r"^\$8\$[./0-9A-Za-z]{14}\$[./0-9A-Za-z]{43}$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::CryptSalt,
    ),
    structured(
        "Cisco Type 9",
        r"^\$9\$[./0-9A-Za-z]{14}\$[./0-9A-Za-z]{43}$",
        25.0,
        Strong,
        "kdf",
        ParamStyle::CryptSalt,
    ),
    structured(
        "DES crypt",
        r"^[./0-9A-Za-z]{13}$",
        -10.0,
        Broken,
        "des",
        ParamStyle::None,
    ),
    structured(
        "BSDi extended DES",
        r"^_[./0-9A-Za-z]{19}$",
        15.0,
        Broken,
        "des",
        ParamStyle::None,
    ),
    structured(
        "MySQL5",
        r"^\*[0-9A-Fa-f]{40}$",
        25.0,
        Weak,
        "sha1",
        ParamStyle::None,
    ),
    structured(
        "PostgreSQL MD5",
        r"^md5[0-9a-f]{32}$",
        25.0,
        Broken,
        "md5",
        ParamStyle::None,
    ),
    structured(
        "Oracle 11g",
        r"^S:[0-9A-Fa-f]{60}$",
        25.0,
        Weak,
        "sha1",
        ParamStyle::None,
    ),
    structured(
        "MSSQL 2005",
        r"^0x0100[0-9A-Fa-f]{48}$",
        25.0,
        Weak,
        "sha1",
        ParamStyle::None,
    ),
    structured(
        "MSSQL 2012",
        r"^0x0200[0-9A-Fa-f]{136}$",
        25.0,
        Moderate,
        "fast-sha2",
        ParamStyle::None,
    ),
    structured(
        "LDAP SSHA",
        r"^\{SSHA\}[A-Za-z0-9+/]{32,}={0,2}$",
        25.0,
        Weak,
        "sha1",
        ParamStyle::SaltedBase64,
    ),
    structured(
        "LDAP SSHA512",
        r"^\{SSHA512\}[A-Za-z0-9+/]{88,}={0,2}$",
        25.0,
        Moderate,
        "fast-sha2",
        ParamStyle::SaltedBase64,
    ),
    structured(
        "LDAP SHA",
        r"^\{SHA\}[A-Za-z0-9+/]{27}=$",
        25.0,
        Broken,
        "sha1",
        ParamStyle::None,
    ),
    structured(
        "LDAP MD5",
        r"^\{MD5\}[A-Za-z0-9+/]{22}==$",
        25.0,
        Broken,
        "md5",
        ParamStyle::None,
    ),
    // Raw digests written in Base64
    base64("MD5 (Base64)", r"^[A-Za-z0-9+/]{22}==$", 5.0, Broken, "md5"),
    base64("SHA-1 (Base64)", r"^[A-Za-z0-9+/]{27}=$", 5.0, Broken, "sha1"),
    base64("SHA-256 (Base64)", r"^[A-Za-z0-9+/]{43}=$", 8.0, Moderate, "fast-sha2"),
    base64("SHA-512 (Base64)", r"^[A-Za-z0-9+/]{86}==$", 6.0, Moderate, "fast-sha2"),
];

lazy_static! {
    /// Compiled regexes, index-aligned with [`SIGNATURES`]
    pub(crate) static ref COMPILED: Vec<Option<Regex>> = SIGNATURES
        .iter()
        .map(|sig| sig.pattern.and_then(|p| Regex::new(p).ok()))
        .collect();
}

/// Known weaknesses, keyed by [`HashSignature::advisory`]
pub static VULNERABILITIES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "checksum" => &["Not a cryptographic hash", "Collisions are trivial to construct"],
    "mysql323" => &["Pre-4.1 MySQL scheme", "Reversible with modest compute"],
    "md5" => &["Practical collision attacks", "Unsalted MD5 is covered by public rainbow tables"],
    "md4" => &["Practical collision attacks", "Preimage attacks faster than brute force"],
    "ntlm" => &["Unsalted MD4 of the UTF-16 password", "Pass-the-hash attacks"],
    "lm" => &["Uppercases and splits the password into 7-character halves", "Cracked in seconds"],
    "sha1" => &["Practical collision attacks (SHAttered)", "Fast to brute force when unsalted"],
    "haval" => &["Collisions found for reduced and full variants"],
    "des" => &["Only the first 8 password characters are used", "56-bit effective key"],
    "md5crypt" => &["Fixed 1000 MD5 iterations", "GPU cracking is fast"],
    "fast-digest" => &["Fast to compute; unsuitable for password storage"],
    "fast-sha2" => &["No known practical attacks", "Fast to compute; unsuitable for password storage when unsalted"],
    "fast-sha3" => &["No known practical attacks", "Fast to compute; unsuitable for password storage when unsalted"],
    "shacrypt" => &["Cost is CPU-only; weaker than memory-hard schemes against GPUs"],
    "bcrypt" => &["Passwords longer than 72 bytes are truncated"],
    "kdf" => &[],
};

/// Vulnerabilities listed for an advisory key
pub fn vulnerabilities(advisory: &str) -> &'static [&'static str] {
    VULNERABILITIES.get(advisory).copied().unwrap_or(&[])
}

/// Whether `input` matches a signature's shape
pub(crate) fn matches(index: usize, input: &str) -> bool {
    let sig = &SIGNATURES[index];
    match sig.charset {
        Charset::Hex => input.len() == sig.length && input.bytes().all(|b| b.is_ascii_hexdigit()),
        Charset::Base64 | Charset::Structured => COMPILED
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|re| re.is_match(input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        assert!(SIGNATURES.len() >= 50);
    }

    #[test]
    fn test_all_patterns_compile() {
        for (sig, compiled) in SIGNATURES.iter().zip(COMPILED.iter()) {
            assert_eq!(sig.pattern.is_some(), compiled.is_some(), "{}", sig.name);
        }
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<&str> = SIGNATURES.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SIGNATURES.len());
    }

    #[test]
    fn test_advisories_known() {
        for sig in SIGNATURES {
            assert!(VULNERABILITIES.contains_key(sig.advisory), "{}", sig.advisory);
        }
    }

    #[test]
    fn test_hex_shapes() {
        let md5 = SIGNATURES.iter().position(|s| s.name == "MD5").unwrap();
        assert!(matches(md5, "5d41402abc4b2a76b9719d911017c592"));
        assert!(!matches(md5, "5d41402abc4b2a76b9719d911017c59"));
        assert!(!matches(md5, "zd41402abc4b2a76b9719d911017c592"));
    }
}
