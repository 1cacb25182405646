//! Decodex CLI binary.
//!
//! Identify and reverse unknown encodings from the command line.
//!
//! # Commands
//!
//! - `detect` - Best match, alternatives and multi-layer chain
//! - `cross-check` - Run every strategy and report consensus
//! - `cipher` - Classical cipher cryptanalysis
//! - `hash` - Hash format identification
//! - `analyze` - Input statistics without decoding
//! - `encode` - Encode with a named pattern
//! - `patterns` - List the registry in priority order

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use decodex::{Analyzer, Config, DecodingResult, PatternRegistry, VERSION};

#[derive(Parser)]
#[command(name = "decodex")]
#[command(version = VERSION)]
#[command(about = "Decodex - identify and reverse unknown encodings", long_about = None)]
struct Cli {
    /// Config file (default: <config_dir>/decodex/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the encoding and decode
    Detect {
        /// Input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only decode one layer
        #[arg(long)]
        single_layer: bool,

        /// Maximum number of layers
        #[arg(long)]
        max_depth: Option<usize>,

        /// Minimum layer confidence (0-100)
        #[arg(long)]
        min_confidence: Option<f64>,
    },

    /// Run all detection strategies and merge their results
    CrossCheck {
        /// Input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Break classical ciphers
    Cipher {
        /// Ciphertext (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Identify a hash format
    Hash {
        /// Hash string (or - for stdin)
        input: Option<String>,
    },

    /// Show input statistics
    Analyze {
        /// Input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Encode text with a named pattern
    Encode {
        /// Pattern name or alias (base64, hex, rot13, ...)
        pattern: String,

        /// Text to encode (or - for stdin)
        input: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered patterns in priority order
    Patterns,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };
    let json = cli.json;

    match cli.command {
        Commands::Detect {
            input,
            file,
            single_layer,
            max_depth,
            min_confidence,
        } => cmd_detect(
            config,
            read_input(input, file)?,
            single_layer,
            max_depth,
            min_confidence,
            json,
        ),
        Commands::CrossCheck { input, file } => {
            cmd_cross_check(config, read_input(input, file)?, json)
        },
        Commands::Cipher { input, file } => cmd_cipher(config, read_input(input, file)?, json),
        Commands::Hash { input } => cmd_hash(config, read_input(input, None)?, json),
        Commands::Analyze { input, file } => cmd_analyze(config, read_input(input, file)?, json),
        Commands::Encode {
            pattern,
            input,
            output,
        } => cmd_encode(&pattern, read_input(input, None)?, output),
        Commands::Patterns => cmd_patterns(json),
    }
}

fn cmd_detect(
    config: Config,
    content: String,
    single_layer: bool,
    max_depth: Option<usize>,
    min_confidence: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut analyzer = Analyzer::new(config).with_multi_layer(!single_layer);
    if let Some(depth) = max_depth {
        analyzer = analyzer.with_max_depth(depth);
    }
    if let Some(confidence) = min_confidence {
        analyzer = analyzer.with_min_confidence(confidence);
    }
    analyzer.config().validate()?;

    let result = analyzer.detect(&content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result("Best match", &result.best_match);
    if result.layers.len() > 1 {
        println!();
        println!("Layers:");
        for layer in &result.layers {
            println!(
                "  {:>2}. {:<18} {:>5.1}%  {} bytes",
                layer.depth, layer.encoding, layer.score_profile.confidence, layer.byte_size
            );
        }
    }
    if !result.alternatives.is_empty() {
        println!();
        println!("Alternatives:");
        for alt in &result.alternatives {
            println!(
                "  {:<18} {:>5.1}%  {}",
                alt.kind,
                alt.confidence,
                preview(&alt.result, 60)
            );
        }
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn cmd_cross_check(config: Config, content: String, json: bool) -> anyhow::Result<()> {
    let result = Analyzer::new(config).cross_check(&content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_result("Best match", &result.best_match);
    println!();
    println!("Consensus:   {}", result.consensus_strength);
    println!("Strategies:  {}", result.strategies_used.join(", "));
    if !result.alternatives.is_empty() {
        println!();
        println!("Alternatives:");
        for alt in &result.alternatives {
            println!(
                "  {:<22} {:>5.1}%  {}",
                alt.kind,
                alt.confidence,
                preview(&alt.result, 60)
            );
        }
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn cmd_cipher(config: Config, content: String, json: bool) -> anyhow::Result<()> {
    let candidates = Analyzer::new(config).analyze_cipher(&content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No classical cipher candidate above the score threshold");
        return Ok(());
    }
    for candidate in &candidates {
        println!(
            "{:<24} {:>5.1}%  key: {}",
            candidate.cipher_type.name(),
            candidate.confidence,
            candidate.key_candidate.as_deref().unwrap_or("-")
        );
        println!("  method:    {}", candidate.method);
        println!("  plaintext: {}", preview(&candidate.plaintext, 70));
        println!(
            "  IC {:.4}, chi-squared {:.1}",
            candidate.frequency_analysis.index_of_coincidence,
            candidate.frequency_analysis.chi_squared
        );
    }
    Ok(())
}

fn cmd_hash(config: Config, content: String, json: bool) -> anyhow::Result<()> {
    let candidates = Analyzer::new(config).analyze_hash(&content)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No known hash format matches");
        return Ok(());
    }
    for candidate in &candidates {
        println!(
            "{:<22} {:>5.1}%  {}",
            candidate.hash_type,
            candidate.confidence,
            candidate.security_assessment.strength.name()
        );
        let traits = &candidate.characteristics;
        if let Some(rounds) = traits.rounds {
            println!("  rounds/cost: {rounds}");
        }
        if let Some(salt) = &traits.salt {
            println!("  salt: {salt}");
        }
        for vulnerability in &candidate.security_assessment.vulnerabilities {
            println!("  - {vulnerability}");
        }
    }
    Ok(())
}

fn cmd_analyze(config: Config, content: String, json: bool) -> anyhow::Result<()> {
    let analysis = Analyzer::new(config).analyze_input(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("Input Analysis:");
    println!("  Length:          {} bytes ({} chars)", analysis.length, analysis.char_count);
    println!("  Charset:         {:?}", analysis.charset);
    println!("  Entropy:         {:.3} bits/char", analysis.entropy);
    println!("  Language score:  {:.1}", analysis.language_score);
    println!("  IC:              {:.4}", analysis.index_of_coincidence);
    println!("  Printable:       {}", analysis.printable);
    if !analysis.likely_encodings.is_empty() {
        println!("  Likely:          {}", analysis.likely_encodings.join(", "));
    }
    Ok(())
}

fn cmd_encode(pattern: &str, content: String, output: Option<PathBuf>) -> anyhow::Result<()> {
    let encoded = PatternRegistry::global().encode(pattern, content.as_bytes())?;
    write_output(output, &encoded)
}

fn cmd_patterns(json: bool) -> anyhow::Result<()> {
    let registry = PatternRegistry::global();

    if json {
        let output: Vec<_> = registry
            .patterns()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "priority": p.priority,
                    "name": p.name,
                    "family": p.family.name(),
                    "description": p.description,
                    "encodable": p.can_encode(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{:<4} {:<18} {:<11} Description", "#", "Name", "Family");
    println!("{}", "-".repeat(72));
    for p in registry.patterns() {
        println!(
            "{:<4} {:<18} {:<11} {}",
            p.priority,
            p.name,
            p.family.name(),
            p.description
        );
    }
    Ok(())
}

fn print_result(label: &str, result: &DecodingResult) {
    println!("{label}: {} ({:.1}%)", result.kind, result.confidence);
    if result.steps.len() > 1 {
        println!("Steps:      {}", result.steps.join(" -> "));
    }
    println!("Result:     {}", result.result);
    println!(
        "Entropy {:.2}, language score {:.1}, valid text: {}",
        result.score_profile.entropy,
        result.score_profile.language_score,
        result.score_profile.is_valid_text
    );
    for warning in &result.warnings {
        println!("  note: {warning}");
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() > max_chars {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    let content = if let Some(path) = file {
        std::fs::read_to_string(path)?
    } else if let Some(s) = input.filter(|s| s != "-") {
        s
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };
    Ok(content.trim_end_matches(['\n', '\r']).to_string())
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}
