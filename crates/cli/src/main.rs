//! BLASTN accelerator model CLI.
//!
//! This binary drives the functional models from the command line. It provides:
//! 1. **Extend:** Run one seed extension over two packed 16-symbol words.
//! 2. **Search:** Run the host-side k-mer seed search over a sequence file.
//! 3. **Cache check:** Replay generated traffic through the cache and the reference model and compare every response.

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blastn_xcel_core::align::{self, Hsp, SeedExtender, SeedSearch, slice_window};
use blastn_xcel_core::cache::{CacheEngine, ReferenceModel, TrafficGen, TrafficPattern};
use blastn_xcel_core::config::Config;
use blastn_xcel_core::mem::SparseMemory;
use blastn_xcel_core::stats::CacheStats;

/// Mismatches logged individually before the rest are only counted.
const MAX_REPORTED_MISMATCHES: usize = 8;

#[derive(Parser, Debug)]
#[command(
    name = "blastn-xcel",
    author,
    version,
    about = "BLASTN seed-extension accelerator models",
    long_about = "Run the seed-extension engine, the host seed search, or a randomized cache check.\n\nLogging is controlled with RUST_LOG (e.g. RUST_LOG=blastn_xcel_core=debug).\n\nExamples:\n  blastn-xcel extend --query 0x00000000 --database 0x00000000 --q-start 8 --d-start 8\n  blastn-xcel search --query AGCTGAC --database database.txt\n  blastn-xcel cache-check --pattern history --count 5000"
)]
struct Cli {
    /// JSON configuration file; built-in defaults otherwise.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extend a seed inside two packed 16-symbol words.
    Extend {
        /// Packed query word (hex, 2 bits per symbol, first symbol in the low bits).
        #[arg(long, value_parser = parse_word)]
        query: u32,

        /// Packed database word (hex).
        #[arg(long, value_parser = parse_word)]
        database: u32,

        /// Query seed offset.
        #[arg(long)]
        q_start: usize,

        /// Database seed offset.
        #[arg(long)]
        d_start: usize,

        /// Slice the words around a shared hit position and extend in window coordinates.
        #[arg(long)]
        window: bool,
    },

    /// Seed-search a query against a file of subject sequences (one per line).
    Search {
        /// Query sequence (ACGT).
        #[arg(short, long)]
        query: String,

        /// Subject sequence file.
        #[arg(short, long)]
        database: PathBuf,

        /// Seed word length.
        #[arg(long)]
        kmer: Option<usize>,

        /// Report HSPs scoring strictly above this.
        #[arg(long, allow_hyphen_values = true)]
        min_score: Option<i32>,
    },

    /// Cross-check the cache engine against the reference model on generated traffic.
    CacheCheck {
        /// Traffic pattern (kebab-case, e.g. `low-addr`, `history`); all patterns if omitted.
        #[arg(short, long, value_parser = parse_pattern)]
        pattern: Option<TrafficPattern>,

        /// Accesses per pattern.
        #[arg(short = 'n', long, default_value_t = 1000)]
        count: usize,

        /// Generator seed.
        #[arg(short, long, default_value_t = 0xdead_beef)]
        seed: u64,
    },
}

/// Outcome of one cache-check run.
#[derive(Serialize, Debug)]
struct CheckReport {
    pattern: TrafficPattern,
    accesses: usize,
    mismatches: usize,
    stats: CacheStats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref().map(Config::from_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => fail(&format!("config: {e}")),
    };

    match cli.command {
        Commands::Extend {
            query,
            database,
            q_start,
            d_start,
            window,
        } => cmd_extend(&config, query, database, (q_start, d_start), window),
        Commands::Search {
            query,
            database,
            kmer,
            min_score,
        } => cmd_search(config, &query, &database, kmer, min_score),
        Commands::CacheCheck {
            pattern,
            count,
            seed,
        } => cmd_cache_check(&config, pattern, count, seed),
    }
}

/// Runs one extension and prints the alignment as JSON.
fn cmd_extend(config: &Config, query: u32, database: u32, seeds: (usize, usize), window: bool) {
    let extender = SeedExtender::new(config.extend);
    let result = if window {
        slice_window(query, database, seeds.0, seeds.1)
            .and_then(|w| extender.extend_window(&w))
    } else {
        extender.extend_packed(query, database, seeds.0, seeds.1)
    };
    match result {
        Ok(aln) => print_json(&aln),
        Err(e) => fail(&format!("extend: {e}")),
    }
}

/// Runs the seed search and prints the filtered HSPs as JSON lines, then the best set.
fn cmd_search(
    mut config: Config,
    query: &str,
    database: &Path,
    kmer: Option<usize>,
    min_score: Option<i32>,
) {
    if let Some(k) = kmer {
        config.search.kmer = k;
    }
    if let Some(s) = min_score {
        config.search.min_score = s;
    }

    let text = fs::read_to_string(database)
        .unwrap_or_else(|e| fail(&format!("cannot read {}: {e}", database.display())));
    let subjects: Vec<Vec<u8>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(align::encode)
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| fail(&format!("database: {e}")));
    let query = align::encode(query).unwrap_or_else(|e| fail(&format!("query: {e}")));

    let search = SeedSearch::new(SeedExtender::new(config.extend), config.search);
    let hsps = search
        .search(&query, &subjects)
        .unwrap_or_else(|e| fail(&format!("search: {e}")));
    let filtered = search.filter(&hsps);
    for hsp in &filtered {
        print_json(hsp);
    }

    let best: Vec<Hsp> = SeedSearch::best(&filtered);
    info!(hsps = hsps.len(), reported = filtered.len(), best = best.len(), "search done");
    print_json(&serde_json::json!({ "best": best }));
}

/// Replays traffic through both models; exits with status 1 on any mismatch.
fn cmd_cache_check(config: &Config, pattern: Option<TrafficPattern>, count: usize, seed: u64) {
    let patterns = pattern.map_or_else(|| TrafficPattern::ALL.to_vec(), |p| vec![p]);
    let mut failed = false;

    for pattern in patterns {
        let report = check_pattern(config, pattern, count, seed)
            .unwrap_or_else(|e| fail(&format!("cache-check: {e}")));
        failed |= report.mismatches > 0;
        print_json(&report);
    }

    if failed {
        process::exit(1);
    }
}

fn check_pattern(
    config: &Config,
    pattern: TrafficPattern,
    count: usize,
    seed: u64,
) -> Result<CheckReport, Box<dyn std::error::Error>> {
    let mut engine = CacheEngine::new(&config.cache, SparseMemory::new())?;
    let mut model = ReferenceModel::new(&config.cache, SparseMemory::new())?;
    let mut mismatches = 0;

    for op in TrafficGen::new(pattern, seed).take(count) {
        let (req, expected) = model.expect(op);
        let actual = engine.handle(&req)?;
        if actual != expected {
            mismatches += 1;
            if mismatches <= MAX_REPORTED_MISMATCHES {
                warn!(%req, %expected, %actual, "cache mismatch");
            }
        }
    }

    Ok(CheckReport {
        pattern,
        accesses: count,
        mismatches,
        stats: *engine.stats(),
    })
}

fn parse_word(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X").replace('_', "");
    u32::from_str_radix(&digits, 16).map_err(|e| format!("invalid word {s:?}: {e}"))
}

fn parse_pattern(s: &str) -> Result<TrafficPattern, String> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| format!("unknown pattern {s:?}"))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => fail(&format!("serialize: {e}")),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}
