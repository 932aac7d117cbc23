//! Trace-replay harness surrogate for the `tage-core` branch predictor.
//!
//! This binary stands in for the (out-of-scope) full microarchitectural
//! simulator: it reads a flat trace of branch records, drives
//! `predict`/`update` on a [`tage_core::TagePredictor`] (or the `gshare`
//! calibration baseline) in strict alternation, and reports prediction
//! accuracy. It demonstrates the core's external interface without claiming
//! to be a cycle-accurate simulator.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use tage_core::config::Config;
use tage_core::predictor::gshare::GSharePredictor;
use tage_core::predictor::tage::TagePredictor;
use tage_core::predictor::{BranchInfo, BranchPredictor};
use tage_core::stats::PredictorStats;

/// One line of a trace file: a dynamic conditional (or non-conditional)
/// branch instance, in the order it was fetched.
#[derive(Debug, Deserialize)]
struct TraceRecord {
    /// The branch instruction's address.
    address: u64,
    /// Whether this branch instance is conditional. Non-conditional
    /// branches are still replayed (the predictor's passthrough path), but
    /// never count toward accuracy.
    #[serde(default = "default_conditional")]
    conditional: bool,
    /// The branch's actual outcome.
    taken: bool,
    /// The branch's actual target address; accepted for trace-format
    /// symmetry with `update_branch`'s signature, but ignored by every
    /// predictor in this crate (direction-only).
    #[serde(default)]
    target: u64,
}

fn default_conditional() -> bool {
    true
}

/// Which predictor to replay the trace against.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PredictorKind {
    /// The TAGE engine (the crate's primary predictor).
    Tage,
    /// The gshare calibration baseline.
    Gshare,
}

/// Replays a branch trace against a direction predictor and reports accuracy.
#[derive(Debug, Parser)]
#[command(
    name = "tage-trace",
    author,
    version,
    about = "Replay a branch trace against the TAGE predictor core",
    long_about = "Reads a newline-delimited JSON trace of branch records (address, conditional,\n\
                   taken, target) from a file or stdin, drives predict/update on the predictor\n\
                   core in strict alternation, and reports prediction accuracy.\n\n\
                   Example trace line:\n  {\"address\": 4096, \"conditional\": true, \"taken\": true}"
)]
struct Cli {
    /// Trace file to replay. Reads from stdin when omitted or set to `-`.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Which predictor to replay the trace against.
    #[arg(short, long, value_enum, default_value_t = PredictorKind::Tage)]
    predictor: PredictorKind,

    /// JSON configuration file overriding the predictor's defaults (see
    /// `tage_core::config::Config`). Unset fields keep their built-in
    /// default values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt::try_init().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    let reader = open_trace(cli.trace.as_deref());

    let stats = match cli.predictor {
        PredictorKind::Tage => replay_tage(&config, reader),
        PredictorKind::Gshare => replay_gshare(&config, reader),
    };

    stats.print();
}

/// Loads a predictor [`Config`] from `path`, or the built-in defaults when
/// no path was given.
fn load_config(path: Option<&std::path::Path>) -> Config {
    let Some(path) = path else { return Config::default() };

    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: could not read config file '{}': {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: malformed config file '{}': {e}", path.display());
        process::exit(1);
    })
}

/// Opens the trace source: `path`, or stdin when `path` is `None` or `-`.
fn open_trace(path: Option<&std::path::Path>) -> Box<dyn BufRead> {
    match path {
        None => Box::new(BufReader::new(io::stdin())),
        Some(p) if p.as_os_str() == "-" => Box::new(BufReader::new(io::stdin())),
        Some(p) => {
            let file = File::open(p).unwrap_or_else(|e| {
                eprintln!("error: could not open trace file '{}': {e}", p.display());
                process::exit(1);
            });
            Box::new(BufReader::new(file))
        }
    }
}

/// Parses one trace line, exiting the process on malformed input (a trace
/// file is a build artifact of the harness, not end-user input to recover
/// gracefully from).
fn parse_line(line_no: usize, line: &str) -> Option<TraceRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(record) => Some(record),
        Err(e) => {
            eprintln!("error: malformed trace record at line {line_no}: {e}");
            process::exit(1);
        }
    }
}

/// Replays the trace against the TAGE engine, attributing each prediction to
/// the tagged table (or the bimodal base) that provided it.
fn replay_tage(config: &Config, reader: Box<dyn BufRead>) -> PredictorStats {
    let mut predictor = TagePredictor::new(&config.tage);
    let mut stats = PredictorStats::new(config.tage.num_tables);

    for (i, line) in reader.lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error: could not read trace line {}: {e}", i + 1);
            process::exit(1);
        });
        let Some(record) = parse_line(i + 1, &line) else { continue };

        let info = BranchInfo { address: record.address, flags: flags_for(record.conditional) };
        let handle = predictor.predict_branch(&info);
        if record.conditional {
            let provider = predictor.last_prime_table();
            stats.record(handle.direction_prediction == record.taken, provider);
        }
        predictor.update_branch(handle, record.taken, record.target);
    }

    stats
}

/// Replays the trace against the gshare calibration baseline. gshare has no
/// tagged tables, so every prediction is attributed to the base table.
fn replay_gshare(config: &Config, reader: Box<dyn BufRead>) -> PredictorStats {
    let mut predictor = GSharePredictor::new(&config.gshare);
    let mut stats = PredictorStats::new(0);

    for (i, line) in reader.lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error: could not read trace line {}: {e}", i + 1);
            process::exit(1);
        });
        let Some(record) = parse_line(i + 1, &line) else { continue };

        let info = BranchInfo { address: record.address, flags: flags_for(record.conditional) };
        let handle = predictor.predict_branch(&info);
        if record.conditional {
            stats.record(handle.direction_prediction == record.taken, None);
        }
        predictor.update_branch(handle, record.taken, record.target);
    }

    stats
}

fn flags_for(conditional: bool) -> u32 {
    if conditional { tage_core::predictor::BR_CONDITIONAL } else { 0 }
}
