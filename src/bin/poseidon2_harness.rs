//! The design philosophy underlying `bounded_poseidon2` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates a discrete concept in modern computational complexity theory,
//! illustrating how modest abstractions compose into a cohesive proof infrastructure.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for future cryptographic research.
//! Command-line front end for the Poseidon2 conformance harness.
//!
//! ```text
//! poseidon2-harness <params.json>
//! poseidon2-harness --zero [--groth16] [--seed N]
//! ```
//!
//! The report is printed to stdout as JSON.  The exit status is non-zero when
//! the witness does not satisfy the circuit or the proof is rejected.  Log
//! verbosity follows `RUST_LOG`.

use bounded_poseidon2::{run_harness, HarnessMode, HarnessParams, WIDTH};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn usage() -> ! {
    fatal("Usage: poseidon2-harness <params.json> | --zero [--groth16] [--seed N]");
}

fn parse_flags(args: Vec<String>) -> HarnessParams {
    let mut params = HarnessParams::new([0; WIDTH]);
    let mut iter = args.into_iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--groth16" => params.mode = HarnessMode::Groth16,
            "--seed" => {
                let raw = iter.next().unwrap_or_else(|| usage());
                params.seed = raw
                    .parse()
                    .unwrap_or_else(|_| fatal(&format!("invalid seed: {raw}")));
            }
            other => fatal(&format!("unknown flag: {other}")),
        }
    }
    params
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let params = match args.next().as_deref() {
        Some("--zero") => parse_flags(args.collect()),
        Some("-h") | Some("--help") | None => usage(),
        Some(path) => HarnessParams::load(Path::new(path))
            .unwrap_or_else(|err| fatal(&format!("failed to load {path}: {err}"))),
    };

    let report = run_harness(&params).unwrap_or_else(|err| fatal(&format!("harness error: {err}")));
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => fatal(&format!("failed to encode report: {err}")),
    }
    if !report.passed() {
        std::process::exit(2);
    }
}
