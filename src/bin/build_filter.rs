//! Builds a Bloom filter file from a list of addresses.
//!
//! Usage:
//!   build_filter -i funded_addresses.txt -o legacy_addresses.bloom
//!   build_filter -i addresses.txt -o small.bloom --error-rate 0.001

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use mnemonic_scan::filter::{is_supported_address, BloomFilter};

/// Build a membership filter from newline-delimited addresses
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file, one address per line
    #[arg(short, long)]
    input: PathBuf,

    /// Output filter file
    #[arg(short, long, default_value = "legacy_addresses.bloom")]
    output: PathBuf,

    /// False-positive rate at capacity
    #[arg(short, long, default_value = "0.01")]
    error_rate: f64,

    /// Filter capacity (default: number of addresses in the input)
    #[arg(short, long)]
    capacity: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "build_filter=info".into()),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn read_addresses(args: &Args) -> Result<Vec<String>> {
    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    let mut addresses = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.context("failed to read input")?;
        let address = line.trim();
        if !address.is_empty() {
            addresses.push(address.to_string());
        }
    }
    Ok(addresses)
}

fn run(args: Args) -> Result<()> {
    let addresses = read_addresses(&args)?;
    let capacity = args.capacity.unwrap_or(addresses.len() as u64);

    let skipped = addresses.iter().filter(|a| !is_supported_address(a)).count();
    if skipped > 0 {
        warn!(skipped, "input contains addresses the scanner never checks");
    }

    let mut filter = BloomFilter::with_capacity(capacity, args.error_rate)?;
    for address in &addresses {
        filter.insert(address)?;
    }

    filter
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        addresses = filter.len(),
        capacity = filter.capacity(),
        bits = filter.num_bits(),
        output = %args.output.display(),
        "filter written"
    );
    Ok(())
}
