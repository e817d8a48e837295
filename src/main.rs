//! Mnemonic scanner CLI
//!
//! Usage:
//!   mnemonic_scan                          # Defaults, credentials from .env
//!   mnemonic_scan -w 2 --delay-ms 500      # Two workers, slower pace
//!   mnemonic_scan --filter my.bloom -n 1   # Stop after the first discovery

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mnemonic_scan::checker::Classification;
use mnemonic_scan::{
    AddressChecker, BloomFilter, Config, EsploraClient, Recorder, ScanContext, ScanHit,
    TelegramNotifier, Wordlist, WorkerPool,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() {
    // A missing .env is fine; the environment may already be set
    let _ = dotenvy::dotenv();
    init_logging();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let wordlist = Wordlist::load(&config.wordlist)
        .with_context(|| format!("failed to load word list {}", config.wordlist.display()))?;
    let filter = BloomFilter::load(&config.filter)
        .with_context(|| format!("failed to load filter {}", config.filter.display()))?;
    info!(
        words = wordlist.len(),
        addresses = filter.len(),
        bits = filter.num_bits(),
        "inputs loaded"
    );

    let credentials = config.credentials()?;
    let notifier = TelegramNotifier::new(
        &config.telegram_api,
        credentials.token,
        credentials.chat_id,
        config.request_timeout(),
    )
    .context("failed to build notification client")?;
    let ledger = EsploraClient::new(config.ledger_url.as_str(), config.request_timeout())
        .context("failed to build ledger client")?;

    let recorder = Recorder::new(config.output_files(), Arc::new(notifier));
    recorder.announce("🚀 Scanner started, checking phrases...");
    recorder
        .files()
        .touch()
        .context("failed to create result files")?;

    let context = ScanContext {
        wordlist: Arc::new(wordlist),
        checker: AddressChecker::new(Arc::new(filter), Arc::new(ledger)),
        recorder,
    };

    // Print startup info
    println!("Mnemonic Scanner");
    println!("================");
    println!("Word list:  {}", config.wordlist.display());
    println!("Filter:     {}", config.filter.display());
    println!("Ledger:     {}", config.ledger_url);
    println!("Workers:    {}", config.worker_count());
    println!("Delay:      {}ms", config.delay_ms);
    println!();

    let pool = WorkerPool::new(config.worker_count(), config.worker_settings(), context)
        .context("failed to spawn workers")?;

    // Set up ctrl-c handler
    ctrlc_handler(pool.stop_flag_clone())?;

    println!("Scanning... (Press Ctrl+C to stop)\n");

    let report_interval = Duration::from_secs(config.report_interval);
    let mut last_report = Instant::now();

    loop {
        // Short waits so Ctrl+C is noticed promptly
        if let Some(hit) = pool.wait_for_hit(POLL_INTERVAL) {
            print_hit(&hit);
        }

        if pool.target_reached(config.count) {
            while let Some(hit) = pool.try_recv() {
                print_hit(&hit);
            }
            println!(
                "\nTarget reached! Recorded {} discovery(ies).",
                pool.total_discoveries()
            );
            break;
        }

        if last_report.elapsed() >= report_interval {
            print_progress(&pool);
            last_report = Instant::now();
        }

        if pool.is_stopped() {
            println!("\nStopping, waiting for workers to finish their current candidate...");
            break;
        }

        if pool.is_finished() {
            // Drain hits sent just before the workers exited
            while let Some(hit) = pool.try_recv() {
                print_hit(&hit);
            }
            println!("\nAll workers reached their candidate limit.");
            break;
        }
    }

    let candidates = pool.total_candidates();
    let filter_hits = pool.total_filter_hits();
    let discoveries = pool.total_discoveries();
    let elapsed = pool.elapsed();
    let rate = pool.candidates_per_second();
    pool.join();

    println!("\n--- Final Statistics ---");
    println!("Addresses checked:    {}", format_number(candidates));
    println!("Filter hits:          {}", filter_hits);
    println!("Discoveries:          {}", discoveries);
    println!("Time elapsed:         {:.2}s", elapsed.as_secs_f64());
    println!("Average speed:        {:.2}/s", rate);

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mnemonic_scan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_hit(hit: &ScanHit) {
    let label = match hit.classification {
        Classification::Funded => "FUNDED",
        Classification::Active => "ACTIVE",
        Classification::Empty => "EMPTY",
    };
    println!("=== {} ===", label);
    println!("Address: {}", hit.address);
    println!("Balance: {:.8} BTC", hit.balance_btc);
    match &hit.path {
        Some(path) => println!("Saved:   {}", path.display()),
        None => println!("Saved:   NOT SAVED (see log)"),
    }
    println!("Worker:  {}", hit.worker_id);
    println!();
}

fn print_progress(pool: &WorkerPool) {
    println!(
        "[{:>5}s] Checked {} addresses ({:.2}/s), {} filter hits, {} discoveries",
        pool.elapsed().as_secs(),
        format_number(pool.total_candidates()),
        pool.candidates_per_second(),
        pool.total_filter_hits(),
        pool.total_discoveries()
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to set Ctrl-C handler")
}
