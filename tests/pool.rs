//! Worker pool integration tests against shared result files.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mnemonic_scan::filter::MembershipFilter;
use mnemonic_scan::ledger::{AddressActivity, LedgerLookup, LookupError};
use mnemonic_scan::notify::{Notifier, NotifyError};
use mnemonic_scan::recorder::RECORD_SEPARATOR;
use mnemonic_scan::{
    AddressChecker, BloomFilter, Keypair, OutputFiles, Recorder, ScanContext, WorkerPool,
    WorkerSettings, Wordlist,
};

struct AcceptAll;

impl MembershipFilter for AcceptAll {
    fn maybe_contains(&self, _item: &str) -> bool {
        true
    }
}

struct RejectAll;

impl MembershipFilter for RejectAll {
    fn maybe_contains(&self, _item: &str) -> bool {
        false
    }
}

struct StubLedger {
    calls: AtomicUsize,
    activity: AddressActivity,
}

impl StubLedger {
    fn new(balance_btc: f64, active: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            activity: AddressActivity { balance_btc, active },
        })
    }
}

impl LedgerLookup for StubLedger {
    fn fetch(&self, _address: &str) -> Result<AddressActivity, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.activity)
    }
}

#[derive(Default)]
struct CountingNotifier {
    sent: AtomicUsize,
}

impl Notifier for CountingNotifier {
    fn send(&self, _text: &str) -> Result<(), NotifyError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn wordlist(size: usize) -> Arc<Wordlist> {
    let words = (0..size).map(|i| format!("word{}", i)).collect();
    Arc::new(Wordlist::from_words(words).unwrap())
}

fn output_files(dir: &Path) -> OutputFiles {
    OutputFiles {
        found: dir.join("found_wallets.txt"),
        active: dir.join("active_wallets.txt"),
    }
}

fn run_to_completion(pool: WorkerPool) {
    let deadline = Instant::now() + Duration::from_secs(60);
    while !pool.is_finished() {
        assert!(Instant::now() < deadline, "workers did not finish");
        std::thread::sleep(Duration::from_millis(10));
    }
    pool.join();
}

/// Splits a result file into record blocks, checking every block's shape.
fn parse_blocks(contents: &str) -> Vec<Vec<String>> {
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len() % 5, 0, "partial block in file");

    lines
        .chunks(5)
        .map(|block| {
            assert!(block[0].starts_with("Mnemonic: "), "bad block: {:?}", block);
            assert!(block[1].starts_with("Private Key (hex): "), "bad block: {:?}", block);
            assert!(block[2].starts_with("Address: 1"), "bad block: {:?}", block);
            assert!(block[3].starts_with("Balance: ") && block[3].ends_with(" BTC"));
            assert_eq!(block[4], RECORD_SEPARATOR);

            let mnemonic = &block[0]["Mnemonic: ".len()..];
            let key_hex = &block[1]["Private Key (hex): ".len()..];
            let address = &block[2]["Address: ".len()..];

            // Every record must be internally consistent
            let keypair = Keypair::from_mnemonic(mnemonic).unwrap();
            assert_eq!(keypair.private_key_hex(), key_hex);
            assert_eq!(keypair.address(), address);

            block.iter().map(|l| l.to_string()).collect()
        })
        .collect()
}

#[test]
fn concurrent_workers_write_intact_blocks() {
    const WORKERS: usize = 4;
    const PER_WORKER: u64 = 25;

    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(CountingNotifier::default());
    let ledger = StubLedger::new(0.5, true);

    let context = ScanContext {
        wordlist: wordlist(2048),
        checker: AddressChecker::new(Arc::new(AcceptAll), ledger.clone()),
        recorder: Recorder::new(output_files(dir.path()), notifier.clone()),
    };
    let settings = WorkerSettings {
        pace: Duration::ZERO,
        candidate_limit: Some(PER_WORKER),
    };

    let pool = WorkerPool::new(WORKERS, settings, context).unwrap();
    assert_eq!(pool.num_workers(), WORKERS);
    run_to_completion(pool);

    let expected = WORKERS * PER_WORKER as usize;
    let found = std::fs::read_to_string(dir.path().join("found_wallets.txt")).unwrap();
    assert_eq!(found.matches(RECORD_SEPARATOR).count(), expected);
    assert_eq!(parse_blocks(&found).len(), expected);

    assert_eq!(ledger.calls.load(Ordering::SeqCst), expected);
    assert_eq!(notifier.sent.load(Ordering::SeqCst), expected);
    assert!(!dir.path().join("active_wallets.txt").exists());
}

#[test]
fn rejecting_filter_never_reaches_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = StubLedger::new(1.0, true);

    let context = ScanContext {
        wordlist: wordlist(2048),
        checker: AddressChecker::new(Arc::new(RejectAll), ledger.clone()),
        recorder: Recorder::new(output_files(dir.path()), Arc::new(CountingNotifier::default())),
    };
    let settings = WorkerSettings {
        pace: Duration::ZERO,
        candidate_limit: Some(100),
    };

    let pool = WorkerPool::new(3, settings, context).unwrap();
    let stats_check = |pool: &WorkerPool| (pool.total_candidates(), pool.total_filter_hits());
    let deadline = Instant::now() + Duration::from_secs(60);
    while !pool.is_finished() {
        assert!(Instant::now() < deadline);
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(stats_check(&pool), (300, 0));
    assert!(pool.try_recv().is_none());
    pool.join();

    assert_eq!(ledger.calls.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("found_wallets.txt").exists());
}

#[test]
fn bloom_filter_gates_known_address() {
    let dir = tempfile::tempdir().unwrap();

    // A one-word list makes every phrase, and so every address, the same
    let words = wordlist(1);
    let phrase = vec!["word0"; 12].join(" ");
    let target = Keypair::from_mnemonic(&phrase).unwrap();

    let mut filter = BloomFilter::with_capacity(100, 0.01).unwrap();
    filter.insert(target.address()).unwrap();

    let ledger = StubLedger::new(0.0, true);
    let context = ScanContext {
        wordlist: words,
        checker: AddressChecker::new(Arc::new(filter), ledger.clone()),
        recorder: Recorder::new(output_files(dir.path()), Arc::new(CountingNotifier::default())),
    };
    let settings = WorkerSettings {
        pace: Duration::ZERO,
        candidate_limit: Some(3),
    };

    let pool = WorkerPool::new(2, settings, context).unwrap();
    run_to_completion(pool);

    let active = std::fs::read_to_string(dir.path().join("active_wallets.txt")).unwrap();
    let blocks = parse_blocks(&active);
    assert_eq!(blocks.len(), 6);

    let addresses: HashSet<&str> = blocks.iter().map(|b| b[2].as_str()).collect();
    assert_eq!(addresses.len(), 1);
    assert!(addresses.contains(format!("Address: {}", target.address()).as_str()));
    assert_eq!(ledger.calls.load(Ordering::SeqCst), 6);
}

#[test]
fn discovery_target_counts_hits_beyond_channel_capacity() {
    const WORKERS: usize = 2;
    const PER_WORKER: u64 = 80;

    let dir = tempfile::tempdir().unwrap();
    let context = ScanContext {
        wordlist: wordlist(2048),
        checker: AddressChecker::new(Arc::new(AcceptAll), StubLedger::new(0.1, true)),
        recorder: Recorder::new(output_files(dir.path()), Arc::new(CountingNotifier::default())),
    };
    let settings = WorkerSettings {
        pace: Duration::ZERO,
        candidate_limit: Some(PER_WORKER),
    };

    let pool = WorkerPool::new(WORKERS, settings, context).unwrap();
    let deadline = Instant::now() + Duration::from_secs(60);
    while !pool.is_finished() {
        assert!(Instant::now() < deadline, "workers did not finish");
        std::thread::sleep(Duration::from_millis(10));
    }

    // Nobody drained the channel, so some hits were dropped
    let expected = WORKERS as u64 * PER_WORKER;
    let mut delivered = 0u64;
    while pool.try_recv().is_some() {
        delivered += 1;
    }
    assert!(delivered < expected);

    assert_eq!(pool.total_discoveries(), expected);
    assert!(pool.target_reached(expected));
    assert!(!pool.target_reached(expected + 1));
    assert!(!pool.target_reached(0));
    pool.join();

    let found = std::fs::read_to_string(dir.path().join("found_wallets.txt")).unwrap();
    assert_eq!(found.matches(RECORD_SEPARATOR).count(), expected as usize);
}

#[test]
fn stop_flag_ends_unbounded_workers() {
    let dir = tempfile::tempdir().unwrap();
    let context = ScanContext {
        wordlist: wordlist(2048),
        checker: AddressChecker::new(Arc::new(RejectAll), StubLedger::new(0.0, false)),
        recorder: Recorder::new(output_files(dir.path()), Arc::new(CountingNotifier::default())),
    };
    let settings = WorkerSettings {
        pace: Duration::from_millis(5),
        candidate_limit: None,
    };

    let pool = WorkerPool::new(2, settings, context).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    assert!(!pool.is_finished());

    let stop_flag = pool.stop_flag_clone();
    stop_flag.store(true, Ordering::Relaxed);
    assert!(pool.is_stopped());

    let started = Instant::now();
    pool.join();
    assert!(started.elapsed() < Duration::from_secs(5));
}
