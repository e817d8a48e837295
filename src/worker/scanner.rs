//! Scan worker loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use secp256k1::{Secp256k1, SignOnly};
use tracing::{debug, error, info, warn};

use crate::checker::{AddressChecker, Classification};
use crate::crypto::Keypair;
use crate::mnemonic::{MnemonicGenerator, Wordlist};
use crate::recorder::{Discovery, Recorder};

use super::ScanHit;

/// Delay between iterations, bounding the ledger request rate.
pub const DEFAULT_PACE: Duration = Duration::from_millis(300);

/// Shared statistics for all workers.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Addresses derived and checked
    pub candidates: AtomicU64,
    /// Addresses the filter reported as possible members
    pub filter_hits: AtomicU64,
    /// Addresses with a positive balance
    pub funded: AtomicU64,
    /// Addresses with history but no balance
    pub active: AtomicU64,
    /// Private keys outside the curve order
    pub rejected_keys: AtomicU64,
    /// Discoveries that could not be written
    pub record_failures: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of addresses checked.
    pub fn total_candidates(&self) -> u64 {
        self.candidates.load(Ordering::Relaxed)
    }

    /// Returns the number of filter-positive addresses.
    pub fn total_filter_hits(&self) -> u64 {
        self.filter_hits.load(Ordering::Relaxed)
    }

    /// Returns funded plus active discoveries.
    pub fn total_discoveries(&self) -> u64 {
        self.funded.load(Ordering::Relaxed) + self.active.load(Ordering::Relaxed)
    }
}

/// Per-worker loop settings.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Sleep after every iteration
    pub pace: Duration,
    /// Stop after this many iterations (`None` = until stopped)
    pub candidate_limit: Option<u64>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            pace: DEFAULT_PACE,
            candidate_limit: None,
        }
    }
}

/// Handles shared by every worker.
#[derive(Clone)]
pub struct ScanContext {
    pub wordlist: Arc<Wordlist>,
    pub checker: AddressChecker,
    pub recorder: Recorder,
}

/// A worker that generates, checks and records candidates.
pub struct ScanWorker {
    /// Worker ID
    id: usize,
    settings: WorkerSettings,
    context: ScanContext,
    /// Channel to report discoveries
    hit_tx: Sender<ScanHit>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
}

impl ScanWorker {
    /// Creates a new scan worker.
    pub fn new(
        id: usize,
        settings: WorkerSettings,
        context: ScanContext,
        hit_tx: Sender<ScanHit>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            settings,
            context,
            hit_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// The stop flag and the candidate limit are checked between iterations,
    /// so an iteration in progress always completes.
    pub fn run(&self) {
        let secp = Secp256k1::signing_only();
        let mut generator = MnemonicGenerator::new(self.context.wordlist.clone());
        let mut iterations = 0u64;

        info!(worker = self.id, "worker started");

        while !self.stop_flag.load(Ordering::Relaxed) {
            if self
                .settings
                .candidate_limit
                .is_some_and(|limit| iterations >= limit)
            {
                break;
            }

            self.scan_one(&secp, &mut generator);
            iterations += 1;

            if !self.settings.pace.is_zero() {
                thread::sleep(self.settings.pace);
            }
        }

        info!(worker = self.id, iterations, "worker stopped");
    }

    fn scan_one(&self, secp: &Secp256k1<SignOnly>, generator: &mut MnemonicGenerator) {
        let mnemonic = generator.next_mnemonic();

        let keypair = match Keypair::from_mnemonic_with(secp, mnemonic.as_str()) {
            Ok(keypair) => keypair,
            Err(e) => {
                self.stats.rejected_keys.fetch_add(1, Ordering::Relaxed);
                warn!(worker = self.id, error = %e, "skipping candidate");
                return;
            }
        };

        let outcome = self.context.checker.check(keypair.address());
        self.stats.candidates.fetch_add(1, Ordering::Relaxed);
        if outcome.filter_hit {
            self.stats.filter_hits.fetch_add(1, Ordering::Relaxed);
        }

        debug!(
            worker = self.id,
            address = keypair.address(),
            balance = outcome.activity.balance_btc,
            active = outcome.activity.active,
            "checked"
        );

        let classification = outcome.classification();
        match classification {
            Classification::Funded => self.stats.funded.fetch_add(1, Ordering::Relaxed),
            Classification::Active => self.stats.active.fetch_add(1, Ordering::Relaxed),
            Classification::Empty => return,
        };

        let discovery = Discovery {
            mnemonic: mnemonic.to_string(),
            private_key_hex: keypair.private_key_hex(),
            address: keypair.address().to_string(),
            balance_btc: outcome.activity.balance_btc,
        };

        let path = match self
            .context
            .recorder
            .record_classified(classification, &discovery)
        {
            Ok(path) => path,
            Err(e) => {
                self.stats.record_failures.fetch_add(1, Ordering::Relaxed);
                error!(worker = self.id, error = %e, "failed to record discovery");
                None
            }
        };

        // Never block on a full channel; the record is already on disk
        let _ = self.hit_tx.try_send(ScanHit {
            worker_id: self.id,
            classification,
            address: discovery.address,
            balance_btc: discovery.balance_btc,
            path,
        });
    }
}
