//! Worker pool management.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::checker::Classification;

use super::scanner::{ScanContext, ScanWorker, WorkerSettings, WorkerStats};

/// Upper bound on the default worker count, to spare the ledger service.
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Available CPUs, capped at [`MAX_DEFAULT_WORKERS`].
pub fn default_worker_count() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

/// A recorded discovery, reported to the coordinating thread.
#[derive(Debug, Clone)]
pub struct ScanHit {
    /// The ID of the worker that found this result
    pub worker_id: usize,
    pub classification: Classification,
    pub address: String,
    pub balance_btc: f64,
    /// File the record was appended to (`None` if writing failed)
    pub path: Option<PathBuf>,
}

/// Manages a fixed set of scan worker threads.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for discoveries
    hit_rx: Receiver<ScanHit>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` scan workers sharing `context`.
    pub fn new(
        num_workers: usize,
        settings: WorkerSettings,
        context: ScanContext,
    ) -> io::Result<Self> {
        let (hit_tx, hit_rx) = bounded(100);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());

        let handles = Self::spawn_workers(
            num_workers,
            settings,
            context,
            hit_tx,
            stop_flag.clone(),
            stats.clone(),
        )?;

        Ok(Self {
            num_workers,
            handles: Some(handles),
            hit_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Spawns worker threads. On failure, already started workers are stopped.
    fn spawn_workers(
        num_workers: usize,
        settings: WorkerSettings,
        context: ScanContext,
        hit_tx: Sender<ScanHit>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> io::Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let context = context.clone();
            let hit_tx = hit_tx.clone();
            let worker_stop = stop_flag.clone();
            let stats = stats.clone();

            let spawned = thread::Builder::new()
                .name(format!("scan-worker-{}", id))
                .spawn(move || {
                    let worker = ScanWorker::new(id, settings, context, hit_tx, worker_stop, stats);
                    worker.run();
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop_flag.store(true, Ordering::Relaxed);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(e);
                }
            }
        }

        Ok(handles)
    }

    /// Waits for a discovery with timeout.
    ///
    /// Returns `Some(hit)` if one arrives, `None` if the timeout expires.
    pub fn wait_for_hit(&self, timeout: Duration) -> Option<ScanHit> {
        self.hit_rx.recv_timeout(timeout).ok()
    }

    /// Attempts to receive a discovery without blocking.
    pub fn try_recv(&self) -> Option<ScanHit> {
        self.hit_rx.try_recv().ok()
    }

    /// Signals all workers to stop after their current iteration.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops all workers and waits for them to complete.
    pub fn join(mut self) {
        self.stop();
        self.join_handles();
    }

    fn join_handles(&mut self) {
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns true once every worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handles
            .as_ref()
            .map_or(true, |handles| handles.iter().all(|h| h.is_finished()))
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the shared statistics.
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Returns the total addresses checked across all workers.
    pub fn total_candidates(&self) -> u64 {
        self.stats.total_candidates()
    }

    /// Returns the total filter-positive addresses.
    pub fn total_filter_hits(&self) -> u64 {
        self.stats.total_filter_hits()
    }

    /// Returns the total discoveries (funded and active).
    pub fn total_discoveries(&self) -> u64 {
        self.stats.total_discoveries()
    }

    /// Whether at least `target` discoveries were made. Zero means no target.
    ///
    /// Counts from the worker stats, so hits dropped on a full channel still
    /// count.
    pub fn target_reached(&self, target: u64) -> bool {
        target > 0 && self.total_discoveries() >= target
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current checking rate (addresses per second).
    pub fn candidates_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_candidates() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        // Wait for workers to finish if they haven't been joined
        self.join_handles();
    }
}
