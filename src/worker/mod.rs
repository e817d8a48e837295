//! Worker pool for parallel mnemonic scanning.
//!
//! This module provides:
//! - Scan workers running generate → derive → check → record
//! - A fixed-size thread pool with a shared stop flag
//! - Progress tracking and discovery events

mod pool;
mod scanner;

pub use pool::{default_worker_count, ScanHit, WorkerPool, MAX_DEFAULT_WORKERS};
pub use scanner::{ScanContext, ScanWorker, WorkerSettings, WorkerStats, DEFAULT_PACE};
