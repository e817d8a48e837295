//! Persisting and reporting discoveries.
//!
//! All workers share one [`Recorder`]. Its lock is held for the whole
//! append-and-notify sequence so record blocks and messages never interleave.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::checker::Classification;
use crate::notify::Notifier;

/// Line written after every record block.
pub const RECORD_SEPARATOR: &str =
    "============================================================";

/// Errors from appending a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A candidate that had a balance or transaction history.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub mnemonic: String,
    pub private_key_hex: String,
    pub address: String,
    pub balance_btc: f64,
}

impl Discovery {
    /// Formats the five-line block appended to the result file.
    pub fn record_block(&self) -> String {
        format!(
            "Mnemonic: {}\nPrivate Key (hex): {}\nAddress: {}\nBalance: {:.8} BTC\n{}\n",
            self.mnemonic, self.private_key_hex, self.address, self.balance_btc, RECORD_SEPARATOR
        )
    }

    /// Formats the Markdown notification for this discovery.
    pub fn notification(&self, file: &Path) -> String {
        format!(
            "🔐 *Wallet found!*\n`{}`\n*Address:* `{}`\n*Balance:* `{:.8}` BTC\n*Mnemonic:* `{}`\n*Private key:* `{}`",
            file.display(),
            self.address,
            self.balance_btc,
            self.mnemonic,
            self.private_key_hex
        )
    }
}

/// The two result files.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    /// Addresses with a positive balance
    pub found: PathBuf,
    /// Addresses with history but no balance
    pub active: PathBuf,
}

impl OutputFiles {
    /// Returns the file a classification is recorded to, if any.
    pub fn path_for(&self, classification: Classification) -> Option<&Path> {
        match classification {
            Classification::Funded => Some(&self.found),
            Classification::Active => Some(&self.active),
            Classification::Empty => None,
        }
    }

    /// Creates both files if they do not exist yet.
    pub fn touch(&self) -> Result<(), RecordError> {
        for path in [&self.found, &self.active] {
            open_append(path).map_err(|source| RecordError::Io {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Appends discoveries to the result files and sends notifications.
#[derive(Clone)]
pub struct Recorder {
    files: OutputFiles,
    notifier: Arc<dyn Notifier>,
    lock: Arc<Mutex<()>>,
}

impl Recorder {
    /// Creates a recorder with its own lock.
    pub fn new(files: OutputFiles, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            files,
            notifier,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the result files.
    pub fn files(&self) -> &OutputFiles {
        &self.files
    }

    /// Records a discovery in the file matching its classification.
    ///
    /// Returns the file written to, or `None` for [`Classification::Empty`].
    pub fn record_classified(
        &self,
        classification: Classification,
        discovery: &Discovery,
    ) -> Result<Option<PathBuf>, RecordError> {
        match self.files.path_for(classification) {
            Some(path) => {
                let path = path.to_path_buf();
                self.record(&path, discovery)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Appends `discovery` to `path` and notifies, holding the shared lock.
    ///
    /// A failed notification is logged and does not fail the record.
    pub fn record(&self, path: &Path, discovery: &Discovery) -> Result<(), RecordError> {
        let block = discovery.record_block();
        let message = discovery.notification(path);

        // The lock guards no data, so a poisoned lock is still usable.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        open_append(path)
            .and_then(|mut file| file.write_all(block.as_bytes()))
            .map_err(|source| RecordError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!(address = %discovery.address, file = %path.display(), "discovery recorded");

        if let Err(e) = self.notifier.send(&message) {
            warn!(address = %discovery.address, error = %e, "notification failed");
        }

        Ok(())
    }

    /// Sends a message outside of any record, logging failures.
    pub fn announce(&self, text: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.notifier.send(text) {
            warn!(error = %e, "notification failed");
        }
    }
}
