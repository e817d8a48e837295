//! Ledger lookups for filter-positive addresses.
//!
//! Lookups are fail-closed: callers use [`LedgerLookup::lookup`], which turns
//! every error into an empty, inactive result instead of retrying.

mod esplora;

use tracing::debug;

pub use esplora::{EsploraClient, DEFAULT_LEDGER_URL, DEFAULT_TIMEOUT};

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Balance and activity of an address.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AddressActivity {
    /// Confirmed plus mempool balance, in BTC
    pub balance_btc: f64,
    /// True if the address has confirmed transactions
    pub active: bool,
}

/// Errors from a single ledger request.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// A source of ground-truth address balances.
pub trait LedgerLookup: Send + Sync {
    /// Performs one request for `address`.
    fn fetch(&self, address: &str) -> Result<AddressActivity, LookupError>;

    /// Like [`LedgerLookup::fetch`], but any error yields `(0.0, false)`.
    fn lookup(&self, address: &str) -> AddressActivity {
        match self.fetch(address) {
            Ok(activity) => activity,
            Err(e) => {
                debug!(%address, error = %e, "ledger lookup failed");
                AddressActivity::default()
            }
        }
    }
}
