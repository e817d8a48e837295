//! Esplora-style HTTP address API client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{AddressActivity, LedgerLookup, LookupError, SATS_PER_BTC};

/// Public Esplora instance used when none is configured.
pub const DEFAULT_LEDGER_URL: &str = "https://blockstream.info";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /api/address/{address}` response body (fields we use).
#[derive(Debug, Deserialize)]
struct AddressInfo {
    chain_stats: ChainStats,
    mempool_stats: MempoolStats,
}

#[derive(Debug, Deserialize)]
struct ChainStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
    tx_count: u64,
}

#[derive(Debug, Deserialize)]
struct MempoolStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
}

impl AddressInfo {
    fn activity(&self) -> AddressActivity {
        let sats = self.chain_stats.funded_txo_sum as i128
            - self.chain_stats.spent_txo_sum as i128
            + self.mempool_stats.funded_txo_sum as i128
            - self.mempool_stats.spent_txo_sum as i128;

        AddressActivity {
            balance_btc: sats as f64 / SATS_PER_BTC,
            active: self.chain_stats.tx_count > 0,
        }
    }
}

/// Blocking client for an Esplora address endpoint.
#[derive(Debug, Clone)]
pub struct EsploraClient {
    http: Client,
    base_url: String,
}

impl EsploraClient {
    /// Creates a client for `base_url` (e.g. `https://blockstream.info`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    fn address_url(&self, address: &str) -> String {
        format!("{}/api/address/{}", self.base_url, address)
    }
}

impl LedgerLookup for EsploraClient {
    fn fetch(&self, address: &str) -> Result<AddressActivity, LookupError> {
        let response = self.http.get(self.address_url(address)).send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text()?;
        let info: AddressInfo =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;

        Ok(info.activity())
    }
}
