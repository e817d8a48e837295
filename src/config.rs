//! Runtime configuration for the mnemonic scanner.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::ledger::DEFAULT_LEDGER_URL;
use crate::notify::DEFAULT_TELEGRAM_API;
use crate::recorder::OutputFiles;
use crate::worker::{default_worker_count, WorkerSettings};

/// Random mnemonic scanner for funded legacy Bitcoin addresses
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Word list file (one word per line)
    #[arg(long, default_value = "english.txt")]
    pub wordlist: PathBuf,

    /// Bloom filter of known funded legacy addresses
    #[arg(long, default_value = "legacy_addresses.bloom")]
    pub filter: PathBuf,

    /// File for addresses with a positive balance
    #[arg(long, default_value = "found_wallets.txt")]
    pub found_file: PathBuf,

    /// File for addresses with history but no balance
    #[arg(long, default_value = "active_wallets.txt")]
    pub active_file: PathBuf,

    /// Number of worker threads (default: CPU count, at most 4)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Delay between iterations of each worker, in milliseconds
    #[arg(long, default_value = "300")]
    pub delay_ms: u64,

    /// Esplora base URL for balance lookups
    #[arg(long, default_value = DEFAULT_LEDGER_URL)]
    pub ledger_url: String,

    /// HTTP timeout for ledger and notification requests, in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout: u64,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram chat to notify
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, default_value = DEFAULT_TELEGRAM_API)]
    pub telegram_api: String,

    /// Stop after recording N discoveries (0 = run until interrupted)
    #[arg(short = 'n', long, default_value = "0")]
    pub count: u64,

    /// Stop each worker after N candidates (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_candidates: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "30")]
    pub report_interval: u64,
}

/// Notification credentials, present once validated.
#[derive(Debug, Clone)]
pub struct Credentials<'a> {
    pub token: &'a str,
    pub chat_id: &'a str,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count capped at 4
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials()?;

        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("Worker count must be at least 1".into()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid("Request timeout must be at least 1 second".into()));
        }

        if self.report_interval == 0 {
            return Err(ConfigError::Invalid("Report interval must be at least 1 second".into()));
        }

        if self.found_file == self.active_file {
            return Err(ConfigError::Invalid(
                "Found and active files must be different".into(),
            ));
        }

        Ok(())
    }

    /// Returns the notification credentials, failing if either is missing.
    pub fn credentials(&self) -> Result<Credentials<'_>, ConfigError> {
        let token = non_blank(&self.telegram_token)
            .ok_or(ConfigError::MissingCredential("TELEGRAM_TOKEN"))?;
        let chat_id = non_blank(&self.telegram_chat_id)
            .ok_or(ConfigError::MissingCredential("TELEGRAM_CHAT_ID"))?;

        Ok(Credentials { token, chat_id })
    }

    /// Returns the per-worker loop settings.
    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            pace: Duration::from_millis(self.delay_ms),
            candidate_limit: (self.max_candidates > 0).then_some(self.max_candidates),
        }
    }

    /// Returns the result file paths.
    pub fn output_files(&self) -> OutputFiles {
        OutputFiles {
            found: self.found_file.clone(),
            active: self.active_file.clone(),
        }
    }

    /// Returns the HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set (pass it as a flag, in the environment or in .env)")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
