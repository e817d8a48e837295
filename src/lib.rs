//! # mnemonic_scan
//!
//! Generates random 12-word mnemonics, derives legacy Bitcoin addresses from
//! them and looks up the rare addresses that pass a membership filter.
//!
//! ## Architecture
//!
//! - `crypto`: Private key, public key and address derivation
//! - `mnemonic`: Word list loading and random phrase generation
//! - `filter`: Approximate membership filters over funded addresses
//! - `ledger`: Balance lookups against an Esplora API
//! - `checker`: Address class gate, filter and lookup combined
//! - `notify`: Discovery notifications
//! - `recorder`: Append-only result files under a shared lock
//! - `worker`: Parallel execution and worker pool management
//! - `config`: Runtime configuration

pub mod checker;
pub mod config;
pub mod crypto;
pub mod filter;
pub mod ledger;
pub mod mnemonic;
pub mod notify;
pub mod recorder;
pub mod worker;

pub use checker::{AddressChecker, CheckOutcome, Classification};
pub use config::{Config, ConfigError};
pub use crypto::{derive_address, derive_private_key, derive_public_key, Keypair};
pub use filter::{BloomFilter, MembershipFilter};
pub use ledger::{AddressActivity, EsploraClient, LedgerLookup};
pub use mnemonic::{Mnemonic, MnemonicGenerator, Wordlist};
pub use notify::{Notifier, TelegramNotifier};
pub use recorder::{Discovery, OutputFiles, Recorder};
pub use worker::{ScanContext, ScanHit, WorkerPool, WorkerSettings};
