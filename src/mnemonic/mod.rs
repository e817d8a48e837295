//! Random mnemonic generation.
//!
//! - `Wordlist`: the word source, loaded once at startup
//! - `MnemonicGenerator`: an endless stream of random 12-word phrases

mod generator;
mod wordlist;

pub use generator::{Mnemonic, MnemonicGenerator, MNEMONIC_WORDS};
pub use wordlist::{Wordlist, WordlistError, CANONICAL_WORDLIST_LEN};
