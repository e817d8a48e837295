//! Cryptographic operations for legacy Bitcoin key and address derivation.
//!
//! This module provides:
//! - Mnemonic to private key hashing (SHA-256)
//! - secp256k1 public key derivation (uncompressed encoding)
//! - P2PKH address derivation with Base58Check encoding

mod address;
mod keypair;

pub use address::{decode_check, derive_address, AddressError, LEGACY_VERSION};
pub use keypair::{derive_private_key, derive_public_key, KeyError, Keypair};
