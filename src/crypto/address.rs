//! Legacy (P2PKH) address derivation and Base58Check handling.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte for mainnet pay-to-pubkey-hash addresses.
pub const LEGACY_VERSION: u8 = 0x00;

const CHECKSUM_LEN: usize = 4;

/// Errors from decoding a Base58Check string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    Base58(String),

    #[error("Encoded data too short ({0} bytes)")]
    TooShort(usize),

    #[error("Checksum mismatch")]
    ChecksumMismatch,
}

/// Derives a legacy address from an uncompressed public key.
///
/// Process:
/// 1. SHA-256 of the 65-byte public key
/// 2. RIPEMD-160 of that digest
/// 3. Prefix the version byte (0x00)
/// 4. Append the first 4 bytes of SHA-256(SHA-256(payload))
/// 5. Base58 encode
pub fn derive_address(public_key: &[u8; 65]) -> String {
    let sha = Sha256::digest(public_key);
    let hash160 = Ripemd160::digest(sha);

    let mut payload = Vec::with_capacity(1 + 20 + CHECKSUM_LEN);
    payload.push(LEGACY_VERSION);
    payload.extend_from_slice(&hash160);

    let checksum = checksum(&payload);
    payload.extend_from_slice(&checksum);

    bs58::encode(payload).into_string()
}

/// Decodes a Base58Check string and verifies its checksum.
///
/// Returns the payload (version byte included, checksum stripped).
pub fn decode_check(encoded: &str) -> Result<Vec<u8>, AddressError> {
    let mut data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| AddressError::Base58(e.to_string()))?;

    if data.len() <= CHECKSUM_LEN {
        return Err(AddressError::TooShort(data.len()));
    }

    let split = data.len() - CHECKSUM_LEN;
    if checksum(&data[..split]) != data[split..] {
        return Err(AddressError::ChecksumMismatch);
    }

    data.truncate(split);
    Ok(data)
}

#[inline]
fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let double = Sha256::digest(Sha256::digest(payload));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&double[..CHECKSUM_LEN]);
    out
}
