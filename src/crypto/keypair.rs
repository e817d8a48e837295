//! Mnemonic-derived secp256k1 keypairs.

use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly};
use sha2::{Digest, Sha256};

use super::derive_address;

/// Errors from key derivation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    /// The 32 bytes are zero or not below the curve order.
    #[error("Private key is not a valid secp256k1 scalar")]
    InvalidScalar,
}

/// Hashes a mnemonic into a 32-byte private key (SHA-256 of its UTF-8 bytes).
#[inline]
pub fn derive_private_key(mnemonic: &str) -> [u8; 32] {
    Sha256::digest(mnemonic.as_bytes()).into()
}

/// Derives the uncompressed public key (`0x04 || X || Y`) for a private key.
pub fn derive_public_key(private_key: &[u8; 32]) -> Result<[u8; 65], KeyError> {
    let secp = Secp256k1::signing_only();
    derive_public_key_with(&secp, private_key)
}

#[inline]
fn derive_public_key_with(
    secp: &Secp256k1<SignOnly>,
    private_key: &[u8; 32],
) -> Result<[u8; 65], KeyError> {
    let secret_key = SecretKey::from_slice(private_key).map_err(|_| KeyError::InvalidScalar)?;
    Ok(PublicKey::from_secret_key(secp, &secret_key).serialize_uncompressed())
}

/// A private key together with its derived public key and legacy address.
#[derive(Debug, Clone)]
pub struct Keypair {
    /// SHA-256 of the mnemonic
    secret_key: [u8; 32],
    /// Uncompressed public key (65 bytes)
    public_key: [u8; 65],
    /// Base58Check P2PKH address
    address: String,
}

impl Keypair {
    /// Runs the full derivation pipeline for a mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self, KeyError> {
        Self::from_secret_key(derive_private_key(mnemonic))
    }

    /// Derives the public key and address for existing private key bytes.
    pub fn from_secret_key(secret_key: [u8; 32]) -> Result<Self, KeyError> {
        let public_key = derive_public_key(&secret_key)?;
        let address = derive_address(&public_key);

        Ok(Self {
            secret_key,
            public_key,
            address,
        })
    }

    /// Like [`Keypair::from_mnemonic`] but reuses a signing context.
    ///
    /// Workers hold one context for their lifetime instead of building one
    /// per candidate.
    pub fn from_mnemonic_with(
        secp: &Secp256k1<SignOnly>,
        mnemonic: &str,
    ) -> Result<Self, KeyError> {
        let secret_key = derive_private_key(mnemonic);
        let public_key = derive_public_key_with(secp, &secret_key)?;
        let address = derive_address(&public_key);

        Ok(Self {
            secret_key,
            public_key,
            address,
        })
    }

    /// Returns the private key as a lowercase hex string.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the uncompressed public key bytes.
    pub fn public_key(&self) -> &[u8; 65] {
        &self.public_key
    }

    /// Returns the legacy address.
    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }
}
