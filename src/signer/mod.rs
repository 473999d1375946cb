//! Signature production and verification
//!
//! The [`Signer`] owns the derived key pair for the process lifetime. It
//! signs envelope digests and verifies `(data hash, signature)` pairs
//! against either its own public key or an explicitly supplied one, so that
//! third-party signatures can be checked without touching the owned key.

use ed25519_dalek::{Signature, Signer as _, Verifier as _, VerifyingKey};
use thiserror::Error;

use crate::crypto::KeyPair;
use crate::message::Address;

/// Expected data-hash length for verification, in bytes
pub const DATA_HASH_LEN: usize = 32;

/// Expected signature length, in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Signing and verification errors
#[derive(Error, Debug)]
pub enum SignerError {
    /// Structurally invalid verification input (wrong-length hash,
    /// signature, or key). Cryptographically invalid signatures are NOT an
    /// error; they verify as `false`.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// The signing key is unavailable
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Holds the derived key pair and produces/checks ed25519 signatures
#[derive(Debug)]
pub struct Signer {
    key_pair: KeyPair,
}

impl Signer {
    pub fn new(key_pair: KeyPair) -> Self {
        Self { key_pair }
    }

    /// The signer's own public key
    pub fn public_key(&self) -> &VerifyingKey {
        self.key_pair.public_key()
    }

    /// The wallet address controlled by the owned key pair
    pub fn address(&self) -> Address {
        self.key_pair.address()
    }

    /// Sign a digest with the owned key
    ///
    /// The input is expected to already be a hash of the canonical envelope
    /// bytes; malformed envelopes are rejected during encoding, never here.
    pub fn sign(&self, digest: &[u8]) -> Signature {
        self.key_pair.secret_key().sign(digest)
    }

    /// Verify a signature over a 32-byte data hash
    ///
    /// Pure function of its inputs: never consults the owned secret key.
    /// `public_key` defaults to the signer's own key when `None`. Returns
    /// `Ok(false)` for cryptographically invalid signatures; errors only on
    /// wrong-length inputs.
    pub fn verify(
        &self,
        data_hash: &[u8],
        signature: &[u8],
        public_key: Option<&VerifyingKey>,
    ) -> Result<bool, SignerError> {
        let public_key = public_key.unwrap_or_else(|| self.public_key());
        verify(data_hash, signature, public_key)
    }
}

/// Verify a signature over a 32-byte data hash against an explicit key
pub fn verify(
    data_hash: &[u8],
    signature: &[u8],
    public_key: &VerifyingKey,
) -> Result<bool, SignerError> {
    if data_hash.len() != DATA_HASH_LEN {
        return Err(SignerError::MalformedInput(format!(
            "data hash must be {} bytes, got {}",
            DATA_HASH_LEN,
            data_hash.len()
        )));
    }

    let signature: [u8; SIGNATURE_LEN] = signature.try_into().map_err(|_| {
        SignerError::MalformedInput(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        ))
    })?;
    let signature = Signature::from_bytes(&signature);

    Ok(public_key.verify(data_hash, &signature).is_ok())
}
