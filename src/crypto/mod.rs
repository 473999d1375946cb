//! Cryptographic utilities for the wallet client
//!
//! This module provides:
//! - SHA-256 hashing
//! - ed25519 key management and mnemonic-based derivation
//! - Wallet address derivation

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_concat, sha256_hex};
pub use keys::{
    derive_address, public_key_from_hex, KeyError, KeyPair, WALLET_CODE_HASH, WALLET_WORKCHAIN,
};
