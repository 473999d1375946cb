//! Key management for the wallet
//!
//! Provides mnemonic-based key pair derivation, mnemonic generation, and
//! wallet address derivation using ed25519 (the signature scheme verified
//! by the target network).

use bip39::{Language, Mnemonic};
use ed25519_dalek::{SigningKey, VerifyingKey};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use super::hash::sha256_concat;
use crate::message::Address;

/// Hash of the wallet contract code template. Every wallet controlled by
/// this client deploys the same code, so the account id is fully determined
/// by the owner's public key.
pub const WALLET_CODE_HASH: [u8; 32] = [
    0x84, 0xda, 0xfa, 0x44, 0x9f, 0x98, 0xa6, 0x98, 0x77, 0x89, 0xba, 0x23, 0x23, 0x58, 0x07, 0x2b,
    0xc0, 0xf7, 0x6d, 0xc4, 0x52, 0x40, 0x02, 0xa5, 0xd0, 0x91, 0x8b, 0x9a, 0x75, 0xd2, 0xd5, 0x99,
];

/// Workchain the wallet contract lives in
pub const WALLET_WORKCHAIN: i8 = 0;

/// Supported seed phrase lengths
const SUPPORTED_WORD_COUNTS: [usize; 2] = [12, 24];

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid seed phrase: {0}")]
    InvalidSeed(String),
    #[error("Invalid public key")]
    InvalidPublicKey,
}

/// An ed25519 key pair derived from a seed phrase
///
/// The secret half is held only in process memory and is zeroed on drop.
/// It is derived exactly once per session and never mutated afterwards.
pub struct KeyPair {
    secret_key: SigningKey,
    public_key: VerifyingKey,
}

impl KeyPair {
    /// Derive a key pair from a mnemonic seed phrase
    ///
    /// The phrase must be 12 or 24 English words with a valid checksum.
    /// Derivation is deterministic: the same phrase always yields the same
    /// key pair and address.
    pub fn derive_from_phrase(phrase: &str) -> Result<Self, KeyError> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(|e| KeyError::InvalidSeed(e.to_string()))?;

        let word_count = mnemonic.word_count();
        if !SUPPORTED_WORD_COUNTS.contains(&word_count) {
            return Err(KeyError::InvalidSeed(format!(
                "unsupported word count: {}",
                word_count
            )));
        }

        let seed = Zeroizing::new(mnemonic.to_seed(""));
        let mut secret_bytes = [0u8; 32];
        secret_bytes.copy_from_slice(&seed[..32]);

        let secret_key = SigningKey::from_bytes(&secret_bytes);
        secret_bytes.zeroize();

        let public_key = secret_key.verifying_key();
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// Generate a fresh 24-word seed phrase
    pub fn generate_phrase() -> Result<String, KeyError> {
        let mnemonic = Mnemonic::generate_in_with(&mut rand::rngs::OsRng, Language::English, 24)
            .map_err(|e| KeyError::InvalidSeed(e.to_string()))?;
        Ok(mnemonic.to_string())
    }

    /// The signing key. Only the signer should touch this.
    pub(crate) fn secret_key(&self) -> &SigningKey {
        &self.secret_key
    }

    /// The verifying half of the key pair
    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    /// Get the public key as a hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.to_bytes())
    }

    /// The wallet address controlled by this key pair
    pub fn address(&self) -> Address {
        derive_address(&self.public_key)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret half
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Derive the wallet address for a public key
///
/// The account id is `sha256(wallet_code_hash || public_key)`: the state of
/// a freshly deployed wallet is fully determined by its code template and
/// its owner's key. Pure and deterministic, no I/O.
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let account = sha256_concat(&WALLET_CODE_HASH, &public_key.to_bytes());
    let mut account_id = [0u8; 32];
    account_id.copy_from_slice(&account);
    Address::new(WALLET_WORKCHAIN, account_id)
}

/// Parse a public key from a hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<VerifyingKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Standard 24-word test vector (valid checksum)
    const TEST_PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon abandon abandon art";

    const TEST_PHRASE_12: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon \
         abandon abandon about";

    #[test]
    fn test_derivation_is_deterministic() {
        let kp1 = KeyPair::derive_from_phrase(TEST_PHRASE).unwrap();
        let kp2 = KeyPair::derive_from_phrase(TEST_PHRASE).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_twelve_word_phrase_supported() {
        let kp = KeyPair::derive_from_phrase(TEST_PHRASE_12).unwrap();
        assert_eq!(kp.public_key_hex().len(), 64);
    }

    #[test]
    fn test_unknown_word_rejected() {
        let phrase = TEST_PHRASE.replace("art", "notaword");
        assert!(matches!(
            KeyPair::derive_from_phrase(&phrase),
            Err(KeyError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // 12 repeated words fail the checksum even though each word is valid
        let phrase = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            KeyPair::derive_from_phrase(phrase),
            Err(KeyError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(KeyPair::derive_from_phrase("abandon abandon art").is_err());
    }

    #[test]
    fn test_address_format() {
        let kp = KeyPair::derive_from_phrase(TEST_PHRASE).unwrap();
        let addr = kp.address().to_string();
        let (workchain, account) = addr.split_once(':').unwrap();
        assert_eq!(workchain, "0");
        assert_eq!(account.len(), 64);
        assert!(account.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_phrase_derives() {
        let phrase = KeyPair::generate_phrase().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);
        assert!(KeyPair::derive_from_phrase(&phrase).is_ok());
    }

    #[test]
    fn test_public_key_hex_round_trip() {
        let kp = KeyPair::derive_from_phrase(TEST_PHRASE).unwrap();
        let parsed = public_key_from_hex(&kp.public_key_hex()).unwrap();
        assert_eq!(&parsed, kp.public_key());
    }

    #[test]
    fn test_public_key_from_bad_hex() {
        assert!(public_key_from_hex("zzzz").is_err());
        assert!(public_key_from_hex("aabb").is_err());
    }
}
