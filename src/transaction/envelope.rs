//! Transaction envelopes
//!
//! An envelope wraps an ordered batch of prepared messages together with
//! the replay-protection pair (wallet seqno, expiration timestamp). It is
//! signed exactly once, over the hash of its canonical serialization,
//! regardless of how many messages it carries. Message order is significant:
//! it is the on-chain execution order.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, VerifyingKey};

use crate::crypto::sha256;
use crate::message::PreparedMessage;

/// Canonical envelope serialization version
pub const ENVELOPE_VERSION: u8 = 1;

/// Network-imposed cap on messages per transaction
pub const MAX_BATCH: usize = 4;

/// Default envelope lifetime
pub const DEFAULT_TTL_SECS: u32 = 60;

/// When a signed envelope stops being valid for submission
///
/// This is the replay guard: once past `expire_at`, the network refuses the
/// envelope even if it was never seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Valid for this many seconds from signing time
    Timeout(u32),
    /// Valid until this unix timestamp
    At(u32),
}

impl Expiration {
    /// Resolve to an absolute unix timestamp
    pub fn expire_at(&self, now: DateTime<Utc>) -> u32 {
        match self {
            Self::Timeout(ttl) => now.timestamp() as u32 + ttl,
            Self::At(timestamp) => *timestamp,
        }
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Self::Timeout(DEFAULT_TTL_SECS)
    }
}

/// An unsigned batch of messages plus replay protection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Wallet sequence number at signing time
    pub seqno: u32,
    /// Unix timestamp after which the envelope is invalid
    pub expire_at: u32,
    /// Messages in execution order
    pub messages: Vec<PreparedMessage>,
}

impl Envelope {
    /// Canonical byte serialization
    ///
    /// Layout (integers big-endian): version u8 | seqno u32 | expire_at u32 |
    /// message_count u8 | for each message: len u32 | message bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(ENVELOPE_VERSION);
        bytes.extend_from_slice(&self.seqno.to_be_bytes());
        bytes.extend_from_slice(&self.expire_at.to_be_bytes());
        bytes.push(self.messages.len() as u8);
        for message in &self.messages {
            let encoded = message.to_bytes();
            bytes.extend_from_slice(&(encoded.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&encoded);
        }
        bytes
    }

    /// The digest the envelope signature covers
    pub fn digest(&self) -> [u8; 32] {
        let hash = sha256(&self.to_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hash);
        digest
    }
}

/// An envelope plus its single signature, ready for submission
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    pub envelope: Envelope,
    pub signature: Signature,
    /// Key the signature verifies under (the wallet owner's key)
    pub public_key: VerifyingKey,
}

impl SignedEnvelope {
    /// Wire serialization: public key, signature, then the envelope bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let envelope = self.envelope.to_bytes();
        let mut bytes = Vec::with_capacity(96 + envelope.len());
        bytes.extend_from_slice(&self.public_key.to_bytes());
        bytes.extend_from_slice(&self.signature.to_bytes());
        bytes.extend_from_slice(&envelope);
        bytes
    }
}
