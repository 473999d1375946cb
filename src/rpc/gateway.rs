//! Gateway interface to the blockchain node
//!
//! The core only sees this logical contract; transport and wire format live
//! behind it. Timeouts and cancellation are the gateway's responsibility
//! and surface as errors, never as a retried submission.

use async_trait::async_trait;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::public_key_from_hex;
use crate::message::Address;
use crate::transaction::SignedEnvelope;

/// RPC-level errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Node rejected request: {message} (code {code})")]
    Node { code: i64, message: String },
    #[error("Malformed RPC response: {0}")]
    InvalidResponse(String),
    #[error("Account is not deployed")]
    AccountNotDeployed,
    #[error("Account has no recoverable public key")]
    NoAccountPublicKey,
}

impl RpcError {
    /// Whether the request may have reached the node despite the error.
    /// A transport failure or timeout leaves the outcome unknown; an
    /// explicit node rejection means the envelope did not land.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

/// Hash identifying a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// On-chain state of an account, as reported by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    /// Balance in the smallest unit
    pub balance: u64,
    /// Current wallet sequence number; zero for un-deployed accounts
    pub seqno: u32,
    /// Whether the wallet contract is deployed
    pub deployed: bool,
    /// Owner public key recovered from the deployed wallet data, hex
    pub public_key: Option<String>,
}

impl AccountState {
    /// Extract the owning public key of a deployed wallet account
    pub fn owner_public_key(&self) -> Result<VerifyingKey, RpcError> {
        if !self.deployed {
            return Err(RpcError::AccountNotDeployed);
        }
        let hex_key = self
            .public_key
            .as_deref()
            .ok_or(RpcError::NoAccountPublicKey)?;
        public_key_from_hex(hex_key).map_err(|_| RpcError::NoAccountPublicKey)
    }
}

/// Logical contract consumed by the signing engine
///
/// `submit` hands a signed envelope to the network exactly once. Callers
/// own retry policy: a blind resubmission of a signed envelope risks a
/// double spend if the first attempt actually landed, so implementations
/// must not retry internally.
#[async_trait]
pub trait RpcGateway: Send + Sync {
    /// Submit a signed envelope; returns the transaction hash on acceptance
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<TxHash, RpcError>;

    /// Current balance of an account, in the smallest unit
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError>;

    /// Current on-chain state of an account
    async fn get_account_state(&self, address: &Address) -> Result<AccountState, RpcError>;
}
