//! Building and submitting transactions
//!
//! Wraps one or more prepared messages into a signed envelope and hands it
//! to the gateway, uniformly for the single-message and batched cases.
//!
//! Failure semantics: this component never retries. A signed envelope that
//! failed to submit may still have reached the node, and resubmitting it
//! blindly risks a double spend. Submission failures carry
//! `maybe_delivered` so the caller can decide whether a retry is safe; the
//! seqno/expiration pair bounds the damage either way.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::envelope::{Envelope, Expiration, SignedEnvelope, MAX_BATCH};
use crate::message::PreparedMessage;
use crate::rpc::{RpcError, RpcGateway, TxHash};
use crate::signer::Signer;

/// Errors from building or submitting a transaction
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot build a transaction with no messages")]
    EmptyBatch,
    #[error("Batch too large: {len} messages, network maximum is {max}")]
    BatchTooLarge { len: usize, max: usize },
    #[error("Failed to query wallet state: {0}")]
    StateQuery(#[source] RpcError),
    /// The node did not accept the envelope. When `maybe_delivered` is true
    /// the outcome is unknown (timeout or transport failure after send) and
    /// a retry could double-spend; when false the node definitely rejected
    /// it.
    #[error("Submission failed: {cause}")]
    Submission {
        #[source]
        cause: RpcError,
        maybe_delivered: bool,
    },
}

/// Signs batches of prepared messages into envelopes and submits them
#[derive(Debug)]
pub struct TransactionBuilder<'a> {
    signer: &'a Signer,
    expiration: Expiration,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(signer: &'a Signer) -> Self {
        Self {
            signer,
            expiration: Expiration::default(),
        }
    }

    /// Override the default envelope lifetime
    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sign a batch into an envelope without touching the network
    ///
    /// Message order is preserved; it determines on-chain execution order.
    /// The envelope is signed once, over the digest of all messages plus
    /// the replay-protection pair.
    pub fn sign_batch(
        &self,
        seqno: u32,
        now: DateTime<Utc>,
        messages: Vec<PreparedMessage>,
    ) -> Result<SignedEnvelope, BuildError> {
        if messages.is_empty() {
            return Err(BuildError::EmptyBatch);
        }
        if messages.len() > MAX_BATCH {
            return Err(BuildError::BatchTooLarge {
                len: messages.len(),
                max: MAX_BATCH,
            });
        }

        let envelope = Envelope {
            seqno,
            expire_at: self.expiration.expire_at(now),
            messages,
        };
        let signature = self.signer.sign(&envelope.digest());

        Ok(SignedEnvelope {
            envelope,
            signature,
            public_key: *self.signer.public_key(),
        })
    }

    /// Build, sign, and submit a batch as one transaction
    ///
    /// All local validation happens before the state query and signing, so
    /// a rejected batch causes no network traffic and no signature.
    pub async fn build_and_submit(
        &self,
        gateway: &dyn RpcGateway,
        messages: Vec<PreparedMessage>,
    ) -> Result<TxHash, BuildError> {
        if messages.is_empty() {
            return Err(BuildError::EmptyBatch);
        }
        if messages.len() > MAX_BATCH {
            return Err(BuildError::BatchTooLarge {
                len: messages.len(),
                max: MAX_BATCH,
            });
        }

        let address = self.signer.address();
        let state = gateway
            .get_account_state(&address)
            .await
            .map_err(BuildError::StateQuery)?;

        let signed = self.sign_batch(state.seqno, Utc::now(), messages)?;
        log::debug!(
            "submitting envelope: seqno={} expire_at={} messages={}",
            signed.envelope.seqno,
            signed.envelope.expire_at,
            signed.envelope.messages.len()
        );

        match gateway.submit(&signed).await {
            Ok(hash) => {
                log::info!("transaction submitted: {}", hash);
                Ok(hash)
            }
            Err(cause) => {
                let maybe_delivered = cause.outcome_unknown();
                log::warn!(
                    "submission failed (outcome {}): {}",
                    if maybe_delivered { "unknown" } else { "not delivered" },
                    cause
                );
                Err(BuildError::Submission {
                    cause,
                    maybe_delivered,
                })
            }
        }
    }
}
