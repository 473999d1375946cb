//! Client facade
//!
//! Composes key derivation, message encoding, signing, and submission into
//! the caller-facing operations. The key pair is derived exactly once at
//! construction and shared immutably afterwards, so a `Client` is safe to
//! use from concurrent callers.

use std::sync::Arc;
use thiserror::Error;

use crate::abi::AbiDefinition;
use crate::crypto::{public_key_from_hex, KeyError, KeyPair};
use crate::message::{
    Address, AddressError, CodecError, MessageCodec, MessageFlags, PreparedMessage,
};
use crate::rpc::{RpcError, RpcGateway, TxHash};
use crate::signer::{Signer, SignerError};
use crate::transaction::{BuildError, Expiration, TransactionBuilder};

/// Errors surfaced by client operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// A wallet client bound to one seed phrase and one node gateway
pub struct Client {
    signer: Signer,
    codec: MessageCodec,
    gateway: Arc<dyn RpcGateway>,
    // Derived once from the public key, immutable afterwards
    address: Address,
}

impl Client {
    /// Derive the key pair from a seed phrase and bind to a gateway
    ///
    /// The phrase is only read during derivation; it is never stored.
    pub fn new(phrase: &str, gateway: Arc<dyn RpcGateway>) -> Result<Self, ClientError> {
        Self::with_codec(phrase, gateway, MessageCodec::new())
    }

    /// Like [`Client::new`] with a custom message codec (e.g. a different
    /// amount cap)
    pub fn with_codec(
        phrase: &str,
        gateway: Arc<dyn RpcGateway>,
        codec: MessageCodec,
    ) -> Result<Self, ClientError> {
        let key_pair = KeyPair::derive_from_phrase(phrase)?;
        let address = key_pair.address();
        log::info!("wallet address: {}", address);
        Ok(Self {
            signer: Signer::new(key_pair),
            codec,
            gateway,
            address,
        })
    }

    /// The address controlled by this client's key pair
    pub fn wallet_address(&self) -> &Address {
        &self.address
    }

    /// This client's public key, hex-encoded
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signer.public_key().to_bytes())
    }

    /// Balance of an arbitrary account. Read-only passthrough, no signing.
    pub async fn balance_of(&self, address: &str) -> Result<u64, ClientError> {
        let address: Address = address.parse()?;
        Ok(self.gateway.get_balance(&address).await?)
    }

    /// Send native value to a destination
    pub async fn send_value(&self, destination: &str, amount: u64) -> Result<TxHash, ClientError> {
        let message =
            self.codec
                .encode_transfer(destination, amount, None, MessageFlags::default())?;
        self.submit(vec![message]).await
    }

    /// Invoke a contract method and submit the call as one transaction
    pub async fn call(
        &self,
        destination: &str,
        amount: u64,
        abi: &AbiDefinition,
        method: &str,
        args: &serde_json::Value,
    ) -> Result<TxHash, ClientError> {
        let message = self.make_call_payload(destination, amount, abi, method, args)?;
        self.submit(vec![message]).await
    }

    /// Build a contract-call message without signing or submitting it,
    /// so it can be batched later via [`Client::call_multi`]
    pub fn make_call_payload(
        &self,
        destination: &str,
        amount: u64,
        abi: &AbiDefinition,
        method: &str,
        args: &serde_json::Value,
    ) -> Result<PreparedMessage, ClientError> {
        Ok(self.codec.encode_call(
            destination,
            amount,
            abi,
            method,
            args,
            MessageFlags::default(),
        )?)
    }

    /// Submit a pre-built batch of messages as one transaction
    ///
    /// Execution order on-chain is exactly the order of `payloads`. All
    /// messages are covered by the single envelope signature of this
    /// client's key pair.
    pub async fn call_multi(&self, payloads: Vec<PreparedMessage>) -> Result<TxHash, ClientError> {
        self.submit(payloads).await
    }

    /// Verify a signature over a 32-byte data hash
    ///
    /// `public_key_hex` overrides the key to verify under; this client's own
    /// key is the default. Pure with respect to the owned key pair: a
    /// cryptographically invalid signature yields `Ok(false)`, never an
    /// error.
    pub fn check_signature(
        &self,
        data_hash_hex: &str,
        signature_hex: &str,
        public_key_hex: Option<&str>,
    ) -> Result<bool, ClientError> {
        let data_hash = decode_hex_input("data hash", data_hash_hex)?;
        let signature = decode_hex_input("signature", signature_hex)?;
        let public_key = match public_key_hex {
            Some(hex_key) => Some(public_key_from_hex(hex_key)?),
            None => None,
        };
        Ok(self
            .signer
            .verify(&data_hash, &signature, public_key.as_ref())?)
    }

    /// Verify a signature against the owner key of a deployed account
    ///
    /// Resolves the public key from on-chain account state, then verifies
    /// like [`Client::check_signature`].
    pub async fn check_signature_by_address(
        &self,
        address: &str,
        signature_hex: &str,
        data_hash_hex: &str,
    ) -> Result<bool, ClientError> {
        let address: Address = address.parse()?;
        let data_hash = decode_hex_input("data hash", data_hash_hex)?;
        let signature = decode_hex_input("signature", signature_hex)?;

        let state = self.gateway.get_account_state(&address).await?;
        let public_key = state.owner_public_key()?;

        Ok(self.signer.verify(&data_hash, &signature, Some(&public_key))?)
    }

    async fn submit(&self, messages: Vec<PreparedMessage>) -> Result<TxHash, ClientError> {
        let builder = TransactionBuilder::new(&self.signer).with_expiration(Expiration::default());
        Ok(builder.build_and_submit(self.gateway.as_ref(), messages).await?)
    }
}

fn decode_hex_input(what: &str, hex_str: &str) -> Result<Vec<u8>, ClientError> {
    hex::decode(hex_str)
        .map_err(|_| SignerError::MalformedInput(format!("{} is not valid hex", what)).into())
}
