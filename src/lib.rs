//! Ever-Signer: a wallet-signing client for an account-based blockchain
//!
//! This crate provides the signing and message-construction engine for a
//! wallet reachable over JSON-RPC:
//! - Mnemonic seed phrase to ed25519 key pair derivation
//! - Deterministic message and call-payload encoding from JSON ABIs
//! - Envelope signing with seqno/expiration replay protection
//! - Batching of up to four messages into one on-chain transaction
//! - Signature verification against arbitrary public keys
//!
//! # Example
//!
//! ```rust,no_run
//! use ever_signer::client::Client;
//! use ever_signer::rpc::JsonRpcGateway;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(JsonRpcGateway::new("https://jrpc.example.net/rpc")?);
//! let client = Client::new("word1 word2 ... word24", gateway)?;
//!
//! println!("Address: {}", client.wallet_address());
//!
//! let hash = client
//!     .send_value(
//!         "0:8e2586602513e99a55fa2be08561469c7ce51a7d5a25977558e77ef2bc9387b4",
//!         1_000_000,
//!     )
//!     .await?;
//! println!("Submitted: {}", hash);
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod cli;
pub mod client;
pub mod crypto;
pub mod message;
pub mod rpc;
pub mod signer;
pub mod transaction;

// Re-export commonly used types
pub use abi::{AbiDefinition, AbiError, DecodedCall, ParamType};
pub use client::{Client, ClientError};
pub use crypto::{KeyError, KeyPair};
pub use message::{
    Address, AddressError, CodecError, MessageCodec, MessageFlags, PreparedMessage,
};
pub use rpc::{AccountState, JsonRpcGateway, RpcError, RpcGateway, TxHash};
pub use signer::{Signer, SignerError};
pub use transaction::{
    BuildError, Envelope, Expiration, SignedEnvelope, TransactionBuilder, MAX_BATCH,
};
