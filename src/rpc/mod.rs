//! Node communication
//!
//! The [`RpcGateway`] trait is the engine's only view of the network; the
//! JSON-RPC HTTP client is its one concrete implementation.

pub mod gateway;
pub mod jsonrpc;

pub use gateway::{AccountState, RpcError, RpcGateway, TxHash};
pub use jsonrpc::{JsonRpcGateway, DEFAULT_REQUEST_TIMEOUT};
