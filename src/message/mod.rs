//! Message construction
//!
//! Addresses, message flags, and the canonical encoding of prepared
//! messages that get batched into signed envelopes.

pub mod address;
pub mod codec;

pub use address::{Address, AddressError};
pub use codec::{
    CodecError, MessageCodec, MessageFlags, PreparedMessage, DEFAULT_MAX_AMOUNT, MESSAGE_VERSION,
};
