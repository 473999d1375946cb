//! Transaction envelopes and submission
//!
//! Canonical envelope serialization, the replay-protection pair
//! (seqno + expiration), and the builder that signs batches and hands them
//! to the gateway.

pub mod builder;
pub mod envelope;

pub use builder::{BuildError, TransactionBuilder};
pub use envelope::{
    Envelope, Expiration, SignedEnvelope, DEFAULT_TTL_SECS, ENVELOPE_VERSION, MAX_BATCH,
};
