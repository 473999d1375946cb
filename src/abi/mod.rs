//! Contract ABI handling
//!
//! Schema types parsed from JSON ABI definitions, structural validation of
//! JSON arguments, and the deterministic binary calling convention.

pub mod encode;
pub mod types;

pub use encode::{decode_call, encode_call, DecodedCall};
pub use types::{AbiDefinition, AbiError, Function, Param, ParamType};
