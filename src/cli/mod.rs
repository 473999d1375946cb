//! Command-line interface for the wallet client

pub mod commands;

pub use commands::*;
