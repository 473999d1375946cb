//! Account addresses
//!
//! An address names an account as `workchain:account_id`, where the account
//! id is 32 bytes rendered as 64 lowercase hex characters, e.g.
//! `0:9aad01fa…87e9`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// An on-chain account address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    workchain: i8,
    account_id: [u8; 32],
}

impl Address {
    /// Build an address from its raw parts
    pub fn new(workchain: i8, account_id: [u8; 32]) -> Self {
        Self {
            workchain,
            account_id,
        }
    }

    /// The workchain this account lives in
    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    /// The 32-byte account id
    pub fn account_id(&self) -> &[u8; 32] {
        &self.account_id
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, account) = s
            .split_once(':')
            .ok_or_else(|| AddressError::InvalidAddress(format!("missing ':' in {:?}", s)))?;

        let workchain: i8 = workchain
            .parse()
            .map_err(|_| AddressError::InvalidAddress(format!("bad workchain in {:?}", s)))?;

        if account.len() != 64 {
            return Err(AddressError::InvalidAddress(format!(
                "account id must be 64 hex chars, got {}",
                account.len()
            )));
        }

        let bytes = hex::decode(account)
            .map_err(|_| AddressError::InvalidAddress(format!("non-hex account id in {:?}", s)))?;
        let mut account_id = [0u8; 32];
        account_id.copy_from_slice(&bytes);

        Ok(Self {
            workchain,
            account_id,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.account_id))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0:8e2586602513e99a55fa2be08561469c7ce51a7d5a25977558e77ef2bc9387b4";

    #[test]
    fn test_parse_and_display_round_trip() {
        let addr: Address = SAMPLE.parse().unwrap();
        assert_eq!(addr.workchain(), 0);
        assert_eq!(addr.to_string(), SAMPLE);
    }

    #[test]
    fn test_negative_workchain() {
        let s = format!("-1:{}", "ab".repeat(32));
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.workchain(), -1);
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert!(Address::from_str("deadbeef").is_err());
    }

    #[test]
    fn test_short_account_rejected() {
        assert!(Address::from_str("0:abcd").is_err());
    }

    #[test]
    fn test_non_hex_account_rejected() {
        let s = format!("0:{}", "zz".repeat(32));
        assert!(Address::from_str(&s).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let addr: Address = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
