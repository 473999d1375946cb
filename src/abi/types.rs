//! ABI schema types
//!
//! A contract ABI is a JSON document describing callable methods and their
//! ordered, typed parameters. Supplied per call by the caller; never cached,
//! because distinct contracts have distinct ABIs.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::hash::sha256;

/// ABI handling errors
#[derive(Error, Debug)]
pub enum AbiError {
    #[error("Invalid ABI definition: {0}")]
    InvalidDefinition(String),
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
    #[error("Argument mismatch: {0}")]
    ArgumentMismatch(String),
    #[error("Truncated call payload")]
    TruncatedPayload,
    #[error("Unknown function id: {0}")]
    UnknownFunctionId(String),
}

/// The type of a single ABI parameter
///
/// A tagged-variant schema: arguments are validated structurally against
/// this before any binary encoding happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Unsigned integer of the given bit width (8..=128, multiple of 8)
    Uint(u16),
    /// Signed integer of the given bit width (8..=128, multiple of 8)
    Int(u16),
    Bool,
    /// On-chain account address
    Address,
    /// Length-prefixed byte string, hex on the JSON side
    Bytes,
    /// Length-prefixed UTF-8 string
    String,
    /// Homogeneous array of the inner type
    Array(Box<ParamType>),
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(Self::Array(Box::new(inner.parse()?)));
        }
        if let Some(bits) = s.strip_prefix("uint") {
            return Ok(Self::Uint(parse_bits(s, bits)?));
        }
        if let Some(bits) = s.strip_prefix("int") {
            return Ok(Self::Int(parse_bits(s, bits)?));
        }
        match s {
            "bool" => Ok(Self::Bool),
            "address" => Ok(Self::Address),
            "bytes" => Ok(Self::Bytes),
            "string" => Ok(Self::String),
            _ => Err(AbiError::InvalidDefinition(format!(
                "unsupported parameter type {:?}",
                s
            ))),
        }
    }
}

fn parse_bits(whole: &str, bits: &str) -> Result<u16, AbiError> {
    let bits: u16 = bits
        .parse()
        .map_err(|_| AbiError::InvalidDefinition(format!("bad integer type {:?}", whole)))?;
    if bits == 0 || bits > 128 || bits % 8 != 0 {
        return Err(AbiError::InvalidDefinition(format!(
            "unsupported integer width in {:?}",
            whole
        )));
    }
    Ok(bits)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{}", bits),
            Self::Int(bits) => write!(f, "int{}", bits),
            Self::Bool => write!(f, "bool"),
            Self::Address => write!(f, "address"),
            Self::Bytes => write!(f, "bytes"),
            Self::String => write!(f, "string"),
            Self::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// A named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

/// A callable contract method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
}

impl Function {
    /// Canonical signature string, e.g. `transfer(uint128,address)`
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.param_type.to_string()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    /// Four-byte function id: prefix of the signature hash
    pub fn id(&self) -> [u8; 4] {
        let hash = sha256(self.signature().as_bytes());
        let mut id = [0u8; 4];
        id.copy_from_slice(&hash[..4]);
        id
    }
}

/// A parsed contract ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDefinition {
    pub functions: Vec<Function>,
}

impl AbiDefinition {
    /// Parse an ABI from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let abi: Self = serde_json::from_str(json)
            .map_err(|e| AbiError::InvalidDefinition(e.to_string()))?;
        Ok(abi)
    }

    /// Look up a method by name
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::UnknownMethod(name.to_string()))
    }

    /// Look up a method by its four-byte id
    pub fn function_by_id(&self, id: [u8; 4]) -> Result<&Function, AbiError> {
        self.functions
            .iter()
            .find(|f| f.id() == id)
            .ok_or_else(|| AbiError::UnknownFunctionId(hex::encode(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_parsing() {
        assert_eq!("uint128".parse::<ParamType>().unwrap(), ParamType::Uint(128));
        assert_eq!("int64".parse::<ParamType>().unwrap(), ParamType::Int(64));
        assert_eq!("bool".parse::<ParamType>().unwrap(), ParamType::Bool);
        assert_eq!("address".parse::<ParamType>().unwrap(), ParamType::Address);
        assert_eq!(
            "uint8[]".parse::<ParamType>().unwrap(),
            ParamType::Array(Box::new(ParamType::Uint(8)))
        );
    }

    #[test]
    fn test_bad_param_types_rejected() {
        assert!("uint0".parse::<ParamType>().is_err());
        assert!("uint256".parse::<ParamType>().is_err());
        assert!("uint7".parse::<ParamType>().is_err());
        assert!("float".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_param_type_display_round_trip() {
        for s in ["uint128", "int8", "bool", "address", "bytes", "string", "uint64[]"] {
            let t: ParamType = s.parse().unwrap();
            assert_eq!(t.to_string(), s);
        }
    }

    #[test]
    fn test_function_signature_and_id() {
        let abi = AbiDefinition::from_json(
            r#"{"functions": [
                {"name": "transfer",
                 "inputs": [{"name": "amount", "type": "uint128"},
                            {"name": "recipient", "type": "address"}],
                 "outputs": []}
            ]}"#,
        )
        .unwrap();
        let f = abi.function("transfer").unwrap();
        assert_eq!(f.signature(), "transfer(uint128,address)");
        assert_eq!(abi.function_by_id(f.id()).unwrap().name, "transfer");
    }

    #[test]
    fn test_unknown_method() {
        let abi = AbiDefinition::from_json(r#"{"functions": []}"#).unwrap();
        assert!(matches!(
            abi.function("transfer"),
            Err(AbiError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_invalid_definition() {
        assert!(AbiDefinition::from_json("not json").is_err());
        assert!(AbiDefinition::from_json(
            r#"{"functions": [{"name": "f", "inputs": [{"name": "x", "type": "float"}]}]}"#
        )
        .is_err());
    }
}
