//! Binary calling convention for contract methods
//!
//! A call payload is the method's four-byte id followed by its arguments
//! encoded in declaration order: big-endian fixed-width integers,
//! length-prefixed bytes/strings/arrays. Encoding is deterministic; the
//! payload is covered by the envelope signature and may be reconstructed
//! independently by verifiers, so the same logical inputs must always
//! produce identical bytes.

use serde_json::{Map, Value};

use super::types::{AbiDefinition, AbiError, ParamType};
use crate::message::Address;

/// A call payload decoded back into its method name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub method: String,
    pub args: Value,
}

/// Encode a method call against an ABI definition
///
/// Fails with [`AbiError::UnknownMethod`] if the method is absent and with
/// [`AbiError::ArgumentMismatch`] on any type or arity mismatch. Validation
/// is structural and complete before the first byte is written.
pub fn encode_call(abi: &AbiDefinition, method: &str, args: &Value) -> Result<Vec<u8>, AbiError> {
    let function = abi.function(method)?;

    let map = args
        .as_object()
        .ok_or_else(|| AbiError::ArgumentMismatch("arguments must be a JSON object".into()))?;

    for key in map.keys() {
        if !function.inputs.iter().any(|p| &p.name == key) {
            return Err(AbiError::ArgumentMismatch(format!(
                "unexpected argument {:?} for {}",
                key, method
            )));
        }
    }

    let mut out = function.id().to_vec();
    for param in &function.inputs {
        let value = map.get(&param.name).ok_or_else(|| {
            AbiError::ArgumentMismatch(format!("missing argument {:?} for {}", param.name, method))
        })?;
        encode_value(&param.param_type, value, &mut out)
            .map_err(|e| prefix_param(&param.name, e))?;
    }

    Ok(out)
}

/// Decode a call payload back into its method name and argument values
///
/// The inverse of [`encode_call`] for payloads produced by it.
pub fn decode_call(abi: &AbiDefinition, payload: &[u8]) -> Result<DecodedCall, AbiError> {
    let mut cursor = Cursor::new(payload);

    let id: [u8; 4] = cursor
        .take(4)?
        .try_into()
        .map_err(|_| AbiError::TruncatedPayload)?;
    let function = abi.function_by_id(id)?;

    let mut args = Map::new();
    for param in &function.inputs {
        let value =
            decode_value(&param.param_type, &mut cursor).map_err(|e| prefix_param(&param.name, e))?;
        args.insert(param.name.clone(), value);
    }

    if !cursor.is_empty() {
        return Err(AbiError::ArgumentMismatch(format!(
            "{} trailing bytes after arguments",
            cursor.remaining()
        )));
    }

    Ok(DecodedCall {
        method: function.name.clone(),
        args: Value::Object(args),
    })
}

fn prefix_param(name: &str, err: AbiError) -> AbiError {
    match err {
        AbiError::ArgumentMismatch(reason) => {
            AbiError::ArgumentMismatch(format!("{}: {}", name, reason))
        }
        other => other,
    }
}

fn encode_value(ty: &ParamType, value: &Value, out: &mut Vec<u8>) -> Result<(), AbiError> {
    match ty {
        ParamType::Uint(bits) => {
            let v = parse_uint(value)?;
            check_uint_width(v, *bits)?;
            let n = (*bits / 8) as usize;
            out.extend_from_slice(&v.to_be_bytes()[16 - n..]);
        }
        ParamType::Int(bits) => {
            let v = parse_int(value)?;
            check_int_width(v, *bits)?;
            let n = (*bits / 8) as usize;
            out.extend_from_slice(&v.to_be_bytes()[16 - n..]);
        }
        ParamType::Bool => {
            let v = value
                .as_bool()
                .ok_or_else(|| mismatch("expected a boolean", value))?;
            out.push(v as u8);
        }
        ParamType::Address => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch("expected an address string", value))?;
            let addr: Address = s
                .parse()
                .map_err(|e| AbiError::ArgumentMismatch(format!("{}", e)))?;
            out.push(addr.workchain() as u8);
            out.extend_from_slice(addr.account_id());
        }
        ParamType::Bytes => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch("expected a hex string", value))?;
            let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))
                .map_err(|_| mismatch("expected a hex string", value))?;
            write_len(bytes.len(), out)?;
            out.extend_from_slice(&bytes);
        }
        ParamType::String => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch("expected a string", value))?;
            write_len(s.len(), out)?;
            out.extend_from_slice(s.as_bytes());
        }
        ParamType::Array(inner) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch("expected an array", value))?;
            write_len(items.len(), out)?;
            for item in items {
                encode_value(inner, item, out)?;
            }
        }
    }
    Ok(())
}

fn decode_value(ty: &ParamType, cursor: &mut Cursor<'_>) -> Result<Value, AbiError> {
    Ok(match ty {
        ParamType::Uint(bits) => {
            let n = (*bits / 8) as usize;
            let mut buf = [0u8; 16];
            buf[16 - n..].copy_from_slice(cursor.take(n)?);
            let v = u128::from_be_bytes(buf);
            if v <= u64::MAX as u128 {
                Value::from(v as u64)
            } else {
                Value::from(v.to_string())
            }
        }
        ParamType::Int(bits) => {
            let n = (*bits / 8) as usize;
            let bytes = cursor.take(n)?;
            let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
            let mut buf = [fill; 16];
            buf[16 - n..].copy_from_slice(bytes);
            let v = i128::from_be_bytes(buf);
            if v >= i64::MIN as i128 && v <= i64::MAX as i128 {
                Value::from(v as i64)
            } else {
                Value::from(v.to_string())
            }
        }
        ParamType::Bool => Value::from(cursor.take(1)?[0] != 0),
        ParamType::Address => {
            let workchain = cursor.take(1)?[0] as i8;
            let account: [u8; 32] = cursor
                .take(32)?
                .try_into()
                .map_err(|_| AbiError::TruncatedPayload)?;
            Value::from(Address::new(workchain, account).to_string())
        }
        ParamType::Bytes => {
            let len = read_len(cursor)?;
            Value::from(hex::encode(cursor.take(len)?))
        }
        ParamType::String => {
            let len = read_len(cursor)?;
            let s = std::str::from_utf8(cursor.take(len)?)
                .map_err(|_| AbiError::ArgumentMismatch("invalid UTF-8 in string".into()))?;
            Value::from(s)
        }
        ParamType::Array(inner) => {
            let len = read_len(cursor)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_value(inner, cursor)?);
            }
            Value::Array(items)
        }
    })
}

fn parse_uint(value: &Value) -> Result<u128, AbiError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| mismatch("expected an unsigned integer", value)),
        Value::String(s) => s
            .parse()
            .map_err(|_| mismatch("expected an unsigned integer", value)),
        _ => Err(mismatch("expected an unsigned integer", value)),
    }
}

fn parse_int(value: &Value) -> Result<i128, AbiError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .ok_or_else(|| mismatch("expected an integer", value)),
        Value::String(s) => s.parse().map_err(|_| mismatch("expected an integer", value)),
        _ => Err(mismatch("expected an integer", value)),
    }
}

fn check_uint_width(v: u128, bits: u16) -> Result<(), AbiError> {
    if bits < 128 && v >> bits != 0 {
        return Err(AbiError::ArgumentMismatch(format!(
            "{} does not fit in uint{}",
            v, bits
        )));
    }
    Ok(())
}

fn check_int_width(v: i128, bits: u16) -> Result<(), AbiError> {
    if bits < 128 {
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << (bits - 1)) - 1;
        if v < min || v > max {
            return Err(AbiError::ArgumentMismatch(format!(
                "{} does not fit in int{}",
                v, bits
            )));
        }
    }
    Ok(())
}

fn mismatch(expected: &str, got: &Value) -> AbiError {
    AbiError::ArgumentMismatch(format!("{}, got {}", expected, got))
}

fn write_len(len: usize, out: &mut Vec<u8>) -> Result<(), AbiError> {
    let len = u32::try_from(len)
        .map_err(|_| AbiError::ArgumentMismatch("value too large to encode".into()))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn read_len(cursor: &mut Cursor<'_>) -> Result<usize, AbiError> {
    let bytes: [u8; 4] = cursor
        .take(4)?
        .try_into()
        .map_err(|_| AbiError::TruncatedPayload)?;
    Ok(u32::from_be_bytes(bytes) as usize)
}

/// Bounds-checked reader over a payload
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AbiError> {
        if self.pos + n > self.data.len() {
            return Err(AbiError::TruncatedPayload);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDR: &str = "0:8e2586602513e99a55fa2be08561469c7ce51a7d5a25977558e77ef2bc9387b4";

    fn sample_abi() -> AbiDefinition {
        AbiDefinition::from_json(
            r#"{
                "functions": [
                    {
                        "name": "transfer",
                        "inputs": [
                            {"name": "amount", "type": "uint128"},
                            {"name": "recipient", "type": "address"},
                            {"name": "bounce", "type": "bool"},
                            {"name": "comment", "type": "string"}
                        ],
                        "outputs": []
                    },
                    {
                        "name": "burn",
                        "inputs": [{"name": "amount", "type": "uint64"}],
                        "outputs": []
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_encode_is_deterministic() {
        let abi = sample_abi();
        let args = json!({"amount": 1, "recipient": ADDR, "bounce": true, "comment": "hi"});
        let a = encode_call(&abi, "transfer", &args).unwrap();
        let b = encode_call(&abi, "transfer", &args).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip_preserves_method_and_args() {
        let abi = sample_abi();
        let args = json!({"amount": 1, "recipient": ADDR, "bounce": true, "comment": "hi"});
        let payload = encode_call(&abi, "transfer", &args).unwrap();
        let decoded = decode_call(&abi, &payload).unwrap();
        assert_eq!(decoded.method, "transfer");
        assert_eq!(decoded.args, args);
    }

    #[test]
    fn test_unknown_method() {
        let abi = sample_abi();
        let err = encode_call(&abi, "mint", &json!({})).unwrap_err();
        assert!(matches!(err, AbiError::UnknownMethod(_)));
    }

    #[test]
    fn test_missing_argument() {
        let abi = sample_abi();
        let err = encode_call(&abi, "burn", &json!({})).unwrap_err();
        assert!(matches!(err, AbiError::ArgumentMismatch(_)));
    }

    #[test]
    fn test_unexpected_argument() {
        let abi = sample_abi();
        let err = encode_call(&abi, "burn", &json!({"amount": 1, "extra": 2})).unwrap_err();
        assert!(matches!(err, AbiError::ArgumentMismatch(_)));
    }

    #[test]
    fn test_wrong_argument_type() {
        let abi = sample_abi();
        let err = encode_call(&abi, "burn", &json!({"amount": "not a number"})).unwrap_err();
        assert!(matches!(err, AbiError::ArgumentMismatch(_)));
    }

    #[test]
    fn test_uint_width_enforced() {
        let abi = AbiDefinition::from_json(
            r#"{"functions": [{"name": "f", "inputs": [{"name": "x", "type": "uint8"}]}]}"#,
        )
        .unwrap();
        assert!(encode_call(&abi, "f", &json!({"x": 255})).is_ok());
        assert!(encode_call(&abi, "f", &json!({"x": 256})).is_err());
    }

    #[test]
    fn test_int_width_and_sign() {
        let abi = AbiDefinition::from_json(
            r#"{"functions": [{"name": "f", "inputs": [{"name": "x", "type": "int8"}]}]}"#,
        )
        .unwrap();
        for x in [-128i64, -1, 0, 127] {
            let payload = encode_call(&abi, "f", &json!({ "x": x })).unwrap();
            let decoded = decode_call(&abi, &payload).unwrap();
            assert_eq!(decoded.args, json!({ "x": x }));
        }
        assert!(encode_call(&abi, "f", &json!({"x": 128})).is_err());
        assert!(encode_call(&abi, "f", &json!({"x": -129})).is_err());
    }

    #[test]
    fn test_large_uint_as_decimal_string() {
        let abi = AbiDefinition::from_json(
            r#"{"functions": [{"name": "f", "inputs": [{"name": "x", "type": "uint128"}]}]}"#,
        )
        .unwrap();
        let big = "340282366920938463463374607431768211455"; // u128::MAX
        let payload = encode_call(&abi, "f", &json!({ "x": big })).unwrap();
        let decoded = decode_call(&abi, &payload).unwrap();
        assert_eq!(decoded.args, json!({ "x": big }));
    }

    #[test]
    fn test_bytes_and_arrays() {
        let abi = AbiDefinition::from_json(
            r#"{"functions": [{"name": "f", "inputs": [
                {"name": "data", "type": "bytes"},
                {"name": "ids", "type": "uint32[]"}
            ]}]}"#,
        )
        .unwrap();
        let args = json!({"data": "deadbeef", "ids": [1, 2, 3]});
        let payload = encode_call(&abi, "f", &args).unwrap();
        let decoded = decode_call(&abi, &payload).unwrap();
        assert_eq!(decoded.args, args);
    }

    #[test]
    fn test_truncated_payload() {
        let abi = sample_abi();
        let args = json!({"amount": 1, "recipient": ADDR, "bounce": false, "comment": ""});
        let payload = encode_call(&abi, "transfer", &args).unwrap();
        let err = decode_call(&abi, &payload[..payload.len() - 1]).unwrap_err();
        assert!(matches!(err, AbiError::TruncatedPayload));
    }

    #[test]
    fn test_unknown_function_id() {
        let abi = sample_abi();
        let err = decode_call(&abi, &[0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, AbiError::UnknownFunctionId(_)));
    }
}
