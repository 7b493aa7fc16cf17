// src/blockchain/abi.rs

use anyhow::{anyhow, bail, Context, Result};
use ethers_core::abi::{decode, encode, Abi, Function, ParamType, Token};
use ethers_core::types::{Address, Bytes, I256, U256};
use ethers_core::utils::{keccak256, to_checksum};
use serde_json::{json, Value};
use std::str::FromStr;

// --- Fixed-signature helpers (used by the protocol readers) ---

pub fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

pub fn encode_call(sig: &str, tokens: Vec<Token>) -> Bytes {
    let mut out = selector(sig).to_vec();
    let mut tail = encode(&tokens);
    out.append(&mut tail);
    Bytes::from(out)
}

pub fn parse_address(input: &str, field: &str) -> Result<Address> {
    Address::from_str(input.trim()).map_err(|e| anyhow!("Invalid {} '{}': {}", field, input, e))
}

/// Parses a wei amount given as a decimal string.
pub fn parse_wei(input: &str) -> Result<U256> {
    U256::from_dec_str(input.trim()).map_err(|e| anyhow!("Invalid wei amount '{}': {}", input, e))
}

// --- ABI fragment handling ---

/// Accepts a JSON array of ABI items, a single ABI item object, or a string
/// containing either.
pub fn parse_abi(abi: &Value) -> Result<Abi> {
    match abi {
        Value::String(s) => {
            let inner: Value = serde_json::from_str(s).context("ABI string is not valid JSON")?;
            if inner.is_string() {
                bail!("ABI must be a JSON array or object");
            }
            parse_abi(&inner)
        }
        Value::Array(_) => serde_json::from_value(abi.clone()).context("Malformed ABI"),
        Value::Object(_) => {
            serde_json::from_value(json!([abi])).context("Malformed ABI item")
        }
        _ => bail!("ABI must be a JSON array or object"),
    }
}

/// Picks the function called `name`; overloads are resolved by argument count.
pub fn find_function<'a>(abi: &'a Abi, name: &str, arg_count: usize) -> Result<&'a Function> {
    let candidates = abi
        .functions_by_name(name)
        .map_err(|_| anyhow!("Function '{}' not found in ABI", name))?;
    candidates
        .iter()
        .find(|f| f.inputs.len() == arg_count)
        .ok_or_else(|| {
            anyhow!(
                "Function '{}' takes {} argument(s), got {}",
                name,
                candidates[0].inputs.len(),
                arg_count
            )
        })
}

pub fn coerce_tokens(func: &Function, args: &[Value]) -> Result<Vec<Token>> {
    if func.inputs.len() != args.len() {
        bail!(
            "arg count mismatch: expected {}, got {}",
            func.inputs.len(),
            args.len()
        );
    }
    func.inputs
        .iter()
        .zip(args)
        .map(|(param, val)| {
            coerce_token(&param.kind, val)
                .with_context(|| format!("argument '{}' ({})", param.name, param.kind))
        })
        .collect()
}

fn as_numeric_str(val: &Value) -> Result<String> {
    match val {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => bail!("expected a numeric string, got {}", other),
    }
}

fn hex_arg(val: &Value) -> Result<Vec<u8>> {
    let s = val.as_str().ok_or_else(|| anyhow!("bytes arg must be a 0x hex string"))?;
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

fn coerce_token(kind: &ParamType, val: &Value) -> Result<Token> {
    let tok = match kind {
        ParamType::Address => {
            let s = val.as_str().ok_or_else(|| anyhow!("address arg must be string"))?;
            Token::Address(parse_address(s, "address")?)
        }
        ParamType::Uint(_) => Token::Uint(U256::from_dec_str(&as_numeric_str(val)?)?),
        ParamType::Int(_) => {
            let n = I256::from_dec_str(&as_numeric_str(val)?)
                .map_err(|e| anyhow!("invalid int: {}", e))?;
            Token::Int(n.into_raw())
        }
        ParamType::Bool => Token::Bool(val.as_bool().ok_or_else(|| anyhow!("bool arg must be boolean"))?),
        ParamType::String => Token::String(
            val.as_str()
                .ok_or_else(|| anyhow!("string arg must be string"))?
                .to_string(),
        ),
        ParamType::Bytes => Token::Bytes(hex_arg(val)?),
        ParamType::FixedBytes(n) => {
            let bytes = hex_arg(val)?;
            if bytes.len() != *n {
                bail!("expected {} bytes, got {}", n, bytes.len());
            }
            Token::FixedBytes(bytes)
        }
        ParamType::Array(inner) => {
            let items = val.as_array().ok_or_else(|| anyhow!("array arg must be array"))?;
            Token::Array(
                items
                    .iter()
                    .map(|v| coerce_token(inner, v))
                    .collect::<Result<_>>()?,
            )
        }
        ParamType::FixedArray(inner, n) => {
            let items = val.as_array().ok_or_else(|| anyhow!("array arg must be array"))?;
            if items.len() != *n {
                bail!("expected {} elements, got {}", n, items.len());
            }
            Token::FixedArray(
                items
                    .iter()
                    .map(|v| coerce_token(inner, v))
                    .collect::<Result<_>>()?,
            )
        }
        ParamType::Tuple(components) => {
            let items = val.as_array().ok_or_else(|| anyhow!("tuple arg must be array"))?;
            if items.len() != components.len() {
                bail!("expected {} tuple fields, got {}", components.len(), items.len());
            }
            Token::Tuple(
                components
                    .iter()
                    .zip(items)
                    .map(|(k, v)| coerce_token(k, v))
                    .collect::<Result<_>>()?,
            )
        }
    };
    Ok(tok)
}

pub fn encode_function_call(func: &Function, args: &[Value]) -> Result<Bytes> {
    let tokens = coerce_tokens(func, args)?;
    let data = func
        .encode_input(&tokens)
        .map_err(|e| anyhow!("Failed to encode call to '{}': {}", func.name, e))?;
    Ok(Bytes::from(data))
}

/// Decoded outputs as JSON: the bare value for single-output functions, an
/// array otherwise.
pub fn decode_function_output(func: &Function, data: &[u8]) -> Result<Value> {
    let tokens = func
        .decode_output(data)
        .map_err(|e| anyhow!("Failed to decode '{}' output: {}", func.name, e))?;
    Ok(match tokens.as_slice() {
        [single] => token_to_json(single),
        many => Value::Array(many.iter().map(token_to_json).collect()),
    })
}

/// Integers become decimal strings so large values survive JSON.
pub fn token_to_json(token: &Token) -> Value {
    match token {
        Token::Address(a) => Value::String(to_checksum(a, None)),
        Token::Uint(n) => Value::String(n.to_string()),
        Token::Int(n) => Value::String(I256::from_raw(*n).to_string()),
        Token::Bool(b) => Value::Bool(*b),
        Token::String(s) => Value::String(s.clone()),
        Token::Bytes(b) | Token::FixedBytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            Value::Array(items.iter().map(token_to_json).collect())
        }
    }
}

// --- Positional accessors for fixed-layout return data ---

pub fn decode_return(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    decode(types, data).map_err(|e| anyhow!("Failed to decode return data: {}", e))
}

pub fn uint_at(tokens: &[Token], index: usize) -> Result<U256> {
    match tokens.get(index) {
        Some(Token::Uint(n)) => Ok(*n),
        other => Err(anyhow!("expected uint at position {}, got {:?}", index, other)),
    }
}

pub fn int_at(tokens: &[Token], index: usize) -> Result<I256> {
    match tokens.get(index) {
        Some(Token::Int(n)) => Ok(I256::from_raw(*n)),
        other => Err(anyhow!("expected int at position {}, got {:?}", index, other)),
    }
}

pub fn address_at(tokens: &[Token], index: usize) -> Result<Address> {
    match tokens.get(index) {
        Some(Token::Address(a)) => Ok(*a),
        other => Err(anyhow!("expected address at position {}, got {:?}", index, other)),
    }
}

pub fn bool_at(tokens: &[Token], index: usize) -> Result<bool> {
    match tokens.get(index) {
        Some(Token::Bool(b)) => Ok(*b),
        other => Err(anyhow!("expected bool at position {}, got {:?}", index, other)),
    }
}
