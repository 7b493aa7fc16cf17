// src/blockchain/models.rs
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// --- Response envelope ---

/// `{ "success": true, "chain": .., ...fields }`
pub fn success_envelope(chain: &str, fields: Value) -> Value {
    envelope(true, chain, None, fields)
}

/// `{ "success": false, "error": .., "chain": .., ...context }`
pub fn failure_envelope(chain: &str, error: &anyhow::Error, context: Value) -> Value {
    envelope(false, chain, Some(format!("{:#}", error)), context)
}

fn envelope(success: bool, chain: &str, error: Option<String>, fields: Value) -> Value {
    let mut map = Map::new();
    map.insert("success".into(), json!(success));
    if let Some(error) = error {
        map.insert("error".into(), json!(error));
    }
    map.insert("chain".into(), json!(chain));
    if let Value::Object(extra) = fields {
        for (k, v) in extra {
            map.entry(k).or_insert(v);
        }
    }
    Value::Object(map)
}

// --- Tool request models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadContractRequest {
    pub chain: String,
    pub address: String,
    pub abi: Value,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionRequest {
    pub chain: String,
    #[serde(default)]
    pub from: Option<String>,
    pub to: String,
    pub abi: Value,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Wei, decimal string.
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTransactionRequest {
    pub chain: String,
    pub to: String,
    pub abi: Value,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Wei, decimal string. Defaults to "0".
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaveReserveRequest {
    pub chain: String,
    /// Underlying asset (e.g. USDC) address.
    pub asset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniswapPoolRequest {
    pub chain: String,
    pub pool_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChainBalanceRequest {
    pub address: String,
    pub token_address: String,
    pub chains: Vec<String>,
}

// --- Tool response models ---

/// An unsigned transaction ready to hand to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltTransaction {
    pub to: String,
    pub data: String,
    pub value: String,
    pub chain_id: u64,
}
