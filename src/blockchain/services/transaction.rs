// src/blockchain/services/transaction.rs

use anyhow::Result;
use serde_json::{json, Value};
use tracing::warn;

use super::resolve_chain;
use crate::blockchain::{
    abi,
    models::{failure_envelope, success_envelope, BuildTransactionRequest, BuiltTransaction},
};

/// ABI-encodes a call into an unsigned transaction. Offline: no RPC traffic.
pub fn build_transaction(request: &BuildTransactionRequest) -> Value {
    match try_build(request) {
        Ok(tx) => success_envelope(&request.chain, json!({ "transaction": tx })),
        Err(e) => {
            warn!("build_transaction failed: {:#}", e);
            failure_envelope(
                &request.chain,
                &e,
                json!({ "to": request.to, "functionName": request.function_name }),
            )
        }
    }
}

fn try_build(request: &BuildTransactionRequest) -> Result<BuiltTransaction> {
    let chain = resolve_chain(&request.chain)?;
    let contract = abi::parse_abi(&request.abi)?;
    let func = abi::find_function(&contract, &request.function_name, request.args.len())?;
    let data = abi::encode_function_call(func, &request.args)?;
    let value = request.value.clone().unwrap_or_else(|| "0".to_string());
    // passed through verbatim, but must still be a decimal wei amount
    abi::parse_wei(&value)?;

    Ok(BuiltTransaction {
        to: request.to.clone(),
        data: format!("0x{}", hex::encode(&data)),
        value,
        chain_id: chain.chain_id(),
    })
}
