// src/blockchain/services/contract.rs

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::resolve_chain;
use crate::blockchain::{
    abi,
    client::{CallRequest, ChainReader},
    models::{failure_envelope, success_envelope, ReadContractRequest},
};

/// Read-only contract call through an arbitrary ABI fragment.
pub async fn read_contract<C: ChainReader + ?Sized>(client: &C, request: &ReadContractRequest) -> Value {
    info!(
        "read_contract {}::{} on {}",
        request.address, request.function_name, request.chain
    );
    match try_read_contract(client, request).await {
        Ok(result) => success_envelope(
            &request.chain,
            json!({
                "address": request.address,
                "functionName": request.function_name,
                "result": result,
            }),
        ),
        Err(e) => {
            warn!("read_contract failed: {:#}", e);
            failure_envelope(
                &request.chain,
                &e,
                json!({
                    "address": request.address,
                    "functionName": request.function_name,
                }),
            )
        }
    }
}

async fn try_read_contract<C: ChainReader + ?Sized>(
    client: &C,
    request: &ReadContractRequest,
) -> Result<Value> {
    let chain = resolve_chain(&request.chain)?;
    let contract = abi::parse_abi(&request.abi)?;
    let func = abi::find_function(&contract, &request.function_name, request.args.len())?;
    let data = abi::encode_function_call(func, &request.args)?;
    let to = abi::parse_address(&request.address, "contract address")?;

    let raw = client.call(chain, CallRequest::new(to, data)).await?;
    abi::decode_function_output(func, &raw)
}
