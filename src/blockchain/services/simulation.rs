// src/blockchain/services/simulation.rs

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::resolve_chain;
use crate::blockchain::{
    abi,
    client::{CallRequest, ChainReader},
    models::{failure_envelope, success_envelope, SimulateTransactionRequest},
};

/// Dry-runs the call and then estimates gas for it.
///
/// A revert and a transport failure look the same to the caller: both come
/// back as `willSucceed: false` with the error message.
pub async fn simulate_transaction<C: ChainReader + ?Sized>(
    client: &C,
    request: &SimulateTransactionRequest,
) -> Value {
    info!(
        "simulate_transaction {}::{} on {}",
        request.to, request.function_name, request.chain
    );
    match try_simulate(client, request).await {
        Ok((return_data, gas)) => success_envelope(
            &request.chain,
            json!({
                "willSucceed": true,
                "returnData": return_data,
                "gasEstimate": gas,
            }),
        ),
        Err(e) => {
            warn!("simulation failed: {:#}", e);
            failure_envelope(
                &request.chain,
                &e,
                json!({
                    "willSucceed": false,
                    "to": request.to,
                    "functionName": request.function_name,
                }),
            )
        }
    }
}

async fn try_simulate<C: ChainReader + ?Sized>(
    client: &C,
    request: &SimulateTransactionRequest,
) -> Result<(String, String)> {
    let chain = resolve_chain(&request.chain)?;
    let contract = abi::parse_abi(&request.abi)?;
    let func = abi::find_function(&contract, &request.function_name, request.args.len())?;
    let data = abi::encode_function_call(func, &request.args)?;

    let mut call = CallRequest::new(abi::parse_address(&request.to, "to address")?, data);
    if let Some(from) = &request.from {
        call.from = Some(abi::parse_address(from, "from address")?);
    }
    if let Some(value) = &request.value {
        call.value = Some(abi::parse_wei(value)?);
    }

    let returned = client.call(chain, call.clone()).await?;
    let gas = client.estimate_gas(chain, call).await?;
    Ok((format!("0x{}", hex::encode(&returned)), gas.to_string()))
}
