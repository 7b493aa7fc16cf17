// src/blockchain/services/uniswap.rs

use anyhow::{anyhow, Result};
use ethers_core::abi::ParamType;
use ethers_core::types::{Address, Bytes, I256, U256};
use ethers_core::utils::to_checksum;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::resolve_chain;
use crate::blockchain::{
    abi,
    chains::Chain,
    client::{CallRequest, ChainReader},
    models::{failure_envelope, success_envelope, UniswapPoolRequest},
};

fn slot0_layout() -> Vec<ParamType> {
    vec![
        ParamType::Uint(160), // sqrtPriceX96
        ParamType::Int(24),   // tick
        ParamType::Uint(16),  // observationIndex
        ParamType::Uint(16),  // observationCardinality
        ParamType::Uint(16),  // observationCardinalityNext
        ParamType::Uint(8),   // feeProtocol
        ParamType::Bool,      // unlocked
    ]
}

/// Pool fee as displayed to users: raw fee units divided by 10000, e.g.
/// `3000` -> `"0.3%"`.
pub fn format_fee(raw_fee: u64) -> String {
    format!("{}%", raw_fee as f64 / 10_000.0)
}

fn fee_units(raw: U256) -> Result<u64> {
    u64::try_from(raw).map_err(|_| anyhow!("fee out of range: {}", raw))
}

fn tick_value(raw: I256) -> Result<i64> {
    if raw < I256::from(i64::MIN) || raw > I256::from(i64::MAX) {
        return Err(anyhow!("tick out of range: {}", raw));
    }
    Ok(raw.as_i64())
}

async fn read<C: ChainReader + ?Sized>(client: &C, chain: Chain, pool: Address, sig: &str) -> Result<Bytes> {
    client
        .call(chain, CallRequest::new(pool, abi::encode_call(sig, vec![])))
        .await
}

pub async fn get_pool_info<C: ChainReader + ?Sized>(client: &C, request: &UniswapPoolRequest) -> Value {
    info!("Uniswap pool info for {} on {}", request.pool_address, request.chain);
    match try_pool_info(client, request).await {
        Ok(fields) => success_envelope(&request.chain, fields),
        Err(e) => {
            warn!("Uniswap pool read failed: {:#}", e);
            failure_envelope(
                &request.chain,
                &e,
                json!({ "poolAddress": request.pool_address }),
            )
        }
    }
}

async fn try_pool_info<C: ChainReader + ?Sized>(client: &C, request: &UniswapPoolRequest) -> Result<Value> {
    let chain = resolve_chain(&request.chain)?;
    let pool = abi::parse_address(&request.pool_address, "pool address")?;

    let (token0, token1, fee, liquidity, slot0) = futures::try_join!(
        read(client, chain, pool, "token0()"),
        read(client, chain, pool, "token1()"),
        read(client, chain, pool, "fee()"),
        read(client, chain, pool, "liquidity()"),
        read(client, chain, pool, "slot0()"),
    )?;

    let token0 = abi::address_at(&abi::decode_return(&[ParamType::Address], &token0)?, 0)?;
    let token1 = abi::address_at(&abi::decode_return(&[ParamType::Address], &token1)?, 0)?;
    let fee = abi::uint_at(&abi::decode_return(&[ParamType::Uint(24)], &fee)?, 0)?;
    let liquidity = abi::uint_at(&abi::decode_return(&[ParamType::Uint(128)], &liquidity)?, 0)?;
    let slot0 = abi::decode_return(&slot0_layout(), &slot0)?;

    Ok(json!({
        "poolAddress": request.pool_address,
        "token0": to_checksum(&token0, None),
        "token1": to_checksum(&token1, None),
        "fee": format_fee(fee_units(fee)?),
        "liquidity": liquidity.to_string(),
        "sqrtPriceX96": abi::uint_at(&slot0, 0)?.to_string(),
        "tick": tick_value(abi::int_at(&slot0, 1)?)?,
        "unlocked": abi::bool_at(&slot0, 6)?,
    }))
}
