// src/blockchain/services/aave.rs

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, SecondsFormat};
use ethers_core::abi::{ParamType, Token};
use ethers_core::types::U256;
use ethers_core::utils::to_checksum;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::resolve_chain;
use crate::blockchain::{
    abi,
    client::{CallRequest, ChainReader},
    models::{failure_envelope, success_envelope, AaveReserveRequest},
};

const GET_RESERVE_DATA: &str = "getReserveData(address)";

/// Aave V3 `DataTypes.ReserveData`, flattened. Every member is static, so the
/// struct encodes exactly like this parameter list.
fn reserve_data_layout() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256), // configuration
        ParamType::Uint(128), // liquidityIndex
        ParamType::Uint(128), // currentLiquidityRate
        ParamType::Uint(128), // variableBorrowIndex
        ParamType::Uint(128), // currentVariableBorrowRate
        ParamType::Uint(128), // currentStableBorrowRate
        ParamType::Uint(40),  // lastUpdateTimestamp
        ParamType::Uint(16),  // id
        ParamType::Address,   // aTokenAddress
        ParamType::Address,   // stableDebtTokenAddress
        ParamType::Address,   // variableDebtTokenAddress
        ParamType::Address,   // interestRateStrategyAddress
        ParamType::Uint(128), // accruedToTreasury
        ParamType::Uint(128), // unbacked
        ParamType::Uint(128), // isolationModeTotalDebt
    ]
}

/// Ray (1e27 fixed point) rate as a percentage with two decimals, e.g.
/// `5e25` -> `"5.00%"`. Rounds half up.
pub fn ray_to_percent(rate: U256) -> Result<String> {
    let ray = U256::exp10(27);
    let hundred = U256::from(100u64);
    let scaled = rate
        .checked_mul(U256::from(10_000u64))
        .and_then(|r| r.checked_add(ray / U256::from(2u64)))
        .ok_or_else(|| anyhow!("rate out of range: {}", rate))?;
    let hundredths = scaled / ray;
    let whole = hundredths / hundred;
    let frac = (hundredths % hundred).low_u64();
    Ok(format!("{}.{:02}%", whole, frac))
}

/// Seconds since epoch as an ISO-8601 UTC string with millisecond precision.
pub fn unix_seconds_to_iso(seconds: U256) -> Result<String> {
    if seconds > U256::from(i64::MAX as u64) {
        bail!("timestamp out of range: {}", seconds);
    }
    let secs = seconds.as_u64() as i64;
    let ts = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| anyhow!("timestamp out of range: {}", secs))?;
    Ok(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub async fn get_reserve_data<C: ChainReader + ?Sized>(client: &C, request: &AaveReserveRequest) -> Value {
    info!("Aave reserve data for {} on {}", request.asset, request.chain);
    match try_reserve_data(client, request).await {
        Ok(fields) => success_envelope(&request.chain, fields),
        Err(e) => {
            warn!("Aave reserve read failed: {:#}", e);
            failure_envelope(&request.chain, &e, json!({ "asset": request.asset }))
        }
    }
}

async fn try_reserve_data<C: ChainReader + ?Sized>(
    client: &C,
    request: &AaveReserveRequest,
) -> Result<Value> {
    let chain = resolve_chain(&request.chain)?;
    let pool = abi::parse_address(chain.aave_v3_pool(), "pool address")?;
    let asset = abi::parse_address(&request.asset, "asset address")?;

    let data = abi::encode_call(GET_RESERVE_DATA, vec![Token::Address(asset)]);
    let raw = client.call(chain, CallRequest::new(pool, data)).await?;
    let reserve = abi::decode_return(&reserve_data_layout(), &raw)?;

    let liquidity_rate = abi::uint_at(&reserve, 2)?;
    let variable_borrow_rate = abi::uint_at(&reserve, 4)?;

    Ok(json!({
        "asset": request.asset,
        "pool": to_checksum(&pool, None),
        "supplyAPY": ray_to_percent(liquidity_rate)?,
        "variableBorrowAPY": ray_to_percent(variable_borrow_rate)?,
        "liquidityIndex": abi::uint_at(&reserve, 1)?.to_string(),
        "variableBorrowIndex": abi::uint_at(&reserve, 3)?.to_string(),
        "aTokenAddress": to_checksum(&abi::address_at(&reserve, 8)?, None),
        "variableDebtTokenAddress": to_checksum(&abi::address_at(&reserve, 10)?, None),
        "lastUpdateTimestamp": unix_seconds_to_iso(abi::uint_at(&reserve, 6)?)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_rates_render_as_percent() {
        let five_percent = U256::from_dec_str("50000000000000000000000000").unwrap();
        assert_eq!(ray_to_percent(five_percent).unwrap(), "5.00%");
        assert_eq!(ray_to_percent(U256::zero()).unwrap(), "0.00%");
        // 3.456% rounds to 3.46%
        let rate = U256::from_dec_str("34560000000000000000000000").unwrap();
        assert_eq!(ray_to_percent(rate).unwrap(), "3.46%");
    }

    #[test]
    fn oversized_rate_is_an_error() {
        let err = ray_to_percent(U256::MAX).unwrap_err();
        assert!(err.to_string().contains("rate out of range"));
    }

    #[test]
    fn timestamps_render_as_iso() {
        assert_eq!(
            unix_seconds_to_iso(U256::from(1_700_000_000u64)).unwrap(),
            "2023-11-14T22:13:20.000Z"
        );
    }
}
