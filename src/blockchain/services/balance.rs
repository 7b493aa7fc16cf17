// src/blockchain/services/balance.rs

use anyhow::Result;
use ethers_core::abi::{ParamType, Token};
use ethers_core::types::U256;
use futures::future::join_all;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::resolve_chain;
use crate::blockchain::{
    abi,
    client::{CallRequest, ChainReader},
    models::MultiChainBalanceRequest,
};

async fn erc20_balance_of<C: ChainReader + ?Sized>(
    client: &C,
    chain_name: &str,
    token: &str,
    owner: &str,
) -> Result<U256> {
    let chain = resolve_chain(chain_name)?;
    let token = abi::parse_address(token, "token address")?;
    let owner = abi::parse_address(owner, "owner address")?;
    let data = abi::encode_call("balanceOf(address)", vec![Token::Address(owner)]);
    let raw = client.call(chain, CallRequest::new(token, data)).await?;
    abi::uint_at(&abi::decode_return(&[ParamType::Uint(256)], &raw)?, 0)
}

/// ERC-20 `balanceOf` on every requested chain at once.
///
/// Chains fail independently: a failing chain gets an `"Error: ..."` string
/// in its slot and the call as a whole still succeeds. Slots appear in
/// request order.
pub async fn get_multichain_balance<C: ChainReader + ?Sized>(
    client: &C,
    request: &MultiChainBalanceRequest,
) -> Value {
    info!(
        "Token {} balance of {} across {} chain(s)",
        request.token_address,
        request.address,
        request.chains.len()
    );

    let lookups = request.chains.iter().map(|chain| async move {
        let outcome =
            erc20_balance_of(client, chain, &request.token_address, &request.address).await;
        (chain, outcome)
    });

    let mut balances = Map::new();
    for (chain, outcome) in join_all(lookups).await {
        let slot = match outcome {
            Ok(amount) => json!(amount.to_string()),
            Err(e) => {
                warn!("Balance lookup on {} failed: {:#}", chain, e);
                json!(format!("Error: {:#}", e))
            }
        };
        balances.insert(chain.clone(), slot);
    }

    json!({
        "success": true,
        "address": request.address,
        "tokenAddress": request.token_address,
        "chains": request.chains,
        "balances": balances,
    })
}
