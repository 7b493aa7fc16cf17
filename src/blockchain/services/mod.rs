// src/blockchain/services/mod.rs

//! One module per tool. Every public tool function returns the JSON response
//! envelope and never an error: failures are reported inside the envelope.

pub mod aave;
pub mod balance;
pub mod contract;
pub mod simulation;
pub mod transaction;
pub mod uniswap;

use crate::blockchain::chains::Chain;
use anyhow::Result;

pub(crate) fn resolve_chain(name: &str) -> Result<Chain> {
    Ok(name.parse::<Chain>()?)
}
