//! Chain access seam for the blockchain tools.
//!
//! Tools never build providers themselves; they receive something that
//! implements [`ChainReader`]. The production implementation is
//! [`EvmClient`], which holds one HTTP JSON-RPC provider per configured chain.
//! Tests plug in an in-memory reader instead.

use anyhow::Result;
use async_trait::async_trait;
use ethers_core::types::{Address, Bytes, U256};

pub use super::evm_client::EvmClient;
use crate::blockchain::chains::Chain;

/// A read-only call or gas estimation against a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
}

impl CallRequest {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            from: None,
            to,
            data,
            value: None,
        }
    }
}

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `eth_call` at the latest block; returns the raw return data.
    async fn call(&self, chain: Chain, request: CallRequest) -> Result<Bytes>;

    /// `eth_estimateGas` for the same request shape.
    async fn estimate_gas(&self, chain: Chain, request: CallRequest) -> Result<U256>;
}
