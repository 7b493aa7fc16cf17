// src/blockchain/evm_client.rs

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, TransactionRequest},
};
use ethers_core::types::{Bytes, U256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::blockchain::{
    chains::Chain,
    client::{CallRequest, ChainReader},
};

/// Client for interacting with the supported EVM chains
#[derive(Clone)]
pub struct EvmClient {
    providers: HashMap<Chain, Arc<Provider<Http>>>,
}

impl EvmClient {
    /// Create a new EvmClient with the given RPC URLs
    pub fn new(rpc_urls: &HashMap<Chain, String>) -> Self {
        let mut providers = HashMap::new();

        for (chain, url) in rpc_urls {
            match Provider::<Http>::try_from(url.as_str()) {
                Ok(provider) => {
                    providers.insert(*chain, Arc::new(provider));
                }
                Err(e) => {
                    tracing::warn!("Failed to create provider for {} at {}: {}", chain, url, e);
                }
            }
        }

        Self { providers }
    }

    /// Get a provider for the specified chain
    fn get_provider(&self, chain: Chain) -> Result<Arc<Provider<Http>>> {
        self.providers
            .get(&chain)
            .cloned()
            .ok_or_else(|| anyhow!("No provider available for chain: {}", chain))
    }
}

fn to_typed_transaction(request: CallRequest) -> TypedTransaction {
    let mut tx = TransactionRequest::new().to(request.to).data(request.data);
    if let Some(from) = request.from {
        tx = tx.from(from);
    }
    if let Some(value) = request.value {
        tx = tx.value(value);
    }
    tx.into()
}

#[async_trait]
impl ChainReader for EvmClient {
    async fn call(&self, chain: Chain, request: CallRequest) -> Result<Bytes> {
        let provider = self.get_provider(chain)?;
        let tx = to_typed_transaction(request);
        Ok(provider.call(&tx, None).await?)
    }

    async fn estimate_gas(&self, chain: Chain, request: CallRequest) -> Result<U256> {
        let provider = self.get_provider(chain)?;
        let tx = to_typed_transaction(request);
        Ok(provider.estimate_gas(&tx, None).await?)
    }
}
