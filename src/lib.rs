// src/lib.rs

use std::sync::Arc;

pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod registry;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Chain access used by every blockchain tool
    pub chain_client: Arc<dyn blockchain::ChainReader>,
    /// Process-lifetime agent directory
    pub registry: registry::AgentRegistry,
}

impl AppState {
    /// State backed by real RPC providers for every configured chain
    pub fn from_config(config: config::Config) -> Self {
        let chain_client = blockchain::EvmClient::new(&config.chain_rpc_urls);
        Self {
            config,
            chain_client: Arc::new(chain_client),
            registry: registry::AgentRegistry::new(),
        }
    }
}
