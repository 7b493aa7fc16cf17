// src/config.rs

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::env;

use crate::blockchain::Chain;

// A struct to hold all configuration, loaded once at startup from the environment / .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,
    pub host: String,

    /// One RPC endpoint per supported chain. Every chain has an entry; the
    /// built-in public endpoint is used unless `CHAIN_RPC_URLS` overrides it.
    pub chain_rpc_urls: HashMap<Chain, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            chain_rpc_urls: default_rpc_urls(),
        }
    }
}

fn default_rpc_urls() -> HashMap<Chain, String> {
    Chain::ALL
        .iter()
        .map(|chain| (*chain, chain.default_rpc_url().to_string()))
        .collect()
}

/// Parses a `CHAIN_RPC_URLS` value: a JSON object of chain name -> URL.
pub fn parse_rpc_overrides(raw: &str) -> Result<HashMap<Chain, String>> {
    let named: HashMap<String, String> =
        serde_json::from_str(raw).context("Invalid CHAIN_RPC_URLS JSON format")?;
    named
        .into_iter()
        .map(|(name, url)| {
            let chain = name
                .parse::<Chain>()
                .map_err(|e| anyhow!("CHAIN_RPC_URLS: {}", e))?;
            Ok((chain, url))
        })
        .collect()
}

impl Config {
    /// Supported chains in a stable order
    pub fn supported_chains(&self) -> Vec<Chain> {
        Chain::ALL.to_vec()
    }

    /// The effective RPC endpoint for a chain
    pub fn rpc_url(&self, chain: Chain) -> &str {
        self.chain_rpc_urls
            .get(&chain)
            .map(String::as_str)
            .unwrap_or_else(|| chain.default_rpc_url())
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let mut chain_rpc_urls = default_rpc_urls();
        if let Ok(raw) = env::var("CHAIN_RPC_URLS") {
            chain_rpc_urls.extend(parse_rpc_overrides(&raw)?);
        }

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            chain_rpc_urls,
        })
    }
}
