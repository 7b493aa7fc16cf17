// src/blockchain/chains.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// EVM networks the tools can talk to. Each is bound to one RPC endpoint at
/// startup (see `Config::rpc_url`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Base,
    Arbitrum,
    Optimism,
    Polygon,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported chain: {0}")]
pub struct UnsupportedChain(pub String);

impl Chain {
    pub const ALL: [Chain; 5] = [
        Chain::Ethereum,
        Chain::Base,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Polygon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Base => "base",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Polygon => "polygon",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Base => 8453,
            Chain::Arbitrum => 42161,
            Chain::Optimism => 10,
            Chain::Polygon => 137,
        }
    }

    /// Public endpoint used when no override is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Chain::Ethereum => "https://eth.llamarpc.com",
            Chain::Base => "https://mainnet.base.org",
            Chain::Arbitrum => "https://arb1.arbitrum.io/rpc",
            Chain::Optimism => "https://mainnet.optimism.io",
            Chain::Polygon => "https://polygon-rpc.com",
        }
    }

    /// Aave V3 Pool contract on this chain.
    pub fn aave_v3_pool(&self) -> &'static str {
        match self {
            Chain::Ethereum => "0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2",
            Chain::Base => "0xA238Dd80C259a72e81d7e4664a9801593F98d1c5",
            Chain::Arbitrum | Chain::Optimism | Chain::Polygon => {
                "0x794a61358D6845594F94dc1DB02A252b5b4814aD"
            }
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chain {
    type Err = UnsupportedChain;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim().to_lowercase().replace([' ', '_'], "-");
        match s.as_str() {
            "ethereum" | "mainnet" | "eth" | "1" => Ok(Chain::Ethereum),
            "base" | "8453" => Ok(Chain::Base),
            "arbitrum" | "arb" | "arbitrum-one" | "42161" => Ok(Chain::Arbitrum),
            "optimism" | "op" | "10" => Ok(Chain::Optimism),
            "polygon" | "matic" | "137" => Ok(Chain::Polygon),
            _ => Err(UnsupportedChain(input.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("Ethereum".parse::<Chain>(), Ok(Chain::Ethereum));
        assert_eq!("mainnet".parse::<Chain>(), Ok(Chain::Ethereum));
        assert_eq!(" arb ".parse::<Chain>(), Ok(Chain::Arbitrum));
        assert_eq!("137".parse::<Chain>(), Ok(Chain::Polygon));
        assert!("solana".parse::<Chain>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_name() {
        assert_eq!(serde_json::to_string(&Chain::Optimism).unwrap(), "\"optimism\"");
        for chain in Chain::ALL {
            assert_eq!(chain.name().parse::<Chain>(), Ok(chain));
        }
    }
}
