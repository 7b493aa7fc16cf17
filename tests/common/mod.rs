//! Shared fixtures for the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ethers_core::abi::{encode, Token};
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::keccak256;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use evm_agent_server::{
    blockchain::{CallRequest, Chain, ChainReader},
    config::Config,
    registry::{AgentDescriptor, AgentRegistry, Capability},
    AppState,
};

pub fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

/// In-memory chain: canned return data keyed by (chain, contract, selector).
/// Anything not registered reverts.
#[derive(Default)]
pub struct FakeChain {
    responses: Mutex<HashMap<(Chain, Address, [u8; 4]), Bytes>>,
    down: Mutex<HashSet<Chain>>,
    gas: Mutex<Option<U256>>,
    pub calls: Mutex<Vec<(Chain, CallRequest)>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, chain: Chain, to: Address, sig: &str, tokens: Vec<Token>) {
        self.responses
            .lock()
            .unwrap()
            .insert((chain, to, selector(sig)), Bytes::from(encode(&tokens)));
    }

    /// Answers with `data` verbatim, whether or not it is valid ABI.
    pub fn respond_raw(&self, chain: Chain, to: Address, sig: &str, data: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert((chain, to, selector(sig)), Bytes::from(data));
    }

    /// Every request against `chain` fails as if the endpoint were unreachable.
    pub fn take_down(&self, chain: Chain) {
        self.down.lock().unwrap().insert(chain);
    }

    pub fn set_gas(&self, gas: u64) {
        *self.gas.lock().unwrap() = Some(U256::from(gas));
    }

    fn check_up(&self, chain: Chain) -> Result<()> {
        if self.down.lock().unwrap().contains(&chain) {
            return Err(anyhow!("connection refused ({})", chain));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn call(&self, chain: Chain, request: CallRequest) -> Result<Bytes> {
        self.calls.lock().unwrap().push((chain, request.clone()));
        self.check_up(chain)?;
        let mut sel = [0u8; 4];
        sel.copy_from_slice(&request.data[0..4]);
        self.responses
            .lock()
            .unwrap()
            .get(&(chain, request.to, sel))
            .cloned()
            .ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn estimate_gas(&self, chain: Chain, _request: CallRequest) -> Result<U256> {
        self.check_up(chain)?;
        self.gas
            .lock()
            .unwrap()
            .ok_or_else(|| anyhow!("gas estimation failed"))
    }
}

pub fn state_with(chain: Arc<FakeChain>) -> AppState {
    AppState {
        config: Config::default(),
        chain_client: chain,
        registry: AgentRegistry::new(),
    }
}

pub fn capability(id: &str, operations: &[&str], protocols: &[&str], chains: &[&str]) -> Capability {
    Capability {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        chains: chains.iter().map(|s| s.to_string()).collect(),
        protocols: protocols.iter().map(|s| s.to_string()).collect(),
        operations: operations.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn agent(id: &str, capabilities: Vec<Capability>) -> AgentDescriptor {
    AgentDescriptor {
        id: id.to_string(),
        name: format!("{} agent", id),
        endpoint: format!("https://agents.example/{}", id),
        capabilities,
    }
}

pub fn u(n: u64) -> Token {
    Token::Uint(U256::from(n))
}
