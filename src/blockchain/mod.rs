// src/blockchain/mod.rs

pub mod abi;
pub mod chains;
pub mod client;
mod evm_client;
pub mod models;
pub mod services;

pub use chains::Chain;
pub use client::{CallRequest, ChainReader, EvmClient};

// Re-export commonly used types
pub use ethers_core::{
    types::{Address, Bytes, U256},
    utils::to_checksum,
};
