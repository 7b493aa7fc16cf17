// src/registry/mod.rs

//! In-memory agent directory: registration, capability discovery, per-agent
//! mailboxes, task delegation, and sequential workflow composition.

pub mod error;
pub mod models;
pub mod service;

pub use error::RegistryError;
pub use models::*;
pub use service::{AgentRegistry, COORDINATOR_ID};
