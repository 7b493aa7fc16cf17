// src/registry/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const INITIAL_REPUTATION: i32 = 100;
pub const MIN_REPUTATION: i32 = 0;
pub const MAX_REPUTATION: i32 = 200;

// --- Agent Models ---

/// A tagged unit of functionality an agent advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl Capability {
    /// True if `tag` is one of this capability's operations, protocols or chains.
    pub fn matches(&self, tag: &str) -> bool {
        self.operations.iter().any(|t| t == tag)
            || self.protocols.iter().any(|t| t == tag)
            || self.chains.iter().any(|t| t == tag)
    }
}

/// What a caller supplies when registering an agent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    #[validate(length(min = 1, message = "agent id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "agent name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

/// A directory entry as stored by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAgent {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub capabilities: Vec<Capability>,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub reputation: i32,
}

impl RegisteredAgent {
    pub fn from_descriptor(descriptor: AgentDescriptor, now: DateTime<Utc>) -> Self {
        Self {
            id: descriptor.id,
            name: descriptor.name,
            endpoint: descriptor.endpoint,
            capabilities: descriptor.capabilities,
            registered_at: now,
            last_seen: now,
            reputation: INITIAL_REPUTATION,
        }
    }

    pub fn offers(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c.matches(tag))
    }
}

// --- Message Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
    Event,
    Delegation,
}

/// A message as submitted for delivery; the registry stamps the timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: Value,
    /// Carried through untouched; never verified here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl AgentMessage {
    pub fn stamped(msg: OutgoingMessage, timestamp: DateTime<Utc>) -> Self {
        Self {
            from: msg.from,
            to: msg.to,
            message_type: msg.message_type,
            payload: msg.payload,
            timestamp,
            signature: msg.signature,
        }
    }
}

// --- Delegation Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

/// A delegation request before the registry assigns an id and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelegation {
    pub from: String,
    pub to: String,
    pub task: TaskDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDelegation {
    pub task_id: String,
    pub from: String,
    pub to: String,
    pub task: TaskDescriptor,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Workflow Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Tag matched against agent capabilities.
    pub capability: String,
    pub task: TaskDescriptor,
}

/// Outcome of one workflow step. The delegation is recorded as soon as it is
/// issued; it is still `pending` when returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStepResult {
    pub step: usize,
    pub capability: String,
    pub agent_id: String,
    pub delegation: TaskDelegation,
}
