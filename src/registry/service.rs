// src/registry/service.rs

use chrono::Utc;
use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::registry::{
    error::RegistryError,
    models::{
        AgentDescriptor, AgentMessage, MessageType, NewDelegation, OutgoingMessage,
        RegisteredAgent, TaskDelegation, TaskStatus, WorkflowStep, WorkflowStepResult,
        MAX_REPUTATION, MIN_REPUTATION,
    },
};

/// Originator id used for delegations issued by `compose_workflow`.
pub const COORDINATOR_ID: &str = "coordinator";

/// Agents in registration order. Re-registering an id replaces the entry but
/// keeps its original position.
#[derive(Debug, Default)]
struct AgentDirectory {
    order: Vec<String>,
    entries: HashMap<String, RegisteredAgent>,
}

impl AgentDirectory {
    fn upsert(&mut self, agent: RegisteredAgent) {
        if !self.entries.contains_key(&agent.id) {
            self.order.push(agent.id.clone());
        }
        self.entries.insert(agent.id.clone(), agent);
    }

    fn iter(&self) -> impl Iterator<Item = &RegisteredAgent> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}

/// Process-lifetime agent registry. Clones share the same stores.
///
/// Nothing here is persisted. Mailboxes are unbounded: a recipient that never
/// drains its mailbox keeps accumulating messages.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Arc<Mutex<AgentDirectory>>,
    mailboxes: Arc<DashMap<String, Vec<AgentMessage>>>,
    delegations: Arc<DashMap<String, TaskDelegation>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the agent, replacing any previous entry with the same id.
    /// Timestamps are reset and reputation starts over at 100.
    pub async fn register_agent(&self, descriptor: AgentDescriptor) -> RegisteredAgent {
        let agent = RegisteredAgent::from_descriptor(descriptor, Utc::now());
        let mut agents = self.agents.lock().await;
        if agents.entries.contains_key(&agent.id) {
            info!("Re-registering agent {} ({})", agent.id, agent.name);
        } else {
            info!("Registered agent {} ({})", agent.id, agent.name);
        }
        agents.upsert(agent.clone());
        agent
    }

    /// Agents advertising `tag` in any capability's operations, protocols or
    /// chains, best reputation first. Ties keep registration order.
    pub async fn discover_agents(&self, tag: &str) -> Vec<RegisteredAgent> {
        let agents = self.agents.lock().await;
        let mut matches: Vec<RegisteredAgent> =
            agents.iter().filter(|a| a.offers(tag)).cloned().collect();
        matches.sort_by(|a, b| b.reputation.cmp(&a.reputation));
        debug!("Discovery for '{}' matched {} agent(s)", tag, matches.len());
        matches
    }

    pub async fn list_agents(&self) -> Vec<RegisteredAgent> {
        self.agents.lock().await.iter().cloned().collect()
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<RegisteredAgent, RegistryError> {
        self.agents
            .lock()
            .await
            .entries
            .get(agent_id)
            .cloned()
            .ok_or_else(|| RegistryError::AgentNotFound(agent_id.to_string()))
    }

    /// Appends to the recipient's mailbox. The recipient does not need to be
    /// registered.
    pub async fn send_message(&self, msg: OutgoingMessage) -> AgentMessage {
        let message = AgentMessage::stamped(msg, Utc::now());
        debug!(
            "Message {:?} {} -> {}",
            message.message_type, message.from, message.to
        );
        self.mailboxes
            .entry(message.to.clone())
            .or_default()
            .push(message.clone());
        message
    }

    /// Drains the mailbox. A second call with nothing sent in between returns
    /// an empty list.
    pub async fn receive_messages(&self, agent_id: &str) -> Vec<AgentMessage> {
        let messages = self
            .mailboxes
            .remove(agent_id)
            .map(|(_, queue)| queue)
            .unwrap_or_default();

        let mut agents = self.agents.lock().await;
        if let Some(agent) = agents.entries.get_mut(agent_id) {
            agent.last_seen = Utc::now();
        }
        messages
    }

    /// Records a pending delegation and notifies the target agent.
    pub async fn delegate_task(&self, request: NewDelegation) -> TaskDelegation {
        let now = Utc::now();
        let delegation = TaskDelegation {
            task_id: Uuid::new_v4().to_string(),
            from: request.from,
            to: request.to,
            task: request.task,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.delegations
            .insert(delegation.task_id.clone(), delegation.clone());
        info!(
            "Delegated task {} ({}) from {} to {}",
            delegation.task_id, delegation.task.task_type, delegation.from, delegation.to
        );

        self.send_message(OutgoingMessage {
            from: delegation.from.clone(),
            to: delegation.to.clone(),
            message_type: MessageType::Delegation,
            payload: json!({
                "taskId": delegation.task_id,
                "task": delegation.task,
            }),
            signature: None,
        })
        .await;

        delegation
    }

    /// Sets the status (any status may follow any other) and overwrites
    /// result/error only when supplied, then reports back to the originator.
    pub async fn update_delegation(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<Value>,
        error: Option<String>,
    ) -> Result<TaskDelegation, RegistryError> {
        let updated = {
            let mut entry = self
                .delegations
                .get_mut(task_id)
                .ok_or_else(|| RegistryError::DelegationNotFound(task_id.to_string()))?;
            entry.status = status;
            if let Some(result) = result {
                entry.result = Some(result);
            }
            if let Some(error) = error {
                entry.error = Some(error);
            }
            entry.updated_at = Utc::now();
            entry.value().clone()
        };
        info!("Delegation {} is now {:?}", task_id, updated.status);

        self.send_message(OutgoingMessage {
            from: updated.to.clone(),
            to: updated.from.clone(),
            message_type: MessageType::Response,
            payload: json!({
                "taskId": updated.task_id,
                "status": updated.status,
                "result": updated.result,
                "error": updated.error,
            }),
            signature: None,
        })
        .await;

        Ok(updated)
    }

    pub async fn get_delegation(&self, task_id: &str) -> Result<TaskDelegation, RegistryError> {
        self.delegations
            .get(task_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::DelegationNotFound(task_id.to_string()))
    }

    /// Applies `delta` and clamps the result to [0, 200].
    pub async fn update_reputation(
        &self,
        agent_id: &str,
        delta: i32,
    ) -> Result<RegisteredAgent, RegistryError> {
        let mut agents = self.agents.lock().await;
        let agent = agents
            .entries
            .get_mut(agent_id)
            .ok_or_else(|| RegistryError::AgentNotFound(agent_id.to_string()))?;
        agent.reputation = agent
            .reputation
            .saturating_add(delta)
            .clamp(MIN_REPUTATION, MAX_REPUTATION);
        agent.last_seen = Utc::now();
        info!(
            "Reputation of {} adjusted by {} to {}",
            agent_id, delta, agent.reputation
        );
        Ok(agent.clone())
    }

    /// Walks the steps in order, delegating each to the highest-reputation
    /// agent offering the step's capability.
    ///
    /// Delegations are fire-and-forget: each step result holds the freshly
    /// issued (pending) delegation, and no step waits for the previous one to
    /// complete. The first step without a capable agent aborts the workflow;
    /// delegations already issued for earlier steps stay in place.
    pub async fn compose_workflow(
        &self,
        name: &str,
        steps: Vec<WorkflowStep>,
    ) -> Result<Vec<WorkflowStepResult>, RegistryError> {
        info!("Composing workflow '{}' with {} step(s)", name, steps.len());
        let mut results = Vec::with_capacity(steps.len());

        for (index, step) in steps.into_iter().enumerate() {
            let candidates = self.discover_agents(&step.capability).await;
            let Some(best) = candidates.into_iter().next() else {
                warn!(
                    "Workflow '{}' aborted at step {}: no agent for '{}'",
                    name, index, step.capability
                );
                return Err(RegistryError::NoCapableAgent {
                    workflow: name.to_string(),
                    step: index,
                    capability: step.capability,
                });
            };

            let delegation = self
                .delegate_task(NewDelegation {
                    from: COORDINATOR_ID.to_string(),
                    to: best.id.clone(),
                    task: step.task,
                })
                .await;

            results.push(WorkflowStepResult {
                step: index,
                capability: step.capability,
                agent_id: best.id,
                delegation,
            });
        }

        Ok(results)
    }
}
