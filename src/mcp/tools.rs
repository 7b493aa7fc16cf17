//! # Tool catalog and dispatcher
//!
//! Every tool an LLM loop (or any other caller) can invoke by name lives here.
//! Both the MCP handler and the HTTP `/tools/:name` route go through
//! [`call_tool`].
//!
//! ## Blockchain tools
//! Always answer with the `{ success, chain, ... }` envelope; RPC and decoding
//! failures are reported inside it, never as a dispatch error.
//! - `read_contract`, `simulate_transaction`, `build_transaction`
//! - `get_aave_reserve_data`, `get_uniswap_pool_info`, `get_multichain_balance`
//! - `list_supported_chains`
//!
//! ## Registry tools
//! Return the registry entities as-is. Unknown ids surface as
//! [`ToolError::Registry`].
//! - `register_agent`, `list_agents`, `discover_agents`
//! - `send_message`, `receive_messages`
//! - `delegate_task`, `update_delegation`, `get_delegation`
//! - `update_reputation`, `compose_workflow`

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    blockchain::{
        models::{
            AaveReserveRequest, BuildTransactionRequest, MultiChainBalanceRequest,
            ReadContractRequest, SimulateTransactionRequest, UniswapPoolRequest,
        },
        services::{aave, balance, contract, simulation, transaction, uniswap},
    },
    mcp::protocol::error_codes,
    registry::{
        AgentDescriptor, NewDelegation, OutgoingMessage, RegistryError, TaskStatus, WorkflowStep,
    },
    utils, AppState,
};

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("{0}")]
    InvalidParams(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ToolError {
    /// JSON-RPC error code for this failure
    pub fn code(&self) -> i32 {
        match self {
            ToolError::UnknownTool(_) => error_codes::METHOD_NOT_FOUND,
            ToolError::InvalidParams(_) => error_codes::INVALID_PARAMS,
            ToolError::Registry(e) if e.is_not_found() => error_codes::NOT_FOUND,
            ToolError::Registry(_) => error_codes::NO_CAPABLE_AGENT,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDelegationArgs {
    task_id: String,
    status: TaskStatus,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateReputationArgs {
    agent_id: String,
    delta: i32,
}

#[derive(Deserialize)]
struct ComposeWorkflowArgs {
    name: String,
    steps: Vec<WorkflowStep>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!("Failed to serialize tool result: {}", e);
        Value::Null
    })
}

/// Runs the named tool with JSON arguments.
pub async fn call_tool(state: &AppState, name: &str, args: &Value) -> Result<Value, ToolError> {
    info!("Calling tool: {}", name);
    let chain = state.chain_client.as_ref();
    let registry = &state.registry;

    let result = match name {
        // --- Blockchain tools ---
        "read_contract" => {
            let req: ReadContractRequest = utils::parse_args(args)?;
            contract::read_contract(chain, &req).await
        }
        "simulate_transaction" => {
            let req: SimulateTransactionRequest = utils::parse_args(args)?;
            simulation::simulate_transaction(chain, &req).await
        }
        "build_transaction" => {
            let req: BuildTransactionRequest = utils::parse_args(args)?;
            transaction::build_transaction(&req)
        }
        "get_aave_reserve_data" => {
            let req: AaveReserveRequest = utils::parse_args(args)?;
            aave::get_reserve_data(chain, &req).await
        }
        "get_uniswap_pool_info" => {
            let req: UniswapPoolRequest = utils::parse_args(args)?;
            uniswap::get_pool_info(chain, &req).await
        }
        "get_multichain_balance" => {
            let req: MultiChainBalanceRequest = utils::parse_args(args)?;
            balance::get_multichain_balance(chain, &req).await
        }
        "list_supported_chains" => {
            let chains: Vec<Value> = state
                .config
                .supported_chains()
                .into_iter()
                .map(|c| {
                    json!({
                        "name": c.name(),
                        "chainId": c.chain_id(),
                        "rpcUrl": state.config.rpc_url(c),
                    })
                })
                .collect();
            json!({ "success": true, "chains": chains })
        }

        // --- Registry tools ---
        "register_agent" => {
            let descriptor: AgentDescriptor = utils::parse_args(args)?;
            descriptor
                .validate()
                .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
            to_json(&registry.register_agent(descriptor).await)
        }
        "list_agents" => to_json(&registry.list_agents().await),
        "discover_agents" => {
            let capability: String = utils::get_required_arg(args, "capability")?;
            to_json(&registry.discover_agents(&capability).await)
        }
        "send_message" => {
            let msg: OutgoingMessage = utils::parse_args(args)?;
            to_json(&registry.send_message(msg).await)
        }
        "receive_messages" => {
            let agent_id: String = utils::get_required_arg(args, "agentId")?;
            to_json(&registry.receive_messages(&agent_id).await)
        }
        "delegate_task" => {
            let req: NewDelegation = utils::parse_args(args)?;
            to_json(&registry.delegate_task(req).await)
        }
        "update_delegation" => {
            let req: UpdateDelegationArgs = utils::parse_args(args)?;
            let updated = registry
                .update_delegation(&req.task_id, req.status, req.result, req.error)
                .await?;
            to_json(&updated)
        }
        "get_delegation" => {
            let task_id: String = utils::get_required_arg(args, "taskId")?;
            to_json(&registry.get_delegation(&task_id).await?)
        }
        "update_reputation" => {
            let req: UpdateReputationArgs = utils::parse_args(args)?;
            to_json(&registry.update_reputation(&req.agent_id, req.delta).await?)
        }
        "compose_workflow" => {
            let req: ComposeWorkflowArgs = utils::parse_args(args)?;
            to_json(&registry.compose_workflow(&req.name, req.steps).await?)
        }
        other => return Err(ToolError::UnknownTool(other.to_string())),
    };

    Ok(result)
}

/// True if `name` is a tool `call_tool` understands.
pub fn is_known_tool(name: &str) -> bool {
    tool_definitions()
        .as_array()
        .map(|tools| tools.iter().any(|t| t["name"] == name))
        .unwrap_or(false)
}

/// JSON definitions of all available tools, as returned by `tools/list`.
pub fn tool_definitions() -> Value {
    let chain_prop = json!({
        "type": "string",
        "description": "Chain name: ethereum, base, arbitrum, optimism or polygon."
    });
    let abi_prop = json!({
        "description": "ABI fragment: JSON array of ABI items, a single item, or a string holding either."
    });
    let capability_schema = json!({
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "chains": {"type": "array", "items": {"type": "string"}},
            "protocols": {"type": "array", "items": {"type": "string"}},
            "operations": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["id", "name"]
    });
    let task_schema = json!({
        "type": "object",
        "properties": {
            "type": {"type": "string"},
            "description": {"type": "string"},
            "parameters": {"type": "object"}
        },
        "required": ["type"]
    });

    json!([
        // --- Blockchain ---
        {
            "name": "read_contract",
            "description": "Read a contract function via ABI (eth_call).",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain": chain_prop,
                    "address": {"type": "string", "description": "Contract address."},
                    "abi": abi_prop,
                    "functionName": {"type": "string"},
                    "args": {"type": "array"}
                },
                "required": ["chain", "address", "abi", "functionName"]
            }
        },
        {
            "name": "simulate_transaction",
            "description": "Dry-run a contract call and estimate its gas.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain": chain_prop,
                    "from": {"type": "string"},
                    "to": {"type": "string"},
                    "abi": abi_prop,
                    "functionName": {"type": "string"},
                    "args": {"type": "array"},
                    "value": {"type": "string", "description": "Wei, decimal string."}
                },
                "required": ["chain", "to", "abi", "functionName"]
            }
        },
        {
            "name": "build_transaction",
            "description": "Encode an unsigned contract transaction ({to, data, value, chainId}) without touching the network.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain": chain_prop,
                    "to": {"type": "string"},
                    "abi": abi_prop,
                    "functionName": {"type": "string"},
                    "args": {"type": "array"},
                    "value": {"type": "string", "description": "Wei, decimal string. Defaults to 0."}
                },
                "required": ["chain", "to", "abi", "functionName"]
            }
        },
        {
            "name": "get_aave_reserve_data",
            "description": "Aave V3 reserve data for an asset: supply and variable borrow APY.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain": chain_prop,
                    "asset": {"type": "string", "description": "Underlying asset address."}
                },
                "required": ["chain", "asset"]
            }
        },
        {
            "name": "get_uniswap_pool_info",
            "description": "Uniswap V3 pool tokens, fee, liquidity and slot0.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain": chain_prop,
                    "poolAddress": {"type": "string"}
                },
                "required": ["chain", "poolAddress"]
            }
        },
        {
            "name": "get_multichain_balance",
            "description": "ERC-20 balance of an address on several chains at once. Chains fail independently.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": {"type": "string"},
                    "tokenAddress": {"type": "string"},
                    "chains": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["address", "tokenAddress", "chains"]
            }
        },
        {
            "name": "list_supported_chains",
            "description": "Supported chains with their ids and RPC endpoints.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        },
        // --- Registry ---
        {
            "name": "register_agent",
            "description": "Register (or replace) an agent and its capabilities. Reputation starts at 100.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "name": {"type": "string"},
                    "endpoint": {"type": "string"},
                    "capabilities": {"type": "array", "items": capability_schema}
                },
                "required": ["id", "name"]
            }
        },
        {
            "name": "list_agents",
            "description": "All registered agents.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        },
        {
            "name": "discover_agents",
            "description": "Agents offering a capability tag (operation, protocol or chain), best reputation first.",
            "inputSchema": {
                "type": "object",
                "properties": { "capability": {"type": "string"} },
                "required": ["capability"]
            }
        },
        {
            "name": "send_message",
            "description": "Append a message to another agent's mailbox.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "from": {"type": "string"},
                    "to": {"type": "string"},
                    "type": {"type": "string", "enum": ["request", "response", "event", "delegation"]},
                    "payload": {},
                    "signature": {"type": "string"}
                },
                "required": ["from", "to", "type"]
            }
        },
        {
            "name": "receive_messages",
            "description": "Drain an agent's mailbox.",
            "inputSchema": {
                "type": "object",
                "properties": { "agentId": {"type": "string"} },
                "required": ["agentId"]
            }
        },
        {
            "name": "delegate_task",
            "description": "Delegate a task to another agent; the delegation starts out pending.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "from": {"type": "string"},
                    "to": {"type": "string"},
                    "task": task_schema
                },
                "required": ["from", "to", "task"]
            }
        },
        {
            "name": "update_delegation",
            "description": "Set a delegation's status (and optionally result/error); notifies the originator.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "taskId": {"type": "string"},
                    "status": {"type": "string", "enum": ["pending", "in-progress", "completed", "failed"]},
                    "result": {},
                    "error": {"type": "string"}
                },
                "required": ["taskId", "status"]
            }
        },
        {
            "name": "get_delegation",
            "description": "Look up a delegation by task id.",
            "inputSchema": {
                "type": "object",
                "properties": { "taskId": {"type": "string"} },
                "required": ["taskId"]
            }
        },
        {
            "name": "update_reputation",
            "description": "Adjust an agent's reputation by a delta, clamped to [0, 200].",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "agentId": {"type": "string"},
                    "delta": {"type": "integer"}
                },
                "required": ["agentId", "delta"]
            }
        },
        {
            "name": "compose_workflow",
            "description": "Delegate each step to the best agent for its capability. Returns the pending delegations without waiting for completion.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "steps": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "capability": {"type": "string"}, "task": task_schema },
                            "required": ["capability", "task"]
                        }
                    }
                },
                "required": ["name", "steps"]
            }
        }
    ])
}
