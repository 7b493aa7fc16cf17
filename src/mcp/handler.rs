//! # MCP Handler Module
//!
//! Implements the Model Context Protocol surface of the server: `initialize`,
//! `tools/list` and `tools/call`. Every tool is also reachable as a direct
//! JSON-RPC method of the same name; such calls are rewritten into
//! `tools/call` internally so both paths share the same logic.
//!
//! Tool results are returned as plain JSON with an added `content` text
//! array, so MCP clients that only render text still see something useful.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    mcp::{
        protocol::{error_codes, Request, Response},
        tools::{self, ToolError},
    },
    AppState,
};

// Helper: produce a result Value that always contains a text content array
// and preserves structured data for JSON-friendly clients.
fn make_texty_result(text: String, payload: Value) -> Value {
    let content = json!([{ "type": "text", "text": text }]);
    match payload {
        Value::Object(mut map) => {
            // Do not overwrite if caller already set content
            if !map.contains_key("content") {
                map.insert("content".into(), content);
            }
            Value::Object(map)
        }
        other => json!({
            "data": other,
            "content": content
        }),
    }
}

fn summarize(tool_name: &str, payload: &Value) -> String {
    match payload.get("success").and_then(Value::as_bool) {
        Some(false) => format!(
            "{} failed: {}",
            tool_name,
            payload
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
        ),
        _ => format!(
            "{} result:\n{}",
            tool_name,
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
        ),
    }
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        method if tools::is_known_tool(method) => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": method,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);

    match tools::call_tool(&state, tool_name, args).await {
        Ok(payload) => {
            let summary = summarize(tool_name, &payload);
            Response::success(req.id.clone(), make_texty_result(summary, payload))
        }
        Err(err) => {
            warn!("Tool '{}' failed: {}", tool_name, err);
            tool_error_response(req.id.clone(), err)
        }
    }
}

fn tool_error_response(id: Value, err: ToolError) -> Response {
    Response::error(id, err.code(), err.to_string())
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "evm_agent",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "EVM read tools (contract reads, simulation, transaction building, Aave and Uniswap data, multi-chain balances) plus an agent registry for discovery, messaging and task delegation.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    Response::success(req.id.clone(), json!({ "tools": tools::tool_definitions() }))
}
