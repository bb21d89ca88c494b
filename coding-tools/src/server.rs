//! MCP server: line-delimited JSON-RPC 2.0 over stdio.
//!
//! One request per line, one response per line. Notifications (requests
//! without an `id`) are processed but never answered.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::tools::schema::tool_definitions;
use crate::tools::{ToolContext, call_tool};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "coding-tools";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    method: String,
    params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "result": result, "id": id})
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({"jsonrpc": "2.0", "error": error, "id": id})
}

/// Dispatches JSON-RPC requests to the tools.
pub struct Server {
    ctx: ToolContext,
}

impl Server {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    /// Handle one input line; `None` means nothing should be written back.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "unparseable request line");
                return Some(error_response(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("Parse error: {err}")),
                ));
            }
        };

        let id = message.get("id").cloned();
        let request: RpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => {
                return Some(error_response(
                    id.unwrap_or(Value::Null),
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {err}")),
                ));
            }
        };

        debug!(method = %request.method, "request");
        let result = self.handle_method(&request.method, request.params.as_ref());
        let id = id?;
        Some(match result {
            Ok(result) => success_response(id, result),
            Err(error) => error_response(id, error),
        })
    }

    fn handle_method(&self, method: &str, params: Option<&Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": tool_definitions()})),
            "tools/call" => self.handle_tool_call(params),
            method if method.starts_with("notifications/") => Ok(Value::Null),
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }

    fn handle_tool_call(&self, params: Option<&Value>) -> Result<Value, RpcError> {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(INVALID_PARAMS, "Missing tool name"))?;
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .unwrap_or(&Value::Null);

        let output = call_tool(&self.ctx, name, arguments)
            .map_err(|err| RpcError::new(INVALID_PARAMS, err.to_string()))?;
        let text = serde_json::to_string_pretty(&output.to_json())
            .map_err(|err| RpcError::new(INTERNAL_ERROR, format!("serialize tool result: {err}")))?;
        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "isError": !output.is_success()
        }))
    }

    /// Serve until `reader` reaches end of input.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = line.context("read request line")?;
            let Some(response) = self.handle_line(&line) else {
                continue;
            };
            let encoded = serde_json::to_string(&response).context("encode response")?;
            writeln!(writer, "{encoded}").context("write response")?;
            writer.flush().context("flush response")?;
        }
        info!("input closed; shutting down");
        Ok(())
    }
}

/// Serve on the process's stdin and stdout.
pub fn serve_stdio(ctx: ToolContext) -> Result<()> {
    let server = Server::new(ctx);
    info!(workspace = %server.ctx.workspace().display(), "serving tools on stdio");
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server.serve(stdin.lock(), stdout.lock())
}
