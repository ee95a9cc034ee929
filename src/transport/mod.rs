//! Transport layer implementations for the MCP protocol
//!
//! Two transports are supported:
//! - stdio: line-delimited JSON-RPC over stdin/stdout for local MCP clients
//! - http: JSON over HTTP for web applications and remote access

pub mod http;
pub mod stdio;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

/// JSON-RPC 2.0 message wrapper for wire serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request {
        jsonrpc: String,
        id: Option<u64>,
        method: String,
        params: Option<Value>,
    },
    Response {
        jsonrpc: String,
        id: Option<u64>,
        result: Option<Value>,
        error: Option<McpError>,
    },
    Notification {
        jsonrpc: String,
        method: String,
        params: Option<Value>,
    },
}

/// MCP message types (internal representation)
#[derive(Debug, Clone)]
pub enum McpMessage {
    Initialize { id: u64, params: InitializeParams },
    ToolsList { id: u64 },
    ToolsCall { id: u64, params: ToolsCallParams },
    Notification { method: String, params: Option<Value> },
    Response {
        id: u64,
        result: Option<Value>,
        error: Option<McpError>,
    },
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Option<Value>,
    pub client_info: ClientInfo,
}

/// Client identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Tool call parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    pub arguments: Option<Value>,
}

/// MCP error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl McpMessage {
    /// Convert to a JSON-RPC message for serialization
    pub fn to_jsonrpc(&self) -> JsonRpcMessage {
        match self {
            McpMessage::Initialize { id, params } => JsonRpcMessage::Request {
                jsonrpc: "2.0".to_string(),
                id: Some(*id),
                method: "initialize".to_string(),
                params: serde_json::to_value(params).ok(),
            },
            McpMessage::ToolsList { id } => JsonRpcMessage::Request {
                jsonrpc: "2.0".to_string(),
                id: Some(*id),
                method: "tools/list".to_string(),
                params: None,
            },
            McpMessage::ToolsCall { id, params } => JsonRpcMessage::Request {
                jsonrpc: "2.0".to_string(),
                id: Some(*id),
                method: "tools/call".to_string(),
                params: serde_json::to_value(params).ok(),
            },
            McpMessage::Notification { method, params } => JsonRpcMessage::Notification {
                jsonrpc: "2.0".to_string(),
                method: method.clone(),
                params: params.clone(),
            },
            McpMessage::Response { id, result, error } => JsonRpcMessage::Response {
                jsonrpc: "2.0".to_string(),
                id: Some(*id),
                result: result.clone(),
                error: error.clone(),
            },
        }
    }

    /// Convert a parsed JSON-RPC message into the internal representation
    pub fn from_jsonrpc(jsonrpc: JsonRpcMessage) -> Result<Self> {
        match jsonrpc {
            JsonRpcMessage::Request {
                id, method, params, ..
            } => {
                // A request without an id is a notification in JSON-RPC 2.0;
                // the untagged deserializer lands those here
                let Some(id) = id else {
                    return Ok(McpMessage::Notification { method, params });
                };
                match method.as_str() {
                    "initialize" => {
                        let params: InitializeParams = match params {
                            Some(p) => serde_json::from_value(p).map_err(|e| {
                                anyhow::Error::new(e).context("Failed to parse initialize params")
                            })?,
                            None => return Err(anyhow::Error::msg("Missing initialize params")),
                        };
                        Ok(McpMessage::Initialize { id, params })
                    }
                    "tools/list" => Ok(McpMessage::ToolsList { id }),
                    "tools/call" => {
                        let params: ToolsCallParams = match params {
                            Some(p) => serde_json::from_value(p).map_err(|e| {
                                anyhow::Error::new(e).context("Failed to parse tool call params")
                            })?,
                            None => return Err(anyhow::Error::msg("Missing tool call params")),
                        };
                        Ok(McpMessage::ToolsCall { id, params })
                    }
                    _ => Err(anyhow::Error::msg(format!("Unknown method: {}", method))),
                }
            }
            JsonRpcMessage::Response {
                id, result, error, ..
            } => {
                let id = id.ok_or_else(|| anyhow::Error::msg("Missing response ID"))?;
                Ok(McpMessage::Response { id, result, error })
            }
            JsonRpcMessage::Notification { method, params, .. } => {
                Ok(McpMessage::Notification { method, params })
            }
        }
    }
}

impl JsonRpcMessage {
    /// Parse a JSON value into a JSON-RPC message
    pub fn from_json_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| anyhow::Error::new(e).context("Failed to parse JSON-RPC message"))
    }

    /// Convert to the internal MCP message
    pub fn to_mcp_message(self) -> Result<McpMessage> {
        McpMessage::from_jsonrpc(self)
    }
}

/// Handler for incoming MCP messages; the server implements this
#[async_trait]
pub trait MessageHandler {
    /// Handle one message, optionally producing a response
    async fn handle_message(&self, message: McpMessage) -> Result<Option<McpMessage>>;
}

/// Trait for all transport implementations
#[async_trait]
pub trait Transport {
    /// Start the transport and begin handling connections
    async fn start(&self, handler: Box<dyn MessageHandler + Send + Sync>) -> Result<()>;

    /// Stop the transport gracefully
    async fn shutdown(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialize_round_trips_camel_case() {
        let json_str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test-client","version":"1.0.0"}}}"#;
        let message: JsonRpcMessage = serde_json::from_str(json_str).unwrap();
        let mcp = McpMessage::from_jsonrpc(message).unwrap();
        match mcp {
            McpMessage::Initialize { id, params } => {
                assert_eq!(id, 1);
                assert_eq!(params.client_info.name, "test-client");
                assert_eq!(params.protocol_version, "2024-11-05");
            }
            other => panic!("expected Initialize, got {:?}", other),
        }
    }

    #[test]
    fn tools_call_parses_arguments() {
        let value = json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {
                "name": "search-clinical-terminology",
                "arguments": {"method": "icd-10-cm", "terms": "diabetes"}
            }
        });
        let mcp = JsonRpcMessage::from_json_value(value)
            .unwrap()
            .to_mcp_message()
            .unwrap();
        match mcp {
            McpMessage::ToolsCall { id, params } => {
                assert_eq!(id, 7);
                assert_eq!(params.name, "search-clinical-terminology");
                assert_eq!(params.arguments.unwrap()["terms"], json!("diabetes"));
            }
            other => panic!("expected ToolsCall, got {:?}", other),
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        let value = json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"});
        let result = JsonRpcMessage::from_json_value(value)
            .unwrap()
            .to_mcp_message();
        assert!(result.is_err());
    }

    #[test]
    fn response_serializes_with_jsonrpc_version() {
        let message = McpMessage::Response {
            id: 3,
            result: Some(json!({"ok": true})),
            error: None,
        };
        let serialized = serde_json::to_string(&message.to_jsonrpc()).unwrap();
        assert!(serialized.contains("\"jsonrpc\":\"2.0\""));
        assert!(serialized.contains("\"id\":3"));
    }
}
