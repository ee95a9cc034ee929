use clinical_tables_mcp::transport::{
    ClientInfo, InitializeParams, McpMessage, ToolsCallParams,
};
use serde_json::Value;

/// Test utilities shared by the integration suites
pub mod test_utils {
    use super::*;

    pub fn create_initialize_message(id: u64) -> McpMessage {
        McpMessage::Initialize {
            id,
            params: InitializeParams {
                protocol_version: "2024-11-05".to_string(),
                capabilities: Some(serde_json::json!({})),
                client_info: ClientInfo {
                    name: "test-client".to_string(),
                    version: "1.0.0".to_string(),
                },
            },
        }
    }

    pub fn create_tool_call_message(id: u64, tool: &str, arguments: Value) -> McpMessage {
        McpMessage::ToolsCall {
            id,
            params: ToolsCallParams {
                name: tool.to_string(),
                arguments: Some(arguments),
            },
        }
    }
}

/// Assertions over MCP response messages
pub mod assertions {
    use super::*;

    pub fn expect_success_result(message: &McpMessage) -> Value {
        match message {
            McpMessage::Response { result, error, .. } => {
                assert!(error.is_none(), "expected success, got error: {:?}", error);
                result.clone().expect("response should carry a result")
            }
            other => panic!("expected a Response message, got {:?}", other),
        }
    }

    pub fn expect_error_message(message: &McpMessage) -> String {
        match message {
            McpMessage::Response { result, error, .. } => {
                assert!(result.is_none(), "expected error, got result: {:?}", result);
                error.clone().expect("response should carry an error").message
            }
            other => panic!("expected a Response message, got {:?}", other),
        }
    }
}
