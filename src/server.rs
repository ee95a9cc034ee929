//! Core MCP server implementation
//!
//! Routes incoming protocol messages to the search core. The server holds
//! no per-request state; every lookup is validate -> build -> fetch -> map
//! over its own arguments.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::search::{
    ALL_VOCABULARIES, ClinicalTablesClient, SearchError, SearchParams, SearchResponse, build_query,
    map_response,
};
use crate::transport::{McpError, McpMessage, MessageHandler};

/// Name of the single multi-method lookup tool
pub const LOOKUP_TOOL: &str = "search-clinical-terminology";

/// Main MCP server exposing the clinical terminology lookup tool
#[derive(Clone)]
pub struct ClinicalTablesServer {
    config: crate::config::ServerConfig,
    client: ClinicalTablesClient,
}

/// MCP server initialization result
#[derive(Debug, Clone)]
pub struct ServerInitResult {
    pub protocol_version: String,
    pub server_name: String,
    pub server_version: String,
    pub instructions: Option<String>,
}

/// Tool call result
#[derive(Debug, Clone)]
pub struct ToolCallResult {
    pub success: bool,
    pub content: String,
    pub error: Option<String>,
}

/// Tool definition
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ClinicalTablesServer {
    /// Create a new server instance
    pub fn new(config: crate::config::ServerConfig) -> Self {
        let client = ClinicalTablesClient::new(config.upstream_base_url.clone());
        Self { config, client }
    }

    pub fn config(&self) -> &crate::config::ServerConfig {
        &self.config
    }

    /// Run one lookup end to end: validate, build the query, fetch, map.
    ///
    /// Rewriter diagnostics are advisory; they are logged and never block
    /// the request.
    pub async fn handle_lookup(&self, arguments: &Value) -> Result<SearchResponse, SearchError> {
        let params = SearchParams::from_arguments(arguments)?;
        let query = build_query(&params);
        for diagnostic in &query.diagnostics {
            warn!(
                method = params.vocabulary.as_str(),
                "additional query rewrite: {}", diagnostic
            );
        }

        let raw = self.client.fetch(params.vocabulary, &query).await?;
        map_response(params.vocabulary, params.offset, &raw)
    }

    /// Get the MCP initialize result
    pub fn get_initialize_result(&self) -> ServerInitResult {
        ServerInitResult {
            protocol_version: "2024-11-05".to_string(),
            server_name: "clinical-tables-mcp".to_string(),
            server_version: crate::VERSION.to_string(),
            instructions: Some(
                "Clinical Tables MCP Server - search ICD-10-CM, ICD-11, HCPCS, NPI, HPO, \
                 LOINC, RxTerms, gene and condition vocabularies"
                    .to_string(),
            ),
        }
    }

    /// Get the available tools list
    pub fn get_tools(&self) -> Vec<ToolDefinition> {
        let methods: Vec<Value> = ALL_VOCABULARIES
            .iter()
            .map(|v| json!(v.as_str()))
            .collect();
        let method_docs: Vec<String> = ALL_VOCABULARIES
            .iter()
            .map(|v| format!("{}: {}", v.as_str(), v.defaults().description))
            .collect();

        vec![ToolDefinition {
            name: LOOKUP_TOOL.to_string(),
            description: format!(
                "Search clinical terminology vocabularies by free text or code. \
                 Methods - {}",
                method_docs.join("; ")
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "method": {
                        "type": "string",
                        "enum": methods,
                        "description": "Vocabulary to search"
                    },
                    "terms": {
                        "type": "string",
                        "description": "Free-text or code search terms"
                    },
                    "maxList": {
                        "type": "integer",
                        "description": "Maximum number of results (1-500, default 7)"
                    },
                    "offset": {
                        "type": "integer",
                        "description": "Number of results to skip for pagination (default 0)"
                    },
                    "count": {
                        "type": "integer",
                        "description": "Number of results to retrieve per page (1-500, default 7)"
                    },
                    "searchFields": {
                        "type": "string",
                        "description": "Comma-separated list of fields to search, overriding the vocabulary default"
                    },
                    "displayFields": {
                        "type": "string",
                        "description": "Comma-separated list of fields to display, overriding the vocabulary default"
                    },
                    "codeField": {
                        "type": "string",
                        "description": "Field to return as the result code, overriding the vocabulary default"
                    },
                    "extraFields": {
                        "type": "string",
                        "description": "Comma-separated list of extra fields to include with each result"
                    },
                    "additionalQuery": {
                        "type": "string",
                        "description": "Boolean filter expression (AND/OR); parenthesized groups are rewritten for the upstream API"
                    },
                    "type": {
                        "type": "string",
                        "description": "Result type filter (loinc-questions only, default 'question')"
                    },
                    "available": {
                        "type": "boolean",
                        "description": "Restrict to available items (loinc-questions only)"
                    },
                    "excludeCopyrighted": {
                        "type": "boolean",
                        "description": "Exclude copyrighted entries (major-surgeries-implants only)"
                    }
                },
                "required": ["method", "terms"]
            }),
        }]
    }

    /// Handle an MCP tool call by name
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        match name {
            LOOKUP_TOOL => match self.handle_lookup(&arguments).await {
                Ok(response) => {
                    let content = serde_json::to_string(&response)?;
                    Ok(ToolCallResult {
                        success: true,
                        content,
                        error: None,
                    })
                }
                Err(e) => Ok(ToolCallResult {
                    success: false,
                    content: String::new(),
                    error: Some(e.to_string()),
                }),
            },
            _ => Err(anyhow::Error::msg(format!("Unknown tool: {}", name))),
        }
    }
}

#[async_trait]
impl MessageHandler for ClinicalTablesServer {
    async fn handle_message(&self, message: McpMessage) -> Result<Option<McpMessage>> {
        match message {
            McpMessage::Initialize { id, params } => {
                info!(
                    "Received initialize request from client: {}",
                    params.client_info.name
                );

                let init_result = self.get_initialize_result();
                Ok(Some(McpMessage::Response {
                    id,
                    result: Some(json!({
                        "protocolVersion": init_result.protocol_version,
                        "serverInfo": {
                            "name": init_result.server_name,
                            "version": init_result.server_version
                        },
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        },
                        "instructions": init_result.instructions
                    })),
                    error: None,
                }))
            }

            McpMessage::ToolsList { id } => {
                info!("Received tools list request");

                let tools_json: Vec<Value> = self
                    .get_tools()
                    .into_iter()
                    .map(|tool| {
                        json!({
                            "name": tool.name,
                            "description": tool.description,
                            "inputSchema": tool.input_schema
                        })
                    })
                    .collect();

                Ok(Some(McpMessage::Response {
                    id,
                    result: Some(json!({ "tools": tools_json })),
                    error: None,
                }))
            }

            McpMessage::ToolsCall { id, params } => {
                info!("Received tool call: {}", params.name);

                let arguments = params.arguments.unwrap_or(Value::Null);
                match self.handle_tool_call(&params.name, arguments).await {
                    Ok(result) if result.success => Ok(Some(McpMessage::Response {
                        id,
                        result: Some(json!({
                            "content": [
                                {
                                    "type": "text",
                                    "text": result.content
                                }
                            ]
                        })),
                        error: None,
                    })),
                    Ok(result) => Ok(Some(McpMessage::Response {
                        id,
                        result: None,
                        error: Some(McpError {
                            code: -1,
                            message: result.error.unwrap_or("Unknown error".to_string()),
                            data: None,
                        }),
                    })),
                    Err(e) => {
                        warn!("Tool call failed: {}", e);
                        Ok(Some(McpMessage::Response {
                            id,
                            result: None,
                            error: Some(McpError {
                                code: -1,
                                message: e.to_string(),
                                data: None,
                            }),
                        }))
                    }
                }
            }

            McpMessage::Notification { method, params: _ } => {
                info!("Received notification: {}", method);
                Ok(None)
            }

            McpMessage::Response { .. } => {
                // This server never initiates requests
                warn!("Received unexpected response message");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_server() -> ClinicalTablesServer {
        ClinicalTablesServer::new(crate::config::ServerConfig::default())
    }

    #[tokio::test]
    async fn server_initialization_reports_tool_capability() {
        let server = create_test_server();
        let result = server.get_initialize_result();

        assert_eq!(result.protocol_version, "2024-11-05");
        assert_eq!(result.server_name, "clinical-tables-mcp");
        assert_eq!(result.server_version, crate::VERSION);
    }

    #[tokio::test]
    async fn tools_list_exposes_the_lookup_tool() {
        let server = create_test_server();
        let tools = server.get_tools();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, LOOKUP_TOOL);

        let schema = &tools[0].input_schema;
        assert_eq!(schema["required"], json!(["method", "terms"]));
        assert_eq!(schema["properties"]["method"]["enum"].as_array().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn validation_errors_surface_without_a_network_call() {
        let server = create_test_server();
        let result = server
            .handle_tool_call(LOOKUP_TOOL, json!({"method": "icd-10-cm"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("terms required and must be a string")
        );
    }

    #[tokio::test]
    async fn unknown_method_lists_permitted_vocabularies() {
        let server = create_test_server();
        let result = server
            .handle_tool_call(LOOKUP_TOOL, json!({"method": "snomed", "terms": "x"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("method must be one of:"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let server = create_test_server();
        let result = server.handle_tool_call("unknown_tool", json!({})).await;
        assert!(result.is_err());
    }
}
