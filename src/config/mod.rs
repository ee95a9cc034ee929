//! Configuration management

use serde::{Deserialize, Serialize};

use crate::search::DEFAULT_BASE_URL;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host for the HTTP transport (default: localhost)
    pub host: String,
    /// Server port for the HTTP transport (default: 3000)
    pub port: u16,
    /// Log level (default: info)
    pub log_level: String,
    /// Enable HTTP transport
    pub http_transport: bool,
    /// Enable stdio transport
    pub stdio_transport: bool,
    /// Base URL of the Clinical Table Search Service
    pub upstream_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            http_transport: false,
            stdio_transport: true,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
