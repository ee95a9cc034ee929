//! # Clinical Tables MCP Server
//!
//! Model Context Protocol server exposing a single multi-method lookup tool
//! over the NLM Clinical Table Search Service vocabularies (ICD-10-CM,
//! ICD-11, HCPCS, NPI, HPO, LOINC, RxTerms, genes, conditions).

pub mod config;
pub mod search;
pub mod server;
pub mod transport;

// Re-export commonly used types
pub use config::ServerConfig;
pub use search::{SearchError, SearchResponse, Vocabulary};
pub use server::ClinicalTablesServer;

/// Current version of the MCP server
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
