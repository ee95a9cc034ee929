//! Query-normalization and response-reshaping core
//!
//! Data flow: raw arguments -> params (validate/normalize) -> query
//! (merge vocabulary defaults, rewrite boolean filters) -> client (one
//! outbound GET) -> response (positional tuple to uniform envelope).
//! Every step is a pure function over its inputs plus the one network
//! round trip; no state is shared between lookups.

pub mod client;
pub mod error;
pub mod params;
pub mod query;
pub mod response;
pub mod rewrite;
pub mod vocabulary;

pub use client::{ClinicalTablesClient, DEFAULT_BASE_URL};
pub use error::SearchError;
pub use params::SearchParams;
pub use query::{SearchQuery, build_query};
pub use response::{CodeResult, Pagination, SearchResponse, map_response};
pub use rewrite::{RewrittenQuery, rewrite_additional_query};
pub use vocabulary::{ALL_VOCABULARIES, Vocabulary, VocabularyDefaults};
