//! Error taxonomy for the search core
//!
//! Three caller-visible failure classes plus a transport wrapper:
//! - `Validation`: bad or missing caller input, surfaced verbatim
//! - `UpstreamHttp`: a non-2xx answer from the terminology API
//! - `UpstreamFormat`: the API answered but the payload shape is wrong
//!
//! None of these are ever retried; the core reports every failure upward
//! immediately.

use thiserror::Error;

/// Errors produced by the search core
#[derive(Debug, Error)]
pub enum SearchError {
    /// Caller supplied invalid arguments
    #[error("{0}")]
    Validation(String),

    /// The outbound request itself failed (connect, DNS, body read)
    #[error("request to the clinical tables API failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The terminology API answered with a non-success status
    #[error("clinical tables API returned {status} {status_text}")]
    UpstreamHttp { status: u16, status_text: String },

    /// The terminology API answered with an unexpected payload shape
    #[error("unexpected {vocabulary} response format: {message}")]
    UpstreamFormat {
        vocabulary: &'static str,
        message: String,
    },
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation(message.into())
    }

    pub fn format(vocabulary: &'static str, message: impl Into<String>) -> Self {
        SearchError::UpstreamFormat {
            vocabulary,
            message: message.into(),
        }
    }

    /// True when the failure was caused by caller input rather than the upstream API
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}
