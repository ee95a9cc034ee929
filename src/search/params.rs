//! Parameter validation and normalization for lookup requests
//!
//! Arguments arrive as a loosely typed JSON object from the MCP transport.
//! Numeric bounds are clamped rather than rejected; the only hard failures
//! are a missing/non-string `terms` and an unknown `method`.

use serde_json::Value;

use crate::search::error::SearchError;
use crate::search::vocabulary::{Vocabulary, unknown_method_message};

/// Default result-list size for `maxList` and `count`
pub const DEFAULT_LIST_SIZE: u32 = 7;
/// Upper clamp for `maxList` and `count`
pub const MAX_LIST_SIZE: u32 = 500;

/// Normalized lookup parameters, ready for the query builder
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub vocabulary: Vocabulary,
    /// Trimmed search terms; an all-whitespace input passes validation and
    /// is sent upstream as an empty string
    pub terms: String,
    pub max_list: u32,
    pub offset: i64,
    pub count: u32,
    pub search_fields: Option<String>,
    pub display_fields: Option<String>,
    pub code_field: Option<String>,
    pub extra_fields: Option<String>,
    /// Raw additional boolean filter, untouched; the rewriter owns its handling
    pub additional_query: Option<String>,
    /// Result type override (loinc-questions)
    pub result_type: Option<String>,
    /// Availability filter (loinc-questions)
    pub available: Option<bool>,
    /// Copyright exclusion (major-surgeries-implants)
    pub exclude_copyrighted: Option<bool>,
}

impl SearchParams {
    /// Validate and normalize raw tool-call arguments
    pub fn from_arguments(args: &Value) -> Result<Self, SearchError> {
        let method = args
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchError::validation(unknown_method_message()))?;
        let vocabulary = Vocabulary::parse(method)?;

        let terms = match args.get("terms") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => {
                return Err(SearchError::validation(
                    "terms required and must be a string",
                ));
            }
        };

        Ok(SearchParams {
            vocabulary,
            terms,
            max_list: clamp_list_size(args.get("maxList")),
            offset: clamp_offset(args.get("offset")),
            count: clamp_list_size(args.get("count")),
            search_fields: optional_string(args.get("searchFields")),
            display_fields: optional_string(args.get("displayFields")),
            code_field: optional_string(args.get("codeField")),
            extra_fields: optional_string(args.get("extraFields")),
            additional_query: args
                .get("additionalQuery")
                .and_then(Value::as_str)
                .map(str::to_string),
            result_type: optional_string(args.get("type")),
            available: args.get("available").and_then(Value::as_bool),
            exclude_copyrighted: args.get("excludeCopyrighted").and_then(Value::as_bool),
        })
    }
}

/// Coerce a JSON value to an integer the way a dynamic caller would expect;
/// non-numeric input yields `None` so defaults apply
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

/// `min(max(value, 1), 500)` with the default applied before clamping
fn clamp_list_size(value: Option<&Value>) -> u32 {
    let raw = value
        .and_then(coerce_int)
        .unwrap_or(i64::from(DEFAULT_LIST_SIZE));
    raw.clamp(1, i64::from(MAX_LIST_SIZE)) as u32
}

/// Clamp `offset` to be non-negative; no upper bound
fn clamp_offset(value: Option<&Value>) -> i64 {
    value.and_then(coerce_int).unwrap_or(0).max(0)
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}
