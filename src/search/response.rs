//! Response mapping from the upstream positional-array format
//!
//! The terminology API answers every search with a fixed positional tuple:
//! `[totalCount, codes, extraFields | null, displayData, codeSystems?]`.
//! Indices correlate across the arrays; `codes[i]`, `displayData[i]` and
//! every `extraFields[*][i]` describe the same logical result row. That
//! wire format is parsed once here at the boundary and converted straight
//! to row-oriented records; positional indexing never leaks past this
//! module.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::search::error::SearchError;
use crate::search::vocabulary::{DisplayMapping, Vocabulary};

/// The raw upstream tuple, validated but not yet row-oriented
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub total_count: i64,
    pub codes: Vec<Value>,
    pub extra_fields: Option<Map<String, Value>>,
    pub display_data: Vec<Value>,
}

impl UpstreamResponse {
    /// Validate the positional tuple shape; errors name the vocabulary
    /// whose API produced the malformed payload
    pub fn from_value(vocabulary: Vocabulary, value: &Value) -> Result<Self, SearchError> {
        let wire = vocabulary.as_str();
        let elements = value.as_array().ok_or_else(|| {
            SearchError::format(wire, "expected a JSON array response from the API")
        })?;
        if elements.len() < 4 {
            return Err(SearchError::format(
                wire,
                format!(
                    "expected at least 4 response elements, got {}",
                    elements.len()
                ),
            ));
        }

        let codes = elements[1]
            .as_array()
            .cloned()
            .ok_or_else(|| SearchError::format(wire, "codes element is not an array"))?;
        let display_data = elements[3]
            .as_array()
            .cloned()
            .ok_or_else(|| SearchError::format(wire, "display element is not an array"))?;

        Ok(UpstreamResponse {
            total_count: coerce_count(&elements[0]),
            codes,
            extra_fields: elements[2].as_object().cloned(),
            display_data,
        })
    }
}

/// One result row in the uniform envelope
#[derive(Debug, Clone, Serialize)]
pub struct CodeResult {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Vocabulary-specific named fields merged from the extra-field columns
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Pagination metadata computed against the raw upstream total
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: i64,
    pub count: usize,
    pub has_more: bool,
}

/// The uniform response envelope returned for every vocabulary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub method: String,
    pub total_count: i64,
    pub results: Vec<CodeResult>,
    pub pagination: Pagination,
}

/// Map a raw upstream payload into the uniform envelope
pub fn map_response(
    vocabulary: Vocabulary,
    offset: i64,
    raw: &Value,
) -> Result<SearchResponse, SearchError> {
    let upstream = UpstreamResponse::from_value(vocabulary, raw)?;
    let results = map_rows(vocabulary, &upstream);
    let has_more = upstream.total_count > offset + results.len() as i64;

    Ok(SearchResponse {
        method: vocabulary.as_str().to_string(),
        total_count: upstream.total_count,
        pagination: Pagination {
            offset,
            count: results.len(),
            has_more,
        },
        results,
    })
}

fn map_rows(vocabulary: Vocabulary, upstream: &UpstreamResponse) -> Vec<CodeResult> {
    let defaults = vocabulary.defaults();
    (0..upstream.codes.len())
        .map(|row| {
            let mut fields = Map::new();
            let display = match defaults.display {
                DisplayMapping::JoinWithPipe => joined_display(upstream.display_data.get(row)),
                DisplayMapping::Positional {
                    display_index,
                    named,
                } => match upstream.display_data.get(row).and_then(Value::as_array) {
                    Some(columns) => {
                        for (index, key) in named {
                            if let Some(cell) = columns.get(*index) {
                                if !cell.is_null() {
                                    fields.insert((*key).to_string(), cell.clone());
                                }
                            }
                        }
                        columns.get(display_index).and_then(display_text)
                    }
                    // A scalar row falls back to the generic handling
                    None => joined_display(upstream.display_data.get(row)),
                },
            };

            if let Some(extra) = &upstream.extra_fields {
                for (name, column) in extra {
                    let Some(column) = column.as_array() else {
                        continue;
                    };
                    // A short column means the entry is absent for this row,
                    // not an error.
                    if let Some(cell) = column.get(row) {
                        fields.insert(vocabulary.output_field_name(name), cell.clone());
                    }
                }
            }

            CodeResult {
                code: code_text(&upstream.codes[row]),
                display,
                fields,
            }
        })
        .collect()
}

/// Default display handling: join list rows with `" | "`, pass strings
/// through, and leave absent rows absent rather than falling back to the code
fn joined_display(entry: Option<&Value>) -> Option<String> {
    match entry {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(display_text)
                .collect::<Vec<_>>()
                .join(" | "),
        ),
        Some(other) => display_text(other),
    }
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn code_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `totalCount || 0`: a missing or non-numeric first element counts as zero
fn coerce_count(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}
