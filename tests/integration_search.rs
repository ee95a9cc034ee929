//! Integration tests for the search pipeline
//!
//! Exercises validation, query construction, boolean-query rewriting, and
//! response mapping end to end against captured upstream payload shapes.
//! The network fetch itself is the only step not covered here.

use clinical_tables_mcp::search::{
    SearchError, SearchParams, Vocabulary, build_query, map_response, rewrite_additional_query,
};
use rstest::rstest;
use serde_json::json;

#[test]
fn pipeline_builds_the_documented_url_shape() {
    let params = SearchParams::from_arguments(&json!({
        "method": "icd-10-cm",
        "terms": "diabetes",
        "maxList": 10
    }))
    .unwrap();
    let query = build_query(&params);
    let url = query.url("https://clinicaltables.nlm.nih.gov");

    assert!(url.starts_with("https://clinicaltables.nlm.nih.gov/api/icd10cm/v3/search?"));
    assert!(url.contains("terms=diabetes"));
    assert!(url.contains("maxList=10"));
}

#[test]
fn mapped_envelope_matches_the_documented_example() {
    // Upstream: [2, ["A1","A2"], {"desc":["x","y"]}, [["A1 name"],["A2 name"]]]
    let raw = json!([2, ["A1", "A2"], {"desc": ["x", "y"]}, [["A1 name"], ["A2 name"]]]);
    let response = map_response(Vocabulary::Icd10Cm, 0, &raw).unwrap();
    let envelope = serde_json::to_value(&response).unwrap();

    assert_eq!(
        envelope,
        json!({
            "method": "icd-10-cm",
            "totalCount": 2,
            "results": [
                {"code": "A1", "display": "A1 name", "desc": "x"},
                {"code": "A2", "display": "A2 name", "desc": "y"}
            ],
            "pagination": {"offset": 0, "count": 2, "hasMore": false}
        })
    );
}

#[test]
fn truncated_upstream_array_is_a_format_error() {
    let raw = json!([2, ["A1", "A2"]]);
    let err = map_response(Vocabulary::Icd10Cm, 0, &raw).unwrap_err();
    assert!(matches!(err, SearchError::UpstreamFormat { .. }));
}

#[rstest]
#[case(2, 0, 2, false)] // totalCount == offset + results: boundary is false
#[case(3, 0, 2, true)]
#[case(10, 8, 2, false)]
#[case(11, 8, 2, true)]
fn has_more_uses_strict_comparison(
    #[case] total: i64,
    #[case] offset: i64,
    #[case] rows: usize,
    #[case] expected: bool,
) {
    let codes: Vec<String> = (0..rows).map(|i| format!("C{i}")).collect();
    let display: Vec<Vec<String>> = (0..rows).map(|i| vec![format!("name {i}")]).collect();
    let raw = json!([total, codes, null, display]);

    let response = map_response(Vocabulary::Conditions, offset, &raw).unwrap();
    assert_eq!(response.pagination.has_more, expected);
    assert_eq!(response.pagination.count, rows);
}

#[rstest]
#[case(
    "(diabetes OR hypertension) AND chronic",
    "(diabetes AND chronic) OR (hypertension AND chronic)"
)]
#[case(
    "chronic AND (diabetes OR hypertension)",
    "(chronic AND diabetes) OR (chronic AND hypertension)"
)]
#[case("asthma OR (diabetes AND chronic)", "asthma OR diabetes AND chronic")]
#[case("(diabetes OR hypertension)", "diabetes OR hypertension")]
#[case("(diabetes AND chronic)", "diabetes AND chronic")]
#[case("chronic AND (a OR b OR c)", "chronic AND (a OR b OR c)")]
fn rewriter_transforms_reach_the_outbound_query(#[case] input: &str, #[case] expected: &str) {
    let params = SearchParams::from_arguments(&json!({
        "method": "conditions",
        "terms": "pain",
        "additionalQuery": input
    }))
    .unwrap();
    let query = build_query(&params);
    let q = query
        .params
        .iter()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.as_str());
    assert_eq!(q, Some(expected));
}

#[test]
fn rewriter_is_idempotent_on_parenthesis_free_output() {
    let first = rewrite_additional_query(
        Some("(diabetes OR hypertension) AND chronic"),
        Vocabulary::Conditions,
    )
    .unwrap();
    // The distributed form still contains parentheses by construction, so
    // idempotence is checked on the flattened OR-of-AND output instead
    let flattened =
        rewrite_additional_query(Some("asthma OR (a AND b)"), Vocabulary::Conditions).unwrap();
    let again =
        rewrite_additional_query(Some(flattened.query.as_str()), Vocabulary::Conditions).unwrap();

    assert_eq!(again.query, flattened.query);
    assert!(again.diagnostics.is_empty());
    assert!(!first.query.is_empty());
}

#[test]
fn npi_organization_results_use_positional_display_columns() {
    let raw = json!([
        1,
        ["1093774722"],
        null,
        [["1093774722", "General Hospital", "Hospital", "12 Elm St, Anytown OH"]]
    ]);
    let response = map_response(Vocabulary::NpiOrganizations, 0, &raw).unwrap();
    let envelope = serde_json::to_value(&response).unwrap();

    assert_eq!(envelope["results"][0]["code"], json!("1093774722"));
    assert_eq!(envelope["results"][0]["display"], json!("General Hospital"));
    assert_eq!(envelope["results"][0]["providerType"], json!("Hospital"));
    assert_eq!(envelope["results"][0]["address"], json!("12 Elm St, Anytown OH"));
}

#[test]
fn rxterms_extra_columns_are_merged_and_renamed() {
    let raw = json!([
        1,
        ["211"],
        {
            "STRENGTHS_AND_FORMS": [["81 mg Chewable Tab", "325 mg Tab"]],
            "RXCUIS": [["243670", "198466"]]
        },
        ["Aspirin (Oral Pill)"]
    ]);
    let response = map_response(Vocabulary::RxTerms, 0, &raw).unwrap();
    let envelope = serde_json::to_value(&response).unwrap();

    assert_eq!(
        envelope["results"][0]["strengthsAndForms"],
        json!(["81 mg Chewable Tab", "325 mg Tab"])
    );
    assert_eq!(envelope["results"][0]["rxcuis"], json!(["243670", "198466"]));
}

#[test]
fn all_vocabularies_build_distinct_endpoint_paths() {
    let mut paths = std::collections::HashSet::new();
    for vocab in clinical_tables_mcp::search::ALL_VOCABULARIES {
        let params = SearchParams::from_arguments(&json!({
            "method": vocab.as_str(),
            "terms": "x"
        }))
        .unwrap();
        let query = build_query(&params);
        assert!(query.path.starts_with("/api/"));
        assert!(query.path.ends_with("/v3/search"));
        assert!(paths.insert(query.path.clone()), "duplicate path {}", query.path);
    }
    assert_eq!(paths.len(), 11);
}
