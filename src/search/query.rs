//! Outbound query construction
//!
//! Merges normalized parameters with the vocabulary's default field lists
//! into an ordered parameter list plus the endpoint path. The rewriter runs
//! here when the caller supplied a free-form additional query; its advisory
//! diagnostics ride along for the dispatcher to log.

use url::form_urlencoded;

use crate::search::params::SearchParams;
use crate::search::rewrite::rewrite_additional_query;
use crate::search::vocabulary::Vocabulary;

/// A fully assembled upstream search request
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Endpoint path under the configured base URL, e.g. `/api/icd10cm/v3/search`
    pub path: String,
    /// Ordered query parameters, not yet percent-encoded
    pub params: Vec<(String, String)>,
    /// Advisory diagnostics from the boolean-query rewriter
    pub diagnostics: Vec<String>,
}

impl SearchQuery {
    /// Render the percent-encoded query string
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }

    /// Full request URL against the given base
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}{}?{}",
            base_url.trim_end_matches('/'),
            self.path,
            self.query_string()
        )
    }
}

/// Build the upstream query for one validated request
pub fn build_query(params: &SearchParams) -> SearchQuery {
    let defaults = params.vocabulary.defaults();
    let mut pairs: Vec<(String, String)> = vec![
        ("terms".into(), params.terms.clone()),
        ("maxList".into(), params.max_list.to_string()),
        ("count".into(), params.count.to_string()),
        ("offset".into(), params.offset.to_string()),
        (
            "sf".into(),
            params
                .search_fields
                .clone()
                .unwrap_or_else(|| defaults.search_fields.to_string()),
        ),
        (
            "df".into(),
            params
                .display_fields
                .clone()
                .unwrap_or_else(|| defaults.display_fields.to_string()),
        ),
        (
            "cf".into(),
            params
                .code_field
                .clone()
                .unwrap_or_else(|| defaults.code_field.to_string()),
        ),
    ];

    let extra_fields = params
        .extra_fields
        .clone()
        .or_else(|| defaults.extra_fields.map(str::to_string));
    if let Some(ef) = extra_fields {
        pairs.push(("ef".into(), ef));
    }

    let mut diagnostics = Vec::new();
    if let Some(rewritten) =
        rewrite_additional_query(params.additional_query.as_deref(), params.vocabulary)
    {
        pairs.push(("q".into(), rewritten.query));
        diagnostics = rewritten.diagnostics;
    }

    match params.vocabulary {
        Vocabulary::LoincQuestions => {
            let result_type = params.result_type.clone().unwrap_or_else(|| "question".into());
            pairs.push(("type".into(), result_type));
            if let Some(available) = params.available {
                pairs.push(("available".into(), available.to_string()));
            }
        }
        Vocabulary::MajorSurgeriesImplants => {
            if let Some(exclude) = params.exclude_copyrighted {
                pairs.push(("excludeCopyrighted".into(), exclude.to_string()));
            }
        }
        _ => {}
    }

    SearchQuery {
        path: format!("/api/{}/v3/search", defaults.path),
        params: pairs,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params_for(args: serde_json::Value) -> SearchParams {
        SearchParams::from_arguments(&args).unwrap()
    }

    fn value_of<'a>(query: &'a SearchQuery, key: &str) -> Option<&'a str> {
        query
            .params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn defaults_fill_in_field_lists() {
        let query = build_query(&params_for(
            json!({"method": "icd-10-cm", "terms": "diabetes"}),
        ));
        assert_eq!(query.path, "/api/icd10cm/v3/search");
        assert_eq!(value_of(&query, "terms"), Some("diabetes"));
        assert_eq!(value_of(&query, "maxList"), Some("7"));
        assert_eq!(value_of(&query, "sf"), Some("code,name"));
        assert_eq!(value_of(&query, "df"), Some("code,name"));
        assert_eq!(value_of(&query, "cf"), Some("code"));
        assert_eq!(value_of(&query, "ef"), None);
        assert_eq!(value_of(&query, "q"), None);
    }

    #[test]
    fn caller_overrides_win_over_defaults() {
        let query = build_query(&params_for(json!({
            "method": "icd-10-cm",
            "terms": "diabetes",
            "searchFields": "name",
            "displayFields": "name",
            "codeField": "name",
            "extraFields": "synonyms"
        })));
        assert_eq!(value_of(&query, "sf"), Some("name"));
        assert_eq!(value_of(&query, "df"), Some("name"));
        assert_eq!(value_of(&query, "cf"), Some("name"));
        assert_eq!(value_of(&query, "ef"), Some("synonyms"));
    }

    #[test]
    fn vocabulary_default_extra_fields_apply() {
        let query = build_query(&params_for(json!({"method": "rx-terms", "terms": "aspirin"})));
        assert_eq!(value_of(&query, "ef"), Some("STRENGTHS_AND_FORMS,RXCUIS"));
    }

    #[test]
    fn additional_query_is_rewritten_before_sending() {
        let query = build_query(&params_for(json!({
            "method": "conditions",
            "terms": "pain",
            "additionalQuery": "(diabetes OR hypertension) AND chronic"
        })));
        assert_eq!(
            value_of(&query, "q"),
            Some("(diabetes AND chronic) OR (hypertension AND chronic)")
        );
        assert_eq!(query.diagnostics.len(), 1);
    }

    #[test]
    fn whitespace_additional_query_is_omitted_except_for_npi_organizations() {
        let omitted = build_query(&params_for(json!({
            "method": "conditions",
            "terms": "pain",
            "additionalQuery": "  "
        })));
        assert_eq!(value_of(&omitted, "q"), None);

        let forwarded = build_query(&params_for(json!({
            "method": "npi-organizations",
            "terms": "clinic",
            "additionalQuery": "  "
        })));
        assert_eq!(value_of(&forwarded, "q"), Some(""));
    }

    #[test]
    fn loinc_questions_always_sends_a_type() {
        let query = build_query(&params_for(
            json!({"method": "loinc-questions", "terms": "pain"}),
        ));
        assert_eq!(query.path, "/api/loinc_items/v3/search");
        assert_eq!(value_of(&query, "type"), Some("question"));
        assert_eq!(value_of(&query, "available"), None);

        let filtered = build_query(&params_for(json!({
            "method": "loinc-questions",
            "terms": "pain",
            "type": "panel",
            "available": true
        })));
        assert_eq!(value_of(&filtered, "type"), Some("panel"));
        assert_eq!(value_of(&filtered, "available"), Some("true"));
    }

    #[test]
    fn procedures_copyright_flag_is_optional() {
        let bare = build_query(&params_for(
            json!({"method": "major-surgeries-implants", "terms": "hip"}),
        ));
        assert_eq!(value_of(&bare, "excludeCopyrighted"), None);

        let flagged = build_query(&params_for(json!({
            "method": "major-surgeries-implants",
            "terms": "hip",
            "excludeCopyrighted": true
        })));
        assert_eq!(value_of(&flagged, "excludeCopyrighted"), Some("true"));
    }

    #[test]
    fn query_string_is_percent_encoded() {
        let query = build_query(&params_for(
            json!({"method": "icd-10-cm", "terms": "type 2 diabetes"}),
        ));
        let encoded = query.query_string();
        assert!(encoded.contains("terms=type+2+diabetes"));
        assert!(encoded.contains("sf=code%2Cname"));
    }

    #[test]
    fn url_joins_base_and_path() {
        let query = build_query(&params_for(json!({"method": "hpo-vocabulary", "terms": "x"})));
        let url = query.url("https://clinicaltables.nlm.nih.gov/");
        assert!(url.starts_with("https://clinicaltables.nlm.nih.gov/api/hpo/v3/search?"));
    }
}
