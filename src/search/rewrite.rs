//! Boolean-query rewriting for the upstream free-text filter
//!
//! The Clinical Table Search Service has unreliable support for
//! parenthesis-grouped boolean expressions in its `q` filter. This module
//! detects problematic parentheses (ignoring any inside double-quoted
//! literals) and applies a small ordered set of algebraic rewrites that
//! produce an equivalent parenthesis-free form. The pattern set is
//! intentionally limited to a single group with a single inner operator;
//! nested or multi-group expressions pass through unchanged with a warning.
//!
//! Diagnostics are advisory. They never fail the request and never change
//! the returned string beyond the documented transform.

use std::sync::LazyLock;

use regex::Regex;

use crate::search::vocabulary::Vocabulary;

/// Result of running the rewriter over an additional query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenQuery {
    /// The string to send upstream as the `q` parameter
    pub query: String,
    /// Advisory warnings describing the transform, if any
    pub diagnostics: Vec<String>,
}

impl RewrittenQuery {
    fn clean(query: impl Into<String>) -> Self {
        RewrittenQuery {
            query: query.into(),
            diagnostics: Vec::new(),
        }
    }
}

// Double-quoted literals are stripped before parenthesis detection so a
// quoted "(asthma)" never triggers a rewrite.
static QUOTED_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*""#).unwrap());

// The five rewrite patterns, tried in order; first clean match wins. Each
// requires exactly one parenthesized group with exactly one inner operator:
// nested groups never match, and groups with extra operators are rejected by
// the per-operand check after capture.
static AND_OVER_OR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^()]+?)\s+AND\s+\(\s*([^()]+?)\s+OR\s+([^()]+?)\s*\)$").unwrap()
});
static OR_OF_AND_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^()]+?)\s+OR\s+\(\s*([^()]+?)\s+AND\s+([^()]+?)\s*\)$").unwrap()
});
static OR_GROUP_AND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(\s*([^()]+?)\s+OR\s+([^()]+?)\s*\)\s+AND\s+([^()]+?)$").unwrap()
});
// The operator is captured so a bare strip changes nothing but the parens.
static BARE_OR_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*([^()]+?)\s+(OR)\s+([^()]+?)\s*\)$").unwrap());
static BARE_AND_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\(\s*([^()]+?)\s+(AND)\s+([^()]+?)\s*\)$").unwrap());

/// Prepare a caller-supplied additional query for the upstream `q` parameter.
///
/// Returns `None` when the parameter should be omitted from the request.
/// The organization search is the one exception: a present but
/// whitespace-only query is forwarded as an explicit empty parameter there,
/// while every other vocabulary drops it.
pub fn rewrite_additional_query(
    raw: Option<&str>,
    vocabulary: Vocabulary,
) -> Option<RewrittenQuery> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        if vocabulary == Vocabulary::NpiOrganizations {
            return Some(RewrittenQuery::clean(""));
        }
        return None;
    }
    Some(rewrite(trimmed))
}

/// Apply the parenthesis rewrite rules to a non-empty, trimmed query
pub fn rewrite(query: &str) -> RewrittenQuery {
    if !has_problematic_parentheses(query) {
        return RewrittenQuery::clean(query);
    }

    if let Some(caps) = AND_OVER_OR.captures(query) {
        let (a, b, c) = (trimmed(&caps, 1), trimmed(&caps, 2), trimmed(&caps, 3));
        if group_operands_are_atomic(&[b, c]) {
            let rewritten = format!("({a} AND {b}) OR ({a} AND {c})");
            return with_rewrite_diagnostic(query, rewritten);
        }
    }

    if let Some(caps) = OR_OF_AND_GROUP.captures(query) {
        let (a, b, c) = (trimmed(&caps, 1), trimmed(&caps, 2), trimmed(&caps, 3));
        if group_operands_are_atomic(&[b, c]) {
            // OR does not distribute over AND; the parentheses are stripped
            // without redistribution and the caller is told to split the query.
            let rewritten = format!("{a} OR {b} AND {c}");
            return RewrittenQuery {
                query: rewritten,
                diagnostics: vec![format!(
                    "OR cannot be distributed over AND; removed parentheses from \"{query}\". \
                     Consider splitting into two separate queries: \"{a}\" and \"{b} AND {c}\""
                )],
            };
        }
    }

    if let Some(caps) = OR_GROUP_AND.captures(query) {
        let (a, b, c) = (trimmed(&caps, 1), trimmed(&caps, 2), trimmed(&caps, 3));
        if group_operands_are_atomic(&[a, b]) {
            let rewritten = format!("({a} AND {c}) OR ({b} AND {c})");
            return with_rewrite_diagnostic(query, rewritten);
        }
    }

    if let Some(caps) = BARE_OR_GROUP.captures(query) {
        let (a, op, b) = (trimmed(&caps, 1), trimmed(&caps, 2), trimmed(&caps, 3));
        if group_operands_are_atomic(&[a, b]) {
            return with_rewrite_diagnostic(query, format!("{a} {op} {b}"));
        }
    }

    if let Some(caps) = BARE_AND_GROUP.captures(query) {
        let (a, op, b) = (trimmed(&caps, 1), trimmed(&caps, 2), trimmed(&caps, 3));
        if group_operands_are_atomic(&[a, b]) {
            return with_rewrite_diagnostic(query, format!("{a} {op} {b}"));
        }
    }

    RewrittenQuery {
        query: query.to_string(),
        diagnostics: vec![format!(
            "additional query \"{query}\" contains parentheses that could not be rewritten; \
             the upstream API may handle it unpredictably"
        )],
    }
}

/// True when the query contains parentheses outside double-quoted literals
fn has_problematic_parentheses(query: &str) -> bool {
    let stripped = QUOTED_LITERAL.replace_all(query, "");
    stripped.contains('(') || stripped.contains(')')
}

/// True when none of the group's operands contains a further boolean operator.
///
/// The lazy regex captures still match a group holding two or more operators
/// (the trailing operand swallows the rest), so each pattern re-checks its
/// in-group operands and falls through to the warning branch otherwise.
fn group_operands_are_atomic(operands: &[&str]) -> bool {
    operands.iter().all(|operand| {
        !operand
            .split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("AND") || token.eq_ignore_ascii_case("OR"))
    })
}

fn trimmed<'t>(caps: &regex::Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str().trim())
}

fn with_rewrite_diagnostic(original: &str, rewritten: String) -> RewrittenQuery {
    let diagnostics = if rewritten != original {
        vec![format!(
            "rewrote additional query \"{original}\" to \"{rewritten}\""
        )]
    } else {
        Vec::new()
    };
    RewrittenQuery {
        query: rewritten,
        diagnostics,
    }
}
