//! Prompt templates for each analysis dimension.

use super::Dimension;
use crate::{dialect::SqlDialect, knowledge::Snippet};

const RESPONSE_FORMAT: &str = "Respond with a single JSON object and nothing else, using this shape:\n\
{\"summary\": string, \"issues\": [{\"description\": string, \"severity\": \
\"low\"|\"medium\"|\"high\"|\"critical\"}], \"recommendations\": [string], \
\"score\": integer 0-100, \"confidence\": number 0-1";

fn instructions(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Performance => {
            "You are a database performance expert. Review the SQL statement below for \
             performance problems: full table scans, missing or unusable indexes, functions \
             applied to indexed columns, unbounded result sets, N+1 subqueries, expensive \
             sorts and joins without conditions. Score 100 means no performance concerns."
        }
        Dimension::Security => {
            "You are a database security auditor. Review the SQL statement below for security \
             risks: injection-prone string concatenation, dynamic SQL, bulk UPDATE or DELETE \
             without WHERE, destructive DDL, privilege changes and exposure of sensitive \
             columns. Score 100 means no security concerns."
        }
        Dimension::Standards => {
            "You are a SQL code reviewer. Review the SQL statement below against common coding \
             standards: explicit column lists instead of SELECT *, consistent keyword casing, \
             meaningful aliases, readable formatting and portable constructs. Score 100 means \
             fully compliant."
        }
    }
}

fn extra_fields(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Performance => ", \"metrics\": object with any estimates you can give}",
        Dimension::Security => ", \"riskLevel\": \"low\"|\"medium\"|\"high\"|\"critical\"}",
        Dimension::Standards => ", \"complianceScore\": integer 0-100}"
    }
}

/// Build the prompt sent to the Judge for one dimension
pub fn build_prompt(
    dimension: Dimension,
    sql: &str,
    dialect: SqlDialect,
    snippets: &[Snippet]
) -> String {
    let mut prompt = String::with_capacity(sql.len() + 1024);
    prompt.push_str(instructions(dimension));
    prompt.push_str("\n\nDialect: ");
    prompt.push_str(dialect.display_name());
    prompt.push_str("\n\nSQL:\n```sql\n");
    prompt.push_str(sql.trim());
    prompt.push_str("\n```\n\n");
    if !snippets.is_empty() {
        prompt.push_str("Reference material:\n");
        for snippet in snippets {
            prompt.push_str(&format!("- [{}] {}\n", snippet.source_id, snippet.content));
        }
        prompt.push('\n');
    }
    prompt.push_str(RESPONSE_FORMAT);
    prompt.push_str(extra_fields(dimension));
    prompt
}
