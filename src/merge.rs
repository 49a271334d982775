//! Merging of dimension results into a single scored report.
//!
//! [`merge`] is deterministic for a fixed input: results are re-ordered by
//! dimension declaration order (performance, security, standards) before
//! issues and recommendations are concatenated, so worker completion order
//! never leaks into the output. Only `created_at` varies between calls.
//!
//! # Scoring
//!
//! ```text
//! security score < 40  OR  risk level high/critical
//!         │ yes                        │ no
//!         ▼                            ▼
//! min(30, security score or 0)   round(mean of present scores), 0 if none
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    cache::Fingerprint,
    dialect::SqlDialect,
    dimension::{Dimension, DimensionResult, Severity}
};

/// Security score below which the veto triggers
pub const VETO_SCORE_THRESHOLD: u8 = 40;
/// Maximum overall score when the veto triggered
pub const VETO_SCORE_CAP: u8 = 30;
/// Summary used when no dimension produced a judgment
pub const ALL_FAILED_SUMMARY: &str =
    "All analysis dimensions failed; no judgment is available for this statement.";

/// Issue tagged with the dimension that reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedIssue {
    pub dimension:   Dimension,
    pub description: String,
    pub severity:    Severity
}

/// Recommendation tagged with the dimension that made it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedRecommendation {
    pub dimension: Dimension,
    pub text:      String
}

/// Outcome of the security veto rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityVeto {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason:    Option<String>
}

/// Final report for one analyzed statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedReport {
    pub success:             bool,
    pub summary:             String,
    pub all_issues:          Vec<TaggedIssue>,
    pub all_recommendations: Vec<TaggedRecommendation>,
    pub overall_score:       u8,
    pub security_veto:       SecurityVeto,
    pub per_dimension:       IndexMap<Dimension, DimensionResult>,
    pub dialect:             SqlDialect,
    pub fingerprint:         String,
    pub created_at:          DateTime<Utc>
}

impl MergedReport {
    /// Attach the resolved dialect and cache fingerprint
    pub fn with_origin(mut self, dialect: SqlDialect, fingerprint: &Fingerprint) -> Self {
        self.dialect = dialect;
        self.fingerprint = fingerprint.to_hex();
        self
    }

    /// Number of high or critical issues
    pub fn severe_issue_count(&self) -> usize {
        self.all_issues
            .iter()
            .filter(|i| i.severity.is_severe())
            .count()
    }

    /// Dimensions whose worker degraded
    pub fn degraded_dimensions(&self) -> Vec<Dimension> {
        self.per_dimension
            .values()
            .filter(|r| !r.success)
            .map(|r| r.dimension)
            .collect()
    }
}

/// Map an overall score to its label
pub fn score_label(score: u8) -> &'static str {
    match score {
        90.. => "excellent",
        80..=89 => "good",
        60..=79 => "fair",
        _ => "needs improvement"
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Evaluate the security veto against the security result, if any
pub fn evaluate_veto(security: Option<&DimensionResult>) -> SecurityVeto {
    let Some(result) = security else {
        return SecurityVeto::default();
    };
    let mut reasons = Vec::new();
    if let Some(risk) = result.payload.risk_level.filter(|r| r.is_severe()) {
        reasons.push(format!("security risk level is {}", risk));
    }
    if let Some(score) = result
        .payload
        .dimension_score
        .filter(|s| *s < VETO_SCORE_THRESHOLD)
    {
        reasons.push(format!(
            "security score {} is below {}",
            score, VETO_SCORE_THRESHOLD
        ));
    }
    if reasons.is_empty() {
        return SecurityVeto::default();
    }
    SecurityVeto {
        triggered: true,
        reason:    Some(reasons.join(" and "))
    }
}

fn overall_score(results: &[DimensionResult], veto: &SecurityVeto) -> u8 {
    if veto.triggered {
        let security_score = results
            .iter()
            .find(|r| r.dimension == Dimension::Security)
            .and_then(|r| r.payload.dimension_score)
            .unwrap_or(0);
        return security_score.min(VETO_SCORE_CAP);
    }
    let scores: Vec<u32> = results
        .iter()
        .filter_map(|r| r.payload.dimension_score)
        .map(u32::from)
        .collect();
    if scores.is_empty() {
        return 0;
    }
    let mean = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

fn build_summary(
    issues: &[TaggedIssue],
    recommendations: usize,
    score: u8,
    veto: &SecurityVeto,
    degraded: usize
) -> String {
    let severe = issues.iter().filter(|i| i.severity.is_severe()).count();
    let mut summary = format!(
        "{} found, {} of high or critical severity. {} provided. Overall score: {}/100 ({}).",
        plural(issues.len(), "issue"),
        severe,
        plural(recommendations, "recommendation"),
        score,
        score_label(score)
    );
    if let Some(reason) = veto.reason.as_deref().filter(|_| veto.triggered) {
        summary.push_str(&format!(" Security veto applied: {}.", reason));
    }
    if degraded > 0 {
        summary.push_str(&format!(
            " {} could not be evaluated.",
            plural(degraded, "dimension")
        ));
    }
    summary
}

/// Merge dimension results into one report.
///
/// Pure apart from the `created_at` timestamp; cannot fail.
pub fn merge(mut results: Vec<DimensionResult>) -> MergedReport {
    results.sort_by_key(|r| r.dimension);

    let all_issues: Vec<TaggedIssue> = results
        .iter()
        .flat_map(|r| {
            r.payload.issues.iter().map(|issue| TaggedIssue {
                dimension:   r.dimension,
                description: issue.description.clone(),
                severity:    issue.severity
            })
        })
        .collect();
    let all_recommendations: Vec<TaggedRecommendation> = results
        .iter()
        .flat_map(|r| {
            r.payload
                .recommendations
                .iter()
                .map(|text| TaggedRecommendation {
                    dimension: r.dimension,
                    text:      text.clone()
                })
        })
        .collect();

    let security_veto = evaluate_veto(results.iter().find(|r| r.dimension == Dimension::Security));
    let overall_score = overall_score(&results, &security_veto);
    let degraded = results.iter().filter(|r| !r.success).count();
    let success = degraded < results.len();
    let summary = if success {
        build_summary(
            &all_issues,
            all_recommendations.len(),
            overall_score,
            &security_veto,
            degraded
        )
    } else {
        ALL_FAILED_SUMMARY.to_string()
    };

    MergedReport {
        success,
        summary,
        all_issues,
        all_recommendations,
        overall_score,
        security_veto,
        per_dimension: results.into_iter().map(|r| (r.dimension, r)).collect(),
        dialect: SqlDialect::Generic,
        fingerprint: String::new(),
        created_at: Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_labels() {
        assert_eq!(score_label(100), "excellent");
        assert_eq!(score_label(90), "excellent");
        assert_eq!(score_label(85), "good");
        assert_eq!(score_label(60), "fair");
        assert_eq!(score_label(59), "needs improvement");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "issue"), "1 issue");
        assert_eq!(plural(0, "issue"), "0 issues");
    }

    #[test]
    fn test_empty_results_fail() {
        let report = merge(Vec::new());
        assert!(!report.success);
        assert_eq!(report.summary, ALL_FAILED_SUMMARY);
        assert_eq!(report.overall_score, 0);
    }
}
