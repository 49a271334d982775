//! Best-effort parsing of Judge output into typed dimension payloads.
//!
//! Judge responses are free text that usually, but not always, contain the
//! requested JSON object. Parsing walks a fixed chain of strategies and stops
//! at the first one that succeeds:
//!
//! 1. [`ParseStrategy::StructuredParse`] - the whole trimmed response is the
//!    expected object.
//! 2. [`ParseStrategy::RecoveredParse`] - the first balanced `{...}` substring
//!    that reads as a judgment (the model wrapped the payload in prose or a
//!    fenced code block). Objects without any judgment key, such as `{}` or
//!    `{"error": "..."}`, are skipped.
//! 3. [`ParseStrategy::Fallback`] - the dimension's canned payload with
//!    confidence `0.3`.
//!
//! There is no error path: a malformed response must never abort sibling
//! workers.
//!
//! # Example
//!
//! ```
//! use sql_analysis_engine::{
//!     dimension::{Dimension, ParseStrategy},
//!     parser::parse
//! };
//!
//! let raw = "Here you go: ```json\n{\"summary\": \"ok\", \"score\": \"85\"}\n```";
//! let outcome = parse(raw, Dimension::Performance);
//! assert_eq!(outcome.strategy, ParseStrategy::RecoveredParse);
//! assert_eq!(outcome.payload.dimension_score, Some(85));
//! ```

mod recover;

pub use recover::balanced_objects;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::dimension::{
    Dimension, DimensionPayload, FALLBACK_CONFIDENCE, Issue, ParseStrategy, RiskLevel, Severity
};

/// Parsed payload with its confidence and the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub payload:    DimensionPayload,
    pub confidence: f64,
    pub strategy:   ParseStrategy
}

impl ParseOutcome {
    fn fallback(dimension: Dimension) -> Self {
        Self {
            payload:    DimensionPayload::fallback(dimension),
            confidence: FALLBACK_CONFIDENCE,
            strategy:   ParseStrategy::Fallback
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.strategy == ParseStrategy::Fallback
    }
}

/// Accepted spellings, first present wins
const SCORE_KEYS: &[&str] = &[
    "score",
    "dimensionScore",
    "dimension_score",
    "performance_score",
    "security_score",
    "standards_score"
];
const RISK_KEYS: &[&str] = &["risk_level", "riskLevel", "risk"];
const COMPLIANCE_KEYS: &[&str] = &["compliance_score", "complianceScore"];

#[derive(Debug)]
struct RawPayload {
    summary:          Option<String>,
    issues:           Option<Vec<RawIssue>>,
    recommendations:  Option<Vec<RawRecommendation>>,
    score:            Option<Value>,
    confidence:       Option<Value>,
    risk_level:       Option<String>,
    metrics:          Option<Value>,
    compliance_score: Option<Value>
}

impl RawPayload {
    /// Read a payload from one JSON object.
    ///
    /// Returns `None` when the text is not an object, a known key has the
    /// wrong shape, or the object carries none of the judgment keys.
    fn from_json(text: &str) -> Option<Self> {
        let Value::Object(mut map) = serde_json::from_str::<Value>(text).ok()? else {
            return None;
        };
        let payload = Self {
            summary:          take(&mut map, &["summary"])?,
            issues:           take(&mut map, &["issues"])?,
            recommendations:  take(&mut map, &["recommendations"])?,
            score:            take(&mut map, SCORE_KEYS)?,
            confidence:       take(&mut map, &["confidence"])?,
            risk_level:       take(&mut map, RISK_KEYS)?,
            metrics:          take(&mut map, &["metrics"])?,
            compliance_score: take(&mut map, COMPLIANCE_KEYS)?
        };
        payload.has_judgment().then_some(payload)
    }

    fn has_judgment(&self) -> bool {
        self.summary.is_some()
            || self.issues.is_some()
            || self.recommendations.is_some()
            || self.score.is_some()
            || self.risk_level.is_some()
            || self.compliance_score.is_some()
    }
}

/// First non-null value among `keys`.
///
/// The outer `None` means the value is present but has the wrong shape.
fn take<T: DeserializeOwned>(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Option<T>> {
    let value = keys
        .iter()
        .filter_map(|key| map.remove(*key))
        .find(|value| !value.is_null());
    match value {
        Some(value) => serde_json::from_value(value).ok().map(Some),
        None => Some(None)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIssue {
    Text(String),
    Detailed {
        #[serde(default, alias = "issue", alias = "message", alias = "title")]
        description: Option<String>,
        #[serde(default)]
        severity:    Option<Value>
    }
}

impl RawIssue {
    fn into_issue(self) -> Option<Issue> {
        match self {
            Self::Text(description) => Some(Issue {
                description,
                severity: Severity::default()
            }),
            Self::Detailed {
                description,
                severity
            } => {
                let severity = match severity {
                    Some(Value::String(s)) => Severity::parse_lenient(&s),
                    _ => Severity::default()
                };
                description
                    .filter(|d| !d.trim().is_empty())
                    .map(|description| Issue {
                        description,
                        severity
                    })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRecommendation {
    Text(String),
    Detailed {
        #[serde(
            default,
            alias = "suggestion",
            alias = "recommendation",
            alias = "text"
        )]
        description: Option<String>
    }
}

impl RawRecommendation {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => Some(text),
            Self::Detailed {
                description
            } => description
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Parse a Judge response for the given dimension. Never fails.
pub fn parse(raw: &str, dimension: Dimension) -> ParseOutcome {
    if let Some(payload) = RawPayload::from_json(raw.trim()) {
        return normalize(payload, dimension, ParseStrategy::StructuredParse);
    }
    for candidate in balanced_objects(raw) {
        if let Some(payload) = RawPayload::from_json(candidate) {
            return normalize(payload, dimension, ParseStrategy::RecoveredParse);
        }
    }
    ParseOutcome::fallback(dimension)
}

/// Numeric value from a JSON number or a numeric-looking string
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None
    }?;
    n.is_finite().then_some(n)
}

fn coerce_score(value: Option<&Value>) -> Option<u8> {
    value
        .and_then(coerce_number)
        .map(|n| n.clamp(0.0, 100.0).round() as u8)
}

fn coerce_confidence(value: Option<&Value>) -> Option<f64> {
    let n = value.and_then(coerce_number)?;
    // "85" or 85 means a percentage
    let n = if n > 1.0 && n <= 100.0 { n / 100.0 } else { n };
    Some(n.clamp(0.0, 1.0))
}

/// Completeness-based confidence estimate, bounded to `[0.3, 1.0]`
pub fn estimate_confidence(payload: &DimensionPayload) -> f64 {
    let parts = [
        !payload.summary.trim().is_empty(),
        !payload.issues.is_empty(),
        !payload.recommendations.is_empty()
    ];
    let present = parts.iter().filter(|p| **p).count() as f64;
    (present / 3.0).clamp(FALLBACK_CONFIDENCE, 1.0)
}

fn normalize(raw: RawPayload, dimension: Dimension, strategy: ParseStrategy) -> ParseOutcome {
    let mut payload = DimensionPayload {
        summary: raw.summary.unwrap_or_default(),
        issues: raw
            .issues
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawIssue::into_issue)
            .collect(),
        recommendations: raw
            .recommendations
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawRecommendation::into_text)
            .collect(),
        dimension_score: coerce_score(raw.score.as_ref()),
        ..DimensionPayload::default()
    };
    match dimension {
        Dimension::Security => {
            payload.risk_level = Some(
                raw.risk_level
                    .as_deref()
                    .map(RiskLevel::parse_lenient)
                    .unwrap_or_default()
            );
        }
        Dimension::Performance => {
            payload.metrics = raw.metrics.filter(|m| !m.is_null());
        }
        Dimension::Standards => {
            payload.compliance_score = coerce_score(raw.compliance_score.as_ref());
        }
    }
    let confidence = coerce_confidence(raw.confidence.as_ref())
        .unwrap_or_else(|| estimate_confidence(&payload));
    ParseOutcome {
        payload,
        confidence,
        strategy
    }
}
