//! Type definitions shared by dimension workers, the parser and the merger.
//!
//! - [`Dimension`] - Analysis axis (Performance, Security, Standards)
//! - [`Severity`] - Issue severity levels (Low, Medium, High, Critical)
//! - [`RiskLevel`] - Overall security risk reported by the security dimension
//! - [`DimensionPayload`] - Normalized judgment content
//! - [`DimensionResult`] - One dimension's outcome for one request

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, validation_error};

/// Independent axis of SQL judgment.
///
/// Declaration order is significant: the merger emits issues and
/// recommendations in this order, and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Performance,
    Security,
    Standards
}

impl Dimension {
    /// All dimensions in declaration order
    pub const ALL: [Dimension; 3] = [
        Dimension::Performance,
        Dimension::Security,
        Dimension::Standards
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Standards => "standards"
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "performance" | "perf" => Ok(Self::Performance),
            "security" | "sec" => Ok(Self::Security),
            "standards" | "style" => Ok(Self::Standards),
            other => Err(validation_error(format!("unsupported dimension '{}'", other)))
        }
    }
}

/// Normalize a requested dimension set: empty means all dimensions
pub fn normalize_dimensions(requested: impl IntoIterator<Item = Dimension>) -> BTreeSet<Dimension> {
    let set: BTreeSet<Dimension> = requested.into_iter().collect();
    if set.is_empty() {
        Dimension::ALL.into_iter().collect()
    } else {
        set
    }
}

/// Severity of a single issue reported by the Judge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical
}

impl Severity {
    /// Lenient parse; unknown labels read as `Medium`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "info" | "minor" => Self::Low,
            "high" | "major" | "error" => Self::High,
            "critical" | "blocker" | "severe" => Self::Critical,
            _ => Self::Medium
        }
    }

    /// High or critical
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL")
        }
    }
}

/// Overall security risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown
}

impl RiskLevel {
    /// Case-insensitive parse; anything unrecognized is `Unknown`
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "none" => Self::Low,
            "medium" | "moderate" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Unknown
        }
    }

    /// High or critical risk triggers the security veto
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Unknown => "unknown"
        };
        write!(f, "{}", s)
    }
}

/// A single issue in a dimension judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub description: String,
    pub severity:    Severity
}

/// Normalized judgment content for one dimension.
///
/// All dimensions share the envelope; `risk_level` is only set for
/// security, `metrics` only for performance and `compliance_score` only for
/// standards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionPayload {
    pub summary:          String,
    pub issues:           Vec<Issue>,
    pub recommendations:  Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_score:  Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level:       Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics:          Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<u8>
}

impl DimensionPayload {
    /// Canned low-confidence payload substituted when a dimension could not
    /// be evaluated
    pub fn fallback(dimension: Dimension) -> Self {
        let summary = match dimension {
            Dimension::Performance => {
                "Performance analysis unavailable: the judgment could not be obtained or interpreted."
            }
            Dimension::Security => {
                "Security analysis unavailable: the judgment could not be obtained or interpreted."
            }
            Dimension::Standards => {
                "Standards analysis unavailable: the judgment could not be obtained or interpreted."
            }
        };
        Self {
            summary: summary.to_string(),
            risk_level: (dimension == Dimension::Security).then_some(RiskLevel::Unknown),
            ..Self::default()
        }
    }
}

/// Strategy the parser used to obtain a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Whole response was the expected object
    StructuredParse,
    /// Object was recovered from surrounding prose or a code fence
    RecoveredParse,
    /// Canned fallback payload
    Fallback
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredParse => write!(f, "structured_parse"),
            Self::RecoveredParse => write!(f, "recovered_parse"),
            Self::Fallback => write!(f, "fallback")
        }
    }
}

/// Confidence reported for fallback payloads
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Outcome of one dimension for one request.
///
/// `success == false` always carries the dimension's fallback payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension:   Dimension,
    pub success:     bool,
    pub payload:     DimensionPayload,
    pub confidence:  f64,
    pub raw_text:    String,
    pub strategy:    ParseStrategy,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:       Option<String>
}

impl DimensionResult {
    /// Degraded result for a dimension whose Judge call failed
    pub fn degraded(
        dimension: Dimension,
        raw_text: String,
        duration_ms: u64,
        error: impl Into<String>
    ) -> Self {
        Self {
            dimension,
            success: false,
            payload: DimensionPayload::fallback(dimension),
            confidence: FALLBACK_CONFIDENCE,
            raw_text,
            strategy: ParseStrategy::Fallback,
            duration_ms,
            error: Some(error.into())
        }
    }
}
