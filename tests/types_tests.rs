// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use sql_analysis_engine::{
    dimension::{
        Dimension, DimensionPayload, DimensionResult, FALLBACK_CONFIDENCE, ParseStrategy,
        RiskLevel, Severity, normalize_dimensions
    },
    engine::{AnalysisRequest, BatchOutcome}
};

#[test]
fn test_severity_display() {
    assert_eq!(format!("{}", Severity::Low), "LOW");
    assert_eq!(format!("{}", Severity::Medium), "MEDIUM");
    assert_eq!(format!("{}", Severity::High), "HIGH");
    assert_eq!(format!("{}", Severity::Critical), "CRITICAL");
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::High < Severity::Critical);
    assert!(Severity::Critical.is_severe());
    assert!(!Severity::Medium.is_severe());
}

#[test]
fn test_severity_lenient_parse() {
    assert_eq!(Severity::parse_lenient("Blocker"), Severity::Critical);
    assert_eq!(Severity::parse_lenient(" minor "), Severity::Low);
    assert_eq!(Severity::parse_lenient("whatever"), Severity::Medium);
}

#[test]
fn test_risk_level() {
    assert_eq!(RiskLevel::parse_lenient("HIGH"), RiskLevel::High);
    assert_eq!(RiskLevel::parse_lenient("none"), RiskLevel::Low);
    assert_eq!(RiskLevel::default(), RiskLevel::Unknown);
    assert_eq!(RiskLevel::Unknown.to_string(), "unknown");
    assert!(!RiskLevel::Medium.is_severe());
}

#[test]
fn test_dimension_parse_and_display() {
    assert_eq!("perf".parse::<Dimension>().unwrap(), Dimension::Performance);
    assert_eq!("Security".parse::<Dimension>().unwrap(), Dimension::Security);
    assert_eq!("style".parse::<Dimension>().unwrap(), Dimension::Standards);
    assert!("latency".parse::<Dimension>().is_err());
    assert_eq!(Dimension::Standards.to_string(), "standards");
}

#[test]
fn test_normalize_dimensions() {
    let all = normalize_dimensions(Vec::<Dimension>::new());
    assert_eq!(all.len(), 3);
    let some = normalize_dimensions([Dimension::Security, Dimension::Security]);
    assert_eq!(some.len(), 1);
}

#[test]
fn test_fallback_payloads() {
    for dimension in Dimension::ALL {
        let payload = DimensionPayload::fallback(dimension);
        assert!(!payload.summary.is_empty());
        assert!(payload.issues.is_empty());
        assert!(payload.dimension_score.is_none());
    }
    assert_eq!(
        DimensionPayload::fallback(Dimension::Security).risk_level,
        Some(RiskLevel::Unknown)
    );
    assert_eq!(DimensionPayload::fallback(Dimension::Performance).risk_level, None);
}

#[test]
fn test_degraded_result() {
    let result = DimensionResult::degraded(Dimension::Standards, "raw".into(), 12, "boom");
    assert!(!result.success);
    assert_eq!(result.strategy, ParseStrategy::Fallback);
    assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    assert_eq!(result.raw_text, "raw");
    assert_eq!(result.error.as_deref(), Some("boom"));
}

#[test]
fn test_parse_strategy_display() {
    assert_eq!(ParseStrategy::RecoveredParse.to_string(), "recovered_parse");
    assert_eq!(ParseStrategy::Fallback.to_string(), "fallback");
}

#[test]
fn test_analysis_request_defaults() {
    let request = AnalysisRequest::new("SELECT 1");
    let expected: BTreeSet<Dimension> = Dimension::ALL.into_iter().collect();
    assert_eq!(request.sql(), "SELECT 1");
    assert_eq!(request.dimensions(), &expected);
    assert!(request.dialect_hint().is_none());
    assert!(request.timeout().is_none());
}

#[test]
fn test_analysis_request_empty_dimensions_means_all() {
    let request = AnalysisRequest::new("SELECT 1").with_dimensions(Vec::<Dimension>::new());
    assert_eq!(request.dimensions().len(), 3);
}

#[test]
fn test_batch_outcome_accessors() {
    let failed = BatchOutcome::Failed {
        index: 2,
        error: "empty".into()
    };
    assert!(failed.is_failed());
    assert!(failed.report().is_none());
}
