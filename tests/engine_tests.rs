// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

mod common;

use std::{sync::Arc, time::Duration};

use common::{FailingJudge, ScriptedJudge, TrackingJudge, engine_with};
use sql_analysis_engine::{
    config::EngineConfig,
    dialect::SqlDialect,
    dimension::{Dimension, ParseStrategy, UNPARSEABLE_RESPONSE},
    engine::{AnalysisRequest, BatchOutcome, OrchestrationEngine},
    knowledge::DirectoryKnowledge,
    merge::ALL_FAILED_SUMMARY
};

#[tokio::test]
async fn test_analyze_merges_all_dimensions() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    let report = engine
        .analyze(&AnalysisRequest::new("SELECT * FROM users"))
        .await
        .unwrap();
    assert!(report.success);
    assert_eq!(report.per_dimension.len(), 3);
    assert_eq!(report.overall_score, 88);
    assert!(!report.security_veto.triggered);
    assert_eq!(report.all_recommendations.len(), 2);
    assert_eq!(report.all_recommendations[0].dimension, Dimension::Performance);
    assert_eq!(judge.calls(), 3);
    assert!(!report.fingerprint.is_empty());
}

#[tokio::test]
async fn test_empty_sql_is_rejected_before_judge() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    let result = engine.analyze(&AnalysisRequest::new("   \n  ")).await;
    assert!(result.is_err());
    assert_eq!(judge.calls(), 0);
    assert_eq!(engine.stats().error_count, 1);
}

#[tokio::test]
async fn test_identical_requests_hit_cache() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    let request = AnalysisRequest::new("SELECT id FROM orders")
        .with_dimensions([Dimension::Performance, Dimension::Security]);
    let first = engine.analyze(&request).await.unwrap();
    let second = engine.analyze(&request).await.unwrap();
    assert_eq!(judge.calls(), 2);
    assert_eq!(first, second);
    assert_eq!(engine.cached_reports(), 1);

    let stats = engine.stats();
    assert_eq!(stats.total_calls, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_hit_rate, 0.5);
}

#[tokio::test]
async fn test_whitespace_variants_share_fingerprint() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    engine
        .analyze(&AnalysisRequest::new("SELECT 1"))
        .await
        .unwrap();
    engine
        .analyze(&AnalysisRequest::new("  SELECT 1\n"))
        .await
        .unwrap();
    assert_eq!(judge.calls(), 3);
}

#[tokio::test]
async fn test_clear_cache_repeats_work() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    let request = AnalysisRequest::new("SELECT 1").with_dimensions([Dimension::Standards]);
    engine.analyze(&request).await.unwrap();
    engine.clear_cache();
    assert_eq!(engine.cached_reports(), 0);
    engine.analyze(&request).await.unwrap();
    assert_eq!(judge.calls(), 2);
}

#[tokio::test]
async fn test_different_dimension_sets_are_distinct_entries() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge.clone());
    engine
        .analyze(&AnalysisRequest::new("SELECT 1").with_dimensions([Dimension::Security]))
        .await
        .unwrap();
    engine
        .analyze(&AnalysisRequest::new("SELECT 1").with_dimensions([Dimension::Standards]))
        .await
        .unwrap();
    assert_eq!(judge.calls(), 2);
    assert_eq!(engine.cached_reports(), 2);
}

#[tokio::test]
async fn test_failing_judge_degrades_gracefully() {
    let judge = Arc::new(FailingJudge::new());
    let engine = engine_with(judge);
    let report = engine
        .analyze(&AnalysisRequest::new("SELECT * FROM accounts"))
        .await
        .unwrap();
    assert!(!report.success);
    assert_eq!(report.summary, ALL_FAILED_SUMMARY);
    assert_eq!(report.per_dimension.len(), 3);
    for result in report.per_dimension.values() {
        assert!(!result.success);
        assert_eq!(result.strategy, ParseStrategy::Fallback);
        assert!(result.error.is_some());
    }
}

#[tokio::test]
async fn test_total_failure_is_not_cached() {
    let judge = Arc::new(FailingJudge::new());
    let engine = engine_with(judge.clone());
    let request = AnalysisRequest::new("SELECT 1");
    engine.analyze(&request).await.unwrap();
    engine.analyze(&request).await.unwrap();
    assert_eq!(engine.cached_reports(), 0);
    assert_eq!(judge.calls.load(std::sync::atomic::Ordering::SeqCst), 6);
    assert_eq!(engine.stats().error_count, 2);
}

#[tokio::test]
async fn test_partial_failure_keeps_success() {
    let judge = Arc::new(ScriptedJudge::new(
        "I am not JSON at all",
        r#"{"summary": "fine", "score": 85, "riskLevel": "low"}"#,
        r#"{"summary": "fine", "score": 75}"#
    ));
    let engine = engine_with(judge);
    let report = engine
        .analyze(&AnalysisRequest::new("SELECT a FROM b"))
        .await
        .unwrap();
    assert!(report.success);
    assert_eq!(report.overall_score, 80);
    let perf = &report.per_dimension[&Dimension::Performance];
    assert!(!perf.success);
    assert_eq!(perf.error.as_deref(), Some(UNPARSEABLE_RESPONSE));
    assert_eq!(perf.raw_text, "I am not JSON at all");
    assert_eq!(report.degraded_dimensions(), vec![Dimension::Performance]);
}

#[tokio::test]
async fn test_security_veto_through_engine() {
    let judge = Arc::new(ScriptedJudge::new(
        r#"{"summary": "fast", "score": 100}"#,
        r#"{"summary": "injectable", "score": 70, "riskLevel": "HIGH", "issues": [{"description": "string concatenation", "severity": "critical"}]}"#,
        r#"{"summary": "clean", "score": 100}"#
    ));
    let engine = engine_with(judge);
    let report = engine
        .analyze(&AnalysisRequest::new("EXEC('SELECT * FROM t WHERE id=' + @id)"))
        .await
        .unwrap();
    assert!(report.security_veto.triggered);
    assert!(report.overall_score <= 30);
}

#[tokio::test]
async fn test_timeout_degrades_only_that_call() {
    let judge = Arc::new(ScriptedJudge::healthy().with_delay(Duration::from_secs(5)));
    let engine = engine_with(judge);
    let request = AnalysisRequest::new("SELECT 1").with_timeout(Duration::from_millis(50));
    let started = std::time::Instant::now();
    let report = engine.analyze(&request).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!report.success);
    for result in report.per_dimension.values() {
        assert!(result.error.is_some());
        assert!(result.raw_text.is_empty());
        assert!(result.duration_ms < 2000);
    }
}

#[tokio::test]
async fn test_dimension_concurrency_cap() {
    let judge = Arc::new(TrackingJudge::new(Duration::from_millis(40)));
    let config = EngineConfig {
        max_concurrency: 1,
        ..EngineConfig::default()
    };
    let engine = OrchestrationEngine::new(judge.clone(), config);
    let report = engine
        .analyze(&AnalysisRequest::new("SELECT 1"))
        .await
        .unwrap();
    assert!(report.success);
    assert_eq!(judge.peak(), 1);
}

#[tokio::test]
async fn test_dimension_cap_is_engine_wide_across_batch() {
    let judge = Arc::new(TrackingJudge::new(Duration::from_millis(40)));
    let config = EngineConfig {
        max_concurrency: 2,
        ..EngineConfig::default()
    };
    let engine = OrchestrationEngine::new(judge.clone(), config);
    let requests = (0..4)
        .map(|i| AnalysisRequest::new(format!("SELECT {}", i)))
        .collect();
    let outcomes = engine.analyze_batch(requests, Some(4)).await.unwrap();
    assert_eq!(outcomes.len(), 4);
    assert!(judge.peak() <= 2);
    assert!(judge.peak() >= 1);
}

#[tokio::test]
async fn test_batch_concurrency_caps_statements() {
    let judge = Arc::new(TrackingJudge::new(Duration::from_millis(30)));
    let config = EngineConfig {
        max_concurrency: 10,
        ..EngineConfig::default()
    };
    let engine = OrchestrationEngine::new(judge.clone(), config);
    let requests = (0..4)
        .map(|i| {
            AnalysisRequest::new(format!("SELECT {}", i)).with_dimensions([Dimension::Performance])
        })
        .collect();
    let outcomes = engine.analyze_batch(requests, Some(1)).await.unwrap();
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|o| o.report().is_some()));
    assert_eq!(judge.peak(), 1);
}

#[tokio::test]
async fn test_batch_preserves_index_and_isolates_failures() {
    let judge = Arc::new(ScriptedJudge::healthy());
    let engine = engine_with(judge);
    let requests = vec![
        AnalysisRequest::new("SELECT 1"),
        AnalysisRequest::new(""),
        AnalysisRequest::new("SELECT 2"),
    ];
    let outcomes = engine.analyze_batch(requests, None).await.unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].report().is_some());
    assert!(matches!(outcomes[1], BatchOutcome::Failed { index: 1, .. }));
    assert!(outcomes[2].report().is_some());
    assert_ne!(
        outcomes[0].report().unwrap().fingerprint,
        outcomes[2].report().unwrap().fingerprint
    );
}

#[tokio::test]
async fn test_batch_size_limits() {
    let engine = OrchestrationEngine::new(
        Arc::new(ScriptedJudge::healthy()),
        EngineConfig {
            max_batch_size: 2,
            ..EngineConfig::default()
        }
    );
    let too_many = (0..3).map(|_| AnalysisRequest::new("SELECT 1")).collect();
    assert!(engine.analyze_batch(too_many, None).await.is_err());
    assert!(engine.analyze_batch(Vec::new(), None).await.is_err());
}

#[tokio::test]
async fn test_dialect_hint_is_honored() {
    let engine = engine_with(Arc::new(ScriptedJudge::healthy()));
    let report = engine
        .analyze(
            &AnalysisRequest::new("SELECT NVL(a, 0) FROM dual WHERE ROWNUM < 5")
                .with_dialect_hint(SqlDialect::PostgreSQL)
        )
        .await
        .unwrap();
    assert_eq!(report.dialect, SqlDialect::PostgreSQL);

    let detected = engine
        .analyze(&AnalysisRequest::new("SELECT NVL(a, 0) FROM dual WHERE ROWNUM < 5"))
        .await
        .unwrap();
    assert_eq!(detected.dialect, SqlDialect::Oracle);
}

#[tokio::test]
async fn test_knowledge_snippets_reach_the_judge() {
    struct EchoJudge;

    #[async_trait::async_trait]
    impl sql_analysis_engine::judge::Judge for EchoJudge {
        async fn invoke(
            &self,
            prompt: &str,
            _options: &sql_analysis_engine::judge::JudgeOptions
        ) -> sql_analysis_engine::error::AppResult<sql_analysis_engine::judge::JudgeResponse>
        {
            let summary = if prompt.contains("[guide.md#1]") { "enriched" } else { "plain" };
            Ok(format!(r#"{{"summary": "{}", "score": 50}}"#, summary).into())
        }
    }

    let knowledge = Arc::new(DirectoryKnowledge::from_documents([(
        "guide.md",
        "Wildcard LIKE patterns defeat index usage on users tables."
    )]));
    let engine = OrchestrationEngine::with_knowledge(
        Arc::new(EchoJudge),
        knowledge,
        2,
        EngineConfig::default()
    );
    let report = engine
        .analyze(
            &AnalysisRequest::new("SELECT * FROM users WHERE name LIKE '%a'")
                .with_dimensions([Dimension::Performance])
        )
        .await
        .unwrap();
    assert_eq!(
        report.per_dimension[&Dimension::Performance].payload.summary,
        "enriched"
    );
}
