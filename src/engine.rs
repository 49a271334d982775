//! Analysis orchestration engine.
//!
//! The engine owns everything that is shared between concurrent analyses:
//! the dimension worker, the fingerprint cache, the engine-wide dimension
//! semaphore and the lifetime counters. It is a cheap [`Clone`] handle, so
//! spawned tasks can carry their own reference to it.
//!
//! # Pipeline
//!
//! ```text
//! request ─▶ validate ─▶ resolve dialect ─▶ fingerprint ─▶ cache hit? ──yes──▶ report
//!                                                              │ no
//!                                                              ▼
//!                              spawn one task per enabled dimension
//!                              (each waits for a dimension permit,
//!                               each bounded by its own timeout)
//!                                                              │
//!                                                              ▼
//!                              await in dimension order ─▶ merge ─▶ cache if success
//! ```
//!
//! Every dimension task resolves to a [`DimensionResult`]; Judge errors,
//! timeouts, unparseable output and even task panics become degraded results,
//! so one flaky dimension never aborts its siblings. Only malformed requests
//! are reported as errors.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sql_analysis_engine::{
//!     config::{EngineConfig, RetryConfig},
//!     engine::{AnalysisRequest, OrchestrationEngine},
//!     llm::{LlmClient, LlmProvider}
//! };
//!
//! # async fn run() -> sql_analysis_engine::error::AppResult<()> {
//! let client = LlmClient::with_retry_config(
//!     LlmProvider::Ollama {
//!         base_url: "http://localhost:11434".into(),
//!         model:    "llama3.2".into()
//!     },
//!     RetryConfig::default()
//! );
//! let engine = OrchestrationEngine::new(Arc::new(client), EngineConfig::default());
//! let report = engine
//!     .analyze(&AnalysisRequest::new("SELECT * FROM orders"))
//!     .await?;
//! println!("{} -> {}", report.overall_score, report.summary);
//! # Ok(())
//! # }
//! ```

mod request;
mod stats;

use std::{
    sync::{Arc, RwLock},
    time::{Duration, Instant}
};

pub use request::{AnalysisRequest, BatchOutcome};
pub use stats::EngineStats;
use stats::StatsRecorder;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    cache::{Fingerprint, FingerprintCache},
    config::EngineConfig,
    dialect::{SqlDialect, resolve},
    dimension::{Dimension, DimensionResult, DimensionWorker},
    error::{AppResult, validation_error},
    judge::Judge,
    knowledge::KnowledgeSource,
    merge::{MergedReport, merge}
};

struct EngineInner {
    worker:            DimensionWorker,
    cache:             RwLock<FingerprintCache>,
    dimension_permits: Semaphore,
    config:            EngineConfig,
    stats:             StatsRecorder
}

/// Orchestrates dimension workers, caching and merging
#[derive(Clone)]
pub struct OrchestrationEngine {
    inner: Arc<EngineInner>
}

impl OrchestrationEngine {
    /// Create an engine that judges with `judge`
    pub fn new(judge: Arc<dyn Judge>, config: EngineConfig) -> Self {
        let worker = DimensionWorker::new(judge, config.max_output_tokens);
        Self::from_worker(worker, config)
    }

    /// Create an engine whose prompts are enriched from a knowledge source
    pub fn with_knowledge(
        judge: Arc<dyn Judge>,
        knowledge: Arc<dyn KnowledgeSource>,
        top_k: usize,
        config: EngineConfig
    ) -> Self {
        let worker =
            DimensionWorker::new(judge, config.max_output_tokens).with_knowledge(knowledge, top_k);
        Self::from_worker(worker, config)
    }

    fn from_worker(worker: DimensionWorker, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                worker,
                cache: RwLock::new(FingerprintCache::new(config.cache_capacity)),
                dimension_permits: Semaphore::new(config.max_concurrency.max(1)),
                config,
                stats: StatsRecorder::default()
            })
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Lifetime counters
    pub fn stats(&self) -> EngineStats {
        self.inner.stats.snapshot()
    }

    /// Drop every cached report
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.inner.cache.write() {
            cache.clear();
        }
    }

    /// Number of cached reports
    pub fn cached_reports(&self) -> usize {
        self.inner.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    fn cached(&self, key: &Fingerprint) -> Option<MergedReport> {
        self.inner.cache.read().ok()?.get(key)
    }

    fn store(&self, key: Fingerprint, report: MergedReport) {
        if let Ok(mut cache) = self.inner.cache.write() {
            cache.put(key, report);
        }
    }

    async fn run_dimension(
        &self,
        dimension: Dimension,
        sql: &str,
        dialect: SqlDialect,
        timeout: Duration
    ) -> DimensionResult {
        let _permit = match self.inner.dimension_permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return DimensionResult::degraded(dimension, String::new(), 0, e.to_string());
            }
        };
        self.inner.worker.run(dimension, sql, dialect, timeout).await
    }

    /// Analyze a single statement.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the SQL text is empty after trimming.
    /// Dimension failures are never errors; they surface as
    /// `success == false` on the dimension result and, when every dimension
    /// failed, on the report itself.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AppResult<MergedReport> {
        let sql = request.sql().trim();
        if sql.is_empty() {
            self.inner.stats.record_rejected();
            return Err(validation_error("SQL text must not be empty"));
        }
        let started = Instant::now();
        let guess = resolve(sql, request.dialect_hint());
        let fingerprint = Fingerprint::compute(sql, guess.dialect, request.dimensions());
        if let Some(report) = self.cached(&fingerprint) {
            self.inner.stats.record_cache_hit();
            debug!(%fingerprint, "cache hit");
            return Ok(report);
        }

        let timeout = request.timeout().unwrap_or_else(|| self.inner.config.timeout());
        let dialect = guess.dialect;
        let shared_sql: Arc<str> = Arc::from(sql);
        let handles: Vec<(Dimension, JoinHandle<DimensionResult>)> = request
            .dimensions()
            .iter()
            .map(|&dimension| {
                let engine = self.clone();
                let sql = Arc::clone(&shared_sql);
                let handle = tokio::spawn(async move {
                    engine.run_dimension(dimension, &sql, dialect, timeout).await
                });
                (dimension, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (dimension, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(%dimension, error = %e, "dimension task aborted");
                    DimensionResult::degraded(
                        dimension,
                        String::new(),
                        0,
                        format!("dimension task failed: {}", e)
                    )
                }
            };
            results.push(result);
        }

        let report = merge(results).with_origin(dialect, &fingerprint);
        let duration_ms = started.elapsed().as_millis() as u64;
        self.inner.stats.record_run(report.success, duration_ms);
        if report.success {
            self.store(fingerprint, report.clone());
        } else {
            warn!(%fingerprint, "every dimension failed, report not cached");
        }
        info!(
            %dialect,
            score = report.overall_score,
            veto = report.security_veto.triggered,
            success = report.success,
            duration_ms,
            "statement analyzed"
        );
        Ok(report)
    }

    /// Analyze many statements, at most `batch_concurrency` at a time
    /// (engine default when `None`).
    ///
    /// The output has exactly one entry per request, in request order.
    /// A statement that is rejected is reported as [`BatchOutcome::Failed`]
    /// without affecting the others.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty batch or one larger than
    /// `max_batch_size`.
    pub async fn analyze_batch(
        &self,
        requests: Vec<AnalysisRequest>,
        batch_concurrency: Option<usize>
    ) -> AppResult<Vec<BatchOutcome>> {
        if requests.is_empty() {
            return Err(validation_error("batch must contain at least one statement"));
        }
        let max = self.inner.config.max_batch_size;
        if requests.len() > max {
            return Err(validation_error(format!(
                "batch of {} statements exceeds the maximum of {}",
                requests.len(),
                max
            )));
        }
        let concurrency = batch_concurrency
            .unwrap_or(self.inner.config.batch_concurrency)
            .max(1);
        let permits = Arc::new(Semaphore::new(concurrency));
        debug!(statements = requests.len(), concurrency, "starting batch");

        let handles: Vec<JoinHandle<BatchOutcome>> = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                let engine = self.clone();
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return BatchOutcome::Failed {
                                index,
                                error: e.to_string()
                            };
                        }
                    };
                    match engine.analyze(&request).await {
                        Ok(report) => BatchOutcome::Report(report),
                        Err(e) => BatchOutcome::Failed {
                            index,
                            error: e.to_string()
                        }
                    }
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let outcome = handle.await.unwrap_or_else(|e| BatchOutcome::Failed {
                index,
                error: format!("statement task failed: {}", e)
            });
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
