use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use super::{Dimension, DimensionResult, prompt::build_prompt};
use crate::{
    dialect::SqlDialect,
    error::judge_timeout_error,
    judge::{Judge, JudgeOptions},
    knowledge::{KnowledgeSource, Snippet},
    parser::parse
};

/// Error recorded when the Judge answered but nothing could be parsed
pub const UNPARSEABLE_RESPONSE: &str = "Judge response could not be parsed";

/// Runs one dimension against the Judge and converts every failure into a
/// degraded [`DimensionResult`].
pub struct DimensionWorker {
    judge:             Arc<dyn Judge>,
    knowledge:         Option<Arc<dyn KnowledgeSource>>,
    knowledge_top_k:   usize,
    max_output_tokens: u32
}

impl DimensionWorker {
    pub fn new(judge: Arc<dyn Judge>, max_output_tokens: u32) -> Self {
        Self {
            judge,
            knowledge: None,
            knowledge_top_k: 0,
            max_output_tokens
        }
    }

    /// Enrich prompts with up to `top_k` snippets from a knowledge source
    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeSource>, top_k: usize) -> Self {
        self.knowledge = Some(knowledge);
        self.knowledge_top_k = top_k;
        self
    }

    async fn snippets(&self, dimension: Dimension, sql: &str, deadline: Instant) -> Vec<Snippet> {
        let Some(knowledge) = self.knowledge.as_ref().filter(|_| self.knowledge_top_k > 0) else {
            return Vec::new();
        };
        let query = format!("{} {}", dimension, sql);
        match timeout_at(deadline, knowledge.query(&query, self.knowledge_top_k)).await {
            Ok(Ok(snippets)) => snippets,
            Ok(Err(e)) => {
                warn!(%dimension, error = %e, "knowledge query failed, continuing without snippets");
                Vec::new()
            }
            Err(_) => {
                warn!(%dimension, "knowledge query timed out, continuing without snippets");
                Vec::new()
            }
        }
    }

    /// Judge one dimension of a statement. Never fails.
    pub async fn run(
        &self,
        dimension: Dimension,
        sql: &str,
        dialect: SqlDialect,
        timeout: Duration
    ) -> DimensionResult {
        let started = Instant::now();
        let deadline = started + timeout;
        let snippets = self.snippets(dimension, sql, deadline).await;
        let prompt = build_prompt(dimension, sql, dialect, &snippets);
        let options = JudgeOptions {
            timeout,
            max_output_tokens: self.max_output_tokens
        };
        let response = timeout_at(deadline, self.judge.invoke(&prompt, &options)).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let text = match response {
            Ok(Ok(response)) => response.text,
            Ok(Err(e)) => {
                warn!(%dimension, duration_ms, error = %e, "judge call failed");
                return DimensionResult::degraded(dimension, String::new(), duration_ms, e.to_string());
            }
            Err(_) => {
                let error = judge_timeout_error(timeout.as_millis() as u64);
                warn!(%dimension, duration_ms, "judge call timed out");
                return DimensionResult::degraded(
                    dimension,
                    String::new(),
                    duration_ms,
                    error.to_string()
                );
            }
        };
        let outcome = parse(&text, dimension);
        if outcome.is_fallback() {
            warn!(%dimension, duration_ms, "judge response could not be parsed");
            return DimensionResult::degraded(dimension, text, duration_ms, UNPARSEABLE_RESPONSE);
        }
        debug!(
            %dimension,
            duration_ms,
            strategy = %outcome.strategy,
            confidence = outcome.confidence,
            "dimension judged"
        );
        DimensionResult {
            dimension,
            success: true,
            payload: outcome.payload,
            confidence: outcome.confidence,
            raw_text: text,
            strategy: outcome.strategy,
            duration_ms,
            error: None
        }
    }
}
