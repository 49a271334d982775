// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    },
    time::Duration
};

use async_trait::async_trait;
use sql_analysis_engine::{
    config::EngineConfig,
    dimension::Dimension,
    engine::OrchestrationEngine,
    error::{AppResult, llm_api_error},
    judge::{Judge, JudgeOptions, JudgeResponse}
};

/// Which dimension a prompt was built for
pub fn prompt_dimension(prompt: &str) -> Dimension {
    if prompt.contains("performance expert") {
        Dimension::Performance
    } else if prompt.contains("security auditor") {
        Dimension::Security
    } else {
        Dimension::Standards
    }
}

/// Answers each dimension with a fixed text and counts calls
pub struct ScriptedJudge {
    pub performance: String,
    pub security:    String,
    pub standards:   String,
    pub calls:       AtomicUsize,
    pub delay:       Duration
}

impl ScriptedJudge {
    pub fn new(performance: &str, security: &str, standards: &str) -> Self {
        Self {
            performance: performance.to_string(),
            security:    security.to_string(),
            standards:   standards.to_string(),
            calls:       AtomicUsize::new(0),
            delay:       Duration::ZERO
        }
    }

    /// Every dimension answers with a clean, well-formed judgment
    pub fn healthy() -> Self {
        Self::new(
            r#"{"summary": "fast", "issues": [], "recommendations": ["add index on id"], "score": 90}"#,
            r#"{"summary": "safe", "issues": [], "recommendations": [], "score": 95, "riskLevel": "low"}"#,
            r#"{"summary": "tidy", "issues": [{"description": "uses SELECT *", "severity": "low"}], "recommendations": ["list columns"], "score": 80}"#
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn invoke(&self, prompt: &str, _options: &JudgeOptions) -> AppResult<JudgeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let text = match prompt_dimension(prompt) {
            Dimension::Performance => &self.performance,
            Dimension::Security => &self.security,
            Dimension::Standards => &self.standards
        };
        Ok(JudgeResponse {
            text: text.clone()
        })
    }
}

/// Always fails
pub struct FailingJudge {
    pub calls: AtomicUsize
}

impl FailingJudge {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0)
        }
    }
}

#[async_trait]
impl Judge for FailingJudge {
    async fn invoke(&self, _prompt: &str, _options: &JudgeOptions) -> AppResult<JudgeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(llm_api_error("backend unavailable"))
    }
}

/// Records the highest number of simultaneous calls
pub struct TrackingJudge {
    in_flight: AtomicUsize,
    pub peak:  AtomicUsize,
    delay:     Duration
}

impl TrackingJudge {
    pub fn new(delay: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Judge for TrackingJudge {
    async fn invoke(&self, _prompt: &str, _options: &JudgeOptions) -> AppResult<JudgeResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(JudgeResponse {
            text: r#"{"summary": "ok", "score": 70}"#.to_string()
        })
    }
}

pub fn engine_with(judge: Arc<dyn Judge>) -> OrchestrationEngine {
    OrchestrationEngine::new(judge, EngineConfig::default())
}
