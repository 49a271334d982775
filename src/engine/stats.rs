use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of the engine's lifetime counters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EngineStats {
    pub total_calls:         u64,
    pub success_count:       u64,
    pub error_count:         u64,
    pub cache_hits:          u64,
    pub average_duration_ms: f64,
    pub cache_hit_rate:      f64
}

/// Lock-free counters updated by concurrent `analyze` calls.
///
/// Cache hits count as calls and successes but are excluded from the
/// duration average, which only reflects analyses that ran workers.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    total_calls:       AtomicU64,
    success_count:     AtomicU64,
    error_count:       AtomicU64,
    cache_hits:        AtomicU64,
    timed_runs:        AtomicU64,
    total_duration_ms: AtomicU64
}

impl StatsRecorder {
    pub fn record_rejected(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run(&self, success: bool, duration_ms: u64) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if success {
            self.success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.timed_runs.fetch_add(1, Ordering::Relaxed);
        self.total_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let timed_runs = self.timed_runs.load(Ordering::Relaxed);
        let total_duration_ms = self.total_duration_ms.load(Ordering::Relaxed);
        EngineStats {
            total_calls,
            success_count: self.success_count.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            cache_hits,
            average_duration_ms: if timed_runs == 0 {
                0.0
            } else {
                total_duration_ms as f64 / timed_runs as f64
            },
            cache_hit_rate: if total_calls == 0 {
                0.0
            } else {
                cache_hits as f64 / total_calls as f64
            }
        }
    }
}
