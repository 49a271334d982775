use std::{collections::BTreeSet, time::Duration};

use serde::Serialize;

use crate::{
    dialect::SqlDialect,
    dimension::{Dimension, normalize_dimensions},
    merge::MergedReport
};

/// One statement to analyze.
///
/// An empty dimension set is normalized to all dimensions on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    sql:          String,
    dialect_hint: Option<SqlDialect>,
    dimensions:   BTreeSet<Dimension>,
    timeout:      Option<Duration>
}

impl AnalysisRequest {
    /// Request analysis of `sql` across all dimensions
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql:          sql.into(),
            dialect_hint: None,
            dimensions:   Dimension::ALL.into_iter().collect(),
            timeout:      None
        }
    }

    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        self.dimensions = normalize_dimensions(dimensions);
        self
    }

    /// Skip dialect identification and use this dialect
    pub fn with_dialect_hint(mut self, dialect: SqlDialect) -> Self {
        self.dialect_hint = Some(dialect);
        self
    }

    /// Override the engine's per-dimension timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn dialect_hint(&self) -> Option<SqlDialect> {
        self.dialect_hint
    }

    pub fn dimensions(&self) -> &BTreeSet<Dimension> {
        &self.dimensions
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// One entry of a batch result: a report or an error marker
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Report(MergedReport),
    Failed { index: usize, error: String }
}

impl BatchOutcome {
    pub fn report(&self) -> Option<&MergedReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed {
                ..
            } => None
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
