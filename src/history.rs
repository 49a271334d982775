//! Append-only analysis history in JSON Lines format.
//!
//! One line per analyzed statement. The store never rewrites earlier lines;
//! readers that only need recent entries can tail the file.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf}
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dialect::SqlDialect,
    dimension::Dimension,
    error::{AppResult, file_read_error, file_write_error},
    merge::MergedReport
};

/// One recorded analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub recorded_at:   DateTime<Utc>,
    pub fingerprint:   String,
    pub dialect:       SqlDialect,
    pub dimensions:    Vec<Dimension>,
    pub overall_score: u8,
    pub success:       bool,
    pub security_veto: bool,
    pub issue_count:   usize,
    pub sql:           String
}

impl HistoryRecord {
    pub fn from_report(sql: &str, report: &MergedReport) -> Self {
        Self {
            recorded_at:   Utc::now(),
            fingerprint:   report.fingerprint.clone(),
            dialect:       report.dialect,
            dimensions:    report.per_dimension.keys().copied().collect(),
            overall_score: report.overall_score,
            success:       report.success,
            security_veto: report.security_veto.triggered,
            issue_count:   report.all_issues.len(),
            sql:           sql.trim().to_string()
        }
    }
}

/// JSON Lines file of [`HistoryRecord`]s
pub struct HistoryStore {
    path: PathBuf
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append records, creating the file and parent directories if needed
    pub fn append(&self, records: &[HistoryRecord]) -> AppResult<()> {
        let path_str = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| file_write_error(&path_str, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| file_write_error(&path_str, e))?;
        let mut buffer = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| {
                file_write_error(&path_str, std::io::Error::other(e.to_string()))
            })?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        file.write_all(buffer.as_bytes())
            .map_err(|e| file_write_error(&path_str, e))?;
        debug!(path = %path_str, records = records.len(), "history appended");
        Ok(())
    }

    /// Read all records; lines that fail to parse are skipped
    pub fn read_all(&self) -> AppResult<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| file_read_error(&self.path.display().to_string(), e))?;
        Ok(content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }
}
