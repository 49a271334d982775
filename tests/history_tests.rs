// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::{collections::BTreeSet, fs};

use sql_analysis_engine::{
    cache::Fingerprint,
    dialect::SqlDialect,
    dimension::Dimension,
    history::{HistoryRecord, HistoryStore},
    merge::merge
};
use tempfile::tempdir;

fn record(sql: &str) -> HistoryRecord {
    let dims: BTreeSet<Dimension> = [Dimension::Security].into_iter().collect();
    let fingerprint = Fingerprint::compute(sql, SqlDialect::MySQL, &dims);
    let report = merge(Vec::new()).with_origin(SqlDialect::MySQL, &fingerprint);
    HistoryRecord::from_report(sql, &report)
}

#[test]
fn test_record_from_report() {
    let record = record("  SELECT 1  ");
    assert_eq!(record.sql, "SELECT 1");
    assert_eq!(record.dialect, SqlDialect::MySQL);
    assert_eq!(record.fingerprint.len(), 64);
    assert!(!record.success);
    assert_eq!(record.issue_count, 0);
}

#[test]
fn test_append_and_read_back() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("nested").join("history.jsonl"));
    store.append(&[record("SELECT 1")]).unwrap();
    store
        .append(&[record("SELECT 2"), record("SELECT 3")])
        .unwrap();

    let records = store.read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].sql, "SELECT 1");
    assert_eq!(records[2].sql, "SELECT 3");

    let content = fs::read_to_string(store.path()).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_read_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("absent.jsonl"));
    assert!(store.read_all().unwrap().is_empty());
}

#[test]
fn test_corrupt_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("history.jsonl"));
    store.append(&[record("SELECT 1")]).unwrap();
    let mut content = fs::read_to_string(store.path()).unwrap();
    content.push_str("not json\n\n");
    fs::write(store.path(), content).unwrap();
    store.append(&[record("SELECT 2")]).unwrap();

    let records = store.read_all().unwrap();
    assert_eq!(records.len(), 2);
}
