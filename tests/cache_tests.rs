// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use sql_analysis_engine::{
    cache::{DEFAULT_CAPACITY, Fingerprint, FingerprintCache},
    dialect::SqlDialect,
    dimension::Dimension,
    merge::{MergedReport, merge}
};

fn all_dims() -> BTreeSet<Dimension> {
    Dimension::ALL.into_iter().collect()
}

fn key(sql: &str) -> Fingerprint {
    Fingerprint::compute(sql, SqlDialect::Generic, &all_dims())
}

fn report(summary: &str) -> MergedReport {
    let mut report = merge(Vec::new());
    report.summary = summary.to_string();
    report
}

#[test]
fn test_fingerprint_is_stable() {
    assert_eq!(key("SELECT 1"), key("SELECT 1"));
    assert_eq!(key("SELECT 1").to_hex().len(), 64);
    assert_eq!(key("SELECT 1").to_string(), key("SELECT 1").to_hex());
}

#[test]
fn test_fingerprint_ignores_surrounding_whitespace() {
    assert_eq!(key("SELECT 1"), key("\n  SELECT 1  \t"));
    assert_ne!(key("SELECT 1"), key("SELECT  1"));
}

#[test]
fn test_fingerprint_depends_on_dialect_and_dimensions() {
    let dims = all_dims();
    let generic = Fingerprint::compute("SELECT 1", SqlDialect::Generic, &dims);
    let mysql = Fingerprint::compute("SELECT 1", SqlDialect::MySQL, &dims);
    assert_ne!(generic, mysql);

    let security: BTreeSet<Dimension> = [Dimension::Security].into_iter().collect();
    assert_ne!(
        generic,
        Fingerprint::compute("SELECT 1", SqlDialect::Generic, &security)
    );
}

#[test]
fn test_fingerprint_ignores_dimension_order() {
    let forward: BTreeSet<Dimension> = [Dimension::Performance, Dimension::Standards]
        .into_iter()
        .collect();
    let backward: BTreeSet<Dimension> = [Dimension::Standards, Dimension::Performance]
        .into_iter()
        .collect();
    assert_eq!(
        Fingerprint::compute("SELECT 1", SqlDialect::Oracle, &forward),
        Fingerprint::compute("SELECT 1", SqlDialect::Oracle, &backward)
    );
}

#[test]
fn test_get_and_put() {
    let mut cache = FingerprintCache::new(4);
    assert!(cache.is_empty());
    assert!(cache.get(&key("a")).is_none());
    cache.put(key("a"), report("first"));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&key("a")).unwrap().summary, "first");
    assert!(cache.inserted_at(&key("a")).is_some());
}

#[test]
fn test_evicts_oldest_insertion() {
    let mut cache = FingerprintCache::new(2);
    cache.put(key("a"), report("a"));
    cache.put(key("b"), report("b"));
    // reads do not refresh position
    cache.get(&key("a"));
    cache.put(key("c"), report("c"));
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&key("a")).is_none());
    assert!(cache.get(&key("b")).is_some());
    assert!(cache.get(&key("c")).is_some());
}

#[test]
fn test_overwrite_does_not_evict() {
    let mut cache = FingerprintCache::new(2);
    cache.put(key("a"), report("a1"));
    cache.put(key("b"), report("b"));
    cache.put(key("a"), report("a2"));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&key("a")).unwrap().summary, "a2");
    assert!(cache.get(&key("b")).is_some());

    // "a" kept its original position, so it is still the oldest
    cache.put(key("c"), report("c"));
    assert!(cache.get(&key("a")).is_none());
    assert!(cache.get(&key("b")).is_some());
}

#[test]
fn test_clear() {
    let mut cache = FingerprintCache::default();
    assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    cache.put(key("a"), report("a"));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_zero_capacity_is_clamped() {
    let mut cache = FingerprintCache::new(0);
    assert_eq!(cache.capacity(), 1);
    cache.put(key("a"), report("a"));
    cache.put(key("b"), report("b"));
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&key("b")).is_some());
}
