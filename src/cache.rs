//! Content-addressable cache of merged reports.
//!
//! Keys are BLAKE3 fingerprints over the trimmed SQL text, the resolved
//! dialect and the sorted dimension list. Entries are kept in insertion order
//! and the oldest inserted entry is evicted first once capacity is reached.
//! The cache is advisory: a miss only repeats work.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{dialect::SqlDialect, dimension::Dimension, merge::MergedReport};

/// Default number of cached reports
pub const DEFAULT_CAPACITY: usize = 100;

/// Stable hash identifying one analysis input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn compute(sql: &str, dialect: SqlDialect, dimensions: &BTreeSet<Dimension>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(sql.trim().as_bytes());
        hasher.update(b"\0");
        hasher.update(dialect.as_str().as_bytes());
        hasher.update(b"\0");
        let dims: Vec<&str> = dimensions.iter().map(Dimension::as_str).collect();
        hasher.update(dims.join(",").as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Cached report with its insertion time
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value:       MergedReport,
    pub inserted_at: DateTime<Utc>
}

/// Bounded insertion-ordered report cache
pub struct FingerprintCache {
    entries:  IndexMap<Fingerprint, CacheEntry>,
    capacity: usize
}

impl FingerprintCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity
        }
    }

    pub fn get(&self, key: &Fingerprint) -> Option<MergedReport> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert a report; a new key at capacity evicts the oldest insertion.
    ///
    /// Re-inserting an existing key overwrites it in place.
    pub fn put(&mut self, key: Fingerprint, value: MergedReport) {
        let entry = CacheEntry {
            value,
            inserted_at: Utc::now()
        };
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insertion time of a cached entry
    pub fn inserted_at(&self, key: &Fingerprint) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.inserted_at)
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
