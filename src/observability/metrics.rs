//! Store counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exact values are not needed across threads

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one record store
#[derive(Debug, Default)]
pub struct StoreMetrics {
    created: AtomicU64,
    updated: AtomicU64,
    deleted: AtomicU64,
    rejected: AtomicU64,
    commits: AtomicU64,
    commit_failures: AtomicU64,
    corruptions: AtomicU64,
}

impl StoreMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Validation, duplicate-key and not-found outcomes
    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commit_failures(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_corruptions(&self) {
        self.corruptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            applications_created: self.created.load(Ordering::Relaxed),
            applications_updated: self.updated.load(Ordering::Relaxed),
            applications_deleted: self.deleted.load(Ordering::Relaxed),
            operations_rejected: self.rejected.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            corruptions_detected: self.corruptions.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub applications_created: u64,
    pub applications_updated: u64,
    pub applications_deleted: u64,
    pub operations_rejected: u64,
    pub commits: u64,
    pub commit_failures: u64,
    pub corruptions_detected: u64,
}
