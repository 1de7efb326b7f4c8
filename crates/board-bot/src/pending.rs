//! Pending pull request retry queue
//!
//! Holds PRs whose state could not yet be resolved to a terminal outcome
//! (e.g., CI still pending) for periodic re-checking. Keyed by PR number:
//! re-enqueuing replaces the existing entry, so there is at most one pending
//! entry per PR no matter how many triggers race.

use chrono::{DateTime, Utc};
use gh_board_client::PullRequestRef;
use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;

/// A PR waiting to be re-checked
#[derive(Debug, Clone)]
pub struct PendingEntry {
    /// The PR to re-check
    pub pr: PullRequestRef,

    /// Jenkins job to trigger once the PR resolves to approved
    pub job_name: String,

    /// When the entry was (last) enqueued
    pub enqueued_at: DateTime<Utc>,
}

impl PendingEntry {
    pub fn new(pr: PullRequestRef, job_name: impl Into<String>) -> Self {
        Self {
            pr,
            job_name: job_name.into(),
            enqueued_at: Utc::now(),
        }
    }
}

/// In-memory retry queue, shared between webhook handlers and the timer
#[derive(Debug, Default)]
pub struct PendingRetryQueue {
    entries: Mutex<HashMap<u64, PendingEntry>>,
}

impl PendingRetryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry for this PR
    pub fn enqueue(&self, entry: PendingEntry) {
        debug!("Enqueueing PR {} for periodic re-check", entry.pr);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(entry.pr.number, entry);
    }

    /// Remove and return the entry for a PR, if any
    ///
    /// Called at the start of each retry attempt so that a racing webhook
    /// and timer never process the same entry twice.
    pub fn remove(&self, pr_number: u64) -> Option<PendingEntry> {
        self.entries.lock().unwrap().remove(&pr_number)
    }

    /// Snapshot the current entries for iteration
    ///
    /// Entries added while the snapshot is being processed are not visited
    /// in the same pass.
    pub fn snapshot(&self) -> Vec<PendingEntry> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
