//! Pull request approval-state classification
//!
//! Pure function over fetched snapshots: given a PR's mergeability, its
//! reviews, and its combined commit status, compute one discrete approval
//! state. Recomputed fresh on every reconciliation pass, never stored.

use gh_board_client::{
    CombinedStatus, MergeableState, PullRequest, Review, ReviewState, StatusState,
};
use log::debug;
use std::collections::HashMap;

/// Discrete classification of a PR's readiness
///
/// "Undetermined" is modeled as `None` at the call sites, so every consumer
/// has to handle the no-decision case explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// Enough approvals, no changes requested, merge is clean
    Approved,
    /// At least one reviewer's latest verdict requests changes
    ChangesRequested,
    /// Fewer approving reviewers than the configured threshold
    AwaitingReviewers,
    /// Merge conflict
    Failed,
    /// CI checks still pending or failing
    Unstable,
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApprovalState::Approved => "approved",
            ApprovalState::ChangesRequested => "changes_requested",
            ApprovalState::AwaitingReviewers => "awaiting_reviewers",
            ApprovalState::Failed => "failed",
            ApprovalState::Unstable => "unstable",
        };
        f.write_str(name)
    }
}

/// Thresholds and labels the classifier depends on
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Minimum number of distinct approving reviewers
    pub min_approvers: usize,

    /// Label marking PRs already through QA; such PRs yield no decision
    pub tested_label: Option<String>,
}

/// Classify a pull request into an approval state
///
/// Returns `None` when no decision can be made this round: unknown
/// mergeability, or the PR already carries the tested label.
///
/// `is_bot_context` identifies CI status contexts created by this bot
/// itself; those are ignored when judging whether CI is green, otherwise
/// the bot would wait on its own status forever.
pub fn classify<F>(
    pr: &PullRequest,
    reviews: &[Review],
    status: &CombinedStatus,
    settings: &ClassifierSettings,
    is_bot_context: F,
) -> Option<ApprovalState>
where
    F: Fn(&str) -> bool,
{
    // Hard conflict wins over everything else
    if pr.mergeable == Some(false) {
        debug!("PR #{} is not mergeable, considering as failed", pr.number);
        return Some(ApprovalState::Failed);
    }

    let reviews = latest_review_per_reviewer(reviews);

    let tentative = match pr.mergeable_state {
        MergeableState::Clean => {
            if let Some(label) = settings.tested_label.as_deref() {
                if pr.has_label(label) {
                    debug!("PR #{} is labeled '{}', ignoring", pr.number, label);
                    return None;
                }
            }
            ApprovalState::Approved
        }
        MergeableState::Dirty => ApprovalState::Failed,
        MergeableState::Unstable => {
            if ci_is_green(status, &is_bot_context) {
                ApprovalState::Approved
            } else {
                debug!("PR #{} has non-green CI statuses", pr.number);
                return Some(ApprovalState::Unstable);
            }
        }
        _ => {
            debug!(
                "PR #{} mergeable_state is {:?}, no decision",
                pr.number, pr.mergeable_state
            );
            return None;
        }
    };

    if tentative != ApprovalState::Approved {
        return Some(tentative);
    }

    let approved = reviews
        .iter()
        .filter(|s| **s == ReviewState::Approved)
        .count();
    if approved < settings.min_approvers {
        return Some(ApprovalState::AwaitingReviewers);
    }

    if reviews.iter().any(|s| *s == ReviewState::ChangesRequested) {
        return Some(ApprovalState::ChangesRequested);
    }

    Some(ApprovalState::Approved)
}

/// Reduce a chronological review sequence to the latest verdict per reviewer
///
/// A later review overrides an earlier one from the same reviewer regardless
/// of kind; reviewers whose latest verdict is not approval, changes-requested,
/// or pending are dropped afterwards.
fn latest_review_per_reviewer(reviews: &[Review]) -> Vec<ReviewState> {
    let mut latest: HashMap<u64, ReviewState> = HashMap::new();
    for review in reviews {
        latest.insert(review.reviewer_id, review.state);
    }

    latest
        .into_values()
        .filter(|state| {
            matches!(
                state,
                ReviewState::Approved | ReviewState::ChangesRequested | ReviewState::Pending
            )
        })
        .collect()
}

/// Whether every relevant CI status context is successful
///
/// The combined status is folded to the most recent entry per context first,
/// so a duplicate context never resurrects a stale state. Contexts created
/// by the bot itself are excluded.
fn ci_is_green<F>(status: &CombinedStatus, is_bot_context: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    let mut latest: HashMap<&str, &gh_board_client::CommitStatus> = HashMap::new();
    for entry in &status.statuses {
        if is_bot_context(&entry.context) {
            continue;
        }
        match latest.get(entry.context.as_str()) {
            Some(existing) if existing.created_at > entry.created_at => {}
            _ => {
                latest.insert(&entry.context, entry);
            }
        }
    }

    latest.values().all(|s| s.state == StatusState::Success)
}
