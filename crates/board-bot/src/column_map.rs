//! Approval state to column routing
//!
//! Static mapping from an approval state to the columns a PR card may
//! currently sit in and the column it belongs in. The source order matters:
//! the card locator scans it front to back and treats the first hit as the
//! card's current location.

use crate::classifier::ApprovalState;
use gh_board_client::ProjectColumn;

/// The three columns the bot manages on the project board
#[derive(Debug, Clone)]
pub struct BoardColumns {
    /// PRs needing contributor action
    pub contributor: ProjectColumn,

    /// PRs awaiting review
    pub review: ProjectColumn,

    /// PRs ready for QA
    pub test: ProjectColumn,
}

impl BoardColumns {
    /// All managed columns; a content item has at most one card among these
    pub fn managed(&self) -> [&ProjectColumn; 3] {
        [&self.contributor, &self.review, &self.test]
    }
}

/// Where a card may be and where it should go
#[derive(Debug, Clone)]
pub struct ColumnRoute<'a> {
    /// Candidate current locations, scanned in order
    pub src_columns: Vec<&'a ProjectColumn>,

    /// Desired location
    pub dst_column: &'a ProjectColumn,
}

/// Resolve the source/destination columns for an approval state
///
/// `None` signals "no action this round": the steady state for PRs that are
/// not yet actionable (undetermined) or whose CI is still settling.
pub fn resolve(
    state: Option<ApprovalState>,
    columns: &BoardColumns,
) -> Option<ColumnRoute<'_>> {
    match state? {
        ApprovalState::AwaitingReviewers => Some(ColumnRoute {
            src_columns: vec![&columns.contributor, &columns.test],
            dst_column: &columns.review,
        }),
        ApprovalState::ChangesRequested | ApprovalState::Failed => Some(ColumnRoute {
            src_columns: vec![&columns.review, &columns.test],
            dst_column: &columns.contributor,
        }),
        ApprovalState::Approved => Some(ColumnRoute {
            src_columns: vec![&columns.contributor, &columns.review],
            dst_column: &columns.test,
        }),
        ApprovalState::Unstable => None,
    }
}
