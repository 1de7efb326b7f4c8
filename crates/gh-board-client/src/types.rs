//! GitHub API data transfer objects
//!
//! These types represent the data returned from the GitHub API.
//! They are intentionally separate from the bot's domain logic
//! to keep this crate pure and reusable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies a pull request within a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// PR number (e.g., 123)
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// A pull request from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Internal GitHub ID (used as card content ID)
    pub id: u64,

    /// PR number (e.g., 123)
    pub number: u64,

    /// PR title
    pub title: String,

    /// Author's GitHub username
    pub author: String,

    /// HEAD commit SHA
    pub head_sha: String,

    /// Whether the PR is mergeable (None if not yet computed by GitHub)
    pub mergeable: Option<bool>,

    /// Mergeable state from GitHub
    pub mergeable_state: MergeableState,

    /// Label names attached to the PR
    pub labels: Vec<String>,

    /// PR URL for humans
    pub html_url: String,

    /// Issue URL of the PR; project cards reference this as their content URL
    pub issue_url: String,

    /// When the PR was last updated
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    /// Whether the PR carries a label with the given name
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

/// Mergeable state as reported by GitHub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    /// The merge is clean
    Clean,
    /// The head branch is behind the base branch
    Behind,
    /// The merge has conflicts
    Dirty,
    /// The merge is blocked (e.g., by required reviews)
    Blocked,
    /// CI checks are failing or pending
    Unstable,
    /// State is unknown or not yet computed
    #[default]
    Unknown,
}

/// A pull request review from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// GitHub user ID of the reviewer (dedup key)
    pub reviewer_id: u64,

    /// Reviewer's username
    pub reviewer: String,

    /// Review verdict
    pub state: ReviewState,

    /// When the review was submitted (None for pending reviews)
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Review verdict as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Pending,
    Commented,
    Dismissed,
}

/// Combined commit status from the GitHub API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Overall state combining all statuses
    pub state: StatusState,

    /// Total number of status checks
    pub total_count: u64,

    /// Individual statuses
    pub statuses: Vec<CommitStatus>,
}

/// Individual commit status (from the Status API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Status context (e.g., "ci/jenkins: macos")
    pub context: String,

    /// Current state
    pub state: StatusState,

    /// When the status was created
    pub created_at: Option<DateTime<Utc>>,
}

/// State of a commit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    /// Check passed
    Success,
    /// Check is still running
    Pending,
    /// Check failed
    Failure,
    /// Error retrieving or producing the status
    Error,
}

/// A project board attached to a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID
    pub id: u64,

    /// Project name (e.g., "Pipeline for QA")
    pub name: String,
}

/// A column (lane) on a project board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectColumn {
    /// Column ID
    pub id: u64,

    /// Column name (e.g., "REVIEW")
    pub name: String,

    /// API URL of the owning project
    pub project_url: String,
}

impl ProjectColumn {
    /// Project ID parsed from the trailing segment of `project_url`
    pub fn project_id(&self) -> Option<u64> {
        self.project_url.rsplit('/').next()?.parse().ok()
    }
}

/// A card on a project board, referencing an issue or PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCard {
    /// Card ID
    pub id: u64,

    /// Column the card currently sits in
    pub column_id: u64,

    /// Content URL of the referenced issue/PR (None for note cards)
    pub content_url: Option<String>,

    /// Free-text note (None for content cards)
    pub note: Option<String>,
}

impl ProjectCard {
    /// Whether this card is a free-text note rather than an issue/PR reference
    pub fn is_note(&self) -> bool {
        self.note.is_some()
    }

    /// Issue/PR number parsed from the trailing segment of the content URL
    pub fn content_number(&self) -> Option<u64> {
        self.content_url
            .as_deref()?
            .rsplit('/')
            .next()?
            .parse()
            .ok()
    }
}

/// Content type when creating a project card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardContentType {
    PullRequest,
    Issue,
}

impl CardContentType {
    /// Wire name expected by the Projects API
    pub fn as_str(&self) -> &'static str {
        match self {
            CardContentType::PullRequest => "PullRequest",
            CardContentType::Issue => "Issue",
        }
    }
}
