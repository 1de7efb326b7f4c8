//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait that all client
//! implementations must satisfy. The bot's reconciliation logic is written
//! against this trait so tests can substitute an in-memory board.

use crate::types::{
    CardContentType, CombinedStatus, Project, ProjectCard, ProjectColumn, PullRequest,
    PullRequestRef, Review,
};
use async_trait::async_trait;

/// GitHub API client trait
///
/// Defines the interface for the subset of the GitHub API the bot needs:
/// pull requests, reviews, commit statuses, and classic project boards.
/// Implementations can be direct (hitting the API) or decorated with
/// retry logic, rate limiting, etc.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch open pull requests for a repository
    ///
    /// Returns summary PR data; `mergeable`/`mergeable_state` are only
    /// reliable on [`GitHubClient::fetch_pull_request`] responses.
    async fn fetch_pull_requests(&self, owner: &str, repo: &str)
        -> anyhow::Result<Vec<PullRequest>>;

    /// Fetch a single pull request with full details
    ///
    /// This returns `mergeable` and `mergeable_state`, which are not
    /// populated by the list endpoint.
    async fn fetch_pull_request(&self, pr: &PullRequestRef) -> anyhow::Result<PullRequest>;

    /// Fetch all reviews for a pull request (paginated)
    ///
    /// Reviews are returned in submission order; later entries supersede
    /// earlier ones from the same reviewer.
    async fn list_reviews(&self, pr: &PullRequestRef) -> anyhow::Result<Vec<Review>>;

    /// Fetch the combined commit status for a commit
    ///
    /// The Status API aggregates the latest status per context.
    async fn fetch_commit_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<CombinedStatus>;

    // === Project board operations ===

    /// List open project boards attached to a repository
    async fn list_repo_projects(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<Project>>;

    /// Fetch a project board by ID
    async fn get_project(&self, project_id: u64) -> anyhow::Result<Project>;

    /// List the columns of a project board
    async fn list_project_columns(&self, project_id: u64)
        -> anyhow::Result<Vec<ProjectColumn>>;

    /// Fetch a single project column by ID
    async fn get_project_column(&self, column_id: u64) -> anyhow::Result<ProjectColumn>;

    /// List the cards in a column
    async fn list_cards(&self, column_id: u64) -> anyhow::Result<Vec<ProjectCard>>;

    /// Move a card to the bottom of the given column
    async fn move_card(&self, card_id: u64, column_id: u64) -> anyhow::Result<()>;

    /// Create a card in a column referencing an issue or PR
    async fn create_card(
        &self,
        column_id: u64,
        content_type: CardContentType,
        content_id: u64,
    ) -> anyhow::Result<ProjectCard>;

    /// Delete a card
    async fn delete_card(&self, card_id: u64) -> anyhow::Result<()>;
}
