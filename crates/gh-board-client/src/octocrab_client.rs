//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab
//! library. Pull request endpoints use octocrab's typed API; the classic
//! Projects endpoints and a few others have no typed octocrab support, so
//! those use raw routes with local DTOs.

use crate::client::GitHubClient;
use crate::types::{
    CardContentType, CombinedStatus, CommitStatus, MergeableState, Project, ProjectCard,
    ProjectColumn, PullRequest, PullRequestRef, Review, ReviewState, StatusState,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use octocrab::Octocrab;
use serde::Deserialize;
use std::sync::Arc;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Get a reference to the underlying octocrab instance
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }
}

const PER_PAGE: u8 = 100;

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        debug!("Fetching open PRs for {}/{}", owner, repo);

        let mut prs = Vec::new();
        let mut page_num = 1u32;

        loop {
            let page = self
                .octocrab
                .pulls(owner, repo)
                .list()
                .state(octocrab::params::State::Open)
                .per_page(PER_PAGE)
                .page(page_num)
                .send()
                .await?;

            let count = page.items.len();
            for pr in page.items {
                prs.push(convert_pull_request(&pr));
            }

            if count < PER_PAGE as usize {
                break;
            }
            page_num += 1;
        }

        debug!("Fetched {} open PRs for {}/{}", prs.len(), owner, repo);
        Ok(prs)
    }

    async fn fetch_pull_request(&self, pr: &PullRequestRef) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR {}", pr);

        let full = self
            .octocrab
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await?;

        Ok(convert_pull_request(&full))
    }

    async fn list_reviews(&self, pr: &PullRequestRef) -> anyhow::Result<Vec<Review>> {
        debug!("Fetching reviews for PR {}", pr);

        let mut reviews = Vec::new();
        let mut page_num = 1u32;

        loop {
            let route = format!(
                "/repos/{}/{}/pulls/{}/reviews?per_page={}&page={}",
                pr.owner, pr.repo, pr.number, PER_PAGE, page_num
            );
            let page: Vec<ReviewDto> = self.octocrab.get(route, None::<&()>).await?;
            let count = page.len();

            for review in page {
                if let Some(converted) = convert_review(review) {
                    reviews.push(converted);
                }
            }

            if count < PER_PAGE as usize {
                break;
            }
            page_num += 1;
        }

        Ok(reviews)
    }

    async fn fetch_commit_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<CombinedStatus> {
        debug!(
            "Fetching combined status for {}/{} @ {}",
            owner, repo, commit_sha
        );

        // Raw GET since octocrab's Reference type doesn't support commit SHAs
        let route = format!("/repos/{}/{}/commits/{}/status", owner, repo, commit_sha);
        let status: CombinedStatusDto = self.octocrab.get(route, None::<&()>).await?;

        Ok(CombinedStatus {
            state: convert_status_state(&status.state),
            total_count: status.total_count,
            statuses: status
                .statuses
                .into_iter()
                .map(|s| CommitStatus {
                    context: s.context.unwrap_or_else(|| "unknown".to_string()),
                    state: convert_status_state(&s.state),
                    created_at: s.created_at,
                })
                .collect(),
        })
    }

    async fn list_repo_projects(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<Project>> {
        debug!("Fetching open projects for {}/{}", owner, repo);

        let route = format!("/repos/{}/{}/projects?state=open", owner, repo);
        let projects: Vec<ProjectDto> = self.octocrab.get(route, None::<&()>).await?;

        Ok(projects.into_iter().map(convert_project).collect())
    }

    async fn get_project(&self, project_id: u64) -> anyhow::Result<Project> {
        let route = format!("/projects/{}", project_id);
        let project: ProjectDto = self.octocrab.get(route, None::<&()>).await?;

        Ok(convert_project(project))
    }

    async fn list_project_columns(
        &self,
        project_id: u64,
    ) -> anyhow::Result<Vec<ProjectColumn>> {
        debug!("Fetching columns for project {}", project_id);

        let route = format!("/projects/{}/columns", project_id);
        let columns: Vec<ColumnDto> = self.octocrab.get(route, None::<&()>).await?;

        Ok(columns.into_iter().map(convert_column).collect())
    }

    async fn get_project_column(&self, column_id: u64) -> anyhow::Result<ProjectColumn> {
        let route = format!("/projects/columns/{}", column_id);
        let column: ColumnDto = self.octocrab.get(route, None::<&()>).await?;

        Ok(convert_column(column))
    }

    async fn list_cards(&self, column_id: u64) -> anyhow::Result<Vec<ProjectCard>> {
        debug!("Fetching cards in column {}", column_id);

        let route = format!("/projects/columns/{}/cards?per_page={}", column_id, PER_PAGE);
        let cards: Vec<CardDto> = self.octocrab.get(route, None::<&()>).await?;

        Ok(cards
            .into_iter()
            .map(|c| convert_card(c, column_id))
            .collect())
    }

    async fn move_card(&self, card_id: u64, column_id: u64) -> anyhow::Result<()> {
        debug!("Moving card {} to column {}", card_id, column_id);

        let route = format!("/projects/columns/cards/{}/moves", card_id);
        let body = serde_json::json!({
            "position": "bottom",
            "column_id": column_id,
        });
        let _: serde_json::Value = self.octocrab.post(route, Some(&body)).await?;

        Ok(())
    }

    async fn create_card(
        &self,
        column_id: u64,
        content_type: CardContentType,
        content_id: u64,
    ) -> anyhow::Result<ProjectCard> {
        debug!(
            "Creating {} card for content {} in column {}",
            content_type.as_str(),
            content_id,
            column_id
        );

        let route = format!("/projects/columns/{}/cards", column_id);
        let body = serde_json::json!({
            "content_type": content_type.as_str(),
            "content_id": content_id,
        });
        let card: CardDto = self.octocrab.post(route, Some(&body)).await?;

        Ok(convert_card(card, column_id))
    }

    async fn delete_card(&self, card_id: u64) -> anyhow::Result<()> {
        debug!("Deleting card {}", card_id);

        let route = format!("/projects/columns/cards/{}", card_id);
        let response = self.octocrab._delete(route, None::<&()>).await?;
        if !response.status().is_success() {
            anyhow::bail!("deleting card {} failed: HTTP {}", card_id, response.status());
        }

        Ok(())
    }
}

// === Wire DTOs for raw routes ===

#[derive(Debug, Deserialize)]
struct ReviewDto {
    user: Option<UserDto>,
    state: String,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: u64,
    login: String,
}

#[derive(Debug, Deserialize)]
struct CombinedStatusDto {
    state: String,
    total_count: u64,
    statuses: Vec<StatusDto>,
}

#[derive(Debug, Deserialize)]
struct StatusDto {
    context: Option<String>,
    state: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ColumnDto {
    id: u64,
    name: String,
    #[serde(default)]
    project_url: String,
}

#[derive(Debug, Deserialize)]
struct CardDto {
    id: u64,
    #[serde(default)]
    column_url: Option<String>,
    #[serde(default)]
    content_url: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

// === Conversions ===

/// Convert octocrab PullRequest to our PullRequest type
fn convert_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        id: pr.id.0,
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        head_sha: pr.head.sha.clone(),
        mergeable: pr.mergeable,
        mergeable_state: pr
            .mergeable_state
            .as_ref()
            .map(convert_mergeable_state)
            .unwrap_or_default(),
        labels: pr
            .labels
            .as_ref()
            .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
        issue_url: pr
            .issue_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
        updated_at: pr.updated_at.unwrap_or_else(Utc::now),
    }
}

/// Convert octocrab MergeableState enum to our enum
fn convert_mergeable_state(state: &octocrab::models::pulls::MergeableState) -> MergeableState {
    use octocrab::models::pulls::MergeableState as OMS;
    match state {
        OMS::Clean => MergeableState::Clean,
        OMS::Behind => MergeableState::Behind,
        OMS::Dirty => MergeableState::Dirty,
        OMS::Blocked => MergeableState::Blocked,
        OMS::Unstable => MergeableState::Unstable,
        OMS::Unknown => MergeableState::Unknown,
        _ => MergeableState::Unknown,
    }
}

/// Convert a review wire object, dropping reviews without an author
fn convert_review(review: ReviewDto) -> Option<Review> {
    let user = review.user?;
    Some(Review {
        reviewer_id: user.id,
        reviewer: user.login,
        state: convert_review_state(&review.state),
        submitted_at: review.submitted_at,
    })
}

/// Convert a review state string from the GitHub API to our enum
fn convert_review_state(state: &str) -> ReviewState {
    match state {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "PENDING" => ReviewState::Pending,
        "DISMISSED" => ReviewState::Dismissed,
        _ => ReviewState::Commented,
    }
}

/// Convert a status state string from the GitHub API to our enum
fn convert_status_state(state: &str) -> StatusState {
    match state {
        "success" => StatusState::Success,
        "failure" => StatusState::Failure,
        "error" => StatusState::Error,
        _ => StatusState::Pending,
    }
}

fn convert_project(project: ProjectDto) -> Project {
    Project {
        id: project.id,
        name: project.name,
    }
}

fn convert_column(column: ColumnDto) -> ProjectColumn {
    ProjectColumn {
        id: column.id,
        name: column.name,
        project_url: column.project_url,
    }
}

fn convert_card(card: CardDto, column_id: u64) -> ProjectCard {
    // The cards endpoint reports the owning column via column_url
    let column_id = card
        .column_url
        .as_deref()
        .and_then(|url| url.rsplit('/').next())
        .and_then(|id| id.parse().ok())
        .unwrap_or(column_id);

    ProjectCard {
        id: card.id,
        column_id,
        content_url: card.content_url,
        note: card.note,
    }
}
