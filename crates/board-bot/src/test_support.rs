//! Shared test fixtures
//!
//! An in-memory `GitHubClient` backed by mutable board state, so
//! reconciliation tests can assert on resulting card positions and count
//! mutating calls.

use crate::column_map::BoardColumns;
use async_trait::async_trait;
use chrono::Utc;
use gh_board_client::{
    CardContentType, CombinedStatus, GitHubClient, MergeableState, Project, ProjectCard,
    ProjectColumn, PullRequest, PullRequestRef, Review, ReviewState, StatusState,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub const PROJECT_ID: u64 = 1002604;
pub const CONTRIBUTOR_COLUMN: u64 = 1;
pub const REVIEW_COLUMN: u64 = 2;
pub const TEST_COLUMN: u64 = 3;

/// In-memory GitHub double with call counting
#[derive(Default)]
pub struct MockClient {
    pub prs: Mutex<Vec<PullRequest>>,
    pub reviews: Mutex<HashMap<u64, Vec<Review>>>,
    pub statuses: Mutex<HashMap<String, CombinedStatus>>,
    pub projects: Mutex<Vec<Project>>,
    pub columns: Mutex<Vec<ProjectColumn>>,
    pub cards: Mutex<Vec<ProjectCard>>,
    next_card_id: Mutex<u64>,
    pub move_calls: Mutex<usize>,
    pub create_calls: Mutex<usize>,
    pub delete_calls: Mutex<usize>,
}

impl MockClient {
    /// A client seeded with the standard three-column board
    pub fn with_board() -> Self {
        let client = Self {
            next_card_id: Mutex::new(100),
            ..Self::default()
        };
        client.projects.lock().unwrap().push(Project {
            id: PROJECT_ID,
            name: "Pipeline for QA".into(),
        });
        *client.columns.lock().unwrap() = vec![
            make_column(CONTRIBUTOR_COLUMN, "CONTRIBUTOR"),
            make_column(REVIEW_COLUMN, "REVIEW"),
            make_column(TEST_COLUMN, "TO TEST"),
        ];
        client
    }

    pub fn add_pr(&self, pr: PullRequest) {
        self.statuses.lock().unwrap().insert(
            pr.head_sha.clone(),
            CombinedStatus {
                state: StatusState::Success,
                total_count: 0,
                statuses: vec![],
            },
        );
        self.prs.lock().unwrap().push(pr);
    }

    pub fn add_reviews(&self, pr_number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(pr_number, reviews);
    }

    pub fn seed_card(&self, column_id: u64, content_url: &str) -> u64 {
        let mut next = self.next_card_id.lock().unwrap();
        *next += 1;
        let id = *next;
        self.cards.lock().unwrap().push(ProjectCard {
            id,
            column_id,
            content_url: Some(content_url.to_string()),
            note: None,
        });
        id
    }

    /// Cards referencing `content_url` among the managed columns
    pub fn cards_for(&self, content_url: &str) -> Vec<ProjectCard> {
        self.cards
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.content_url.as_deref() == Some(content_url))
            .cloned()
            .collect()
    }

    pub fn mutation_count(&self) -> usize {
        *self.move_calls.lock().unwrap()
            + *self.create_calls.lock().unwrap()
            + *self.delete_calls.lock().unwrap()
    }
}

#[async_trait]
impl GitHubClient for MockClient {
    async fn fetch_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        Ok(self.prs.lock().unwrap().clone())
    }

    async fn fetch_pull_request(&self, pr: &PullRequestRef) -> anyhow::Result<PullRequest> {
        self.prs
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.number == pr.number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PR not found"))
    }

    async fn list_reviews(&self, pr: &PullRequestRef) -> anyhow::Result<Vec<Review>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_commit_status(
        &self,
        _owner: &str,
        _repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<CombinedStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(commit_sha)
            .cloned()
            .unwrap_or(CombinedStatus {
                state: StatusState::Success,
                total_count: 0,
                statuses: vec![],
            }))
    }

    async fn list_repo_projects(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> anyhow::Result<Vec<Project>> {
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_project(&self, project_id: u64) -> anyhow::Result<Project> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("project not found"))
    }

    async fn list_project_columns(
        &self,
        _project_id: u64,
    ) -> anyhow::Result<Vec<ProjectColumn>> {
        Ok(self.columns.lock().unwrap().clone())
    }

    async fn get_project_column(&self, column_id: u64) -> anyhow::Result<ProjectColumn> {
        self.columns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == column_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("column not found"))
    }

    async fn list_cards(&self, column_id: u64) -> anyhow::Result<Vec<ProjectCard>> {
        Ok(self
            .cards
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.column_id == column_id)
            .cloned()
            .collect())
    }

    async fn move_card(&self, card_id: u64, column_id: u64) -> anyhow::Result<()> {
        *self.move_calls.lock().unwrap() += 1;
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| anyhow::anyhow!("card not found"))?;
        card.column_id = column_id;
        Ok(())
    }

    async fn create_card(
        &self,
        column_id: u64,
        _content_type: CardContentType,
        content_id: u64,
    ) -> anyhow::Result<ProjectCard> {
        *self.create_calls.lock().unwrap() += 1;
        let content_url = self
            .prs
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == content_id)
            .map(|p| p.issue_url.clone())
            .ok_or_else(|| anyhow::anyhow!("content not found"))?;

        let mut next = self.next_card_id.lock().unwrap();
        *next += 1;
        let card = ProjectCard {
            id: *next,
            column_id,
            content_url: Some(content_url),
            note: None,
        };
        self.cards.lock().unwrap().push(card.clone());
        Ok(card)
    }

    async fn delete_card(&self, card_id: u64) -> anyhow::Result<()> {
        *self.delete_calls.lock().unwrap() += 1;
        self.cards.lock().unwrap().retain(|c| c.id != card_id);
        Ok(())
    }
}

pub fn make_column(id: u64, name: &str) -> ProjectColumn {
    ProjectColumn {
        id,
        name: name.into(),
        project_url: format!("https://api.github.com/projects/{}", PROJECT_ID),
    }
}

pub fn board_columns() -> BoardColumns {
    BoardColumns {
        contributor: make_column(CONTRIBUTOR_COLUMN, "CONTRIBUTOR"),
        review: make_column(REVIEW_COLUMN, "REVIEW"),
        test: make_column(TEST_COLUMN, "TO TEST"),
    }
}

pub fn make_pr(number: u64, mergeable_state: MergeableState) -> PullRequest {
    PullRequest {
        id: 9000 + number,
        number,
        title: format!("PR {}", number),
        author: "carol".into(),
        head_sha: format!("sha{}", number),
        mergeable: Some(true),
        mergeable_state,
        labels: vec![],
        html_url: format!("https://github.com/o/r/pull/{}", number),
        issue_url: format!("https://api.github.com/repos/o/r/issues/{}", number),
        updated_at: Utc::now(),
    }
}

pub fn approval(reviewer_id: u64) -> Review {
    Review {
        reviewer_id,
        reviewer: format!("user{}", reviewer_id),
        state: ReviewState::Approved,
        submitted_at: Some(Utc::now()),
    }
}

pub fn changes_requested(reviewer_id: u64) -> Review {
    Review {
        reviewer_id,
        reviewer: format!("user{}", reviewer_id),
        state: ReviewState::ChangesRequested,
        submitted_at: Some(Utc::now()),
    }
}

/// Notifier double recording every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl crate::notify::Notifier for RecordingNotifier {
    async fn send(&self, room: &str, message: &str) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((room.to_string(), message.to_string()));
        if self.fail {
            anyhow::bail!("notification channel down");
        }
        Ok(())
    }
}
