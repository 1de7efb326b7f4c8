//! GitHub API client for project-board automation
//!
//! This crate provides a trait-based GitHub API client covering the
//! endpoints the board bot needs: pull requests, reviews, commit statuses,
//! and classic project boards (columns and cards).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - fetch_pull_request() / list_reviews()         │
//! │  - fetch_commit_status()                         │
//! │  - list_cards() / move_card() / create_card()    │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!              ┌─────────────────┐
//!              │ OctocrabClient  │
//!              │ (direct API)    │
//!              └─────────────────┘
//! ```
//!
//! Tests substitute their own `GitHubClient` implementations backed by
//! in-memory fixtures.

pub mod client;
pub mod octocrab_client;
pub mod types;

pub use client::GitHubClient;
pub use octocrab_client::OctocrabClient;
pub use types::{
    CardContentType, CombinedStatus, CommitStatus, MergeableState, Project, ProjectCard,
    ProjectColumn, PullRequest, PullRequestRef, Review, ReviewState, StatusState,
};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
