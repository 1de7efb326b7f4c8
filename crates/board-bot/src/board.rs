//! Project board resolution
//!
//! Finds the configured project board and its managed columns by name.
//! A missing board or column is a configuration error: the whole repo pass
//! is aborted, since the bot cannot place cards without knowing the columns.

use crate::column_map::BoardColumns;
use board_bot_config::{ProjectBoardConfig, RepositoryConfig};
use gh_board_client::{GitHubClient, Project, ProjectColumn};
use log::debug;
use thiserror::Error;

/// Board/column lookup failures that abort a reconciliation pass
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("project board '{project}' not found in repo {repo}")]
    ProjectNotFound { project: String, repo: String },

    #[error("column '{column}' not found in project '{project}'")]
    ColumnNotFound { column: String, project: String },
}

/// Resolve the configured project board and its managed columns
pub async fn resolve_board(
    github: &dyn GitHubClient,
    repo: &RepositoryConfig,
    config: &ProjectBoardConfig,
) -> anyhow::Result<(Project, BoardColumns)> {
    let projects = github.list_repo_projects(&repo.owner, &repo.name).await?;
    let project = projects
        .into_iter()
        .find(|p| p.name == config.name)
        .ok_or_else(|| SetupError::ProjectNotFound {
            project: config.name.clone(),
            repo: repo.full_name(),
        })?;

    debug!("Fetched {} project ({})", project.name, project.id);

    let columns = github.list_project_columns(project.id).await?;
    let board = BoardColumns {
        contributor: column_by_name(&columns, &config.contributor_column, &project)?,
        review: column_by_name(&columns, &config.review_column, &project)?,
        test: column_by_name(&columns, &config.test_column, &project)?,
    };

    debug!(
        "Fetched {} ({}), {} ({}), {} ({}) columns",
        board.contributor.name,
        board.contributor.id,
        board.review.name,
        board.review.id,
        board.test.name,
        board.test.id
    );

    Ok((project, board))
}

fn column_by_name(
    columns: &[ProjectColumn],
    name: &str,
    project: &Project,
) -> Result<ProjectColumn, SetupError> {
    columns
        .iter()
        .find(|c| c.name == name)
        .cloned()
        .ok_or_else(|| SetupError::ColumnNotFound {
            column: name.to_string(),
            project: project.name.clone(),
        })
}
