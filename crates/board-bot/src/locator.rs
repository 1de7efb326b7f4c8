//! Card location
//!
//! Finds the existing board card for an issue/PR among a set of candidate
//! columns. Candidates are scanned in the order given and the scan stops at
//! the first match; if a card incorrectly exists in more than one candidate
//! column, the earlier column wins.

use gh_board_client::{GitHubClient, ProjectCard, ProjectColumn};

/// Scan candidate columns for a card referencing `content_url`
///
/// Returns the first matching (column, card) pair, or `None` when no
/// candidate column holds such a card. Fetch errors propagate; the caller
/// treats them as "skip this PR this round".
pub async fn find_card(
    github: &dyn GitHubClient,
    candidates: &[&ProjectColumn],
    content_url: &str,
) -> anyhow::Result<Option<(ProjectColumn, ProjectCard)>> {
    for column in candidates {
        if let Some(card) = card_in_column(github, column, content_url).await? {
            return Ok(Some(((*column).clone(), card)));
        }
    }
    Ok(None)
}

/// Look for a card referencing `content_url` in a single column
pub async fn card_in_column(
    github: &dyn GitHubClient,
    column: &ProjectColumn,
    content_url: &str,
) -> anyhow::Result<Option<ProjectCard>> {
    let cards = github.list_cards(column.id).await?;
    Ok(cards
        .into_iter()
        .find(|card| card.content_url.as_deref() == Some(content_url)))
}
