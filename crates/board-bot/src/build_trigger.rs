//! Automation test build triggering
//!
//! Watches for cards landing in the test column and starts the configured
//! Jenkins job for the referenced PR. PRs whose state has not yet settled
//! (CI pending, reviews outstanding) go to the pending queue and are
//! re-checked on a timer.

use crate::classifier::ApprovalState;
use crate::context::BotContext;
use crate::events::ProjectCardEvent;
use crate::pending::PendingEntry;
use gh_board_client::PullRequestRef;
use log::{debug, error, info, trace, warn};

/// Handle a project_card created/moved event
pub async fn on_card_event(ctx: &BotContext, event: &ProjectCardEvent) {
    let (Some(automation), Some(board)) = (
        ctx.config.automated_tests.as_ref(),
        ctx.config.project_board.as_ref(),
    ) else {
        return;
    };
    if ctx.jenkins.is_none() {
        return;
    }

    if event.project_card.note.is_some() {
        trace!("Card is a note, ignoring");
        return;
    }

    if event.repository.full_name != automation.repo_full_name {
        trace!(
            "Card repo {} doesn't match watched repo {}, exiting",
            event.repository.full_name,
            automation.repo_full_name
        );
        return;
    }

    // The event only carries a column ID; check it is the watched test
    // column on the watched board
    let column = match ctx
        .github
        .get_project_column(event.project_card.column_id)
        .await
    {
        Ok(column) => column,
        Err(err) => {
            warn!(
                "Error while fetching project column {}: {}",
                event.project_card.column_id, err
            );
            return;
        }
    };

    if column.name != board.test_column {
        trace!(
            "Card column {} doesn't match watched column {}, exiting",
            column.name,
            board.test_column
        );
        return;
    }

    let Some(project_id) = column.project_id() else {
        warn!("Column {} has no parseable project URL", column.id);
        return;
    };
    match ctx.github.get_project(project_id).await {
        Ok(project) if project.name == board.name => {}
        Ok(project) => {
            trace!(
                "Card project {} doesn't match watched board {}, exiting",
                project.name,
                board.name
            );
            return;
        }
        Err(err) => {
            warn!("Error while fetching project {}: {}", project_id, err);
            return;
        }
    }

    let Some(pr_number) = event
        .project_card
        .content_url
        .as_deref()
        .and_then(|url| url.rsplit('/').next())
        .and_then(|n| n.parse().ok())
    else {
        warn!("Card {} has no parseable content URL", event.project_card.id);
        return;
    };

    let pr_ref = ctx.pr_ref(pr_number);
    process_pull_request(ctx, &pr_ref, &automation.job_name).await;
}

/// Re-check a PR's state and trigger the test build if it is ready
///
/// The PR is removed from the pending queue before the attempt starts, so a
/// racing webhook and timer never process the same entry concurrently; it is
/// re-added only when the state is still non-terminal.
pub async fn process_pull_request(ctx: &BotContext, pr_ref: &PullRequestRef, job_name: &str) {
    ctx.pending.remove(pr_ref.number);

    let state = match ctx.reconciler.approval_state(pr_ref).await {
        Ok((_, state)) => state,
        Err(err) => {
            error!("Couldn't calculate the PR approval state for {}: {}", pr_ref, err);
            return;
        }
    };

    match state {
        Some(
            ApprovalState::Unstable
            | ApprovalState::AwaitingReviewers
            | ApprovalState::ChangesRequested,
        ) => {
            debug!(
                "State for {} is '{}', adding to backlog to check periodically",
                pr_ref,
                state.unwrap()
            );
            ctx.pending
                .enqueue(PendingEntry::new(pr_ref.clone(), job_name));
            return;
        }
        Some(ApprovalState::Failed) => {
            debug!("State for {} is 'failed', exiting", pr_ref);
            return;
        }
        Some(ApprovalState::Approved) => {
            debug!("State for {} is 'approved', proceeding", pr_ref);
        }
        None => {
            warn!("State for {} is undetermined, ignoring", pr_ref);
            return;
        }
    }

    let Some(jenkins) = ctx.jenkins.as_ref() else {
        debug!("Jenkins is not configured, skipping build for {}", pr_ref);
        return;
    };

    if ctx.dry_run {
        info!("Would start {} job in Jenkins for {}", job_name, pr_ref);
        return;
    }

    info!("Starting {} job in Jenkins for {}", job_name, pr_ref);
    match jenkins.start(job_name, pr_ref.number).await {
        Ok(queue_id) => {
            info!(
                "Started job in Jenkins for {} (queue id {:?})",
                pr_ref, queue_id
            );
        }
        Err(err) => {
            error!(
                "Error while triggering Jenkins build for {}, will retry later: {}",
                pr_ref, err
            );
            ctx.pending
                .enqueue(PendingEntry::new(pr_ref.clone(), job_name));
        }
    }
}

/// Retry every pending PR once, against a snapshot of the queue
///
/// PRs enqueued while the pass runs are picked up on the next tick.
pub async fn drain_pending(ctx: &BotContext) {
    let snapshot = ctx.pending.snapshot();
    trace!("Processing {} pending PRs", snapshot.len());

    for entry in &snapshot {
        process_pull_request(ctx, &entry.pr, &entry.job_name).await;
    }

    trace!("Finished processing {} pending PRs", snapshot.len());
}
