//! Periodic reconciliation sweep
//!
//! Webhooks can be missed or arrive while the bot is down; the sweep walks
//! every open PR on a timer and reconciles its card, so the board converges
//! even without events. One PR failing never aborts the rest of the pass.

use crate::board::resolve_board;
use crate::build_trigger;
use crate::context::BotContext;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

/// Reconcile every open PR in the bound repository once
pub async fn sweep_repository(ctx: &BotContext) {
    let Some(board_config) = ctx.config.project_board.as_ref() else {
        return;
    };
    let repo = &ctx.config.repository;

    let columns = match resolve_board(ctx.github.as_ref(), repo, board_config).await {
        Ok((project, columns)) => {
            debug!("Sweeping board '{}' for {}", project.name, repo.full_name());
            columns
        }
        Err(err) => {
            error!("Couldn't resolve the project board, skipping sweep: {}", err);
            return;
        }
    };

    let prs = match ctx.github.fetch_pull_requests(&repo.owner, &repo.name).await {
        Ok(prs) => prs,
        Err(err) => {
            error!("Couldn't list open PRs, skipping sweep: {}", err);
            return;
        }
    };

    info!("Sweeping {} open PRs on {}", prs.len(), repo.full_name());
    for pr in &prs {
        let pr_ref = ctx.pr_ref(pr.number);
        if let Err(err) = ctx.reconciler.reconcile(&pr_ref, &columns).await {
            error!("Couldn't reconcile PR {}: {}", pr_ref, err);
        }
    }
}

/// Spawn the background timers
///
/// One interval drives the full sweep, a second drains the pending build
/// queue. The drain timer only runs when Jenkins is configured.
pub fn spawn_timers(ctx: Arc<BotContext>) {
    let sweep_minutes = ctx.config.schedule.sweep_minutes;
    let sweep_ctx = ctx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_minutes * 60));
        // The first tick fires immediately; a fresh start gets a fresh board
        loop {
            interval.tick().await;
            sweep_repository(&sweep_ctx).await;
        }
    });

    if ctx.jenkins.is_some() {
        let retry_minutes = ctx.config.schedule.retry_minutes;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(retry_minutes * 60));
            interval.tick().await;
            loop {
                interval.tick().await;
                build_trigger::drain_pending(&ctx).await;
            }
        });
    }
}
