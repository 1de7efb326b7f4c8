//! Bot composition root
//!
//! All collaborators are owned here and passed into handlers explicitly;
//! there is no module-level global state.

use crate::jenkins::JobTrigger;
use crate::notify::Notifier;
use crate::pending::PendingRetryQueue;
use crate::reconciler::Reconciler;
use board_bot_config::BotConfig;
use gh_board_client::{GitHubClient, PullRequestRef};
use std::sync::Arc;

/// Shared state for webhook handlers and timers
pub struct BotContext {
    pub config: BotConfig,
    pub github: Arc<dyn GitHubClient>,
    pub jenkins: Option<Arc<dyn JobTrigger>>,
    pub pending: PendingRetryQueue,
    pub reconciler: Reconciler,
    pub dry_run: bool,
}

impl BotContext {
    pub fn new(
        config: BotConfig,
        github: Arc<dyn GitHubClient>,
        notifier: Arc<dyn Notifier>,
        jenkins: Option<Arc<dyn JobTrigger>>,
        dry_run: bool,
    ) -> anyhow::Result<Self> {
        let board = config
            .project_board
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no project board configured"))?;

        let reconciler = Reconciler::new(
            github.clone(),
            notifier,
            board,
            config.slack.as_ref().map(|s| s.room.clone()),
            dry_run,
        );

        Ok(Self {
            config,
            github,
            jenkins,
            pending: PendingRetryQueue::new(),
            reconciler,
            dry_run,
        })
    }

    /// Reference to a PR in the bound repository
    pub fn pr_ref(&self, number: u64) -> PullRequestRef {
        PullRequestRef::new(
            self.config.repository.owner.clone(),
            self.config.repository.name.clone(),
            number,
        )
    }
}
