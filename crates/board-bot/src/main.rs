//! GitHub project-board automation bot
//!
//! Listens for webhook events on one repository and keeps its project
//! board in sync with each PR's review and CI state; approved PRs landing
//! in the test column get an automation build triggered in Jenkins.

mod board;
mod build_trigger;
mod classifier;
mod column_map;
mod context;
mod events;
mod jenkins;
mod locator;
mod notify;
mod pending;
mod reconciler;
mod sweep;
#[cfg(test)]
mod test_support;
mod webhook;

use crate::context::BotContext;
use crate::jenkins::{JenkinsClient, JobTrigger};
use crate::notify::{Notifier, NullNotifier, SlackNotifier};
use board_bot_config::BotConfig;
use gh_board_client::{octocrab::Octocrab, OctocrabClient};
use log::{info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let Some(config) = BotConfig::load() else {
        anyhow::bail!("no usable board-bot.toml found");
    };

    let dry_run = board_bot_config::dry_run();
    if dry_run {
        info!("DRY_RUN is set, mutating calls will be logged but not made");
    }

    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| anyhow::anyhow!("GITHUB_TOKEN is not set"))?;
    let octocrab = Octocrab::builder().personal_token(token).build()?;
    let github = Arc::new(OctocrabClient::new(Arc::new(octocrab)));

    let notifier: Arc<dyn Notifier> = match (std::env::var("SLACK_TOKEN"), config.slack.as_ref()) {
        (Ok(token), Some(_)) => Arc::new(SlackNotifier::new(token, dry_run)),
        _ => {
            info!("Slack is not configured, notifications are disabled");
            Arc::new(NullNotifier)
        }
    };

    let jenkins: Option<Arc<dyn JobTrigger>> = match (
        std::env::var("JENKINS_URL"),
        std::env::var("JENKINS_USER"),
        std::env::var("JENKINS_TOKEN"),
    ) {
        (Ok(url), Ok(user), Ok(token)) if config.automated_tests.is_some() => {
            Some(Arc::new(JenkinsClient::new(url, user, token)))
        }
        _ => {
            info!("Jenkins is not configured, build triggering is disabled");
            None
        }
    };

    if config.project_board.is_none() {
        warn!("No project board configured, exiting");
        anyhow::bail!("project_board section is required");
    }

    let server = config.server.clone();
    let ctx = Arc::new(BotContext::new(config, github, notifier, jenkins, dry_run)?);

    sweep::spawn_timers(ctx.clone());
    webhook::serve(ctx, &server).await
}
