//! Webhook events and handler registration
//!
//! Event dispatch is an explicit table: event kind in, handler function
//! out. Handlers take the shared context and the raw JSON payload and are
//! responsible for their own payload parsing and error logging; a handler
//! failure never propagates past the dispatch boundary.

use crate::board::resolve_board;
use crate::build_trigger;
use crate::context::BotContext;
use log::{debug, error};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Webhook event kinds the bot reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    PullRequestReview,
    ProjectCard,
}

impl EventKind {
    /// Parse the `X-GitHub-Event` header value
    pub fn from_header(name: &str) -> Option<Self> {
        match name {
            "pull_request" => Some(EventKind::PullRequest),
            "pull_request_review" => Some(EventKind::PullRequestReview),
            "project_card" => Some(EventKind::ProjectCard),
            _ => None,
        }
    }
}

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A registered event handler
pub type Handler = fn(Arc<BotContext>, serde_json::Value) -> BoxFuture<()>;

/// The handler registration table
///
/// Dispatch is a lookup plus invocation; there is no hidden listener list.
pub static HANDLERS: &[(EventKind, Handler)] = &[
    (EventKind::PullRequest, on_pull_request),
    (EventKind::PullRequestReview, on_pull_request_review),
    (EventKind::ProjectCard, on_project_card),
];

/// Look up the handler for an event kind
pub fn handler_for(kind: EventKind) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, handler)| *handler)
}

// === Payload DTOs (the subset of fields the handlers read) ===

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub full_name: String,
    pub owner: OwnerPayload,
}

#[derive(Debug, Deserialize)]
pub struct OwnerPayload {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub repository: RepositoryPayload,
    pub pull_request: PullRequestPayload,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProjectCardEvent {
    pub action: String,
    pub repository: RepositoryPayload,
    pub project_card: CardPayload,
}

#[derive(Debug, Deserialize)]
pub struct CardPayload {
    pub id: u64,
    pub column_id: u64,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// === Handlers ===

/// pull_request events: place freshly opened PRs in the review column
fn on_pull_request(ctx: Arc<BotContext>, payload: serde_json::Value) -> BoxFuture<()> {
    Box::pin(async move {
        let event: PullRequestEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                error!("Malformed pull_request payload: {}", err);
                return;
            }
        };
        if event.action != "opened" {
            debug!("Ignoring pull_request action '{}'", event.action);
            return;
        }
        if !event_matches_repo(&ctx, &event.repository) {
            return;
        }

        let Some(board_config) = ctx.config.project_board.as_ref() else {
            return;
        };
        debug!(
            "Handling new pull request #{} on repo {}",
            event.pull_request.number, event.repository.full_name
        );

        let pr_ref = ctx.pr_ref(event.pull_request.number);
        let result = async {
            let (_, columns) =
                resolve_board(ctx.github.as_ref(), &ctx.config.repository, board_config).await?;
            let pr = ctx.github.fetch_pull_request(&pr_ref).await?;
            ctx.reconciler.place_new_pull_request(&pr, &columns).await
        }
        .await;

        if let Err(err) = result {
            error!("Couldn't place new PR {}: {}", pr_ref, err);
        }
    })
}

/// pull_request_review events: reconcile the PR's card position
fn on_pull_request_review(ctx: Arc<BotContext>, payload: serde_json::Value) -> BoxFuture<()> {
    Box::pin(async move {
        let event: PullRequestEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                error!("Malformed pull_request_review payload: {}", err);
                return;
            }
        };
        if event.action != "submitted" && event.action != "edited" {
            debug!("Ignoring pull_request_review action '{}'", event.action);
            return;
        }
        if !event_matches_repo(&ctx, &event.repository) {
            return;
        }

        let Some(board_config) = ctx.config.project_board.as_ref() else {
            return;
        };
        debug!(
            "Handling review on PR #{} on repo {}",
            event.pull_request.number, event.repository.full_name
        );

        let pr_ref = ctx.pr_ref(event.pull_request.number);
        let result = async {
            let (_, columns) =
                resolve_board(ctx.github.as_ref(), &ctx.config.repository, board_config).await?;
            ctx.reconciler.reconcile(&pr_ref, &columns).await
        }
        .await;

        if let Err(err) = result {
            error!("Couldn't reconcile PR {}: {}", pr_ref, err);
        }
    })
}

/// project_card events: trigger automation builds for cards entering test
fn on_project_card(ctx: Arc<BotContext>, payload: serde_json::Value) -> BoxFuture<()> {
    Box::pin(async move {
        let event: ProjectCardEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                error!("Malformed project_card payload: {}", err);
                return;
            }
        };
        if event.action != "created" && event.action != "moved" {
            debug!("Ignoring project_card action '{}'", event.action);
            return;
        }

        build_trigger::on_card_event(&ctx, &event).await;
    })
}

fn event_matches_repo(ctx: &BotContext, repository: &RepositoryPayload) -> bool {
    let bound = ctx.config.repository.full_name();
    if repository.full_name != bound {
        debug!(
            "Event repo {} doesn't match bound repo {}, ignoring",
            repository.full_name, bound
        );
        return false;
    }
    true
}
