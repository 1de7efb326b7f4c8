//! Outcome notifications
//!
//! Notifications are advisory: a failure to post never affects board state
//! and is logged at warning level by the caller.

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

/// Chat notification abstraction
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a message to a room/channel
    async fn send(&self, room: &str, message: &str) -> anyhow::Result<()>;
}

/// Slack notifier using the Web API
pub struct SlackNotifier {
    http: reqwest::Client,
    token: String,
    dry_run: bool,
}

impl SlackNotifier {
    pub fn new(token: String, dry_run: bool) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            dry_run,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, room: &str, message: &str) -> anyhow::Result<()> {
        if self.dry_run {
            debug!("Would have sent '{}' to '{}' channel", message, room);
            return Ok(());
        }

        let response: PostMessageResponse = self
            .http
            .post("https://slack.com/api/chat.postMessage")
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "channel": room,
                "text": message,
            }))
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            anyhow::bail!(
                "Slack rejected message to '{}': {}",
                room,
                response.error.unwrap_or_else(|| "unknown error".into())
            );
        }

        Ok(())
    }
}

/// No-op notifier used when Slack is not configured
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _room: &str, _message: &str) -> anyhow::Result<()> {
        debug!("Slack client not available");
        Ok(())
    }
}
