//! Bot configuration
//!
//! Configuration loaded from board-bot.toml. Column names, the approver
//! threshold, label names, and job bindings are data, not code: the same
//! binary serves any board layout.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration loaded from board-bot.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Repository the bot operates on
    pub repository: RepositoryConfig,

    /// Project board bindings; board automation is disabled when absent
    #[serde(default)]
    pub project_board: Option<ProjectBoardConfig>,

    /// Jenkins automation bindings; build triggering is disabled when absent
    #[serde(default)]
    pub automated_tests: Option<AutomatedTestsConfig>,

    /// Slack notification settings; notifications are disabled when absent
    #[serde(default)]
    pub slack: Option<SlackConfig>,

    /// Timer intervals
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Webhook server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Repository the bot is bound to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl RepositoryConfig {
    /// "owner/name" form, as found in webhook payloads
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Project board and column bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBoardConfig {
    /// Project board name (e.g., "Pipeline for QA")
    pub name: String,

    /// Column holding PRs that need contributor action
    #[serde(default = "default_contributor_column")]
    pub contributor_column: String,

    /// Column holding PRs awaiting review
    #[serde(default = "default_review_column")]
    pub review_column: String,

    /// Column holding PRs ready for QA
    #[serde(default = "default_test_column")]
    pub test_column: String,

    /// Minimum number of distinct approving reviewers
    #[serde(default = "default_min_approvers")]
    pub min_approvers: usize,

    /// Label marking PRs already through QA; such PRs are left alone
    #[serde(default)]
    pub tested_label: Option<String>,

    /// Prefix of CI status contexts created by this bot itself, which the
    /// classifier must ignore to avoid self-referential deadlock
    #[serde(default)]
    pub bot_context_prefix: Option<String>,
}

fn default_contributor_column() -> String {
    "IN PROGRESS".to_string()
}

fn default_review_column() -> String {
    "REVIEW".to_string()
}

fn default_test_column() -> String {
    "IN TEST".to_string()
}

fn default_min_approvers() -> usize {
    2
}

/// Jenkins automation bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomatedTestsConfig {
    /// Repository the automation watches ("owner/name")
    pub repo_full_name: String,

    /// Full Jenkins job name; folder jobs use '/' separators
    pub job_name: String,
}

/// Slack notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Channel to post outcome notifications to
    pub room: String,
}

/// Timer intervals, in minutes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interval between full-repository reconciliation sweeps
    #[serde(default = "default_sweep_minutes")]
    pub sweep_minutes: u64,

    /// Interval between pending-PR retry passes
    #[serde(default = "default_retry_minutes")]
    pub retry_minutes: u64,
}

fn default_sweep_minutes() -> u64 {
    10
}

fn default_retry_minutes() -> u64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sweep_minutes: default_sweep_minutes(),
            retry_minutes: default_retry_minutes(),
        }
    }
}

/// Webhook server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl BotConfig {
    /// Load config from CWD first, then home directory
    ///
    /// Returns None when no config file is present or it does not parse;
    /// the bot cannot run without a repository binding.
    pub fn load() -> Option<Self> {
        let content = crate::load_config_file()?;
        match toml::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded bot config");
                Some(config)
            }
            Err(e) => {
                log::error!("Failed to parse config file: {}", e);
                None
            }
        }
    }
}
