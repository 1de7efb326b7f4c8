//! Configuration for the board bot
//!
//! This crate provides:
//! - Configuration file loading (TOML, CWD then home directory)
//! - The bot configuration model with per-field defaults
//! - Environment toggles (dry-run)

pub mod bot_config;
pub mod config_file;

pub use bot_config::{
    AutomatedTestsConfig, BotConfig, ProjectBoardConfig, RepositoryConfig, ScheduleConfig,
    ServerConfig, SlackConfig,
};
pub use config_file::load_config_file;

/// Whether mutating collaborator calls are suppressed
///
/// Controlled by the `DRY_RUN` environment variable; any non-empty value
/// enables dry-run mode. Intended actions are still logged.
pub fn dry_run() -> bool {
    std::env::var("DRY_RUN").map(|v| !v.is_empty()).unwrap_or(false)
}
