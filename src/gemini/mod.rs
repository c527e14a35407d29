//! Gemini CLI account, settings, and Code Assist access.
//!
//! The report driver only sees the [`AccountLookup`] and [`UsageConfig`]
//! traits. The concrete implementations here read the Gemini CLI's cached
//! state and talk to Code Assist over HTTP.

pub mod accounts;
pub mod code_assist;
pub mod config;
pub mod credentials;
pub mod paths;
pub mod settings;

use crate::quota::QuotaBucket;
use anyhow::Result;
use async_trait::async_trait;
use settings::Settings;
use std::path::PathBuf;

/// Model the configuration is created for.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";

/// Looks up the account the CLI last signed in with.
pub trait AccountLookup {
    /// Returns None when no account is cached; never errors.
    fn cached_account(&self) -> Option<String>;
}

/// Inputs for constructing a configuration handle.
#[derive(Debug, Clone)]
pub struct ConfigParams {
    pub session_id: String,
    pub target_dir: PathBuf,
    pub cwd: PathBuf,
    pub model: String,
    pub debug_mode: bool,
}

/// Project and tier data held by the Code Assist server after authentication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerInfo {
    pub project_id: Option<String>,
    pub user_tier: Option<String>,
    pub user_tier_name: Option<String>,
}

/// A configuration handle that can authenticate and query quota.
#[async_trait]
pub trait UsageConfig: Send {
    /// Merged settings. May fail on unreadable or malformed settings files.
    fn settings(&self) -> Result<Settings>;

    /// Authenticates with `auth_type`. Failure aborts the report.
    async fn refresh_auth(&mut self, auth_type: &str) -> Result<()>;

    /// The Code Assist server, if the auth method has one.
    fn code_assist_server(&self) -> Option<ServerInfo>;

    /// Current quota buckets, or None if the auth method has no quota.
    async fn refresh_user_quota(&mut self) -> Result<Option<Vec<QuotaBucket>>>;
}
