//! End-to-end usage report flow.
//!
//! Runs the collaborator calls in order, formats the quota, and renders the
//! result through the sink. Errors are returned to the caller, which owns the
//! single error boundary.

use crate::auth::resolve_auth_type;
use crate::gemini::{AccountLookup, ConfigParams, UsageConfig, DEFAULT_GEMINI_MODEL};
use crate::logging;
use crate::output::{self, OutputMode, OutputSink};
use crate::quota::FormattedQuota;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub active: Option<String>,
    pub auth_type: String,
    pub project_id: Option<String>,
    pub user_tier: Option<String>,
    pub user_tier_name: Option<String>,
}

/// Everything the renderer needs. Quota order is the server's order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub account: AccountInfo,
    pub quota: Vec<FormattedQuota>,
}

/// Per-invocation options for [`run`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub auth_override: Option<String>,
    pub mode: OutputMode,
    pub cwd: PathBuf,
    pub session_id: String,
    /// Source of "now" for reset countdowns
    pub clock: fn() -> DateTime<Utc>,
}

impl ReportOptions {
    pub fn new(auth_override: Option<String>, mode: OutputMode, cwd: PathBuf) -> Self {
        Self {
            auth_override,
            mode,
            cwd,
            session_id: uuid::Uuid::new_v4().to_string(),
            clock: Utc::now,
        }
    }
}

/// Produces and renders the usage report.
///
/// `make_config` is called once, after the cached account lookup.
pub async fn run<L, C, F>(
    lookup: &L,
    make_config: F,
    options: &ReportOptions,
    sink: &mut dyn OutputSink,
) -> Result<()>
where
    L: AccountLookup,
    C: UsageConfig,
    F: FnOnce(ConfigParams) -> C,
{
    output::prepare(options.mode, sink);

    let active = lookup.cached_account();

    let mut config = make_config(ConfigParams {
        session_id: options.session_id.clone(),
        target_dir: options.cwd.clone(),
        cwd: options.cwd.clone(),
        model: DEFAULT_GEMINI_MODEL.to_string(),
        debug_mode: logging::is_debug_enabled(),
    });

    let auth_type = resolve_auth_type(options.auth_override.as_deref(), || {
        Ok(config.settings()?.selected_auth_type().map(String::from))
    });

    if options.mode == OutputMode::Verbose {
        sink
            .write_diagnostic(&output::render_banner(active.as_deref(), &auth_type))
            .context("Failed to write account banner")?;
    }

    config
        .refresh_auth(&auth_type)
        .await
        .with_context(|| format!("Authentication with {} failed", auth_type))?;

    let server = config.code_assist_server().unwrap_or_default();
    let buckets = config
        .refresh_user_quota()
        .await
        .context("Failed to fetch quota")?;

    let now = (options.clock)();
    let report = UsageReport {
        account: AccountInfo {
            active,
            auth_type,
            project_id: server.project_id,
            user_tier: server.user_tier,
            user_tier_name: server.user_tier_name,
        },
        quota: buckets
            .unwrap_or_default()
            .iter()
            .map(|bucket| FormattedQuota::from_bucket(bucket, now))
            .collect(),
    };

    let rendered = output::render_report(&report, options.mode)?;
    sink.write_primary(&rendered).context("Failed to write report")?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
