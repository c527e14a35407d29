use super::{Emission, OutputMode};
use crate::report::UsageReport;
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::fmt::{Display, Write};

pub(crate) const NO_QUOTA_MESSAGE: &str = "No quota information available.";

/// `toLocaleString`-style timestamp, e.g. `1/25/2026, 2:35:08 PM`.
const RESET_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

/// Renders the pre-authentication banner shown on stderr in verbose mode.
pub fn render_banner(active_account: Option<&str>, auth_type: &str) -> String {
    format!(
        "--- Account Information ---\n\
         Active Account: {}\n\
         Auth Method:    {}\n\
         \n\
         Authenticating...\n",
        active_account.unwrap_or("None"),
        auth_type
    )
}

/// Renders the report payload for `mode`. Reset times are shown in local time.
pub fn render_report(report: &UsageReport, mode: OutputMode) -> Result<String> {
    render_report_in(report, mode, &Local)
}

pub(crate) fn render_report_in<Tz>(report: &UsageReport, mode: OutputMode, tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match mode {
        OutputMode::Json => render_json(report),
        OutputMode::Short => render_short(report),
        OutputMode::Verbose => render_verbose(report, tz),
    }
}

/// Renders a failure. JSON mode keeps stdout a single parseable document.
pub fn render_error(message: &str, mode: OutputMode) -> Emission {
    match mode {
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(&ErrorPayload { error: message })
                .unwrap_or_else(|_| r#"{"error": "unknown error"}"#.to_string());
            Emission::Primary(format!("{}\n", json))
        }
        OutputMode::Short | OutputMode::Verbose => {
            Emission::Diagnostic(format!("Error: {}\n", message))
        }
    }
}

fn render_json(report: &UsageReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize usage report")?;
    Ok(format!("{}\n", json))
}

fn render_short(report: &UsageReport) -> Result<String> {
    let mut out = String::new();
    if report.quota.is_empty() {
        writeln!(out, "{}", NO_QUOTA_MESSAGE)?;
        return Ok(out);
    }

    for quota in &report.quota {
        write!(out, "{}: {}", quota.model_id, quota.remaining_percent)?;
        if let Some(resets_in) = &quota.resets_in {
            write!(out, " (Reset in {})", resets_in)?;
        }
        out.push('\n');
    }
    Ok(out)
}

fn render_verbose<Tz>(report: &UsageReport, tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let account = &report.account;
    let mut out = String::new();

    writeln!(
        out,
        "Project ID:     {}",
        account.project_id.as_deref().unwrap_or("Not set")
    )?;
    writeln!(
        out,
        "User Tier:      {} ({})",
        account.user_tier_name.as_deref().unwrap_or("Unknown"),
        account.user_tier.as_deref().unwrap_or("Unknown")
    )?;

    if report.quota.is_empty() {
        writeln!(out, "\n{}", NO_QUOTA_MESSAGE)?;
    } else {
        writeln!(out, "\n--- Usage & Quota ---")?;
        for quota in &report.quota {
            writeln!(out, "\nModel: {}", quota.model_id)?;
            writeln!(out, "Usage left: {}", quota.remaining_percent)?;
            if let Some(reset_at) = quota.reset_at {
                writeln!(
                    out,
                    "Resets at:  {}",
                    reset_at.with_timezone(tz).format(RESET_TIME_FORMAT)
                )?;
                if let Some(resets_in) = &quota.resets_in {
                    writeln!(out, "Resets in:  {}", resets_in)?;
                }
            }
        }
    }

    writeln!(out, "\n----------------------")?;
    Ok(out)
}
