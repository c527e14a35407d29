//! Per-model quota buckets and their display formatting.

use chrono::{DateTime, Utc};
use serde::Serialize;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// A raw quota bucket as reported by Code Assist.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaBucket {
    pub model_id: String,
    /// Fraction of the allowance left, expected in `[0, 1]`
    pub remaining_fraction: f64,
    /// RFC 3339 timestamp exactly as the server sent it
    pub reset_time: Option<String>,
}

/// A quota bucket with display-ready fields.
///
/// `resets_in` is a snapshot taken at formatting time and is never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedQuota {
    pub model_id: String,
    pub remaining_fraction: f64,
    pub remaining_percent: String,
    /// Passed through from the server unchanged, even if unparseable
    pub reset_time: Option<String>,
    pub resets_in: Option<String>,
    /// Parsed `reset_time`; None when absent or unparseable
    #[serde(skip)]
    pub reset_at: Option<DateTime<Utc>>,
}

impl FormattedQuota {
    pub fn from_bucket(bucket: &QuotaBucket, now: DateTime<Utc>) -> Self {
        let reset_at = bucket.reset_time.as_deref().and_then(parse_reset_time);
        Self {
            model_id: bucket.model_id.clone(),
            remaining_fraction: bucket.remaining_fraction,
            remaining_percent: format_remaining_percent(bucket.remaining_fraction),
            reset_time: bucket.reset_time.clone(),
            resets_in: reset_at.and_then(|reset| format_resets_in(reset, now)),
            reset_at,
        }
    }
}

fn parse_reset_time(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Ignoring unparseable resetTime '{}': {}", value, e);
            None
        }
    }
}

/// Formats a remaining fraction as a percentage with one decimal, e.g. `0.5` -> `50.0%`.
///
/// Exact ties on the scaled value round away from zero (`0.0015` -> `0.2%`).
/// Out-of-range fractions are not clamped.
pub fn format_remaining_percent(fraction: f64) -> String {
    let tenths = (fraction * 1000.0).round() / 10.0;
    format!("{:.1}%", tenths)
}

/// Formats the countdown until `reset` as `"<H>h <M>m"`.
///
/// Returns None when `reset` is not strictly after `now`. Hours are not rolled
/// into days.
pub fn format_resets_in(reset: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let diff_ms = (reset - now).num_milliseconds();
    if diff_ms <= 0 {
        return None;
    }

    let hours = diff_ms / MILLIS_PER_HOUR;
    let minutes = (diff_ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    Some(format!("{}h {}m", hours, minutes))
}

#[cfg(test)]
#[path = "tests/quota_tests.rs"]
mod tests;
