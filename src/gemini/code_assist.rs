//! Blocking HTTP client for the Code Assist API.
//!
//! Two methods are used:
//! - `loadCodeAssist` - resolves the user's project and tier
//! - `retrieveUserQuota` - lists per-model quota buckets for a project

use super::ServerInfo;
use crate::quota::QuotaBucket;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://cloudcode-pa.googleapis.com";
const API_VERSION: &str = "v1internal";
const API_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadCodeAssistResponse {
    cloudaicompanion_project: Option<String>,
    current_tier: Option<Tier>,
    paid_tier: Option<Tier>,
}

#[derive(Debug, Deserialize)]
struct Tier {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetrieveUserQuotaResponse {
    #[serde(default)]
    buckets: Vec<RawBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBucket {
    model_id: Option<String>,
    remaining_fraction: Option<f64>,
    reset_time: Option<String>,
}

#[derive(Clone)]
pub struct CodeAssistClient {
    agent: ureq::Agent,
    base_url: String,
    access_token: String,
    user_agent: String,
}

impl std::fmt::Debug for CodeAssistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeAssistClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl CodeAssistClient {
    /// Creates a client against `$CODE_ASSIST_ENDPOINT` or the public endpoint.
    pub fn new(access_token: &str, model: &str) -> Self {
        let base_url = std::env::var("CODE_ASSIST_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(access_token, model, base_url)
    }

    fn with_endpoint(access_token: &str, model: &str, base_url: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(API_TIMEOUT))
            .build()
            .into();

        Self {
            agent,
            base_url,
            access_token: access_token.to_string(),
            user_agent: format!("GeminiCLI/{}/{}", env!("CARGO_PKG_VERSION"), model),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/{}:{}",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            method
        )
    }

    fn post(&self, method: &str, body: &serde_json::Value) -> Result<String> {
        let request_body_str =
            serde_json::to_string(body).context("Failed to serialize request body")?;

        tracing::debug!("POST {}", self.method_url(method));
        let response_body: String = self
            .agent
            .post(&self.method_url(method))
            .header("Authorization", &format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .send(&request_body_str)
            .with_context(|| format!("Code Assist {} request failed", method))?
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read {} response", method))?;
        Ok(response_body)
    }

    /// Resolves the user's project and tier.
    pub fn load_code_assist(&self, project: Option<&str>) -> Result<ServerInfo> {
        let body = serde_json::json!({
            "cloudaicompanionProject": project,
            "metadata": {
                "ideType": "IDE_UNSPECIFIED",
                "platform": "PLATFORM_UNSPECIFIED",
                "pluginType": "GEMINI",
                "duetProject": project,
            }
        });
        let response = self.post("loadCodeAssist", &body)?;
        parse_load_code_assist(&response, project)
    }

    /// Lists quota buckets for `project`, in the order the server returns them.
    pub fn retrieve_user_quota(&self, project: &str) -> Result<Vec<QuotaBucket>> {
        let body = serde_json::json!({ "project": project });
        let response = self.post("retrieveUserQuota", &body)?;
        parse_quota_buckets(&response)
    }
}

/// Paid tier takes precedence over the current tier. The server's project wins
/// over `fallback_project`.
fn parse_load_code_assist(body: &str, fallback_project: Option<&str>) -> Result<ServerInfo> {
    let response: LoadCodeAssistResponse =
        serde_json::from_str(body).context("Failed to parse loadCodeAssist response")?;

    let tier = response.paid_tier.or(response.current_tier);
    let (user_tier, user_tier_name) = match tier {
        Some(t) => (t.id, t.name),
        None => (None, None),
    };

    Ok(ServerInfo {
        project_id: response
            .cloudaicompanion_project
            .or_else(|| fallback_project.map(String::from)),
        user_tier,
        user_tier_name,
    })
}

/// Buckets missing a model id or fraction are skipped. Reset times are kept as sent.
fn parse_quota_buckets(body: &str) -> Result<Vec<QuotaBucket>> {
    let response: RetrieveUserQuotaResponse =
        serde_json::from_str(body).context("Failed to parse retrieveUserQuota response")?;

    let buckets = response
        .buckets
        .into_iter()
        .filter_map(|raw| {
            let (Some(model_id), Some(remaining_fraction)) = (raw.model_id, raw.remaining_fraction)
            else {
                tracing::warn!("Skipping incomplete quota bucket");
                return None;
            };
            Some(QuotaBucket {
                model_id,
                remaining_fraction,
                reset_time: raw.reset_time,
            })
        })
        .collect();
    Ok(buckets)
}

#[cfg(test)]
#[path = "tests/code_assist_tests.rs"]
mod tests;
