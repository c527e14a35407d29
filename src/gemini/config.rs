//! Configuration handle backed by the Gemini CLI's files and Code Assist.

use super::code_assist::CodeAssistClient;
use super::credentials::{self, AuthCredentials};
use super::settings::{self, Settings};
use super::{paths, ConfigParams, ServerInfo, UsageConfig};
use crate::quota::QuotaBucket;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

/// An authenticated Code Assist connection.
#[derive(Debug, Clone)]
struct CodeAssistSession {
    client: CodeAssistClient,
    info: ServerInfo,
}

#[derive(Debug)]
pub struct GeminiConfig {
    params: ConfigParams,
    server: Option<CodeAssistSession>,
}

impl GeminiConfig {
    pub fn new(params: ConfigParams) -> Self {
        tracing::debug!(
            session_id = %params.session_id,
            model = %params.model,
            "Created configuration for {}",
            params.target_dir.display()
        );
        Self {
            params,
            server: None,
        }
    }

    /// Settings files, lowest precedence first.
    fn settings_layers(&self) -> Result<Vec<PathBuf>> {
        Ok(vec![
            paths::user_settings_path()?,
            paths::workspace_settings_path(&self.params.cwd),
            paths::system_settings_path(),
        ])
    }
}

#[async_trait]
impl UsageConfig for GeminiConfig {
    fn settings(&self) -> Result<Settings> {
        let layers = self.settings_layers()?;
        if self.params.debug_mode {
            for layer in &layers {
                tracing::debug!("Settings layer candidate: {}", layer.display());
            }
        }
        settings::load_layered(&layers)
    }

    async fn refresh_auth(&mut self, auth_type: &str) -> Result<()> {
        self.server = None;

        match credentials::load_credentials(auth_type, Utc::now())? {
            AuthCredentials::OAuth { access_token } => {
                let client = CodeAssistClient::new(&access_token, &self.params.model);
                let project = std::env::var("GOOGLE_CLOUD_PROJECT")
                    .ok()
                    .filter(|p| !p.is_empty());

                let setup_client = client.clone();
                let info = tokio::task::spawn_blocking(move || {
                    setup_client.load_code_assist(project.as_deref())
                })
                .await
                .context("Code Assist setup task failed")??;

                tracing::debug!(
                    project_id = ?info.project_id,
                    user_tier = ?info.user_tier,
                    "Code Assist user loaded"
                );
                self.server = Some(CodeAssistSession { client, info });
            }
            AuthCredentials::ApiKey { source } => {
                tracing::debug!("Authenticated with {}; no Code Assist server", source);
            }
        }
        Ok(())
    }

    fn code_assist_server(&self) -> Option<ServerInfo> {
        self.server.as_ref().map(|session| session.info.clone())
    }

    async fn refresh_user_quota(&mut self) -> Result<Option<Vec<QuotaBucket>>> {
        let Some(session) = &self.server else {
            return Ok(None);
        };
        let Some(project) = session.info.project_id.clone() else {
            tracing::debug!("No Code Assist project; skipping quota lookup");
            return Ok(None);
        };

        let client = session.client.clone();
        let buckets = tokio::task::spawn_blocking(move || client.retrieve_user_quota(&project))
            .await
            .context("Quota lookup task failed")??;
        Ok(Some(buckets))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
