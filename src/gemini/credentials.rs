//! Credential loading for each auth method.
//!
//! Tokens are only read here. Signing in and refreshing is left to the Gemini
//! CLI itself.

use super::paths;
use crate::auth::AuthType;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Credentials obtained for the selected auth method.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthCredentials {
    /// Google OAuth access token, usable against Code Assist
    OAuth { access_token: String },
    /// API-key style auth; no Code Assist server is available
    ApiKey { source: &'static str },
}

/// Loads credentials for `auth_type`, failing if they are missing or unusable.
pub fn load_credentials(auth_type: &str, now: DateTime<Utc>) -> Result<AuthCredentials> {
    let Some(parsed) = AuthType::parse(auth_type) else {
        bail!("Unsupported auth type: {}", auth_type);
    };

    match parsed {
        AuthType::LoginWithGoogle => read_oauth_credentials(&paths::oauth_creds_path()?, now),
        AuthType::UseGemini => {
            if env_present("GEMINI_API_KEY") {
                Ok(AuthCredentials::ApiKey {
                    source: "GEMINI_API_KEY",
                })
            } else {
                bail!("GEMINI_API_KEY environment variable not found. Set it and try again.")
            }
        }
        AuthType::UseVertexAi => {
            if env_present("GOOGLE_API_KEY") {
                Ok(AuthCredentials::ApiKey {
                    source: "GOOGLE_API_KEY",
                })
            } else if env_present("GOOGLE_CLOUD_PROJECT") && env_present("GOOGLE_CLOUD_LOCATION") {
                Ok(AuthCredentials::ApiKey {
                    source: "GOOGLE_CLOUD_PROJECT",
                })
            } else {
                bail!(
                    "Vertex AI requires GOOGLE_API_KEY, or both GOOGLE_CLOUD_PROJECT and \
                     GOOGLE_CLOUD_LOCATION. Set them and try again."
                )
            }
        }
        AuthType::CloudShell | AuthType::ComputeAdc => bail!(
            "Auth type '{}' needs Application Default Credentials, which this tool cannot load",
            parsed
        ),
    }
}

/// Reads cached Google OAuth tokens from `oauth_creds.json`.
pub fn read_oauth_credentials(path: &Path, now: DateTime<Utc>) -> Result<AuthCredentials> {
    if !path.exists() {
        bail!(
            "No cached Google credentials found at {}. Run `gemini` to sign in first.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).context("Failed to read Gemini credentials")?;
    let json: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse Gemini credentials")?;

    let access_token = json["access_token"]
        .as_str()
        .context("Missing access_token")?
        .to_string();

    if let Some(expires_at) = json["expiry_date"].as_i64() {
        if expires_at <= now.timestamp_millis() {
            bail!("Cached Google credentials have expired. Run `gemini` to sign in again.");
        }
    }

    Ok(AuthCredentials::OAuth { access_token })
}

fn env_present(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
