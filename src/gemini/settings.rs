//! Layered Gemini CLI settings.
//!
//! Only the auth selection is read. Layers are applied user, workspace, system,
//! with later layers overriding earlier ones.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub security: Option<SecuritySettings>,
    /// Flat key used before settings were grouped under `security`
    #[serde(default)]
    pub selected_auth_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SecuritySettings {
    #[serde(default)]
    pub auth: Option<AuthSettings>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    #[serde(default)]
    pub selected_type: Option<String>,
}

impl Settings {
    pub fn with_auth_type(auth_type: &str) -> Self {
        Self {
            security: Some(SecuritySettings {
                auth: Some(AuthSettings {
                    selected_type: Some(auth_type.to_string()),
                }),
            }),
            selected_auth_type: None,
        }
    }

    /// `security.auth.selectedType`, falling back to the flat legacy key.
    pub fn selected_auth_type(&self) -> Option<&str> {
        self.security
            .as_ref()
            .and_then(|s| s.auth.as_ref())
            .and_then(|a| a.selected_type.as_deref())
            .or(self.selected_auth_type.as_deref())
    }

    fn overlay(self, other: Settings) -> Settings {
        match other.selected_auth_type() {
            Some(auth_type) => Settings::with_auth_type(auth_type),
            None => self,
        }
    }
}

/// Reads one settings file. A missing file is `Ok(None)`; an empty file is default settings.
pub fn load_settings_file(path: &Path) -> Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Some(Settings::default()));
    }

    let settings = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
    Ok(Some(settings))
}

/// Loads and merges settings from `layers`, lowest precedence first.
pub fn load_layered(layers: &[PathBuf]) -> Result<Settings> {
    let mut merged = Settings::default();
    for path in layers {
        if let Some(layer) = load_settings_file(path)? {
            tracing::debug!("Loaded settings layer {}", path.display());
            merged = merged.overlay(layer);
        }
    }
    Ok(merged)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
