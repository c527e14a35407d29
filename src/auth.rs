//! Authentication method selection.
//!
//! The auth method comes from, in order: an explicit `--auth` override, the
//! `security.auth.selectedType` settings value, and finally the login-with-Google
//! default.

use anyhow::Result;
use clap::ValueEnum;
use std::fmt;

/// Authentication methods understood by the Gemini CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AuthType {
    #[default]
    #[value(name = "oauth-personal")]
    LoginWithGoogle,
    #[value(name = "gemini-api-key")]
    UseGemini,
    #[value(name = "vertex-ai")]
    UseVertexAi,
    #[value(name = "cloud-shell")]
    CloudShell,
    #[value(name = "compute-default-credentials")]
    ComputeAdc,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::LoginWithGoogle => "oauth-personal",
            AuthType::UseGemini => "gemini-api-key",
            AuthType::UseVertexAi => "vertex-ai",
            AuthType::CloudShell => "cloud-shell",
            AuthType::ComputeAdc => "compute-default-credentials",
        }
    }

    /// Parses a settings or CLI value. Returns None for unknown identifiers.
    pub fn parse(value: &str) -> Option<Self> {
        Self::value_variants()
            .iter()
            .copied()
            .find(|variant| variant.as_str() == value)
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the auth method to use.
///
/// A non-empty `explicit` override wins and `settings_lookup` is never called.
/// Otherwise the lookup's value is used; a lookup that errors or yields nothing
/// falls back to [`AuthType::default`]. This never fails.
pub fn resolve_auth_type<F>(explicit: Option<&str>, settings_lookup: F) -> String
where
    F: FnOnce() -> Result<Option<String>>,
{
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        return value.to_string();
    }

    match settings_lookup() {
        Ok(Some(value)) if !value.is_empty() => value,
        Ok(_) => AuthType::default().to_string(),
        Err(e) => {
            tracing::debug!("Ignoring settings lookup failure: {:#}", e);
            AuthType::default().to_string()
        }
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
