//! Cached Google account lookup from `google_accounts.json`.

use super::{paths, AccountLookup};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct GoogleAccounts {
    #[serde(default)]
    active: Option<String>,
}

/// Reads the active account the Gemini CLI last signed in with.
#[derive(Debug, Clone)]
pub struct GoogleAccountStore {
    path: Option<PathBuf>,
}

impl GoogleAccountStore {
    /// Uses `<gemini home>/google_accounts.json`.
    pub fn new() -> Self {
        Self {
            path: paths::google_accounts_path().ok(),
        }
    }

    #[cfg(test)]
    fn at(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl Default for GoogleAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountLookup for GoogleAccountStore {
    fn cached_account(&self) -> Option<String> {
        self.path.as_deref().and_then(read_active_account)
    }
}

/// Missing, unreadable, or malformed files all mean "no cached account".
fn read_active_account(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<GoogleAccounts>(&content) {
        Ok(accounts) => accounts.active.filter(|a| !a.is_empty()),
        Err(e) => {
            tracing::debug!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}
