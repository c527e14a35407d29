//! Locations of the Gemini CLI's on-disk state.
//!
//! Everything lives under the Gemini home directory:
//! - `settings.json` - user settings
//! - `oauth_creds.json` - cached Google OAuth tokens
//! - `google_accounts.json` - active/previous Google accounts
//!
//! Workspace settings live in `<cwd>/.gemini/settings.json`; system settings in
//! `/etc/gemini-cli/settings.json` unless overridden.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The name of the Gemini CLI directory.
const GEMINI_DIR: &str = ".gemini";

const SETTINGS_FILE: &str = "settings.json";
const OAUTH_CREDS_FILE: &str = "oauth_creds.json";
const GOOGLE_ACCOUNTS_FILE: &str = "google_accounts.json";

const SYSTEM_SETTINGS_ENV: &str = "GEMINI_CLI_SYSTEM_SETTINGS_PATH";

/// Returns the Gemini home directory: `$GEMINI_DIR`, else `~/.gemini/`.
///
/// # Errors
///
/// Returns an error if `GEMINI_DIR` is unset and the home directory cannot be
/// determined.
pub fn gemini_home_dir() -> Result<PathBuf> {
    std::env::var("GEMINI_DIR")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(GEMINI_DIR)))
        .context("Cannot determine Gemini config directory")
}

/// Returns the user settings path: `<gemini home>/settings.json`
pub fn user_settings_path() -> Result<PathBuf> {
    Ok(gemini_home_dir()?.join(SETTINGS_FILE))
}

/// Returns the workspace settings path: `<cwd>/.gemini/settings.json`
pub fn workspace_settings_path(cwd: &Path) -> PathBuf {
    cwd.join(GEMINI_DIR).join(SETTINGS_FILE)
}

/// Returns the system settings path, honoring `GEMINI_CLI_SYSTEM_SETTINGS_PATH`.
pub fn system_settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(SYSTEM_SETTINGS_ENV) {
        return PathBuf::from(path);
    }
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support/GeminiCli").join(SETTINGS_FILE)
    } else if cfg!(windows) {
        PathBuf::from("C:\\ProgramData\\gemini-cli").join(SETTINGS_FILE)
    } else {
        PathBuf::from("/etc/gemini-cli").join(SETTINGS_FILE)
    }
}

/// Returns the cached OAuth credentials path: `<gemini home>/oauth_creds.json`
pub fn oauth_creds_path() -> Result<PathBuf> {
    Ok(gemini_home_dir()?.join(OAUTH_CREDS_FILE))
}

/// Returns the Google accounts path: `<gemini home>/google_accounts.json`
pub fn google_accounts_path() -> Result<PathBuf> {
    Ok(gemini_home_dir()?.join(GOOGLE_ACCOUNTS_FILE))
}
