//! Configuration management
//!
//! A run is driven by one [`Config`], built from command line values layered
//! over an optional JSON settings file:
//! ```json
//! {
//!   "token": "...",
//!   "usersFile": "/var/lib/rollcall/users.txt",
//!   "apiUrl": "https://bnw.im/api/",
//!   "sleep": 10,
//!   "addedMaxTimedelta": 86400,
//!   "messages": { "added": "...", "removed": "...", "renamed": "..." }
//! }
//! ```
//! Command line values win over the file, the file wins over defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::bnw::BNW_PRODUCTION_URL;
use crate::domain::result::{Error, Result};
use crate::services::{FreshnessPolicy, MessageTemplates};

pub const DEFAULT_SLEEP_SECS: u64 = 10;
pub const DEFAULT_ADDED_MAX_TIMEDELTA: u64 = 86_400;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub users_file: Option<PathBuf>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub sleep: Option<u64>,
    #[serde(default)]
    pub added_max_timedelta: Option<u64>,
    #[serde(default)]
    pub messages: MessageSettings,
}

/// Per-kind template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageSettings {
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub removed: Option<String>,
    #[serde(default)]
    pub renamed: Option<String>,
}

impl SettingsFile {
    /// Load settings from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Cannot read settings {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("Invalid settings {}: {}", path.display(), e))
        })
    }

    /// `<config dir>/rollcall/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rollcall").join("settings.json"))
    }

    /// Load from `path` if given, otherwise from the default location when it exists
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub users_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub sleep: Option<u64>,
    pub added_max_timedelta: Option<u64>,
    pub first_run: bool,
    pub no_post: bool,
}

/// Resolved configuration for a single run
#[derive(Debug, Clone)]
pub struct Config {
    /// Posting credential, sent as `login`
    pub token: String,
    /// Snapshot file location (absolute)
    pub users_file: PathBuf,
    pub api_url: String,
    /// Pause between posts
    pub sleep: Duration,
    /// Freshness threshold in seconds, 0 disables it
    pub added_max_timedelta: u64,
    /// Skip diffing, only record the current roster
    pub first_run: bool,
    /// Log messages instead of posting them
    pub no_post: bool,
    pub messages: MessageTemplates,
}

impl Config {
    /// Merge command line values over the settings file
    pub fn resolve(settings: SettingsFile, overrides: Overrides) -> Result<Self> {
        let token = overrides
            .token
            .or(settings.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::config("a posting token is required (--token)"))?;

        let users_file = overrides
            .users_file
            .or(settings.users_file)
            .ok_or_else(|| Error::config("a snapshot path is required (--users-file)"))?;

        let mut messages = MessageTemplates::default();
        if let Some(t) = settings.messages.added {
            messages.added = t;
        }
        if let Some(t) = settings.messages.removed {
            messages.removed = t;
        }
        if let Some(t) = settings.messages.renamed {
            messages.renamed = t;
        }

        Ok(Self {
            token,
            users_file: absolute(&users_file)?,
            api_url: overrides
                .api_url
                .or(settings.api_url)
                .unwrap_or_else(|| BNW_PRODUCTION_URL.to_string()),
            sleep: Duration::from_secs(
                overrides.sleep.or(settings.sleep).unwrap_or(DEFAULT_SLEEP_SECS),
            ),
            added_max_timedelta: overrides
                .added_max_timedelta
                .or(settings.added_max_timedelta)
                .unwrap_or(DEFAULT_ADDED_MAX_TIMEDELTA),
            first_run: overrides.first_run,
            no_post: overrides.no_post,
            messages,
        })
    }

    pub fn freshness(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_seconds(self.added_max_timedelta)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
