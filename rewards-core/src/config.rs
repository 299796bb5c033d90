//! Configuration management
//!
//! Settings live in `settings.json` in the app directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8000", "timeoutSecs": null },
//!   "ui": { "toastDurationMs": 3000, "redirectDelayMs": 2000 },
//!   "device": { "ipLookupUrl": null }
//! }
//! ```
//! Keys this crate does not manage are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{normalize_base_url, API_URL_ENV};

/// Environment variable that overrides the app directory
pub const APP_DIR_ENV: &str = "REWARDS_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

const SETTINGS_FILE: &str = "settings.json";

/// App directory: `$REWARDS_DIR`, else `~/.rewards`
pub fn app_dir(home: Option<PathBuf>) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(APP_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    home.map(|h| h.join(".rewards"))
        .ok_or_else(|| anyhow!("Cannot find home directory; set {}", APP_DIR_ENV))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    /// No explicit timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: None,
            other: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

fn default_toast_duration() -> u64 {
    DEFAULT_TOAST_DURATION_MS
}

fn default_redirect_delay() -> u64 {
    DEFAULT_REDIRECT_DELAY_MS
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            other: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    /// Endpoint returning the caller's public IP; no lookup when unset
    #[serde(default)]
    pub ip_lookup_url: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    ui: UiSettings,
    #[serde(default)]
    device: DeviceSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiSettings,
    pub ui: UiSettings,
    pub device: DeviceSettings,
    /// Set when `REWARDS_API_URL` replaced the stored base URL
    pub api_url_overridden: bool,
}

impl Config {
    /// Load config from the app directory
    ///
    /// A missing or unreadable file gives the defaults. `REWARDS_API_URL`
    /// overrides the stored base URL for this run only.
    pub fn load(app_dir: &Path) -> Result<Self> {
        let raw = read_settings(&app_dir.join(SETTINGS_FILE))?;

        let mut api = raw.api;
        let mut api_url_overridden = false;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                api.base_url = url.trim().to_string();
                api_url_overridden = true;
            }
        }

        Ok(Self {
            api,
            ui: raw.ui,
            device: raw.device,
            api_url_overridden,
        })
    }

    /// Save config to the app directory, keeping unmanaged keys
    ///
    /// An environment override is never written back.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(app_dir)?;
        let settings_path = app_dir.join(SETTINGS_FILE);

        let mut settings = read_settings(&settings_path)?;
        let stored_url = settings.api.base_url.clone();
        settings.api = self.api.clone();
        if self.api_url_overridden {
            settings.api.base_url = stored_url;
        }
        settings.ui = self.ui.clone();
        settings.device = self.device.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Replace the API base URL; only absolute http(s) URLs are accepted
    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        self.api.base_url = normalize_base_url(url)?;
        self.api_url_overridden = false;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_duration_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.ui.redirect_delay_ms)
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}
