use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::{ClearPolicy, Notifier};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "phonebook.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub notification_ttl_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub clear_policy: ClearPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3001".into(),
            notification_ttl_ms: 3000,
            request_timeout_secs: Some(10),
            clear_policy: ClearPolicy::LatestOnly,
        }
    }
}

impl Settings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.notification_ttl(), self.clear_policy)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    notification_ttl_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    clear_policy: Option<String>,
}

/// Defaults, then `phonebook.toml` (or `config_path`), then environment.
pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    load_settings_from(&path, |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("PHONEBOOK_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__NOTIFICATION_TTL_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.notification_ttl_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__NOTIFICATION_TTL_MS"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = env("APP__CLEAR_POLICY") {
        match v.parse::<ClearPolicy>() {
            Ok(policy) => settings.clear_policy = policy,
            Err(err) => warn!(error = %err, "ignoring APP__CLEAR_POLICY"),
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.notification_ttl_ms {
        settings.notification_ttl_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.clear_policy {
        match v.parse::<ClearPolicy>() {
            Ok(policy) => settings.clear_policy = policy,
            Err(err) => warn!(error = %err, "ignoring clear_policy from config file"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
