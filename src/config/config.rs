use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::navigation::LOGIN_PATH;

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn override_merge(&mut self, other: &mut Config) {
        self.client.override_merge(&mut other.client);
        self.session.override_merge(&mut other.session);
    }
}

// Backend api client configuration.
#[derive(Deserialize, Debug, Default)]
pub struct ClientConfig {
    // Base url every api path is relative to.
    base_url: Option<String>,
    // Per request timeout. Unset means the http client's defaults apply.
    timeout_milliseconds: Option<u64>,
}

impl ClientConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api/v1";

    pub fn set_base_url(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.base_url = Some(val)
        }
    }
    pub fn set_timeout_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.timeout_milliseconds = Some(std::cmp::max(val, 1));
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut ClientConfig) {
        self.set_base_url(&mut other.base_url);
        self.set_timeout_milliseconds(other.timeout_milliseconds);
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(ClientConfig::DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_milliseconds.map(Duration::from_millis)
    }
}

// Session persistence and navigation configuration.
#[derive(Deserialize, Debug, Default)]
pub struct SessionConfig {
    // Directory holding the persisted session.
    storage_dir: Option<PathBuf>,
    // Page the user is sent to when the session is forced out.
    login_path: Option<String>,
}

impl SessionConfig {
    const DEFAULT_STORAGE_DIR: &'static str = ".invctl";

    pub fn set_storage_dir(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.storage_dir = Some(val)
        }
    }
    pub fn set_login_path(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.login_path = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut SessionConfig) {
        self.set_storage_dir(&mut other.storage_dir);
        self.set_login_path(&mut other.login_path);
    }

    pub fn storage_dir(&self) -> &Path {
        self.storage_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(SessionConfig::DEFAULT_STORAGE_DIR))
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(LOGIN_PATH)
    }
}
