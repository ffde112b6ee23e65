use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_base: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Validate `api_base`. It must be an absolute http(s) URL that can carry
    /// path segments.
    pub fn new(api_base: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: api_base.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(api_base).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path"));
        }
        Ok(Self {
            api_base: url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}

/// What survives between runs: the bearer token handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

/// JSON file holding the current [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/remeal/session.json`
    pub fn default_location() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dir.join("remeal").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing file means nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ConfigError::SessionFormat {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, session: &Session) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_vec_pretty(session).map_err(|source| {
            ConfigError::SessionFormat {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    /// Forget the session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::SessionIo {
            path: self.path.clone(),
            source,
        }
    }
}
