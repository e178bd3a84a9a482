//! Runtime configuration for the Readwise client.
//!
//! The API token is resolved exactly once at process start (secrets file, then
//! environment) and handed to [`crate::readwise::ReadwiseClient`] as an explicit
//! value. Nothing in the request path reads the environment again.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_READWISE_BASE_URL: &str = "https://readwise.io/api/v2";
pub const TOKEN_ENV_VAR: &str = "READWISE_API_TOKEN";
pub const BASE_URL_ENV_VAR: &str = "READWISE_BASE_URL";

const AUTH_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PAGES: usize = 1000;
const SECRETS_FILE_NAME: &str = "readwise.env";

/// Connection settings for the Readwise API.
#[derive(Clone, PartialEq, Eq)]
pub struct ReadwiseConfig {
    pub api_token: String,
    pub base_url: String,
    /// Timeout for the lightweight `/auth/` probe
    pub auth_timeout: Duration,
    /// Timeout for data-bearing calls
    pub request_timeout: Duration,
    /// Upper bound on pages followed by the cursor collector
    pub max_pages: usize,
}

impl fmt::Debug for ReadwiseConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReadwiseConfig")
            .field("api_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("auth_timeout", &self.auth_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl ReadwiseConfig {
    /// Build a config for the given token with default endpoint and timeouts.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = normalize_text_option(Some(api_token.into()))
            .ok_or_else(|| Error::MissingCredential(default_secrets_path_label()))?;

        Ok(Self {
            api_token,
            base_url: DEFAULT_READWISE_BASE_URL.to_string(),
            auth_timeout: Duration::from_secs(AUTH_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Override the API base URL (trailing slashes are dropped).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = normalize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    #[must_use]
    pub const fn with_timeouts(mut self, auth_timeout: Duration, request_timeout: Duration) -> Self {
        self.auth_timeout = auth_timeout;
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Resolve from `READWISE_API_TOKEN` and optional `READWISE_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let token = normalize_text_option(std::env::var(TOKEN_ENV_VAR).ok())
            .ok_or_else(|| Error::MissingCredential(default_secrets_path_label()))?;
        let config = Self::new(token)?;

        match normalize_text_option(std::env::var(BASE_URL_ENV_VAR).ok()) {
            Some(base_url) => config.with_base_url(base_url),
            None => Ok(config),
        }
    }
}

/// Load `KEY=value` pairs from a dotenv-style secrets file into the process
/// environment. A missing file is not an error.
pub fn load_secrets_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    dotenvy::from_path(path).map_err(|error| {
        Error::InvalidInput(format!(
            "Failed to load secrets file {}: {error}",
            path.display()
        ))
    })?;
    tracing::debug!("Loaded secrets from {}", path.display());
    Ok(true)
}

/// Default location of the Readwise secrets file.
pub fn default_secrets_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("margin").join(SECRETS_FILE_NAME))
}

fn default_secrets_path_label() -> String {
    default_secrets_path().map_or_else(
        || format!("~/.config/margin/{SECRETS_FILE_NAME}"),
        |path| path.display().to_string(),
    )
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let value = normalize_text_option(Some(raw.to_string()))
        .ok_or_else(|| Error::InvalidInput("Readwise base URL must not be empty".to_string()))?;
    if is_http_url(&value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "Readwise base URL must include http:// or https://".to_string(),
        ))
    }
}
