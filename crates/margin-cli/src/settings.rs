//! Persistent task store settings.

use std::path::{Path, PathBuf};

use margin_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const SETTINGS_FILE_NAME: &str = "things.json";
pub const AUTH_TOKEN_ENV_VAR: &str = "THINGS_AUTH_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSettings {
    #[serde(default = "default_settings_version")]
    pub version: u32,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

const fn default_settings_version() -> u32 {
    1
}

pub fn default_settings_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("margin").join(SETTINGS_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve config directory".to_string()))
}

impl TaskSettings {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_settings_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "Failed to read settings at {}: {}",
                path.display(),
                error
            ))
        })?;
        let mut settings = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!(
                "Failed to parse settings at {}: {}",
                path.display(),
                error
            ))
        })?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Environment first, then the settings file.
    pub fn resolve_auth_token(&self) -> Option<String> {
        normalize_text_option(std::env::var(AUTH_TOKEN_ENV_VAR).ok())
            .or_else(|| self.auth_token.clone())
    }

    fn normalize(&mut self) {
        self.auth_token = normalize_text_option(self.auth_token.take());
        if self
            .database_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            self.database_path = None;
        }
    }
}
