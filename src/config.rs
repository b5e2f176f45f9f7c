//! Runtime configuration
//!
//! Built once at startup from an optional TOML file plus environment
//! overrides, then handed to the router. Request handlers never read the
//! environment themselves.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HookError, Result};
use crate::repository::is_allowed_char;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8010";
pub const DEFAULT_CONFIG_PATH: &str = "pull_hook.toml";
pub const DEFAULT_PARENT_DIRECTORY: &str = "/var/www/";
pub const DEFAULT_FOLDER_SUFFIX: &str = ".linu.sk";
pub const DEFAULT_BUILD_FILE: &str = "Makefile";
/// GitHub caps webhook payloads at 25 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bind_address: String,
    pub github_secret: String,
    pub parent_directory: PathBuf,
    pub folder_suffix: String,
    pub build_file: String,
    pub pull_command: Vec<String>,
    pub build_command: Vec<String>,
    pub max_body_bytes: usize,
    pub command_timeout_secs: Option<u64>,
    pub log_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            github_secret: String::new(),
            parent_directory: PathBuf::from(DEFAULT_PARENT_DIRECTORY),
            folder_suffix: DEFAULT_FOLDER_SUFFIX.to_string(),
            build_file: DEFAULT_BUILD_FILE.to_string(),
            pull_command: vec!["git".to_string(), "pull".to_string()],
            build_command: vec!["make".to_string(), "build".to_string()],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            command_timeout_secs: None,
            log_directory: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_address", &self.bind_address)
            .field("github_secret", &"<redacted>")
            .field("parent_directory", &self.parent_directory)
            .field("folder_suffix", &self.folder_suffix)
            .field("build_file", &self.build_file)
            .field("pull_command", &self.pull_command)
            .field("build_command", &self.build_command)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .field("log_directory", &self.log_directory)
            .finish()
    }
}

impl Settings {
    /// Load settings from the TOML file at `path` (if it exists), apply
    /// process environment overrides and validate the result.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::load`], with overrides taken from `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = if path.exists() {
            let config_str = fs::read_to_string(path).map_err(|e| {
                HookError::ConfigError(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&config_str).map_err(|e| {
                HookError::ConfigError(format!(
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            Self::default()
        };

        settings.apply_overrides(lookup);
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// Overlay values looked up by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("GITHUB_SECRET") {
            self.github_secret = secret;
        }
        if let Some(addr) = lookup("BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(parent) = lookup("PARENT_DIRECTORY") {
            self.parent_directory = PathBuf::from(parent);
        }
        if let Some(dir) = lookup("LOG_DIRECTORY") {
            self.log_directory = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.github_secret.is_empty() {
            return Err(HookError::ConfigError(
                "GITHUB_SECRET must be set to a non-empty value".to_string(),
            ));
        }
        if !self.parent_directory.is_absolute() {
            return Err(HookError::ConfigError(format!(
                "parent_directory must be absolute, got '{}'",
                self.parent_directory.display()
            )));
        }
        if self.pull_command.is_empty() || self.pull_command[0].is_empty() {
            return Err(HookError::ConfigError(
                "pull_command must not be empty".to_string(),
            ));
        }
        if self.build_command.is_empty() || self.build_command[0].is_empty() {
            return Err(HookError::ConfigError(
                "build_command must not be empty".to_string(),
            ));
        }
        if self.build_file.is_empty()
            || self.build_file == "."
            || self.build_file == ".."
            || self.build_file.contains(['/', '\\'])
        {
            return Err(HookError::ConfigError(format!(
                "build_file must be a plain file name, got '{}'",
                self.build_file
            )));
        }
        if !self.folder_suffix.chars().all(is_allowed_char) {
            return Err(HookError::ConfigError(format!(
                "folder_suffix contains forbidden characters: '{}'",
                self.folder_suffix
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(HookError::ConfigError(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}
