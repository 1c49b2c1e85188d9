//! # Configuration Management
//!
//! Optional `config.toml` in the XDG config directory holding defaults for
//! the importer. Command-line flags and environment variables take precedence
//! over anything set here.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default name of the attachment directory next to each tickets file
pub const DEFAULT_MEDIA_DIR: &str = "media";

/// How file parts are written into the multipart body
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileEncoding {
  /// Base64 payload with a matching `Content-Transfer-Encoding` header
  #[default]
  Base64,
  /// Raw bytes, no transfer-encoding header
  Binary,
}

/// Importer settings read from `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
  /// FogBugz API endpoint, e.g. `https://example.fogbugz.com/api.asp`
  pub api_url: Option<String>,
  /// Attachment directory name, resolved next to each tickets file
  pub media_dir: String,
  /// Per-request timeout; no timeout when unset
  pub timeout_secs: Option<u64>,
  pub file_encoding: FileEncoding,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      api_url: None,
      media_dir: DEFAULT_MEDIA_DIR.to_string(),
      timeout_secs: None,
      file_encoding: FileEncoding::default(),
    }
  }
}

/// Represents the configuration directory for the importer
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Locate the platform config directory
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", "fogbugz-import").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Use an explicit directory instead of the platform default
  pub fn from_dir(config_dir: impl Into<PathBuf>) -> Self {
    Self {
      config_dir: config_dir.into(),
    }
  }

  /// Get the path to the settings file
  pub fn settings_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }

  /// Load settings from file or return defaults
  pub fn load_settings(&self) -> Result<Settings> {
    let settings_path = self.settings_path();

    if !settings_path.exists() {
      return Ok(Settings::default());
    }

    let content = fs::read_to_string(&settings_path)
      .with_context(|| format!("Failed to read settings from {}", settings_path.display()))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse settings from {}", settings_path.display()))
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path().join("absent"));

    let settings = config_dirs.load_settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.media_dir, "media");
    assert_eq!(settings.file_encoding, FileEncoding::Base64);
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(
      config_dirs.settings_path(),
      "api_url = \"https://example.fogbugz.com/api.asp\"\nfile_encoding = \"binary\"\n",
    )
    .unwrap();

    let settings = config_dirs.load_settings().unwrap();
    assert_eq!(settings.api_url.as_deref(), Some("https://example.fogbugz.com/api.asp"));
    assert_eq!(settings.file_encoding, FileEncoding::Binary);
    assert_eq!(settings.media_dir, "media");
    assert_eq!(settings.timeout_secs, None);
  }

  #[test]
  fn test_full_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(
      config_dirs.settings_path(),
      "api_url = \"https://bugs.example.com/api.asp\"\nmedia_dir = \"files\"\ntimeout_secs = 30\nfile_encoding = \"base64\"\n",
    )
    .unwrap();

    let settings = Settings {
      api_url: Some("https://bugs.example.com/api.asp".to_string()),
      media_dir: "files".to_string(),
      timeout_secs: Some(30),
      file_encoding: FileEncoding::Base64,
    };
    assert_eq!(config_dirs.load_settings().unwrap(), settings);
  }

  #[test]
  fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_dirs = ConfigDirs::from_dir(temp_dir.path());
    fs::write(config_dirs.settings_path(), "timeout_secs = \"soon\"").unwrap();

    let err = config_dirs.load_settings().unwrap_err();
    assert!(err.to_string().contains("Failed to parse settings"));
  }
}
