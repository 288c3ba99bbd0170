//! # Configuration Management
//!
//! Handles the `latch.toml` settings file and the platform directories it and
//! the default file store live in (XDG base directories on Linux).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use latch_core::Accessibility;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Secure store backend selectable from config or the command line
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
  /// JSON file with owner-only permissions
  File,
  /// The operating system's credential manager
  Keyring,
}

impl Default for Backend {
  fn default() -> Self {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
      Backend::Keyring
    } else {
      Backend::File
    }
  }
}

/// Settings read from `latch.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchConfig {
  /// Service namespace records are scoped to
  pub service: String,
  /// Access group for sharing records across applications
  #[serde(skip_serializing_if = "Option::is_none")]
  pub access_group: Option<String>,
  /// Policy applied to written records
  pub accessibility: Accessibility,
  pub backend: Backend,
  /// Location of the file store; defaults to the data directory
  #[serde(skip_serializing_if = "Option::is_none")]
  pub store_path: Option<PathBuf>,
}

impl Default for LatchConfig {
  fn default() -> Self {
    Self {
      service: LatchConfig::DEFAULT_SERVICE.to_string(),
      access_group: None,
      accessibility: Accessibility::default(),
      backend: Backend::default(),
      store_path: None,
    }
  }
}

impl LatchConfig {
  pub const DEFAULT_SERVICE: &'static str = "latch";

  /// Load configuration from `path`, or defaults if it does not exist
  pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      return Ok(Self::default());
    }

    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read latch config from {}", path.display()))?;
    let config: LatchConfig =
      toml::from_str(&content).with_context(|| format!("Failed to parse latch config from {}", path.display()))?;

    config
      .validate()
      .map_err(anyhow::Error::from)
      .with_context(|| format!("Latch config at {} is invalid", path.display()))?;

    Ok(config)
  }

  /// Render as TOML
  pub fn to_toml(&self) -> Result<String> {
    toml::to_string_pretty(self).context("Failed to serialize latch config to TOML")
  }

  /// Check settings that cannot be expressed in the schema
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(path) = &self.store_path {
      if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyStorePath);
      }
      if path.is_dir() {
        return Err(ConfigError::StorePathIsDirectory(path.clone()));
      }
    }
    Ok(())
  }

  /// Access group with empty strings treated as unset
  pub fn access_group(&self) -> Option<&str> {
    self.access_group.as_deref().filter(|group| !group.is_empty())
  }
}

/// Errors raised while validating config files
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("store_path must not be empty")]
  EmptyStorePath,
  #[error("store_path {0} is a directory")]
  StorePathIsDirectory(PathBuf),
}

/// Represents the configuration directories for latch
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
  pub data_dir: PathBuf,
}

impl ConfigDirs {
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("eddieland", "", "latch").context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
      data_dir: proj_dirs.data_dir().to_path_buf(),
    })
  }

  /// Get the path to the config file
  pub fn config_path(&self) -> PathBuf {
    self.config_dir.join("latch.toml")
  }

  /// Get the default path of the file store
  pub fn default_store_path(&self) -> PathBuf {
    self.data_dir.join("store.json")
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = LatchConfig::load_from_path(temp_dir.path().join("latch.toml")).unwrap();
    assert_eq!(config, LatchConfig::default());
    assert_eq!(config.service, "latch");
    assert_eq!(config.accessibility, Accessibility::AfterFirstUnlockThisDeviceOnly);
  }

  #[test]
  fn loads_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("latch.toml");
    fs::write(
      &path,
      r#"
        service = "com.example.app"
        accessibility = "when-unlocked"
        backend = "file"
      "#,
    )
    .unwrap();

    let config = LatchConfig::load_from_path(&path).unwrap();
    assert_eq!(config.service, "com.example.app");
    assert_eq!(config.accessibility, Accessibility::WhenUnlocked);
    assert_eq!(config.backend, Backend::File);
    assert_eq!(config.access_group(), None);
  }

  #[test]
  fn rejects_unknown_accessibility() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("latch.toml");
    fs::write(&path, "accessibility = \"sometimes\"").unwrap();

    assert!(LatchConfig::load_from_path(&path).is_err());
  }

  #[test]
  fn rejects_directory_store_path() {
    let temp_dir = TempDir::new().unwrap();
    let config = LatchConfig {
      store_path: Some(temp_dir.path().to_path_buf()),
      ..LatchConfig::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::StorePathIsDirectory(_))));
  }

  #[test]
  fn empty_access_group_is_unset() {
    let config = LatchConfig {
      access_group: Some(String::new()),
      ..LatchConfig::default()
    };
    assert_eq!(config.access_group(), None);
  }

  #[test]
  fn toml_round_trip() {
    let config = LatchConfig {
      service: "svc".into(),
      access_group: Some("team".into()),
      accessibility: Accessibility::Always,
      backend: Backend::Keyring,
      store_path: None,
    };

    let rendered = config.to_toml().unwrap();
    let parsed: LatchConfig = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, config);
  }

  #[test]
  fn config_paths_live_in_project_dirs() {
    let dirs = ConfigDirs::new().unwrap();
    assert!(dirs.config_path().ends_with("latch.toml"));
    assert!(dirs.default_store_path().starts_with(&dirs.data_dir));
  }
}
