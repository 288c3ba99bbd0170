//! XDG directory isolation for testing
//!
//! Rather than overriding the XDG variables of the test process itself, which
//! leaks between tests running in parallel, [`XdgSandbox`] owns a temporary
//! tree and hands out the variables to set on spawned commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Temporary XDG base directories
pub struct XdgSandbox {
  /// The temporary directory holding config, data and cache trees
  temp_dir: TempDir,
}

impl XdgSandbox {
  /// XDG environment variable names
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";
  pub const XDG_DATA_HOME: &'static str = "XDG_DATA_HOME";
  pub const XDG_CACHE_HOME: &'static str = "XDG_CACHE_HOME";

  /// Create the sandbox and its config/data/cache directories
  pub fn new() -> Result<Self> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory")?;

    for sub in ["config", "data", "cache"] {
      fs::create_dir_all(temp_dir.path().join(sub)).with_context(|| format!("Failed to create {sub} directory"))?;
    }

    Ok(Self { temp_dir })
  }

  pub fn root(&self) -> &Path {
    self.temp_dir.path()
  }

  pub fn config_home(&self) -> PathBuf {
    self.root().join("config")
  }

  pub fn data_home(&self) -> PathBuf {
    self.root().join("data")
  }

  pub fn cache_home(&self) -> PathBuf {
    self.root().join("cache")
  }

  /// Variables pointing a child process at this sandbox
  pub fn envs(&self) -> [(&'static str, PathBuf); 4] {
    [
      (Self::XDG_CONFIG_HOME, self.config_home()),
      (Self::XDG_DATA_HOME, self.data_home()),
      (Self::XDG_CACHE_HOME, self.cache_home()),
      // macOS ignores XDG, keep HOME inside the sandbox too
      ("HOME", self.root().to_path_buf()),
    ]
  }

  /// Write `contents` to `relative` under the config home, creating parents
  pub fn write_config(&self, relative: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
    let path = self.config_home().join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn creates_base_directories() {
    let sandbox = XdgSandbox::new().unwrap();
    assert!(sandbox.config_home().is_dir());
    assert!(sandbox.data_home().is_dir());
    assert!(sandbox.cache_home().is_dir());

    for (_, path) in sandbox.envs() {
      assert!(path.starts_with(sandbox.root()));
    }
  }

  #[test]
  fn writes_nested_config() {
    let sandbox = XdgSandbox::new().unwrap();
    let path = sandbox.write_config("latch/latch.toml", "service = \"x\"").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "service = \"x\"");
  }
}
