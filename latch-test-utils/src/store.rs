//! Temporary secure stores for testing

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use latch_core::{FileStore, Latch, TargetProfile};
use tempfile::TempDir;

/// RAII guard for a file-backed store living in a temporary directory
///
/// The directory, and every record in it, is removed when the guard drops.
pub struct TempStoreGuard {
  _temp_dir: TempDir,
  store: Arc<FileStore>,
}

impl TempStoreGuard {
  /// File name used for the store inside the temporary directory
  pub const FILE_NAME: &'static str = "store.json";

  pub fn new() -> Result<Self> {
    let temp_dir = TempDir::new().context("Failed to create temp directory")?;
    let store = Arc::new(FileStore::new(temp_dir.path().join(Self::FILE_NAME)));
    Ok(Self {
      _temp_dir: temp_dir,
      store,
    })
  }

  pub fn store(&self) -> Arc<FileStore> {
    Arc::clone(&self.store)
  }

  pub fn path(&self) -> PathBuf {
    self.store.path().to_path_buf()
  }

  /// A handle on this store with a desktop profile (no access groups, reset
  /// allowed), independent of the host target.
  pub fn latch(&self, service: &str) -> Latch {
    Latch::new(self.store(), service).with_profile(TargetProfile::new(false, true))
  }
}
