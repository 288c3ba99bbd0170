//! File-backed secure store.
//!
//! Records live in a single JSON document. Every mutation rewrites the whole
//! file through a uniquely named temporary sibling that is then renamed into
//! place, and the result is limited to owner read/write on Unix.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use super::{SecureStore, StoreError, StoreResult};
use crate::query::{Item, Query, Update};
use crate::status;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
  #[serde(default = "default_version")]
  version: u32,
  #[serde(default)]
  items: Vec<Item>,
}

const fn default_version() -> u32 {
  FORMAT_VERSION
}

/// Store persisting records to a JSON file.
///
/// Calls through one instance are serialized. Separate instances on the same
/// file, in this process or another, never corrupt it but can lose each
/// other's writes.
#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
  lock: Mutex<()>,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      lock: Mutex::new(()),
    }
  }

  /// Location of the backing file.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Run `f` over the loaded document, holding the in-process lock.
  fn with_document<T>(&self, f: impl FnOnce(&mut StoreDocument) -> StoreResult<(T, bool)>) -> StoreResult<T> {
    let _guard = self
      .lock
      .lock()
      .map_err(|_poisoned| StoreError::failure(status::IO, "file store lock poisoned"))?;

    let mut document = self.load()?;
    let (result, dirty) = f(&mut document)?;
    if dirty {
      self.save(&document)?;
    }
    Ok(result)
  }

  fn load(&self) -> StoreResult<StoreDocument> {
    let contents = match fs::read(&self.path) {
      Ok(contents) => contents,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        trace!("file store {} does not exist yet", self.path.display());
        return Ok(StoreDocument::default());
      }
      Err(e) => return Err(io_failure("read", &self.path, &e)),
    };

    if contents.iter().all(u8::is_ascii_whitespace) {
      return Ok(StoreDocument::default());
    }

    serde_json::from_slice(&contents).map_err(|e| {
      StoreError::failure(
        status::DECODE,
        format!("failed to parse store file {}: {e}", self.path.display()),
      )
    })
  }

  fn save(&self, document: &StoreDocument) -> StoreResult<()> {
    let dir = self
      .path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| io_failure("create directory for", &self.path, &e))?;

    let contents = serde_json::to_vec_pretty(document)
      .map_err(|e| StoreError::failure(status::DECODE, format!("failed to encode store file: {e}")))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_failure("create temporary file in", dir, &e))?;
    write_private(tmp.as_file_mut(), &contents).map_err(|e| io_failure("write", tmp.path(), &e))?;
    tmp
      .persist(&self.path)
      .map_err(|e| io_failure("replace", &self.path, &e.error))?;

    debug!("saved {} record(s) to {}", document.items.len(), self.path.display());
    Ok(())
  }
}

fn io_failure(action: &str, path: &Path, err: &io::Error) -> StoreError {
  StoreError::failure(status::IO, format!("failed to {action} {}: {err}", path.display()))
}

fn write_private(file: &mut fs::File, contents: &[u8]) -> io::Result<()> {
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?; // Owner read/write only
  }
  file.write_all(contents)?;
  file.sync_all()
}

impl SecureStore for FileStore {
  fn name(&self) -> &'static str {
    "file"
  }

  fn find(&self, query: &Query) -> StoreResult<Vec<u8>> {
    self.with_document(|doc| {
      let value = doc
        .items
        .iter()
        .find(|item| query.matches(item))
        .map(|item| item.value.clone())
        .ok_or(StoreError::NotFound)?;
      Ok((value, false))
    })
  }

  fn insert(&self, item: &Item) -> StoreResult<()> {
    self.with_document(|doc| {
      if doc.items.iter().any(|existing| existing.same_key(item)) {
        return Err(StoreError::status(status::DUPLICATE_ITEM));
      }
      doc.items.push(item.clone());
      Ok(((), true))
    })
  }

  fn update(&self, query: &Query, update: &Update) -> StoreResult<()> {
    self.with_document(|doc| {
      let mut matched = false;
      for item in doc.items.iter_mut().filter(|item| query.matches(item)) {
        item.apply(update);
        matched = true;
      }
      if !matched {
        return Err(StoreError::NotFound);
      }
      Ok(((), true))
    })
  }

  fn delete(&self, query: &Query) -> StoreResult<()> {
    self.with_document(|doc| {
      let before = doc.items.len();
      doc.items.retain(|item| !query.matches(item));
      if doc.items.len() == before {
        return Err(StoreError::NotFound);
      }
      Ok(((), true))
    })
  }
}
