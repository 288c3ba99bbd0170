//! In-memory secure store.

use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use super::{SecureStore, StoreError, StoreResult};
use crate::query::{Item, Query, Update};
use crate::status;

/// Process-local store backed by a `Vec` of records.
///
/// Behaves like the platform store for every primitive, which makes it the
/// fake of choice for tests. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
  items: Mutex<Vec<Item>>,
  reject_access_groups: bool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store that refuses to write records carrying an access group, the way
  /// unsigned simulator builds do.
  pub fn rejecting_access_groups() -> Self {
    Self {
      items: Mutex::default(),
      reject_access_groups: true,
    }
  }

  /// Number of records currently held.
  pub fn len(&self) -> usize {
    self.items().map(|items| items.len()).unwrap_or_default()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Copy of every record, for assertions.
  pub fn snapshot(&self) -> Vec<Item> {
    self.items().map(|items| items.clone()).unwrap_or_default()
  }

  fn items(&self) -> StoreResult<MutexGuard<'_, Vec<Item>>> {
    self
      .items
      .lock()
      .map_err(|_poisoned| StoreError::failure(status::IO, "memory store lock poisoned"))
  }

  fn check_group(&self, group: Option<&String>) -> StoreResult<()> {
    if self.reject_access_groups && group.is_some() {
      return Err(StoreError::status(status::NO_ACCESS_FOR_ITEM));
    }
    Ok(())
  }
}

impl SecureStore for MemoryStore {
  fn name(&self) -> &'static str {
    "memory"
  }

  fn find(&self, query: &Query) -> StoreResult<Vec<u8>> {
    let items = self.items()?;
    items
      .iter()
      .find(|item| query.matches(item))
      .map(|item| item.value.clone())
      .ok_or(StoreError::NotFound)
  }

  fn insert(&self, item: &Item) -> StoreResult<()> {
    self.check_group(item.access_group.as_ref())?;

    let mut items = self.items()?;
    if items.iter().any(|existing| existing.same_key(item)) {
      return Err(StoreError::status(status::DUPLICATE_ITEM));
    }

    trace!("memory store: inserting {:?}", item);
    items.push(item.clone());
    Ok(())
  }

  fn update(&self, query: &Query, update: &Update) -> StoreResult<()> {
    self.check_group(query.access_group.as_ref())?;

    let mut items = self.items()?;
    let mut updated = 0usize;
    for item in items.iter_mut().filter(|item| query.matches(item)) {
      item.apply(update);
      updated += 1;
    }

    trace!("memory store: updated {} record(s)", updated);
    if updated == 0 {
      return Err(StoreError::NotFound);
    }
    Ok(())
  }

  fn delete(&self, query: &Query) -> StoreResult<()> {
    let mut items = self.items()?;
    let before = items.len();
    items.retain(|item| !query.matches(item));

    trace!("memory store: deleted {} record(s)", before - items.len());
    if items.len() == before {
      return Err(StoreError::NotFound);
    }
    Ok(())
  }
}
