//! OS credential store via the `keyring` crate.
//!
//! Uses the platform's native secret storage:
//! - macOS / iOS: Keychain
//! - Linux: kernel keyutils
//! - Windows: Credential Manager
//!
//! `keyring` addresses entries by service and user only, so the record class
//! and access group are not representable and the accessibility policy cannot
//! be set. Class-wide deletion is not available either.

use ::keyring::{Entry, Error as KeyringError};
use tracing::{debug, trace};

use super::{SecureStore, StoreError, StoreResult};
use crate::query::{Item, Query, Update};
use crate::status;

/// Store backed by the operating system's credential manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
  pub const fn new() -> Self {
    Self
  }

  fn entry(query: &Query) -> StoreResult<Entry> {
    let Some(account) = query.account.as_deref() else {
      return Err(StoreError::failure(
        status::PARAM,
        "keyring entries can only be addressed by account",
      ));
    };
    if let Some(group) = &query.access_group {
      trace!("keyring store ignores access group '{}'", group);
    }

    let service = query.service.as_deref().unwrap_or_default();
    Entry::new(service, account).map_err(map_keyring_error)
  }
}

fn map_keyring_error(err: KeyringError) -> StoreError {
  match err {
    KeyringError::NoEntry => StoreError::NotFound,
    KeyringError::NoStorageAccess(e) => {
      StoreError::failure(status::NO_ACCESS_FOR_ITEM, format!("no access to secure storage: {e}"))
    }
    KeyringError::BadEncoding(_) => StoreError::status(status::DECODE),
    KeyringError::TooLong(attr, limit) => {
      StoreError::failure(status::PARAM, format!("{attr} exceeds the platform limit of {limit}"))
    }
    KeyringError::Invalid(attr, reason) => StoreError::failure(status::PARAM, format!("invalid {attr}: {reason}")),
    other => StoreError::failure(status::IO, format!("secure storage error: {other}")),
  }
}

impl SecureStore for KeyringStore {
  fn name(&self) -> &'static str {
    "keyring"
  }

  fn find(&self, query: &Query) -> StoreResult<Vec<u8>> {
    Self::entry(query)?.get_secret().map_err(map_keyring_error)
  }

  fn insert(&self, item: &Item) -> StoreResult<()> {
    let entry = Self::entry(&item.key_query())?;
    match entry.get_secret() {
      Ok(_) => return Err(StoreError::status(status::DUPLICATE_ITEM)),
      Err(KeyringError::NoEntry) => {}
      Err(e) => return Err(map_keyring_error(e)),
    }

    trace!(
      "keyring store cannot apply accessibility '{}', using platform default",
      item.accessibility
    );
    entry.set_secret(&item.value).map_err(map_keyring_error)
  }

  fn update(&self, query: &Query, update: &Update) -> StoreResult<()> {
    let entry = Self::entry(query)?;
    entry.get_secret().map_err(map_keyring_error)?;

    trace!(
      "keyring store cannot apply accessibility '{}', using platform default",
      update.accessibility
    );
    entry.set_secret(&update.value).map_err(map_keyring_error)
  }

  fn delete(&self, query: &Query) -> StoreResult<()> {
    if query.account.is_none() {
      debug!("keyring store cannot delete records without an account");
      return Err(StoreError::failure(
        status::UNIMPLEMENTED,
        "class-wide deletion is not supported by the OS keyring",
      ));
    }
    Self::entry(query)?.delete_credential().map_err(map_keyring_error)
  }
}
