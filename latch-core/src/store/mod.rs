//! # Secure Stores
//!
//! The collaborator a [`Latch`](crate::Latch) talks to. A store exposes four
//! primitives over attribute filters: find one, insert, update matching and
//! delete matching. Each call either succeeds, reports that nothing matched,
//! or fails with a numeric status code.
//!
//! Backends:
//! - [`MemoryStore`]: in-process fake, used by tests
//! - [`FileStore`]: JSON file with owner-only permissions
//! - [`KeyringStore`]: the OS credential store via the `keyring` crate

mod file;
mod memory;
mod os_keyring;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use os_keyring::KeyringStore;
use thiserror::Error;

use crate::query::{Item, Query, Update};
use crate::status;

/// Failure reported by a [`SecureStore`] primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
  /// No record matched the filter.
  #[error("item not found")]
  NotFound,
  /// Any other failure, with its platform status code.
  #[error("{message} (status {code})")]
  Failure { code: i32, message: String },
}

impl StoreError {
  /// Failure with the stock description for `code`.
  pub fn status(code: i32) -> Self {
    if code == status::ITEM_NOT_FOUND {
      return Self::NotFound;
    }
    Self::Failure {
      code,
      message: status::describe(code).to_string(),
    }
  }

  pub fn failure(code: i32, message: impl Into<String>) -> Self {
    Self::Failure {
      code,
      message: message.into(),
    }
  }

  /// Numeric status for this error.
  pub const fn code(&self) -> i32 {
    match self {
      Self::NotFound => status::ITEM_NOT_FOUND,
      Self::Failure { code, .. } => *code,
    }
  }

  pub const fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound)
  }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Secure key-value store addressed by composite attributes.
///
/// Implementations must make each primitive atomic on its own. Callers get no
/// guarantee across calls.
#[cfg_attr(test, mockall::automock)]
pub trait SecureStore: Send + Sync {
  /// Backend name for logs and diagnostics.
  fn name(&self) -> &'static str;

  /// Value of the first record matching `query`.
  fn find(&self, query: &Query) -> StoreResult<Vec<u8>>;

  /// Add a new record. Fails with [`status::DUPLICATE_ITEM`] when its composite
  /// key is taken.
  fn insert(&self, item: &Item) -> StoreResult<()>;

  /// Rewrite value and policy of every record matching `query`.
  fn update(&self, query: &Query, update: &Update) -> StoreResult<()>;

  /// Remove every record matching `query`.
  fn delete(&self, query: &Query) -> StoreResult<()>;
}
