//! Errors surfaced by the `try_*` operations on [`Latch`](crate::Latch).
//!
//! The plain operations collapse these into `false` / `None` after logging
//! them.

use std::fmt;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::store::StoreError;

/// Facade operation that talked to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Read,
  Insert,
  Update,
  Remove,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let verb = match self {
      Self::Read => "retrieve",
      Self::Insert | Self::Update => "set",
      Self::Remove => "remove",
    };
    f.write_str(verb)
  }
}

/// Broad category of a [`LatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The store rejected or failed the request.
  Store,
  /// The operation is not available on this target.
  Unsupported,
  /// The payload could not be encoded or decoded.
  Encoding,
}

#[derive(Debug, Error)]
pub enum LatchError {
  #[error("failed to {operation} data for key '{key}': {source}")]
  Store {
    operation: Operation,
    key: String,
    #[source]
    source: StoreError,
  },

  #[error("failed to reset secure store: {0}")]
  Reset(#[source] StoreError),

  #[error("bulk reset is not available on this target")]
  ResetUnavailable,

  #[error("failed to encode object: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("failed to decode object: {0}")]
  Decode(#[source] serde_json::Error),

  #[error("stored data is not valid UTF-8: {0}")]
  InvalidUtf8(#[from] FromUtf8Error),
}

impl LatchError {
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::Store { .. } | Self::Reset(_) => ErrorKind::Store,
      Self::ResetUnavailable => ErrorKind::Unsupported,
      Self::Encode(_) | Self::Decode(_) | Self::InvalidUtf8(_) => ErrorKind::Encoding,
    }
  }

  /// Status code reported by the store, if the store was involved.
  pub const fn status(&self) -> Option<i32> {
    match self {
      Self::Store { source, .. } | Self::Reset(source) => Some(source.code()),
      _ => None,
    }
  }

  pub(crate) fn store(operation: Operation, key: &str, source: StoreError) -> Self {
    Self::Store {
      operation,
      key: key.to_string(),
      source,
    }
  }
}
