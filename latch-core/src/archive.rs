//! Encoding for structured objects stored through
//! [`Latch::set_object`](crate::Latch::set_object).
//!
//! Objects are archived as compact JSON. Encoding the same value twice yields
//! the same bytes as long as its `Serialize` impl is deterministic (ordered
//! maps, structs).

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LatchError;

/// Encode `value` into archive bytes.
pub fn archive<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, LatchError> {
  serde_json::to_vec(value).map_err(LatchError::Encode)
}

/// Decode archive bytes produced by [`archive`].
pub fn unarchive<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LatchError> {
  serde_json::from_slice(bytes).map_err(LatchError::Decode)
}
