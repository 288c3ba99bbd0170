//! # Latch Core Library
//!
//! A small facade over secure credential stores. A [`Latch`] handle maps
//! logical keys to secrets (raw bytes, UTF-8 strings or archived objects)
//! inside an injected [`SecureStore`], scoped by a service namespace and an
//! optional access group, and tags every write with an [`Accessibility`]
//! policy.
//!
//! ```
//! use std::sync::Arc;
//!
//! use latch_core::{Latch, MemoryStore};
//!
//! let latch = Latch::new(Arc::new(MemoryStore::new()), "com.example.app");
//! assert!(latch.set_string("hunter2", "password"));
//! assert_eq!(latch.get_string("password").as_deref(), Some("hunter2"));
//! assert!(latch.remove("password"));
//! ```

pub mod accessibility;
pub mod archive;
pub mod error;
pub mod latch;
pub mod profile;
pub mod query;
pub mod status;
pub mod store;

// Re-export main types
pub use accessibility::{Accessibility, MigrationScope, UnlockCondition};
pub use error::{ErrorKind, LatchError, Operation};
pub use latch::Latch;
pub use profile::TargetProfile;
pub use query::{Item, ItemClass, Query, Update};
pub use store::{FileStore, KeyringStore, MemoryStore, SecureStore, StoreError, StoreResult};
