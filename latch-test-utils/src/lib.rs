//! Test utilities shared across the latch workspace
//!
//! This crate provides common testing infrastructure including:
//! - Temporary file-backed secure stores ([`TempStoreGuard`])
//! - Isolated XDG directories for spawned processes ([`XdgSandbox`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod env;
pub mod store;

// Re-export commonly used items
pub use env::XdgSandbox;
pub use store::TempStoreGuard;
