//! # Latch
//!
//! Secure credential storage facade. Re-exports [`latch_core`] so
//! applications can depend on a single crate.

pub use latch_core::*;
