//! # Latch CLI
//!
//! Command-line front end for [`latch_core`]: argument parsing, the
//! `latch.toml` config layer and terminal output.

pub mod cli;
pub mod config;
pub mod output;
