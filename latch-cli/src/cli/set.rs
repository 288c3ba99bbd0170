//! # Set Command
//!
//! Stores a value from the command line or standard input.

use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use clap::Args;

use super::CliContext;
use crate::output::{format_key, print_success};

/// Arguments for the set command
#[derive(Args)]
pub struct SetArgs {
  /// Key to store the value under
  pub key: String,

  /// Value to store
  #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
  pub value: Option<String>,

  /// Read the value from standard input instead
  #[arg(long)]
  pub stdin: bool,
}

pub(crate) fn handle_set_command(context: &CliContext, args: SetArgs) -> Result<()> {
  let value = match (args.value, args.stdin) {
    (Some(value), false) => value.into_bytes(),
    (None, true) => {
      let mut buf = Vec::new();
      io::stdin()
        .read_to_end(&mut buf)
        .context("Failed to read value from stdin")?;
      buf
    }
    _ => bail!("Provide a value or --stdin, not both"),
  };

  context.latch().try_set(&value, &args.key)?;

  print_success(&format!("Stored value for {}", format_key(&args.key)));
  Ok(())
}
