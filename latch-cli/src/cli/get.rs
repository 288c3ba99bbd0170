//! # Get Command
//!
//! Prints a stored value as text, or writes its raw bytes.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Args;

use super::CliContext;

/// Arguments for the get command
#[derive(Args)]
pub struct GetArgs {
  /// Key to look up
  pub key: String,

  /// Write the stored bytes without decoding them
  #[arg(long)]
  pub raw: bool,
}

pub(crate) fn handle_get_command(context: &CliContext, args: GetArgs) -> Result<()> {
  let latch = context.latch();

  let Some(bytes) = latch.try_get(&args.key)? else {
    bail!("No value stored for key '{}'", args.key);
  };

  if args.raw {
    let mut stdout = io::stdout().lock();
    stdout.write_all(&bytes).context("Failed to write value to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    return Ok(());
  }

  let text = String::from_utf8(bytes)
    .with_context(|| format!("Value for key '{}' is not valid UTF-8, use --raw to read it", args.key))?;
  println!("{text}");
  Ok(())
}
