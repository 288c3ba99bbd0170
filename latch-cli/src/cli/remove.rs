//! # Remove Command

use anyhow::Result;
use clap::Args;

use super::CliContext;
use crate::output::{format_key, print_success, print_warning};

/// Arguments for the remove command
#[derive(Args)]
pub struct RemoveArgs {
  /// Key to remove
  pub key: String,
}

pub(crate) fn handle_remove_command(context: &CliContext, args: RemoveArgs) -> Result<()> {
  if context.latch().try_remove(&args.key)? {
    print_success(&format!("Removed {}", format_key(&args.key)));
  } else {
    print_warning(&format!("Nothing stored for {}", format_key(&args.key)));
  }
  Ok(())
}
