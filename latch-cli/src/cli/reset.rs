//! # Reset Command
//!
//! Bulk deletion of every generic secret in the selected store.

use anyhow::{Result, bail};
use clap::Args;
use latch_core::{LatchError, status};

use super::CliContext;
use crate::output::{print_info, print_success};

/// Arguments for the reset command
#[derive(Args)]
pub struct ResetArgs {
  /// Confirm deletion of every record in the store
  #[arg(long)]
  pub yes: bool,
}

pub(crate) fn handle_reset_command(context: &CliContext, args: ResetArgs) -> Result<()> {
  if !args.yes {
    bail!("Refusing to reset without --yes: every record in the store would be deleted, not just this service's");
  }

  match context.latch().try_reset_all() {
    Ok(()) => {
      print_success("Store reset");
      Ok(())
    }
    Err(LatchError::Reset(e)) if e.code() == status::ITEM_NOT_FOUND => {
      print_info("Store was already empty");
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}
