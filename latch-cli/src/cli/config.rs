//! # Config Command
//!
//! Shows the settings latch will use after layering flags over `latch.toml`.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::CliContext;
use crate::config::Backend;
use crate::output::{format_path, print_info};

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: ConfigSubcommands,
}

/// Subcommands for the config command
#[derive(Subcommand)]
pub enum ConfigSubcommands {
  /// Print the effective configuration as TOML
  Show,
  /// Print the path of the config file
  Path,
}

pub(crate) fn handle_config_command(context: &CliContext, args: ConfigArgs) -> Result<()> {
  match args.subcommand {
    ConfigSubcommands::Show => {
      let mut config = context.config.clone();
      if config.backend == Backend::File {
        config.store_path = Some(context.store_path.clone());
      }
      print!("{}", config.to_toml()?);
    }
    ConfigSubcommands::Path => {
      if !context.config_path.exists() {
        print_info("Config file does not exist yet, defaults are in use");
      }
      println!("{}", format_path(&context.config_path.display().to_string()));
    }
  }
  Ok(())
}
