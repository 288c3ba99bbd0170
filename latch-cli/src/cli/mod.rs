//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for the latch tool.

mod config;
mod get;
mod remove;
mod reset;
mod set;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Args, Parser, Subcommand};
use latch_core::{Accessibility, FileStore, KeyringStore, Latch, SecureStore};
use tracing::debug;

use crate::config::{Backend, ConfigDirs, LatchConfig};
use crate::output::ColorMode;

/// Top-level CLI command for the latch tool
#[derive(Parser)]
#[command(name = "latch")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Store and retrieve secrets in a secure credential store")]
#[command(
  long_about = "Latch reads and writes secrets in a secure credential store.\n\n\
        Records are scoped by a service namespace and, on targets that support it,\n\
        an access group. Every write carries an accessibility policy that controls\n\
        when the record may be unlocked."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    global = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  #[command(flatten)]
  pub store_args: StoreArgs,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Options selecting the store and scoping records, layered over `latch.toml`
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
  /// Path to the config file
  #[arg(long, global = true, value_name = "PATH")]
  pub config: Option<PathBuf>,

  /// Secure store backend
  #[arg(long, global = true, value_enum)]
  pub backend: Option<Backend>,

  /// Location of the file store
  #[arg(long, global = true, value_name = "PATH")]
  pub store: Option<PathBuf>,

  /// Service namespace for records
  #[arg(long, global = true)]
  pub service: Option<String>,

  /// Access group for sharing records across applications
  #[arg(long, global = true)]
  pub access_group: Option<String>,

  /// Accessibility policy applied to written records
  #[arg(long, global = true, value_enum)]
  pub accessibility: Option<Accessibility>,
}

/// Subcommands for the latch tool
#[derive(Subcommand)]
pub enum Commands {
  /// Print the value stored for a key
  #[command(long_about = "Prints the value stored for a key.\n\n\
            The value is printed as UTF-8 text. Use --raw to write the stored bytes\n\
            unchanged, for binary secrets or archived objects.")]
  Get(get::GetArgs),

  /// Store a value for a key
  #[command(long_about = "Stores a value for a key, replacing any existing value.\n\n\
            The value is taken from the command line, or from standard input with\n\
            --stdin. An existing record also picks up the current accessibility policy.")]
  Set(set::SetArgs),

  /// Remove the value stored for a key
  #[command(alias = "rm")]
  Remove(remove::RemoveArgs),

  /// Delete every record in the store
  #[command(long_about = "Deletes every generic secret in the store.\n\n\
            This is not limited to the configured service: records written by other\n\
            services and applications sharing the store are deleted as well. Requires\n\
            --yes, and is unavailable on mobile targets.")]
  Reset(reset::ResetArgs),

  /// Inspect the effective configuration
  #[command(arg_required_else_help = true)]
  Config(config::ConfigArgs),
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  cli.colors.apply();

  let context = CliContext::resolve(&cli.store_args)?;
  debug!(
    "Using {:?} backend for service '{}'",
    context.config.backend, context.config.service
  );

  match cli.command {
    Commands::Get(args) => get::handle_get_command(&context, args),
    Commands::Set(args) => set::handle_set_command(&context, args),
    Commands::Remove(args) => remove::handle_remove_command(&context, args),
    Commands::Reset(args) => reset::handle_reset_command(&context, args),
    Commands::Config(args) => config::handle_config_command(&context, args),
  }
}

/// Effective settings after layering command-line flags over the config file
pub struct CliContext {
  pub config_path: PathBuf,
  pub config: LatchConfig,
  pub store_path: PathBuf,
}

impl CliContext {
  pub fn resolve(args: &StoreArgs) -> Result<Self> {
    let dirs = ConfigDirs::new()?;
    let config_path = args.config.clone().unwrap_or_else(|| dirs.config_path());

    let mut config = LatchConfig::load_from_path(&config_path)?;
    if let Some(backend) = args.backend {
      config.backend = backend;
    }
    if let Some(store) = &args.store {
      config.store_path = Some(store.clone());
    }
    if let Some(service) = &args.service {
      config.service.clone_from(service);
    }
    if let Some(group) = &args.access_group {
      config.access_group = Some(group.clone());
    }
    if let Some(accessibility) = args.accessibility {
      config.accessibility = accessibility;
    }
    config.validate()?;

    let store_path = config
      .store_path
      .clone()
      .unwrap_or_else(|| dirs.default_store_path());

    Ok(Self {
      config_path,
      config,
      store_path,
    })
  }

  /// Build the secure store the config selects
  pub fn store(&self) -> Arc<dyn SecureStore> {
    match self.config.backend {
      Backend::File => Arc::new(FileStore::new(&self.store_path)),
      Backend::Keyring => Arc::new(KeyringStore::new()),
    }
  }

  /// Build a handle scoped by the config
  pub fn latch(&self) -> Latch {
    let mut latch =
      Latch::new(self.store(), self.config.service.as_str()).with_accessibility(self.config.accessibility);
    if let Some(group) = self.config.access_group() {
      latch = latch.with_access_group(group);
    }
    latch
  }
}
