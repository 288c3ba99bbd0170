//! # Accessibility Policies
//!
//! Defines when a stored record may be unlocked for access and whether it
//! migrates to a new device with encrypted backups.
//!
//! A policy is attached to a record every time it is written. The facade never
//! reads it back; enforcement is left to the backing store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// When data protected by a policy can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnlockCondition {
  /// Readable regardless of the device lock state.
  Always,
  /// Readable once the device has been unlocked after a restart.
  AfterFirstUnlock,
  /// Readable only while the device is unlocked.
  WhenUnlocked,
}

/// Whether data follows the user to a new device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationScope {
  /// Never leaves this device; missing after a restore onto new hardware.
  ThisDeviceOnly,
  /// Migrates with encrypted backups and sync.
  Migratable,
}

/// Access restriction attached to a record at write time.
///
/// Each value is one point on the [`UnlockCondition`] x [`MigrationScope`]
/// grid.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
  /// Readable while unlocked. Migrates with encrypted backups.
  ///
  /// Suited to items only needed while the application is in the foreground.
  WhenUnlocked,
  /// Readable after the first unlock since boot. Migrates with encrypted
  /// backups.
  ///
  /// Suited to items needed by background work.
  AfterFirstUnlock,
  /// Always readable. Migrates with encrypted backups.
  ///
  /// Not recommended outside of system use.
  Always,
  /// Readable while unlocked. Never migrates.
  WhenUnlockedThisDeviceOnly,
  /// Readable after the first unlock since boot. Never migrates.
  #[default]
  AfterFirstUnlockThisDeviceOnly,
  /// Always readable. Never migrates.
  ///
  /// Not recommended outside of system use.
  AlwaysThisDeviceOnly,
}

impl Accessibility {
  /// Every policy, migratable variants first.
  pub const ALL: [Accessibility; 6] = [
    Accessibility::WhenUnlocked,
    Accessibility::AfterFirstUnlock,
    Accessibility::Always,
    Accessibility::WhenUnlockedThisDeviceOnly,
    Accessibility::AfterFirstUnlockThisDeviceOnly,
    Accessibility::AlwaysThisDeviceOnly,
  ];

  /// Build a policy from its two axes.
  pub const fn from_parts(condition: UnlockCondition, scope: MigrationScope) -> Self {
    match (condition, scope) {
      (UnlockCondition::WhenUnlocked, MigrationScope::Migratable) => Self::WhenUnlocked,
      (UnlockCondition::AfterFirstUnlock, MigrationScope::Migratable) => Self::AfterFirstUnlock,
      (UnlockCondition::Always, MigrationScope::Migratable) => Self::Always,
      (UnlockCondition::WhenUnlocked, MigrationScope::ThisDeviceOnly) => Self::WhenUnlockedThisDeviceOnly,
      (UnlockCondition::AfterFirstUnlock, MigrationScope::ThisDeviceOnly) => Self::AfterFirstUnlockThisDeviceOnly,
      (UnlockCondition::Always, MigrationScope::ThisDeviceOnly) => Self::AlwaysThisDeviceOnly,
    }
  }

  pub const fn unlock_condition(self) -> UnlockCondition {
    match self {
      Self::WhenUnlocked | Self::WhenUnlockedThisDeviceOnly => UnlockCondition::WhenUnlocked,
      Self::AfterFirstUnlock | Self::AfterFirstUnlockThisDeviceOnly => UnlockCondition::AfterFirstUnlock,
      Self::Always | Self::AlwaysThisDeviceOnly => UnlockCondition::Always,
    }
  }

  pub const fn migration_scope(self) -> MigrationScope {
    match self {
      Self::WhenUnlocked | Self::AfterFirstUnlock | Self::Always => MigrationScope::Migratable,
      Self::WhenUnlockedThisDeviceOnly | Self::AfterFirstUnlockThisDeviceOnly | Self::AlwaysThisDeviceOnly => {
        MigrationScope::ThisDeviceOnly
      }
    }
  }

  /// Stable kebab-case name used in config files and on the command line.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::WhenUnlocked => "when-unlocked",
      Self::AfterFirstUnlock => "after-first-unlock",
      Self::Always => "always",
      Self::WhenUnlockedThisDeviceOnly => "when-unlocked-this-device-only",
      Self::AfterFirstUnlockThisDeviceOnly => "after-first-unlock-this-device-only",
      Self::AlwaysThisDeviceOnly => "always-this-device-only",
    }
  }

  /// Name of the matching platform `kSecAttrAccessible` constant.
  pub const fn attribute_value(self) -> &'static str {
    match self {
      Self::WhenUnlocked => "kSecAttrAccessibleWhenUnlocked",
      Self::AfterFirstUnlock => "kSecAttrAccessibleAfterFirstUnlock",
      Self::Always => "kSecAttrAccessibleAlways",
      Self::WhenUnlockedThisDeviceOnly => "kSecAttrAccessibleWhenUnlockedThisDeviceOnly",
      Self::AfterFirstUnlockThisDeviceOnly => "kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly",
      Self::AlwaysThisDeviceOnly => "kSecAttrAccessibleAlwaysThisDeviceOnly",
    }
  }

  /// Inverse of [`Accessibility::attribute_value`].
  pub fn from_attribute_value(value: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|policy| policy.attribute_value() == value)
  }
}

impl fmt::Display for Accessibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Raised when a string names no known policy.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown accessibility policy '{0}'")]
pub struct ParseAccessibilityError(String);

impl FromStr for Accessibility {
  type Err = ParseAccessibilityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    Self::ALL
      .into_iter()
      .find(|policy| policy.as_str().eq_ignore_ascii_case(wanted))
      .or_else(|| Self::from_attribute_value(wanted))
      .ok_or_else(|| ParseAccessibilityError(s.to_string()))
  }
}
