//! # Target Profiles
//!
//! Capability flags that depend on the build target, resolved once when a
//! [`Latch`](crate::Latch) is created instead of being compiled in and out.

/// Platform capabilities affecting how queries are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetProfile {
  /// Include the access group attribute in queries and records.
  ///
  /// Only signed device builds have an access group to check. Unsigned
  /// simulator builds reject any record carrying one with
  /// [`NO_ACCESS_FOR_ITEM`](crate::status::NO_ACCESS_FOR_ITEM).
  pub access_groups: bool,
  /// Allow [`Latch::reset_all`](crate::Latch::reset_all).
  pub bulk_reset: bool,
}

impl TargetProfile {
  pub const fn new(access_groups: bool, bulk_reset: bool) -> Self {
    Self {
      access_groups,
      bulk_reset,
    }
  }

  /// Profile for the target this crate was compiled for.
  pub const fn current() -> Self {
    Self {
      access_groups: cfg!(all(target_os = "ios", not(target_abi = "sim"))),
      bulk_reset: !cfg!(any(
        target_os = "ios",
        target_os = "tvos",
        target_os = "watchos",
        target_os = "visionos"
      )),
    }
  }
}

impl Default for TargetProfile {
  fn default() -> Self {
    Self::current()
  }
}
