//! # Composite Keys
//!
//! Attribute filters and records exchanged with a [`SecureStore`].
//!
//! A record is identified by its class, service, account and optional access
//! group. A [`Query`] names a subset of those attributes; every attribute it
//! carries must match, and attributes it leaves out match anything.
//!
//! [`SecureStore`]: crate::store::SecureStore

use serde::{Deserialize, Serialize};

use crate::accessibility::Accessibility;

/// Record class. Only generic secrets are stored by latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemClass {
  #[default]
  GenericPassword,
}

/// Attribute filter over stored records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
  pub class: ItemClass,
  pub service: Option<String>,
  pub account: Option<String>,
  pub access_group: Option<String>,
}

impl Query {
  /// Filter matching every record of a class.
  pub fn class(class: ItemClass) -> Self {
    Self {
      class,
      ..Self::default()
    }
  }

  pub fn with_service(mut self, service: impl Into<String>) -> Self {
    self.service = Some(service.into());
    self
  }

  pub fn with_account(mut self, account: impl Into<String>) -> Self {
    self.account = Some(account.into());
    self
  }

  pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
    self.access_group = Some(group.into());
    self
  }

  /// True when every attribute present in the filter equals the record's.
  pub fn matches(&self, item: &Item) -> bool {
    fn attr_matches(wanted: Option<&String>, actual: Option<&String>) -> bool {
      wanted.is_none_or(|w| actual == Some(w))
    }

    self.class == item.class
      && attr_matches(self.service.as_ref(), item.service.as_ref())
      && attr_matches(self.account.as_ref(), Some(&item.account))
      && attr_matches(self.access_group.as_ref(), item.access_group.as_ref())
  }

  /// Combine the filter with a value and policy into a full record.
  ///
  /// Returns `None` when the filter names no account.
  pub fn into_item(self, value: Vec<u8>, accessibility: Accessibility) -> Option<Item> {
    let account = self.account?;
    Some(Item {
      class: self.class,
      service: self.service,
      account,
      access_group: self.access_group,
      accessibility,
      value,
    })
  }
}

/// A full stored record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub class: ItemClass,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub service: Option<String>,
  pub account: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub access_group: Option<String>,
  pub accessibility: Accessibility,
  #[serde(with = "base64_bytes")]
  pub value: Vec<u8>,
}

impl Item {
  /// True when both records occupy the same composite key.
  pub fn same_key(&self, other: &Item) -> bool {
    self.class == other.class
      && self.service == other.service
      && self.account == other.account
      && self.access_group == other.access_group
  }

  /// Filter matching exactly this record's composite key.
  pub fn key_query(&self) -> Query {
    Query {
      class: self.class,
      service: self.service.clone(),
      account: Some(self.account.clone()),
      access_group: self.access_group.clone(),
    }
  }

  /// Overwrite value and policy in place.
  pub fn apply(&mut self, update: &Update) {
    self.value.clone_from(&update.value);
    self.accessibility = update.accessibility;
  }
}

// Secret values stay out of debug output.
impl std::fmt::Debug for Item {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Item")
      .field("class", &self.class)
      .field("service", &self.service)
      .field("account", &self.account)
      .field("access_group", &self.access_group)
      .field("accessibility", &self.accessibility)
      .field("value", &format_args!("<{} bytes>", self.value.len()))
      .finish()
  }
}

/// Fields rewritten when an existing record is updated.
#[derive(Clone, PartialEq, Eq)]
pub struct Update {
  pub value: Vec<u8>,
  pub accessibility: Accessibility,
}

impl std::fmt::Debug for Update {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Update")
      .field("accessibility", &self.accessibility)
      .field("value", &format_args!("<{} bytes>", self.value.len()))
      .finish()
  }
}

mod base64_bytes {
  use base64::Engine;
  use base64::engine::general_purpose::STANDARD;
  use serde::{Deserialize, Deserializer, Serializer};

  pub(super) fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(value))
  }

  pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
  }
}
