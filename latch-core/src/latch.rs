//! # Credential Store Facade
//!
//! [`Latch`] maps a logical key to an opaque secret inside a [`SecureStore`],
//! scoped by a service namespace and, where the target supports it, an access
//! group.
//!
//! Two surfaces are offered over the same logic:
//! - `get` / `set` / `remove` / `reset_all` never fail loudly. Errors are
//!   logged and collapse to `None` or `false`.
//! - `try_*` variants return [`LatchError`] so callers can tell a missing key
//!   from a store that refused the request.
//!
//! Writes and removals are read-then-act. The read and the follow-up call are
//! separate store requests, so two callers racing on the same key can
//! interleave between them (for example both inserting, with one failing as a
//! duplicate). Nothing here guards against that.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::accessibility::Accessibility;
use crate::archive::{archive, unarchive};
use crate::error::{LatchError, Operation};
use crate::profile::TargetProfile;
use crate::query::{ItemClass, Query, Update};
use crate::status;
use crate::store::{SecureStore, StoreError};

/// Handle onto a secure store for one service namespace.
///
/// Handles hold configuration only. Any number of handles with the same
/// service and access group see the same records.
#[derive(Clone)]
pub struct Latch {
  store: Arc<dyn SecureStore>,
  service: String,
  access_group: Option<String>,
  accessibility: Accessibility,
  profile: TargetProfile,
}

impl fmt::Debug for Latch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Latch")
      .field("store", &self.store.name())
      .field("service", &self.service)
      .field("access_group", &self.access_group)
      .field("accessibility", &self.accessibility)
      .field("profile", &self.profile)
      .finish()
  }
}

impl Latch {
  /// Create a handle for `service` with the default accessibility and the
  /// current target's profile.
  pub fn new(store: Arc<dyn SecureStore>, service: impl Into<String>) -> Self {
    Self {
      store,
      service: service.into(),
      access_group: None,
      accessibility: Accessibility::default(),
      profile: TargetProfile::current(),
    }
  }

  /// Share records with other applications in `group`.
  ///
  /// Ignored unless the profile enables access groups.
  pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
    self.access_group = Some(group.into());
    self
  }

  /// Policy applied to every record this handle writes.
  pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
    self.accessibility = accessibility;
    self
  }

  pub fn with_profile(mut self, profile: TargetProfile) -> Self {
    self.profile = profile;
    self
  }

  pub fn service(&self) -> &str {
    &self.service
  }

  pub fn access_group(&self) -> Option<&str> {
    self.access_group.as_deref()
  }

  pub const fn accessibility(&self) -> Accessibility {
    self.accessibility
  }

  pub const fn profile(&self) -> TargetProfile {
    self.profile
  }

  pub fn store_name(&self) -> &'static str {
    self.store.name()
  }

  // Getters

  /// Bytes stored for `key`, or `None` when absent or unreadable.
  pub fn get(&self, key: &str) -> Option<Vec<u8>> {
    self.try_get(key).unwrap_or_else(|e| {
      warn!("Latch {e}");
      None
    })
  }

  /// Bytes stored for `key`. A missing key is `Ok(None)`.
  pub fn try_get(&self, key: &str) -> Result<Option<Vec<u8>>, LatchError> {
    match self.store.find(&self.base_query(key)) {
      Ok(value) => Ok(Some(value)),
      Err(StoreError::NotFound) => Ok(None),
      Err(e) => Err(LatchError::store(Operation::Read, key, e)),
    }
  }

  /// UTF-8 string stored for `key`. `None` when absent or not valid UTF-8.
  pub fn get_string(&self, key: &str) -> Option<String> {
    self.try_get_string(key).unwrap_or_else(|e| {
      warn!("Latch {e}");
      None
    })
  }

  pub fn try_get_string(&self, key: &str) -> Result<Option<String>, LatchError> {
    self
      .try_get(key)?
      .map(|bytes| String::from_utf8(bytes).map_err(LatchError::from))
      .transpose()
  }

  /// Structured object archived for `key` with [`Latch::set_object`].
  pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    self.try_get_object(key).unwrap_or_else(|e| {
      warn!("Latch {e}");
      None
    })
  }

  pub fn try_get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LatchError> {
    self.try_get(key)?.map(|bytes| unarchive(&bytes)).transpose()
  }

  // Setters

  /// Store `value` under `key`, replacing any existing value.
  ///
  /// Returns `false` if the store rejected the write.
  pub fn set(&self, value: &[u8], key: &str) -> bool {
    match self.try_set(value, key) {
      Ok(()) => true,
      Err(e) => {
        warn!("Latch {e}");
        false
      }
    }
  }

  /// Upsert `value` under `key`.
  ///
  /// An existing record is updated in place and picks up this handle's
  /// accessibility. Otherwise a new record is inserted. A failed existence
  /// check is logged and treated as absent, so the insert still goes to the
  /// store and its status decides the outcome. Not atomic, see the module
  /// docs.
  pub fn try_set(&self, value: &[u8], key: &str) -> Result<(), LatchError> {
    let exists = match self.try_get(key) {
      Ok(existing) => existing.is_some(),
      Err(e) => {
        warn!("Latch {e}");
        false
      }
    };

    if exists {
      let update = Update {
        value: value.to_vec(),
        accessibility: self.accessibility,
      };
      debug!("updating existing record for '{}'", key);
      self
        .store
        .update(&self.base_query(key), &update)
        .map_err(|e| LatchError::store(Operation::Update, key, e))
    } else {
      debug!("inserting new record for '{}'", key);
      let item = self
        .base_query(key)
        .into_item(value.to_vec(), self.accessibility)
        .ok_or_else(|| LatchError::store(Operation::Insert, key, StoreError::status(status::PARAM)))?;
      self
        .store
        .insert(&item)
        .map_err(|e| LatchError::store(Operation::Insert, key, e))
    }
  }

  pub fn set_string(&self, value: &str, key: &str) -> bool {
    self.set(value.as_bytes(), key)
  }

  pub fn try_set_string(&self, value: &str, key: &str) -> Result<(), LatchError> {
    self.try_set(value.as_bytes(), key)
  }

  /// Archive `value` and store it under `key`.
  pub fn set_object<T: Serialize + ?Sized>(&self, value: &T, key: &str) -> bool {
    match self.try_set_object(value, key) {
      Ok(()) => true,
      Err(e) => {
        warn!("Latch {e}");
        false
      }
    }
  }

  pub fn try_set_object<T: Serialize + ?Sized>(&self, value: &T, key: &str) -> Result<(), LatchError> {
    let bytes = archive(value)?;
    self.try_set(&bytes, key)
  }

  // Removal

  /// Remove `key`. Returns `false` if it was not present or the store refused.
  pub fn remove(&self, key: &str) -> bool {
    self.try_remove(key).unwrap_or_else(|e| {
      warn!("Latch {e}");
      false
    })
  }

  /// Remove `key`. `Ok(false)` when there was nothing to remove.
  pub fn try_remove(&self, key: &str) -> Result<bool, LatchError> {
    if self.try_get(key)?.is_none() {
      debug!("nothing stored for '{}', skipping removal", key);
      return Ok(false);
    }

    self
      .store
      .delete(&self.base_query(key))
      .map_err(|e| LatchError::store(Operation::Remove, key, e))?;
    Ok(true)
  }

  /// Delete every generic-secret record in the store.
  ///
  /// This is not limited to this handle's service or access group: records
  /// written by any handle on the same store are removed.
  pub fn reset_all(&self) -> bool {
    match self.try_reset_all() {
      Ok(()) => true,
      Err(e) => {
        warn!("Latch {e}");
        false
      }
    }
  }

  pub fn try_reset_all(&self) -> Result<(), LatchError> {
    if !self.profile.bulk_reset {
      return Err(LatchError::ResetUnavailable);
    }

    self
      .store
      .delete(&Query::class(ItemClass::GenericPassword))
      .map_err(LatchError::Reset)
  }

  // Queries

  fn base_query(&self, key: &str) -> Query {
    let mut query = Query::class(ItemClass::GenericPassword).with_account(key);
    if !self.service.is_empty() {
      query = query.with_service(self.service.as_str());
    }
    if let Some(group) = self.effective_access_group() {
      query = query.with_access_group(group);
    }
    query
  }

  fn effective_access_group(&self) -> Option<&str> {
    if !self.profile.access_groups {
      return None;
    }
    self.access_group.as_deref().filter(|group| !group.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use mockall::predicate::always;

  use super::*;
  use crate::error::ErrorKind;
  use crate::store::{MemoryStore, MockSecureStore};

  const SERVICE: &str = "co.rocketapps.latch.tests";

  fn latch_with(store: &Arc<MemoryStore>) -> Latch {
    Latch::new(store.clone(), SERVICE).with_profile(TargetProfile::new(false, true))
  }

  fn fresh() -> (Arc<MemoryStore>, Latch) {
    let store = Arc::new(MemoryStore::new());
    let latch = latch_with(&store);
    (store, latch)
  }

  #[test]
  fn construction_captures_configuration() {
    let latch = Latch::new(Arc::new(MemoryStore::new()), "svc")
      .with_access_group("group")
      .with_accessibility(Accessibility::WhenUnlocked);

    assert_eq!(latch.service(), "svc");
    assert_eq!(latch.access_group(), Some("group"));
    assert_eq!(latch.accessibility(), Accessibility::WhenUnlocked);
    assert_eq!(latch.profile(), TargetProfile::current());
    assert_eq!(latch.store_name(), "memory");
  }

  #[test]
  fn default_accessibility_is_after_first_unlock_this_device_only() {
    let (_, latch) = fresh();
    assert_eq!(latch.accessibility(), Accessibility::AfterFirstUnlockThisDeviceOnly);
  }

  #[test]
  fn unset_key_reads_as_none() {
    let (_, latch) = fresh();
    assert_eq!(latch.get("test_can_read_nil_data_for_unset_key"), None);
    assert_eq!(latch.try_get("missing").unwrap(), None);
  }

  #[test]
  fn bytes_round_trip() {
    let (_, latch) = fresh();
    let payload = b"Hello, world.".to_vec();

    assert!(latch.set(&payload, "bytes"));
    assert_eq!(latch.get("bytes"), Some(payload));
  }

  #[test]
  fn string_round_trip() {
    let (_, latch) = fresh();

    assert!(latch.set_string("Hello, world.", "string"));
    assert_eq!(latch.get_string("string").as_deref(), Some("Hello, world."));
    assert_eq!(latch.get("string"), Some(b"Hello, world.".to_vec()));
  }

  #[test]
  fn invalid_utf8_reads_as_bytes_only() {
    let (_, latch) = fresh();
    let payload = vec![0x48, 0xff, 0xfe, 0x00];

    assert!(latch.set(&payload, "binary"));
    assert_eq!(latch.get_string("binary"), None);
    assert_eq!(latch.get("binary"), Some(payload));
    assert_eq!(latch.try_get_string("binary").unwrap_err().kind(), ErrorKind::Encoding);
  }

  #[test]
  fn object_bytes_match_independent_archive() {
    let (_, latch) = fresh();
    let object = BTreeMap::from([("hello".to_string(), "world".to_string())]);

    assert!(latch.set_object(&object, "object"));
    assert_eq!(latch.get("object"), Some(archive(&object).unwrap()));

    let decoded: Option<BTreeMap<String, String>> = latch.get_object("object");
    assert_eq!(decoded, Some(object));
  }

  #[test]
  fn second_write_overwrites() {
    let (store, latch) = fresh();

    assert!(latch.set_string("Hello, world.", "update"));
    assert!(latch.set_string("World, Hello.", "update"));

    assert_eq!(latch.get_string("update").as_deref(), Some("World, Hello."));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn update_refreshes_accessibility() {
    let (store, latch) = fresh();
    assert!(latch.set_string("one", "policy"));

    let stricter = latch.clone().with_accessibility(Accessibility::WhenUnlockedThisDeviceOnly);
    assert!(stricter.set_string("two", "policy"));

    let records = store.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].accessibility, Accessibility::WhenUnlockedThisDeviceOnly);
  }

  #[test]
  fn remove_clears_and_is_idempotent() {
    let (_, latch) = fresh();
    assert!(latch.set_string("Hello, world.", "remove"));

    assert!(latch.remove("remove"));
    assert_eq!(latch.get("remove"), None);
    assert!(!latch.remove("remove"));
    assert!(!latch.try_remove("remove").unwrap());
  }

  #[test]
  fn reset_clears_every_key() {
    let (store, latch) = fresh();
    let values = [
      ("key1", "value"),
      ("key2", "yet another value"),
      ("key3", "some other value"),
    ];
    for (key, value) in values {
      assert!(latch.set_string(value, key));
    }

    assert!(latch.reset_all());

    for (key, _) in values {
      assert_eq!(latch.get(key), None);
    }
    assert!(store.is_empty());
  }

  #[test]
  fn reset_ignores_service_scope() {
    let (store, latch) = fresh();
    let other = Latch::new(store.clone(), "some.other.service").with_profile(latch.profile());

    assert!(other.set_string("theirs", "shared"));
    assert!(latch.set_string("ours", "shared"));
    assert_eq!(store.len(), 2);

    assert!(latch.reset_all());
    assert_eq!(other.get("shared"), None);
  }

  #[test]
  fn reset_on_empty_store_reports_not_found() {
    let (_, latch) = fresh();
    assert!(!latch.reset_all());
    assert_eq!(latch.try_reset_all().unwrap_err().status(), Some(status::ITEM_NOT_FOUND));
  }

  #[test]
  fn reset_is_refused_when_profile_disallows_it() {
    let store = Arc::new(MemoryStore::new());
    let latch = Latch::new(store.clone(), SERVICE).with_profile(TargetProfile::new(false, false));
    assert!(latch.set_string("value", "key"));

    assert!(!latch.reset_all());
    assert!(matches!(latch.try_reset_all(), Err(LatchError::ResetUnavailable)));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn handles_with_same_service_share_records() {
    let (store, first) = fresh();
    let second = latch_with(&store);

    assert!(first.set_string("shared", "key"));
    assert_eq!(second.get_string("key").as_deref(), Some("shared"));
  }

  #[test]
  fn services_are_isolated() {
    let (store, latch) = fresh();
    let other = Latch::new(store.clone(), "other").with_profile(latch.profile());

    assert!(latch.set_string("mine", "key"));
    assert_eq!(other.get("key"), None);
  }

  #[test]
  fn empty_service_is_left_out_of_the_query() {
    let store = Arc::new(MemoryStore::new());
    let unscoped = Latch::new(store.clone(), "").with_profile(TargetProfile::new(false, true));
    assert!(unscoped.set_string("value", "key"));

    let records = store.snapshot();
    assert_eq!(records[0].service, None);

    // An unscoped lookup matches records from any service.
    let scoped = latch_with(&store);
    assert!(scoped.set_string("scoped", "other-key"));
    assert_eq!(unscoped.get_string("other-key").as_deref(), Some("scoped"));
  }

  #[test]
  fn access_group_is_omitted_when_profile_disables_it() {
    let store = Arc::new(MemoryStore::rejecting_access_groups());
    let latch = Latch::new(store.clone(), SERVICE)
      .with_access_group("team.shared")
      .with_profile(TargetProfile::new(false, true));

    assert!(latch.set_string("value", "key"));
    assert_eq!(store.snapshot()[0].access_group, None);
  }

  #[test]
  fn access_group_is_included_when_profile_enables_it() {
    let store = Arc::new(MemoryStore::new());
    let grouped = Latch::new(store.clone(), SERVICE)
      .with_access_group("team.shared")
      .with_profile(TargetProfile::new(true, true));

    assert!(grouped.set_string("value", "key"));
    assert_eq!(store.snapshot()[0].access_group.as_deref(), Some("team.shared"));

    let ungrouped = latch_with(&store);
    assert_eq!(ungrouped.get_string("key").as_deref(), Some("value"));
  }

  #[test]
  fn group_rejecting_store_fails_grouped_writes() {
    let store = Arc::new(MemoryStore::rejecting_access_groups());
    let latch = Latch::new(store, SERVICE)
      .with_access_group("team.shared")
      .with_profile(TargetProfile::new(true, true));

    assert!(!latch.set_string("value", "key"));
    let err = latch.try_set_string("value", "key").unwrap_err();
    assert_eq!(err.status(), Some(status::NO_ACCESS_FOR_ITEM));
  }

  #[test]
  fn empty_access_group_is_ignored() {
    let store = Arc::new(MemoryStore::rejecting_access_groups());
    let latch = Latch::new(store, SERVICE)
      .with_access_group("")
      .with_profile(TargetProfile::new(true, true));

    assert!(latch.set_string("value", "key"));
  }

  #[test]
  fn read_failures_collapse_to_none() {
    let mut store = MockSecureStore::new();
    store
      .expect_find()
      .returning(|_| Err(StoreError::status(status::NO_ACCESS_FOR_ITEM)));

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert_eq!(latch.get("key"), None);

    let err = latch.try_get("key").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert_eq!(err.status(), Some(status::NO_ACCESS_FOR_ITEM));
  }

  #[test]
  fn insert_failure_returns_false() {
    let mut store = MockSecureStore::new();
    store.expect_find().returning(|_| Err(StoreError::NotFound));
    store
      .expect_insert()
      .withf(|item| item.account == "key" && item.value == b"value")
      .returning(|_| Err(StoreError::status(status::DUPLICATE_ITEM)));

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert!(!latch.set_string("value", "key"));
  }

  #[test]
  fn failed_existence_check_falls_through_to_insert() {
    let mut store = MockSecureStore::new();
    store
      .expect_find()
      .returning(|_| Err(StoreError::status(status::NO_ACCESS_FOR_ITEM)));
    store.expect_update().never();
    store
      .expect_insert()
      .withf(|item| item.account == "key" && item.value == b"value")
      .times(1)
      .returning(|_| Ok(()));

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert!(latch.set_string("value", "key"));
  }

  #[test]
  fn failed_existence_check_reports_insert_status() {
    let mut store = MockSecureStore::new();
    store
      .expect_find()
      .returning(|_| Err(StoreError::status(status::NO_ACCESS_FOR_ITEM)));
    store
      .expect_insert()
      .times(1)
      .returning(|_| Err(StoreError::status(status::DUPLICATE_ITEM)));

    let latch = Latch::new(Arc::new(store), SERVICE);
    let err = latch.try_set(b"value", "key").unwrap_err();
    assert_eq!(err.status(), Some(status::DUPLICATE_ITEM));
  }

  #[test]
  fn undecodable_object_reads_as_none() {
    let mut store = MockSecureStore::new();
    store.expect_find().returning(|_| Ok(b"not an archive".to_vec()));

    let latch = Latch::new(Arc::new(store), SERVICE);
    let decoded: Option<BTreeMap<String, String>> = latch.get_object("key");
    assert_eq!(decoded, None);

    let err = latch.try_get_object::<BTreeMap<String, String>>("key").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
  }

  #[test]
  fn remove_with_failed_existence_check_returns_false() {
    let mut store = MockSecureStore::new();
    store
      .expect_find()
      .returning(|_| Err(StoreError::status(status::IO)));
    store.expect_delete().never();

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert!(!latch.remove("key"));
    assert_eq!(latch.try_remove("key").unwrap_err().status(), Some(status::IO));
  }

  #[test]
  fn existing_record_is_updated_not_inserted() {
    let mut store = MockSecureStore::new();
    store.expect_find().times(1).returning(|_| Ok(b"old".to_vec()));
    store.expect_insert().never();
    store
      .expect_update()
      .withf(|query, update| {
        query.account.as_deref() == Some("key")
          && query.service.as_deref() == Some(SERVICE)
          && update.value == b"new"
          && update.accessibility == Accessibility::Always
      })
      .times(1)
      .returning(|_, _| Ok(()));

    let latch = Latch::new(Arc::new(store), SERVICE).with_accessibility(Accessibility::Always);
    assert!(latch.set_string("new", "key"));
  }

  #[test]
  fn remove_of_absent_key_never_deletes() {
    let mut store = MockSecureStore::new();
    store.expect_find().returning(|_| Err(StoreError::NotFound));
    store.expect_delete().never();

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert!(!latch.remove("key"));
  }

  #[test]
  fn delete_failure_returns_false() {
    let mut store = MockSecureStore::new();
    store.expect_find().returning(|_| Ok(b"value".to_vec()));
    store
      .expect_delete()
      .with(always())
      .returning(|_| Err(StoreError::status(status::IO)));

    let latch = Latch::new(Arc::new(store), SERVICE);
    assert!(!latch.remove("key"));
    assert_eq!(latch.try_remove("key").unwrap_err().status(), Some(status::IO));
  }

  #[test]
  fn reset_deletes_by_class_only() {
    let mut store = MockSecureStore::new();
    store
      .expect_delete()
      .withf(|query| *query == Query::class(ItemClass::GenericPassword))
      .times(1)
      .returning(|_| Ok(()));

    let latch = Latch::new(Arc::new(store), SERVICE)
      .with_access_group("team")
      .with_profile(TargetProfile::new(true, true));
    assert!(latch.reset_all());
  }
}
