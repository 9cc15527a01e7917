// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use curator_core::{CanonicalUrl, Manifest};

use crate::traits::{AccountStore, CollectionStore, CredentialStore};
use crate::types::{Credential, RemoteAddon, StoreError, StoredAddon, UserId, UserRecord};

/// In-memory implementation of all store contracts.
///
/// Used by the engine's tests and useful for embedders that manage state themselves. Cheap to
/// clone; clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    user_order: Vec<UserId>,
    membership: HashMap<UserId, String>,
    groups: HashMap<String, Vec<StoredAddon>>,
    credentials: HashMap<UserId, Credential>,
    collections: HashMap<String, Vec<RemoteAddon>>,
    remote_offline: bool,
    remote_write_failing: bool,
    remote_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("error getting read lock on store")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .expect("error getting write lock on store")
    }

    pub fn insert_user(&self, record: UserRecord) {
        let mut inner = self.write();
        if !inner.users.contains_key(&record.id) {
            inner.user_order.push(record.id.clone());
        }
        inner.users.insert(record.id.clone(), record);
    }

    /// Create or replace a group's ordered addon list.
    pub fn insert_group(&self, name: &str, addons: Vec<StoredAddon>) {
        self.write().groups.insert(name.to_string(), addons);
    }

    /// Put a user into a group, replacing any previous membership.
    pub fn assign_group(&self, id: &UserId, group: &str) {
        self.write()
            .membership
            .insert(id.clone(), group.to_string());
    }

    pub fn insert_credential(&self, id: &UserId, credential: Credential) {
        self.write().credentials.insert(id.clone(), credential);
    }

    /// Seed the remote collection behind an auth key, bypassing the write counter.
    pub fn seed_collection(&self, credential: &Credential, collection: Vec<RemoteAddon>) {
        self.write()
            .collections
            .insert(credential.auth_key.clone(), collection);
    }

    /// Snapshot of the remote collection behind an auth key.
    pub fn collection(&self, credential: &Credential) -> Vec<RemoteAddon> {
        self.read()
            .collections
            .get(&credential.auth_key)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `set_collection` calls issued so far.
    pub fn remote_writes(&self) -> usize {
        self.read().remote_writes
    }

    /// Make remote reads and writes fail until switched back, to exercise failure paths.
    pub fn set_remote_offline(&self, offline: bool) {
        self.write().remote_offline = offline;
    }

    /// Make only `set_collection` fail, leaving reads working, to exercise the write half of
    /// the failure path in isolation.
    pub fn set_remote_write_failing(&self, failing: bool) {
        self.write().remote_write_failing = failing;
    }
}

impl AccountStore for MemoryStore {
    type Error = Infallible;

    async fn user(&self, id: &UserId) -> Result<Option<UserRecord>, Self::Error> {
        Ok(self.read().users.get(id).cloned())
    }

    async fn user_ids(&self) -> Result<Vec<UserId>, Self::Error> {
        Ok(self.read().user_order.clone())
    }

    async fn group_addons(&self, id: &UserId) -> Result<Option<Vec<StoredAddon>>, Self::Error> {
        let inner = self.read();
        let addons = inner
            .membership
            .get(id)
            .and_then(|group| inner.groups.get(group))
            .cloned();
        Ok(addons)
    }

    async fn put_manifest(
        &self,
        id: &UserId,
        addon: &CanonicalUrl,
        manifest: Manifest,
    ) -> Result<bool, Self::Error> {
        let mut inner = self.write();
        let Some(group) = inner.membership.get(id).cloned() else {
            return Ok(false);
        };
        let Some(addons) = inner.groups.get_mut(&group) else {
            return Ok(false);
        };
        for stored in addons.iter_mut() {
            if stored.canonical_url() == *addon {
                stored.manifest = Some(manifest);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl CredentialStore for MemoryStore {
    type Error = Infallible;

    async fn credential(&self, id: &UserId) -> Result<Option<Credential>, Self::Error> {
        Ok(self.read().credentials.get(id).cloned())
    }
}

impl CollectionStore for MemoryStore {
    type Error = StoreError;

    async fn get_collection(&self, credential: &Credential) -> Result<Vec<RemoteAddon>, Self::Error> {
        let inner = self.read();
        if inner.remote_offline {
            return Err(StoreError::Remote("remote store offline".to_string()));
        }
        Ok(inner
            .collections
            .get(&credential.auth_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_collection(
        &self,
        credential: &Credential,
        collection: Vec<RemoteAddon>,
    ) -> Result<(), Self::Error> {
        let mut inner = self.write();
        if inner.remote_offline || inner.remote_write_failing {
            return Err(StoreError::Remote("remote store offline".to_string()));
        }
        inner.remote_writes += 1;
        inner
            .collections
            .insert(credential.auth_key.clone(), collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use curator_core::Manifest;

    use super::*;

    fn remote(url: &str) -> RemoteAddon {
        RemoteAddon {
            transport_url: url.to_string(),
            transport_name: None,
            manifest: Manifest::fallback("unknown", url, None),
        }
    }

    #[tokio::test]
    async fn group_membership_and_addons() {
        let store = MemoryStore::new();
        let alice = UserId::from("alice");

        store.insert_user(UserRecord::new(alice.clone()));
        store.insert_group(
            "movies",
            vec![
                StoredAddon::new("https://one.dev/manifest.json", "One"),
                StoredAddon::new("https://two.dev/manifest.json", "Two"),
            ],
        );

        // No membership yet.
        assert!(store.group_addons(&alice).await.unwrap().is_none());

        store.assign_group(&alice, "movies");
        let addons = store.group_addons(&alice).await.unwrap().unwrap();
        assert_eq!(addons.len(), 2);
        assert_eq!(addons[0].display_name, "One");
    }

    #[tokio::test]
    async fn put_manifest_updates_matching_addon() {
        let store = MemoryStore::new();
        let alice = UserId::from("alice");

        store.insert_user(UserRecord::new(alice.clone()));
        store.insert_group("movies", vec![StoredAddon::new("https://one.dev/manifest.json", "One")]);
        store.assign_group(&alice, "movies");

        let updated = store
            .put_manifest(
                &alice,
                &CanonicalUrl::parse("one.dev"),
                Manifest::fallback("org.one", "One", None),
            )
            .await
            .unwrap();
        assert!(updated);

        let addons = store.group_addons(&alice).await.unwrap().unwrap();
        assert_eq!(addons[0].manifest.as_ref().unwrap().id, "org.one");

        // Unknown addon is reported, not an error.
        let missed = store
            .put_manifest(
                &alice,
                &CanonicalUrl::parse("nowhere.dev"),
                Manifest::default(),
            )
            .await
            .unwrap();
        assert!(!missed);
    }

    #[tokio::test]
    async fn collection_roundtrip_and_fault_injection() {
        let store = MemoryStore::new();
        let credential = Credential::new("auth-key");

        store
            .set_collection(&credential, vec![remote("https://one.dev/manifest.json")])
            .await
            .unwrap();
        assert_eq!(store.remote_writes(), 1);

        let collection = store.get_collection(&credential).await.unwrap();
        assert_eq!(collection.len(), 1);

        store.set_remote_offline(true);
        assert!(store.get_collection(&credential).await.is_err());
        assert!(store.set_collection(&credential, vec![]).await.is_err());
        // A failed write does not bump the counter.
        assert_eq!(store.remote_writes(), 1);

        // Write-only fault: reads keep working.
        store.set_remote_offline(false);
        store.set_remote_write_failing(true);
        assert!(store.get_collection(&credential).await.is_ok());
        assert!(store.set_collection(&credential, vec![]).await.is_err());
        assert_eq!(store.remote_writes(), 1);
    }
}
