// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use curator_core::{CanonicalUrl, Manifest};

use crate::types::{Credential, RemoteAddon, StoredAddon, UserId, UserRecord};

/// Read access to managed accounts, their group addon lists and their per-user settings.
///
/// A user belongs to at most one group at any time; `group_addons` returning `None` means the
/// user has no group, which is a valid state (the desired list is then empty), not an error.
pub trait AccountStore {
    type Error: Error;

    /// Look up one user record.
    fn user(&self, id: &UserId) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>>;

    /// All managed user ids, in a stable order.
    fn user_ids(&self) -> impl Future<Output = Result<Vec<UserId>, Self::Error>>;

    /// The ordered addon list of the user's group, or `None` when the user has no group.
    ///
    /// The order is operator-curated and meaningful; implementations must preserve it.
    fn group_addons(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<Vec<StoredAddon>>, Self::Error>>;

    /// Replace the stored manifest of one addon in the user's group.
    ///
    /// Returns `true` when a matching addon was found and updated, `false` otherwise.
    fn put_manifest(
        &self,
        id: &UserId,
        addon: &CanonicalUrl,
        manifest: Manifest,
    ) -> impl Future<Output = Result<bool, Self::Error>>;
}

/// Supplies the decrypted remote-platform credential for a user.
pub trait CredentialStore {
    type Error: Error;

    /// The user's credential, or `None` when no usable credential is stored.
    fn credential(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<Credential>, Self::Error>>;
}

/// The remote platform's addon collection API.
///
/// `set_collection` has replace semantics: the remote collection becomes exactly `collection`,
/// in the given order, and anything omitted is removed.
pub trait CollectionStore {
    type Error: Error;

    /// Read the user's current remote collection, in remote order.
    fn get_collection(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<RemoteAddon>, Self::Error>>;

    /// Replace the user's remote collection.
    fn set_collection(
        &self,
        credential: &Credential,
        collection: Vec<RemoteAddon>,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}
