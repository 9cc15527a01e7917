// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store contracts consumed by the reconciliation engine.
//!
//! The engine is a pure computation over data supplied by collaborators: the account store
//! (groups, exclusions, protections), the credential resolver and the remote collection store.
//! This crate specifies those seams as traits and ships an in-memory implementation behind the
//! default `memory` feature for tests and embedders.

#[cfg(feature = "memory")]
mod memory;
mod traits;
mod types;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use traits::{AccountStore, CollectionStore, CredentialStore};
pub use types::{Credential, RemoteAddon, StoreError, StoredAddon, UserId, UserRecord};
