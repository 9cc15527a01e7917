// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::fmt;

use curator_core::{AddonRef, CanonicalUrl, Manifest};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a managed end-user account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Decrypted remote-platform credential for one user.
///
/// Decryption happens upstream; the engine only ever sees the plain auth key and never persists
/// it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    pub auth_key: String,
}

impl Credential {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
        }
    }
}

// Keep auth keys out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").finish_non_exhaustive()
    }
}

/// Per-user account state the engine reads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,

    /// Disabled users are skipped by reconciliation.
    pub enabled: bool,

    /// When set, platform-default addons lose their protection and may be removed.
    pub unsafe_mode: bool,

    /// Addons the user opted out of, by canonical URL or platform id. Sources differ in which
    /// field they populate, so exclusion matching consults both.
    pub exclusions: HashSet<String>,

    /// Canonical URLs the user explicitly pinned. Protected in every mode.
    pub protected: HashSet<CanonicalUrl>,
}

impl UserRecord {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            unsafe_mode: false,
            exclusions: HashSet::new(),
            protected: HashSet::new(),
        }
    }
}

/// An addon record as stored in a group's ordered list.
///
/// The manifest is optional: records created from a bare URL have none until a refresh resolves
/// one. A stored manifest is always preferred over a live fetch so resource or catalog
/// customization applied earlier survives reconciliation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredAddon {
    pub url: String,
    pub display_name: String,
    pub manifest: Option<Manifest>,
}

impl StoredAddon {
    pub fn new(url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            display_name: display_name.into(),
            manifest: None,
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn canonical_url(&self) -> CanonicalUrl {
        CanonicalUrl::parse(&self.url)
    }
}

/// Raw shape of one remote collection entry, exactly as the platform returns it.
///
/// Normalized to [`AddonRef`] immediately at this boundary; nothing past the store layer branches
/// on remote input shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAddon {
    pub transport_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_name: Option<String>,

    pub manifest: Manifest,
}

impl RemoteAddon {
    pub fn into_addon_ref(self) -> AddonRef {
        AddonRef::from_remote(&self.transport_url, self.transport_name.as_deref(), self.manifest)
    }
}

impl From<AddonRef> for RemoteAddon {
    fn from(addon: AddonRef) -> Self {
        Self {
            transport_url: addon.raw_url,
            transport_name: Some(addon.display_name),
            manifest: addon.manifest,
        }
    }
}

/// Failures raised by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The remote collection store could not be read or written.
    #[error("remote collection store error: {0}")]
    Remote(String),

    /// A local account lookup failed at the backend.
    #[error("account store error: {0}")]
    Account(String),
}
