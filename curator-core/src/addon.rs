// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalUrl;
use crate::manifest::Manifest;

/// A reference to one addon, the unit of work throughout the engine.
///
/// Two `AddonRef`s denote the same addon iff their canonical URLs are equal. The platform id is
/// kept because protection matching consults it, but it must never be used alone for equality.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddonRef {
    /// Normalized form of the manifest URL, used for all identity comparisons.
    pub canonical_url: CanonicalUrl,

    /// Original URL as stored or as returned by the remote platform.
    pub raw_url: String,

    /// Platform-assigned addon id, when known.
    pub id: Option<String>,

    pub display_name: String,

    pub manifest: Manifest,
}

impl AddonRef {
    /// Build a reference from a stored addon record.
    pub fn new(url: &str, display_name: &str, manifest: Manifest) -> Self {
        let id = (!manifest.id.is_empty()).then(|| manifest.id.clone());
        Self {
            canonical_url: CanonicalUrl::parse(url),
            raw_url: url.to_string(),
            id,
            display_name: display_name.to_string(),
            manifest,
        }
    }

    /// Normalize a raw remote collection entry.
    ///
    /// This is the single point where remote input shapes become `AddonRef`; the engine core
    /// never branches on what the platform happened to send.
    pub fn from_remote(transport_url: &str, transport_name: Option<&str>, manifest: Manifest) -> Self {
        let display_name = transport_name
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| manifest.name.clone());
        // Remote entries routinely report `id: "unknown"`; treat that the same as no id.
        let id = (!manifest.id.is_empty() && manifest.id != "unknown").then(|| manifest.id.clone());
        Self {
            canonical_url: CanonicalUrl::parse(transport_url),
            raw_url: transport_url.to_string(),
            id,
            display_name,
            manifest,
        }
    }

    /// `true` when both references point at the same addon.
    pub fn same_addon(&self, other: &AddonRef) -> bool {
        self.canonical_url == other.canonical_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_canonical_url_only() {
        let manifest_a = Manifest::fallback("a", "A", None);
        let mut manifest_b = Manifest::fallback("b", "B", None);
        manifest_b.version = "9.9.9".to_string();

        let left = AddonRef::new("https://Addon.dev/a/manifest.json", "A", manifest_a);
        let right = AddonRef::new("addon.dev/a", "Other name", manifest_b);

        assert!(left.same_addon(&right));
    }

    #[test]
    fn unknown_remote_id_is_dropped() {
        let mut manifest = Manifest::fallback("unknown", "Remote", None);
        manifest.id = "unknown".to_string();

        let addon = AddonRef::from_remote("https://addon.dev/r/manifest.json", None, manifest);
        assert_eq!(addon.id, None);
        assert_eq!(addon.display_name, "Remote");
    }

    #[test]
    fn transport_name_wins_over_manifest_name() {
        let manifest = Manifest::fallback("org.example", "Manifest name", None);
        let addon = AddonRef::from_remote("addon.dev/x", Some("Pinned name"), manifest);
        assert_eq!(addon.display_name, "Pinned name");
    }
}
