// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

use curator_core::{AddonRef, CanonicalUrl};

use crate::config::PlatformAddons;

/// Whether platform-default addons count as protected.
///
/// User-protected addons are unaffected by this; they are protected in both modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtectionMode {
    Safe,
    /// Platform defaults lose their protection, letting an operator remove built-in addons.
    Unsafe,
}

/// Classifies addons as protected for one reconciliation run.
///
/// Built fresh per run from the deployment's platform defaults and the user's explicit
/// protection set; never stored.
#[derive(Clone, Debug)]
pub struct ProtectionPolicy {
    default_ids: HashSet<String>,
    default_urls: HashSet<String>,
    default_canonical: HashSet<CanonicalUrl>,
    user_protected: HashSet<CanonicalUrl>,
    mode: ProtectionMode,
}

impl ProtectionPolicy {
    pub fn new(
        defaults: &PlatformAddons,
        user_protected: HashSet<CanonicalUrl>,
        mode: ProtectionMode,
    ) -> Self {
        Self {
            default_ids: defaults.ids.iter().cloned().collect(),
            default_urls: defaults.urls.iter().cloned().collect(),
            default_canonical: defaults
                .urls
                .iter()
                .map(|url| CanonicalUrl::parse(url))
                .collect(),
            user_protected: user_protected
                .into_iter()
                // Entries may have been stored before normalization existed; re-canonicalize.
                .map(|url| CanonicalUrl::parse(url.as_str()))
                .collect(),
            mode,
        }
    }

    /// `true` when `addon` must keep its position and may not be removed.
    ///
    /// Checks, OR'd: platform id against the default-id set, raw URL exact against the
    /// default-URL set, canonical URL against canonicalized defaults and the user set.
    pub fn is_protected(&self, addon: &AddonRef) -> bool {
        if self.user_protected.contains(&addon.canonical_url) {
            return true;
        }

        if self.mode == ProtectionMode::Unsafe {
            return false;
        }

        if addon
            .id
            .as_ref()
            .is_some_and(|id| self.default_ids.contains(id))
        {
            return true;
        }

        self.default_urls.contains(&addon.raw_url)
            || self.default_canonical.contains(&addon.canonical_url)
    }
}

#[cfg(test)]
mod tests {
    use curator_core::Manifest;

    use super::*;

    fn defaults() -> PlatformAddons {
        PlatformAddons {
            ids: vec!["com.platform.cinema".to_string()],
            urls: vec!["https://builtin.platform.tv/manifest.json".to_string()],
        }
    }

    fn addon(url: &str, id: Option<&str>) -> AddonRef {
        let mut manifest = Manifest::fallback(id.unwrap_or(""), "Addon", None);
        manifest.id = id.unwrap_or("").to_string();
        AddonRef::new(url, "Addon", manifest)
    }

    #[test]
    fn default_id_match() {
        let policy = ProtectionPolicy::new(&defaults(), HashSet::new(), ProtectionMode::Safe);
        assert!(policy.is_protected(&addon("https://elsewhere.tv/m", Some("com.platform.cinema"))));
    }

    #[test]
    fn default_url_matches_raw_and_canonical() {
        let policy = ProtectionPolicy::new(&defaults(), HashSet::new(), ProtectionMode::Safe);

        // Exact raw URL.
        assert!(policy.is_protected(&addon("https://builtin.platform.tv/manifest.json", None)));
        // Same addon through a differently written URL.
        assert!(policy.is_protected(&addon("HTTP://Builtin.Platform.TV/", None)));
        assert!(!policy.is_protected(&addon("https://community.dev/manifest.json", None)));
    }

    #[test]
    fn unsafe_mode_releases_defaults_only() {
        let user: HashSet<_> = [CanonicalUrl::parse("https://pinned.dev/manifest.json")].into();
        let policy = ProtectionPolicy::new(&defaults(), user, ProtectionMode::Unsafe);

        assert!(!policy.is_protected(&addon("https://builtin.platform.tv/manifest.json", None)));
        assert!(!policy.is_protected(&addon("x.tv/m", Some("com.platform.cinema"))));
        // User protection survives unsafe mode.
        assert!(policy.is_protected(&addon("https://pinned.dev/manifest.json", None)));
    }
}
