// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use curator_core::{Manifest, canonicalize};
use curator_store::RemoteAddon;

use crate::fetch::{FetchError, ManifestFetcher};

/// Canned manifest fetcher.
///
/// Serves manifests from a fixed map keyed by canonical URL and fails with a timeout for
/// anything unknown, standing in for an unreachable addon.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    manifests: HashMap<String, Manifest>,
}

impl StaticFetcher {
    pub fn with(mut self, url: &str, manifest: Manifest) -> Self {
        self.manifests.insert(canonicalize(url), manifest);
        self
    }
}

impl ManifestFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Manifest, FetchError> {
        self.manifests
            .get(&canonicalize(url))
            .cloned()
            .ok_or(FetchError::Timeout)
    }
}

/// A remote collection entry as the platform would return it, id reported as `"unknown"`.
pub fn remote_entry(url: &str, name: &str) -> RemoteAddon {
    let mut manifest = Manifest::fallback("unknown", name, None);
    manifest.id = "unknown".to_string();
    RemoteAddon {
        transport_url: url.to_string(),
        transport_name: Some(name.to_string()),
        manifest,
    }
}
