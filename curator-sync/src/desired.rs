// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::time::Duration;

use curator_core::{AddonRef, CanonicalUrl, Manifest};
use curator_store::StoredAddon;
use tracing::{debug, warn};

use crate::fetch::{ManifestFetcher, fetch_bounded};

/// Compute the ordered list of addons a user should have.
///
/// Filters the group's ordered addon list by the user's exclusions (matched by canonical URL or
/// platform id), resolves a manifest for every survivor and preserves the group's order
/// throughout. The output is a strict subsequence of the group list: no new members, no
/// duplicates.
///
/// Manifest resolution prefers the stored document, so resource or catalog customization applied
/// earlier survives. Only addons without one are fetched live, each fetch bounded by `timeout`,
/// and a failed or elapsed fetch degrades that one addon to a synthesized fallback manifest
/// instead of dropping it or aborting.
pub async fn resolve_desired<F>(
    group: &[StoredAddon],
    exclusions: &HashSet<String>,
    fetcher: &F,
    timeout: Duration,
) -> Vec<AddonRef>
where
    F: ManifestFetcher,
{
    let excluded_urls: HashSet<CanonicalUrl> = exclusions
        .iter()
        .map(|entry| CanonicalUrl::parse(entry))
        .collect();

    let mut seen: HashSet<CanonicalUrl> = HashSet::new();
    let mut desired = Vec::with_capacity(group.len());

    for stored in group {
        let canonical = stored.canonical_url();

        if !seen.insert(canonical.clone()) {
            continue;
        }

        if excluded_urls.contains(&canonical) || is_excluded_by_id(stored, exclusions) {
            debug!(addon = %canonical, "skipping excluded addon");
            continue;
        }

        let manifest = match &stored.manifest {
            Some(manifest) => manifest.clone(),
            None => match fetch_bounded(fetcher, &stored.url, timeout).await {
                Ok(manifest) => manifest,
                Err(err) => {
                    warn!(addon = %canonical, %err, "manifest fetch failed, using fallback");
                    fallback_manifest(stored, &canonical)
                }
            },
        };

        desired.push(AddonRef::new(&stored.url, &stored.display_name, manifest));
    }

    desired
}

fn is_excluded_by_id(stored: &StoredAddon, exclusions: &HashSet<String>) -> bool {
    stored
        .manifest
        .as_ref()
        .is_some_and(|manifest| !manifest.id.is_empty() && exclusions.contains(&manifest.id))
}

fn fallback_manifest(stored: &StoredAddon, canonical: &CanonicalUrl) -> Manifest {
    let id = stored
        .manifest
        .as_ref()
        .map(|manifest| manifest.id.clone())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| canonical.to_string());
    Manifest::fallback(&id, &stored.display_name, None)
}
