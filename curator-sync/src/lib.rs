// SPDX-License-Identifier: MIT OR Apache-2.0

//! Addon collection reconciliation engine.
//!
//! Computes a user's *desired* addon list from group membership, per-user exclusions and
//! protections, then converges the user's *live remote collection* to match it with minimal
//! disruption:
//!
//! - protected addons are never removed or reordered; they keep their exact index,
//! - per-user exclusions are honoured even when the addon is assigned to the user's group,
//! - a failing manifest source degrades one addon instead of aborting the sync,
//! - repeated runs converge to a fixed point (the second run is a no-op, no write issued),
//! - "normal" mode trusts stored manifests while "advanced" mode refreshes them first.
//!
//! The engine is invoked through [`Reconciler::reconcile`] and never touches persistence,
//! encryption or transport itself; those are collaborator contracts defined in `curator-store`
//! and [`ManifestFetcher`].

pub mod config;
pub mod desired;
pub mod fetch;
pub mod merge;
pub mod protection;
pub mod reconcile;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use config::{PlatformAddons, ReconcileConfig};
pub use desired::resolve_desired;
pub use fetch::{FetchError, ManifestFetcher, fetch_bounded};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use merge::{MergeError, merge};
pub use protection::{ProtectionMode, ProtectionPolicy};
pub use reconcile::{BatchReport, ReconcileError, Reconciler, SyncReport};

use serde::{Deserialize, Serialize};

/// Reconciliation mode selected by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Trust stored manifests; only fetch when an addon has none.
    Normal,

    /// Refresh every stored manifest for the group before resolving desired state, so newly
    /// discovered resources and catalogs take effect.
    Advanced,
}
