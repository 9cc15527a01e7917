// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine configuration.
//!
//! `ReconcileConfig` can be deserialized from an operator's configuration file and passed into
//! `Reconciler::new`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on a single manifest fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// The platform's built-in addons, protected unless a user runs in unsafe mode.
///
/// Deployments list their platform's defaults here; matching happens by addon id, by exact
/// transport URL and by canonical URL, because the platform is inconsistent about which field it
/// populates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlatformAddons {
    #[serde(default)]
    pub ids: Vec<String>,

    #[serde(default)]
    pub urls: Vec<String>,
}

/// Configuration parameters for the reconciliation engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Bound on a single manifest fetch. There is no retry; a fetch that exceeds this degrades
    /// the one addon to a fallback manifest.
    pub fetch_timeout_secs: u64,

    /// Platform-default addons covered by safe-mode protection.
    pub platform_addons: PlatformAddons,
}

impl ReconcileConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            platform_addons: PlatformAddons::default(),
        }
    }
}
