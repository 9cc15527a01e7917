// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use curator_core::AddonRef;
use curator_store::{
    AccountStore, CollectionStore, CredentialStore, RemoteAddon, UserId, UserRecord,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::SyncMode;
use crate::config::ReconcileConfig;
use crate::desired::resolve_desired;
use crate::fetch::{ManifestFetcher, fetch_bounded};
use crate::merge::{MergeError, merge};
use crate::protection::{ProtectionMode, ProtectionPolicy};

/// Why a reconciliation failed.
///
/// Per-addon manifest failures never show up here; they degrade the one addon and the run
/// continues. The engine does not retry; retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Unknown user, disabled user or missing credential. Nothing was written.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote platform could not be read or written. Nothing was partially applied: either
    /// the whole final collection was set, or nothing.
    #[error("remote store error: {0}")]
    RemoteStore(String),

    /// The current collection contains two different protected addons with one canonical URL;
    /// the sync is rejected rather than silently picking a winner.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Outcome of one successful reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// The remote collection already matched the final collection; no write was issued.
    pub already_synced: bool,

    /// Number of addons in the final collection.
    pub total: usize,
}

/// Outcome of a batch run over all managed users.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(UserId, Result<SyncReport, ReconcileError>)>,
}

impl BatchReport {
    pub fn synced(&self) -> usize {
        self.outcomes.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.synced()
    }
}

/// The convergence executor.
///
/// Holds the collaborator contracts and serializes runs per user: two concurrent reconciliations
/// of one user would read `current` at different times and race their full-replace writes, so a
/// per-user async mutex guards the whole read-compute-write span. Different users do not share
/// state and may run concurrently.
#[derive(Debug)]
pub struct Reconciler<A, C, R, F> {
    accounts: A,
    credentials: C,
    collections: R,
    fetcher: F,
    config: ReconcileConfig,
    user_locks: StdMutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<A, C, R, F> Reconciler<A, C, R, F>
where
    A: AccountStore,
    C: CredentialStore,
    R: CollectionStore,
    F: ManifestFetcher,
{
    pub fn new(accounts: A, credentials: C, collections: R, fetcher: F, config: ReconcileConfig) -> Self {
        Self {
            accounts,
            credentials,
            collections,
            fetcher,
            config,
            user_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Converge one user's remote collection to their desired state.
    ///
    /// Reads the current collection once, computes the final collection and issues at most one
    /// full-replace write. When current already equals final the call is a no-op and reports
    /// `already_synced` so callers can skip redundant notifications.
    pub async fn reconcile(
        &self,
        user_id: &UserId,
        mode: SyncMode,
    ) -> Result<SyncReport, ReconcileError> {
        let guard = self.user_lock(user_id);
        let _running = guard.lock().await;

        let user = self
            .accounts
            .user(user_id)
            .await
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?
            .ok_or_else(|| ReconcileError::Configuration(format!("unknown user {user_id}")))?;
        if !user.enabled {
            return Err(ReconcileError::Configuration(format!(
                "user {user_id} is disabled"
            )));
        }

        let credential = self
            .credentials
            .credential(user_id)
            .await
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?
            .ok_or_else(|| {
                ReconcileError::Configuration(format!("no credential stored for {user_id}"))
            })?;

        if mode == SyncMode::Advanced {
            self.refresh_manifests(user_id).await?;
        }

        // Re-read after a refresh so the desired list reflects newly discovered resources.
        let group = self
            .accounts
            .group_addons(user_id)
            .await
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?
            .unwrap_or_default();

        let current: Vec<AddonRef> = self
            .collections
            .get_collection(&credential)
            .await
            .map_err(|err| ReconcileError::RemoteStore(err.to_string()))?
            .into_iter()
            .map(RemoteAddon::into_addon_ref)
            .collect();

        let desired = resolve_desired(
            &group,
            &user.exclusions,
            &self.fetcher,
            self.config.fetch_timeout(),
        )
        .await;
        let policy = self.policy(&user);
        let final_collection = merge(&current, &desired, &policy)?;

        if same_sequence(&current, &final_collection) {
            debug!(user = %user_id, total = final_collection.len(), "collection already in sync");
            return Ok(SyncReport {
                already_synced: true,
                total: final_collection.len(),
            });
        }

        let total = final_collection.len();
        self.collections
            .set_collection(
                &credential,
                final_collection.into_iter().map(RemoteAddon::from).collect(),
            )
            .await
            .map_err(|err| ReconcileError::RemoteStore(err.to_string()))?;

        info!(user = %user_id, total, "collection replaced");
        Ok(SyncReport {
            already_synced: false,
            total,
        })
    }

    /// Reconcile every managed user, sequentially.
    ///
    /// Sequential on purpose: the remote API is rate-limited and shared, and one slow or failing
    /// user must not starve or corrupt the others. A per-user failure is recorded and the batch
    /// continues.
    pub async fn sync_all(&self, mode: SyncMode) -> Result<BatchReport, ReconcileError> {
        let user_ids = self
            .accounts
            .user_ids()
            .await
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?;

        let mut report = BatchReport::default();
        for user_id in user_ids {
            let outcome = self.reconcile(&user_id, mode).await;
            if let Err(err) = &outcome {
                warn!(user = %user_id, %err, "reconciliation failed");
            }
            report.outcomes.push((user_id, outcome));
        }
        Ok(report)
    }

    /// Refresh the stored manifest of every addon in the user's group.
    ///
    /// A failed fetch leaves that addon's stored manifest untouched; the sync proceeds with what
    /// is already there.
    async fn refresh_manifests(&self, user_id: &UserId) -> Result<(), ReconcileError> {
        let Some(group) = self
            .accounts
            .group_addons(user_id)
            .await
            .map_err(|err| ReconcileError::Configuration(err.to_string()))?
        else {
            return Ok(());
        };

        for stored in &group {
            match fetch_bounded(&self.fetcher, &stored.url, self.config.fetch_timeout()).await {
                Ok(manifest) => {
                    self.accounts
                        .put_manifest(user_id, &stored.canonical_url(), manifest)
                        .await
                        .map_err(|err| ReconcileError::Configuration(err.to_string()))?;
                }
                Err(err) => {
                    debug!(addon = %stored.url, %err, "manifest refresh failed, keeping stored copy");
                }
            }
        }
        Ok(())
    }

    fn policy(&self, user: &UserRecord) -> ProtectionPolicy {
        let mode = if user.unsafe_mode {
            ProtectionMode::Unsafe
        } else {
            ProtectionMode::Safe
        };
        ProtectionPolicy::new(&self.config.platform_addons, user.protected.clone(), mode)
    }

    fn user_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .expect("error getting lock on user lock map");
        locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Canonical-URL sequence equality: same length, same URLs, same order.
fn same_sequence(current: &[AddonRef], final_collection: &[AddonRef]) -> bool {
    current.len() == final_collection.len()
        && current
            .iter()
            .zip(final_collection)
            .all(|(a, b)| a.canonical_url == b.canonical_url)
}
