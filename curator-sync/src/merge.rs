// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};

use curator_core::{AddonRef, CanonicalUrl};
use thiserror::Error;

use crate::protection::ProtectionPolicy;

#[derive(Error, Debug)]
pub enum MergeError {
    /// Two different protected entries of the current collection resolve to the same canonical
    /// URL. Only one could keep its position, so the sync is rejected instead of silently
    /// picking a winner.
    #[error("two protected addons resolve to the same canonical url: {0}")]
    ProtectedCollision(CanonicalUrl),
}

/// Merge the current remote collection with the desired group list.
///
/// A plain replace would reorder or delete addons a human explicitly pinned; an append-only
/// update would never remove addons the group dropped. This merge does both jobs: every
/// protected entry of `current` keeps its exact original index, every other slot is filled with
/// the non-protected desired addons in desired order, and whatever `desired` no longer contains
/// is dropped.
///
/// Guarantees, for all inputs:
///
/// - a protected addon at index `i` of `current` is at index `i` of the output whenever the
///   output reaches that far; when `desired` supplies too few fillers the trailing gaps
///   collapse and protected entries keep only their relative order,
/// - a non-protected current addon absent from `desired` does not survive,
/// - each non-protected desired addon appears exactly once, in desired relative order,
/// - the output has no duplicate canonical URLs.
pub fn merge(
    current: &[AddonRef],
    desired: &[AddonRef],
    policy: &ProtectionPolicy,
) -> Result<Vec<AddonRef>, MergeError> {
    let locked = locked_index(current, policy)?;

    // Pin every locked entry at its original index.
    let mut base: Vec<Option<AddonRef>> = vec![None; current.len()];
    for (canonical, index) in &locked {
        base[*index] = Some(current[*index].clone());
        debug_assert_eq!(&current[*index].canonical_url, canonical);
    }

    // Non-protected desired addons, in desired order, minus anything already locked.
    let mut fillers = Vec::new();
    let mut seen: HashSet<CanonicalUrl> = HashSet::new();
    for addon in desired {
        if policy.is_protected(addon)
            || locked.contains_key(&addon.canonical_url)
            || !seen.insert(addon.canonical_url.clone())
        {
            continue;
        }
        fillers.push(addon.clone());
    }

    // Fill unlocked slots left to right, then append what is left over.
    let mut fillers = fillers.into_iter();
    for slot in base.iter_mut() {
        if slot.is_none() {
            match fillers.next() {
                Some(addon) => *slot = Some(addon),
                None => break,
            }
        }
    }
    let mut merged: Vec<AddonRef> = base.into_iter().flatten().collect();
    merged.extend(fillers);

    let deduped = dedup_by_canonical(merged);

    // Dedup can only displace a locked entry under adversarial duplicate input, but the
    // position invariant must hold even then; verify and rebuild if required.
    if locked
        .iter()
        .all(|(canonical, index)| position_holds(&deduped, canonical, *index))
    {
        Ok(deduped)
    } else {
        Ok(enforce_locked_positions(current, deduped, &locked))
    }
}

/// Index of every protected entry of `current` by canonical URL.
///
/// A canonical URL appearing twice among protected entries is tolerated when both occurrences
/// are the same addon (identical raw URL): the first occurrence keeps its index and the
/// duplicate is dropped later by dedup. Two *different* protected addons sharing a canonical URL
/// are a hard error.
fn locked_index(
    current: &[AddonRef],
    policy: &ProtectionPolicy,
) -> Result<HashMap<CanonicalUrl, usize>, MergeError> {
    let mut locked: HashMap<CanonicalUrl, usize> = HashMap::new();
    for (index, addon) in current.iter().enumerate() {
        if !policy.is_protected(addon) {
            continue;
        }
        if let Some(first) = locked.get(&addon.canonical_url) {
            if current[*first].raw_url != addon.raw_url {
                return Err(MergeError::ProtectedCollision(addon.canonical_url.clone()));
            }
            continue;
        }
        locked.insert(addon.canonical_url.clone(), index);
    }
    Ok(locked)
}

fn dedup_by_canonical(addons: Vec<AddonRef>) -> Vec<AddonRef> {
    let mut seen: HashSet<CanonicalUrl> = HashSet::new();
    addons
        .into_iter()
        .filter(|addon| seen.insert(addon.canonical_url.clone()))
        .collect()
}

fn position_holds(result: &[AddonRef], canonical: &CanonicalUrl, index: usize) -> bool {
    result
        .get(index)
        .is_some_and(|addon| &addon.canonical_url == canonical)
}

/// Rebuild the result with every locked entry force-placed at its original index.
///
/// Remaining slots are re-filled with the non-locked entries of `result` in their relative
/// order; leftovers are appended.
fn enforce_locked_positions(
    current: &[AddonRef],
    result: Vec<AddonRef>,
    locked: &HashMap<CanonicalUrl, usize>,
) -> Vec<AddonRef> {
    let size = current.len().max(result.len());
    let mut base: Vec<Option<AddonRef>> = vec![None; size];
    for (_, index) in locked {
        base[*index] = Some(current[*index].clone());
    }

    let mut rest = result
        .into_iter()
        .filter(|addon| !locked.contains_key(&addon.canonical_url));
    for slot in base.iter_mut() {
        if slot.is_none() {
            match rest.next() {
                Some(addon) => *slot = Some(addon),
                None => break,
            }
        }
    }

    let mut rebuilt: Vec<AddonRef> = base.into_iter().flatten().collect();
    rebuilt.extend(rest);
    rebuilt
}
