// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data types for addon collection management.
//!
//! An "addon" is a third-party manifest describing content-provider capabilities, identified
//! primarily by its manifest URL. Everything in the engine compares addons through the
//! [`CanonicalUrl`] derived from that URL; platform-assigned ids are unreliable (the remote side
//! may report `"unknown"` for every entry) and are never used alone for equality.

pub mod addon;
pub mod canonical;
pub mod manifest;

pub use addon::AddonRef;
pub use canonical::{CanonicalUrl, canonicalize};
pub use manifest::Manifest;
