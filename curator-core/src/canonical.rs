// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalize an addon URL to its canonical comparison form.
///
/// Strips the scheme, lower-cases the remainder, drops a trailing `/manifest.json` and any
/// trailing slashes. Pure, no I/O; empty input yields an empty string rather than an error so
/// callers can treat "no URL" and "unusable URL" uniformly.
pub fn canonicalize(url: &str) -> String {
    let trimmed = url.trim();

    // `get` instead of slicing: index 7/8 may fall inside a multi-byte character and
    // canonicalize must degrade on any input, never panic.
    let without_scheme = ["http://", "https://"]
        .iter()
        .find_map(|scheme| {
            trimmed
                .get(..scheme.len())
                .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
                .map(|_| &trimmed[scheme.len()..])
        })
        .unwrap_or(trimmed);

    let mut canonical = without_scheme.to_lowercase();

    if let Some(stripped) = canonical.strip_suffix("/manifest.json") {
        canonical = stripped.to_string();
    }

    canonical.trim_end_matches('/').to_string()
}

/// Canonical form of an addon's manifest URL.
///
/// This is the sole basis for addon equality everywhere in the engine. Construct it with
/// [`CanonicalUrl::parse`] so both stored and remote URLs pass through the same normalization
/// before any comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Canonicalize a raw URL.
    pub fn parse(url: &str) -> Self {
        Self(canonicalize(url))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the source URL normalized to nothing usable.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CanonicalUrl {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_suffix_and_case() {
        assert_eq!(
            canonicalize("HTTPS://Example.com/Path/manifest.json/"),
            "example.com/path"
        );
        assert_eq!(canonicalize("example.com/path"), "example.com/path");
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        assert_eq!(canonicalize("HtTp://Addon.Dev/a"), "addon.dev/a");
    }

    #[test]
    fn trailing_manifest_json_any_case() {
        assert_eq!(
            canonicalize("https://addon.dev/a/MANIFEST.JSON"),
            "addon.dev/a"
        );
    }

    #[test]
    fn whitespace_and_slashes() {
        assert_eq!(canonicalize("  https://addon.dev/a///  "), "addon.dev/a");
    }

    #[test]
    fn multibyte_characters_near_scheme_length() {
        // The 8th byte of these URLs sits inside a multi-byte character; canonicalization must
        // treat them as schemeless rather than panic on a non-boundary slice.
        assert_eq!(
            canonicalize("abcdefé.example/manifest.json"),
            "abcdefé.example"
        );
        assert_eq!(canonicalize("addonsé.dev/a/"), "addonsé.dev/a");
        assert_eq!(
            canonicalize("https://ünicode.example/manifest.json"),
            "ünicode.example"
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("   "), "");
        assert!(CanonicalUrl::parse(" ").is_empty());
    }

    #[test]
    fn parse_equivalence() {
        assert_eq!(
            CanonicalUrl::parse("HTTPS://Example.com/Path/manifest.json/"),
            CanonicalUrl::parse("example.com/path")
        );
    }
}
