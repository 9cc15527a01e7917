// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Addon manifest document.
///
/// Only the identity fields are typed; everything else an addon publishes (behaviour hints,
/// configuration schemas, logos) is carried opaquely in `extra` and round-trips untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content types the addon serves, for example `movie` or `series`.
    #[serde(default)]
    pub types: Vec<String>,

    /// Resources the addon provides (`catalog`, `stream`, ...). Entries may be plain strings or
    /// structured objects; both shapes are preserved as raw JSON.
    #[serde(default)]
    pub resources: Vec<Value>,

    #[serde(default)]
    pub catalogs: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Synthesize a minimal manifest for an addon whose real manifest could not be resolved.
    ///
    /// Fills every required field with a usable default so downstream consumers never see a null
    /// where the platform expects a value.
    pub fn fallback(id: &str, name: &str, description: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: Some(
                description
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Addon {name}")),
            ),
            types: vec!["other".to_string()],
            resources: Vec::new(),
            catalogs: Vec::new(),
            extra: Map::new(),
        }
    }

    /// `true` when this document carries no identity at all.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.version.is_empty()
    }
}
