//! Shape of the registry's collection description.
//!
//! Only the fields the resolver needs are typed. Everything else the registry
//! sends is kept in the `extra` maps so that a persisted snapshot carries the
//! full response. Unknown fields keep their received order; typed fields are
//! written ahead of them, so the snapshot's key order can differ from the
//! response's.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response of the collection detail lookup.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CollectionMetadata {
    pub data: CollectionData,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CollectionData {
    pub collection: CollectionDetail,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CollectionDetail {
    /// Every published version, in the order the registry lists them.
    #[serde(default)]
    pub all_versions: Vec<VersionRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single published version of a collection.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct VersionRecord {
    pub version: String,

    /// Path of the artifact, relative to the registry's download host.
    pub download_url: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionRecord {
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_url: download_url.into(),
            extra: Map::new(),
        }
    }
}

impl CollectionMetadata {
    /// Builds metadata holding only the given version records.
    pub fn from_versions(all_versions: Vec<VersionRecord>) -> Self {
        Self {
            data: CollectionData {
                collection: CollectionDetail {
                    all_versions,
                    extra: Map::new(),
                },
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Version records in registry order.
    pub fn versions(&self) -> &[VersionRecord] {
        &self.data.collection.all_versions
    }

    /// Pretty-printed JSON document of the full description.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
