//! Shared types used across the build pipeline.
//!
//! [`Data`] is the payload a `siteware.json` entry hands to its template;
//! [`DirEntryInfo`] is what the `readdir` template function returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured payload passed from a `siteware.json` entry into the template
/// context as `data`.
///
/// Deserialized untagged, so any JSON value maps onto exactly one variant:
///
/// ```text
/// null            → Data::Null
/// true            → Data::Bool(true)
/// 3.5             → Data::Number(3.5)
/// "hello"         → Data::String("hello")
/// [1, 2]          → Data::Sequence([..])
/// {"title": "x"}  → Data::Mapping({..})
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Data>),
    Mapping(BTreeMap<String, Data>),
}

impl Data {
    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Look up a key when this payload is a mapping.
    pub fn get(&self, key: &str) -> Option<&Data> {
        match self {
            Data::Mapping(map) => map.get(key),
            _ => None,
        }
    }
}

/// One entry of a directory listing, as exposed to templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntryInfo {
    pub name: String,
    /// Size in bytes (as reported by the filesystem for directories).
    pub size: u64,
    /// Permission bits, e.g. `0o644`.
    pub mode: u32,
    /// Modification time in whole seconds since the Unix epoch.
    pub mod_time: i64,
    pub is_dir: bool,
}
