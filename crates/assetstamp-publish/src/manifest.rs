//! Mapping from logical asset name to published file name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Asset manifest accumulated while publishing.
///
/// Ordered by logical name so serialized output is stable between builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    assets: BTreeMap<String, String>,
}

impl AssetManifest {
    /// Create a new empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the published file name for a logical name.
    ///
    /// Returns the previous entry if the name was already present.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        published: impl Into<String>,
    ) -> Option<String> {
        self.assets.insert(name.into(), published.into())
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, published: impl Into<String>) -> Self {
        self.add(name, published);
        self
    }

    /// Published file name for a logical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assets.get(name).map(String::as_str)
    }

    /// Whether a logical name has been recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    /// Number of recorded assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether no asset has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterate entries in logical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize the manifest as a pretty JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let object: Map<String, Value> = self
            .assets
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        serde_json::to_string_pretty(&Value::Object(object))
    }
}
