//! Human-readable names for script and asset references.
//!
//! The engine only uses a [`NameResolver`] to decorate its output: the
//! component type of a script-backed record, and asset guids embedded in
//! changed values. Without one, raw identifiers are shown.

use std::collections::HashMap;
use std::sync::RwLock;

/// Resolves opaque script and asset identifiers to display names.
pub trait NameResolver: Send + Sync {
    /// Type name of the script with this identity (a guid, or a `fileID`
    /// for built-in scripts).
    fn script_name(&self, script: &str) -> Option<String>;

    /// Label of the asset with this guid.
    fn asset_label(&self, guid: &str) -> Option<String>;
}

/// A [`NameResolver`] backed by in-memory maps.
///
/// Lookups on a poisoned lock resolve nothing rather than failing the diff.
#[derive(Debug, Default)]
pub struct InMemoryNameResolver {
    scripts: RwLock<HashMap<String, String>>,
    assets: RwLock<HashMap<String, String>>,
}

impl InMemoryNameResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the type name of a script.
    pub fn insert_script(&self, script: impl Into<String>, name: impl Into<String>) {
        if let Ok(mut scripts) = self.scripts.write() {
            scripts.insert(script.into(), name.into());
        }
    }

    /// Register the label of an asset.
    pub fn insert_asset(&self, guid: impl Into<String>, label: impl Into<String>) {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(guid.into(), label.into());
        }
    }

    /// Builder-style [`insert_script`](Self::insert_script).
    pub fn with_script(self, script: impl Into<String>, name: impl Into<String>) -> Self {
        self.insert_script(script, name);
        self
    }

    /// Builder-style [`insert_asset`](Self::insert_asset).
    pub fn with_asset(self, guid: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert_asset(guid, label);
        self
    }
}

impl NameResolver for InMemoryNameResolver {
    fn script_name(&self, script: &str) -> Option<String> {
        self.scripts.read().ok()?.get(script).cloned()
    }

    fn asset_label(&self, guid: &str) -> Option<String> {
        self.assets.read().ok()?.get(guid).cloned()
    }
}
