use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use scenediff_diff::{DiffConfig, DiffEngine, NameResolver};

use crate::comparison::Comparison;
use crate::error::{SdkError, SdkResult};
use crate::snapshot::Snapshot;

/// High-level entry point: parse two versions, build their hierarchies and
/// diff them.
///
/// ```
/// use scenediff_sdk::SceneDiff;
///
/// let old = "--- !u!1 &1\nGameObject:\n  m_Name: Player\n";
/// let new = "--- !u!1 &1\nGameObject:\n  m_Name: Hero\n";
/// let comparison = SceneDiff::new().compare(old, new);
/// assert_eq!(comparison.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SceneDiff {
    config: DiffConfig,
    resolver: Option<Arc<dyn NameResolver>>,
}

impl SceneDiff {
    /// A pipeline with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DiffConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// A pipeline configured from a TOML file.
    pub fn from_config_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        Ok(Self::new().with_config(DiffConfig::from_file(path)?))
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two document texts.
    ///
    /// Never fails: malformed records degrade and are listed in each
    /// snapshot's diagnostics and issues.
    pub fn compare(&self, old_text: &str, new_text: &str) -> Comparison {
        let old = Snapshot::parse(old_text);
        let new = Snapshot::parse(new_text);
        let differences = self
            .engine()
            .diff(&old.records, &new.records, &old.graph, &new.graph);

        debug!(
            old_records = old.records.len(),
            new_records = new.records.len(),
            differences = differences.len(),
            "compared versions"
        );
        Comparison {
            old,
            new,
            differences,
        }
    }

    /// Compare two documents on disk.
    pub fn compare_files(
        &self,
        old_path: impl AsRef<Path>,
        new_path: impl AsRef<Path>,
    ) -> SdkResult<Comparison> {
        let old_text = read_text(old_path.as_ref())?;
        let new_text = read_text(new_path.as_ref())?;
        Ok(self.compare(&old_text, &new_text))
    }

    fn engine(&self) -> DiffEngine {
        let engine = DiffEngine::new(self.config.clone());
        match &self.resolver {
            Some(resolver) => engine.with_resolver(Arc::clone(resolver)),
            None => engine,
        }
    }
}

impl std::fmt::Debug for SceneDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneDiff")
            .field("config", &self.config)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

fn read_text(path: &Path) -> SdkResult<String> {
    std::fs::read_to_string(path).map_err(|source| SdkError::Read {
        path: path.display().to_string(),
        source,
    })
}
