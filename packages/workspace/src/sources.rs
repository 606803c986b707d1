//! Where catalogs come from.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use pitchcraft_editor::Catalog;

use crate::error::{WorkspaceError, WorkspaceResult};

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Fetch the catalog for one template variant.
    async fn load(&self, variant: &str) -> WorkspaceResult<Catalog>;
}

/// Reads `<dir>/<variant>.json`
pub struct FileCatalogSource {
    dir: PathBuf,
}

impl FileCatalogSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, variant: &str) -> PathBuf {
        self.dir.join(format!("{}.json", variant))
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, variant: &str) -> WorkspaceResult<Catalog> {
        let failed = |reason: String| WorkspaceError::CatalogLoad {
            variant: variant.to_string(),
            reason,
        };
        if variant.is_empty() || variant.contains(['/', '\\']) || variant.starts_with('.') {
            return Err(failed("variant is not a plain name".into()));
        }

        let path = self.path_for(variant);
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| failed(format!("{}: {}", path.display(), e)))?;
        let catalog = Catalog::from_json(variant, &source).map_err(|e| failed(e.to_string()))?;

        tracing::debug!(
            variant,
            blocks = catalog.blocks().len(),
            path = %path.display(),
            "Loaded catalog"
        );
        Ok(catalog)
    }
}

/// Catalogs held in memory, keyed by variant
#[derive(Default)]
pub struct StaticCatalogSource {
    catalogs: HashMap<String, Catalog>,
}

impl StaticCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, catalog: Catalog) -> Self {
        self.catalogs.insert(catalog.variant().to_string(), catalog);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn load(&self, variant: &str) -> WorkspaceResult<Catalog> {
        self.catalogs
            .get(variant)
            .cloned()
            .ok_or_else(|| WorkspaceError::CatalogLoad {
                variant: variant.to_string(),
                reason: "no such variant".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        { "title": "Costs", "anchor": "[Costs Placeholder]",
          "options": [ { "label": "Fixed", "previewText": "Fixed fee." } ] }
    ]"#;

    #[tokio::test]
    async fn test_file_source_reads_variant_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("production.json"), CATALOG).unwrap();

        let source = FileCatalogSource::new(dir.path());
        let catalog = source.load("production").await.unwrap();
        assert_eq!(catalog.variant(), "production");
        assert!(catalog.block("Costs").is_some());
    }

    #[tokio::test]
    async fn test_file_source_reports_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let source = FileCatalogSource::new(dir.path());

        assert!(matches!(
            source.load("missing").await,
            Err(WorkspaceError::CatalogLoad { variant, .. }) if variant == "missing"
        ));
        assert!(matches!(
            source.load("broken").await,
            Err(WorkspaceError::CatalogLoad { .. })
        ));
        assert!(matches!(
            source.load("../etc").await,
            Err(WorkspaceError::CatalogLoad { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticCatalogSource::new().with(Catalog::from_json("trial", CATALOG).unwrap());
        assert_eq!(source.load("trial").await.unwrap().variant(), "trial");
        assert!(source.load("production").await.is_err());
    }
}
