pub mod catalog;
pub mod compose;
pub mod init;
pub mod materialize;
pub mod passcode;

pub use catalog::{catalog, CatalogArgs};
pub use compose::{compose, ComposeArgs};
pub use init::{init, InitArgs};
pub use materialize::{materialize, MaterializeArgs};
pub use passcode::{passcode, PasscodeArgs};

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use pitchcraft_editor::{BlockOp, Catalog, ComposeSession, EngineConfig};
use pitchcraft_workspace::{
    CatalogSource, FileCatalogSource, FileDraftStore, LogEditSink, PersistOutcome, StaticCatalogSource, Workspace,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;

/// Where the catalog and draft for a command come from
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Catalog file (defaults to `<catalogDir>/<variant>.json`)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Catalog variant
    #[arg(short, long)]
    pub variant: Option<String>,

    /// JSON script of block operations to apply
    #[arg(short, long)]
    pub ops: Option<PathBuf>,

    /// Resume this saved draft and save it again afterwards
    #[arg(short, long)]
    pub session: Option<String>,
}

/// A session built from command-line arguments, with the workspace that
/// persists it when a session id was given
pub struct CliSession {
    pub session: ComposeSession,
    workspace: Option<(Workspace, tokio::runtime::Runtime)>,
}

impl CliSession {
    pub fn open(args: &SessionArgs, config: &Config, engine: EngineConfig, cwd: &str) -> Result<Self> {
        let variant = args
            .variant
            .clone()
            .unwrap_or_else(|| config.default_variant.clone());
        let runtime = runtime()?;

        let catalog = match &args.catalog {
            Some(path) => read_catalog(path, args.variant.as_deref())?,
            None => {
                let source = FileCatalogSource::new(config.get_catalog_dir(cwd));
                runtime
                    .block_on(source.load(&variant))
                    .context("Failed to load catalog")?
            }
        };

        let mut cli = match &args.session {
            Some(id) => {
                let workspace = Workspace::new(
                    Arc::new(StaticCatalogSource::new().with(catalog.clone())),
                    Arc::new(FileDraftStore::new(config.get_draft_dir(cwd))),
                    Arc::new(LogEditSink),
                    engine,
                );
                let session = runtime.block_on(workspace.open_session(id, catalog.variant()));
                Self {
                    session,
                    workspace: Some((workspace, runtime)),
                }
            }
            None => Self {
                session: ComposeSession::new("scratch", catalog, engine),
                workspace: None,
            },
        };

        if let Some(ops) = &args.ops {
            apply_script(&mut cli.session, ops)?;
        }
        Ok(cli)
    }

    /// Save the draft when the session came from the draft directory
    pub fn save(&mut self) -> Result<()> {
        let Some((workspace, runtime)) = &self.workspace else {
            return Ok(());
        };
        match runtime.block_on(workspace.save_session(&mut self.session)) {
            PersistOutcome::Saved => {
                eprintln!("  {} Saved draft {}", "✓".green(), self.session.id.bright_white());
                Ok(())
            }
            PersistOutcome::SavedTrimmed => {
                eprintln!(
                    "  {} Saved draft {} without history",
                    "⚠️".yellow(),
                    self.session.id.bright_white()
                );
                Ok(())
            }
            PersistOutcome::Failed => Err(anyhow::anyhow!("Failed to save draft {}", self.session.id)),
        }
    }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Read a catalog file. The variant defaults to the file name.
pub fn read_catalog(path: &Path, variant: Option<&str>) -> Result<Catalog> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let variant = variant
        .map(str::to_string)
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "default".to_string());
    Ok(Catalog::from_json(&variant, &source)?)
}

/// Apply each operation in turn. Rejected operations are reported on
/// stderr and skipped; they never stop the script.
pub fn apply_script(session: &mut ComposeSession, path: &Path) -> Result<usize> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read operations {}", path.display()))?;
    let ops: Vec<BlockOp> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid operations in {}", path.display()))?;

    let mut applied = 0;
    for op in ops {
        let name = op.name();
        let block = op.block().to_string();
        match session.apply(op) {
            Ok(result) if result.changed => {
                applied += 1;
                eprintln!("  {} {} {}", "✓".green(), name, block.bright_white());
            }
            Ok(_) => eprintln!("  {} {} {} (no change)", "·".dimmed(), name, block),
            Err(e) => eprintln!("  {} {} {}: {}", "✗".red(), name, block, e),
        }
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        { "title": "Risk Assessment", "anchor": "[Risk Assessment Placeholder]",
          "options": [
            { "label": "Low", "previewText": "Low risk." },
            { "label": "High", "previewText": "High risk." }
          ] }
    ]"#;

    const OPS: &str = r#"[
        { "op": "insertOption", "block": "Risk Assessment", "options": "Low" },
        { "op": "insertOption", "block": "Nowhere", "options": "Low" },
        { "op": "toggleLock", "block": "Risk Assessment" },
        { "op": "insertOption", "block": "Risk Assessment", "options": "High" }
    ]"#;

    fn project() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("catalogs")).unwrap();
        fs::write(dir.path().join("catalogs/production.json"), CATALOG).unwrap();
        fs::write(dir.path().join("ops.json"), OPS).unwrap();
        let cwd = dir.path().display().to_string();
        (dir, cwd)
    }

    fn args(cwd: &str, session: Option<&str>, ops: bool) -> SessionArgs {
        SessionArgs {
            catalog: None,
            variant: None,
            ops: ops.then(|| PathBuf::from(cwd).join("ops.json")),
            session: session.map(str::to_string),
        }
    }

    #[test]
    fn test_script_skips_rejected_and_locked_ops() {
        let (_dir, cwd) = project();
        let config = Config::default();
        let cli = CliSession::open(&args(&cwd, None, true), &config, config.engine.clone(), &cwd).unwrap();

        let index = cli.session.structured_index();
        assert_eq!(index.selected("Risk Assessment"), vec!["Low"]);
        assert!(index.is_locked("Risk Assessment"));
    }

    #[test]
    fn test_session_is_saved_and_resumed() {
        let (dir, cwd) = project();
        let config = Config::default();

        let mut first =
            CliSession::open(&args(&cwd, Some("matter-1"), true), &config, config.engine.clone(), &cwd)
                .unwrap();
        first.save().unwrap();
        assert!(dir.path().join("drafts/matter-1.json").exists());

        let resumed =
            CliSession::open(&args(&cwd, Some("matter-1"), false), &config, config.engine.clone(), &cwd)
                .unwrap();
        assert_eq!(resumed.session.document().markup(), first.session.document().markup());
    }

    #[test]
    fn test_read_catalog_names_variant_after_file() {
        let (dir, _cwd) = project();
        let catalog = read_catalog(&dir.path().join("catalogs/production.json"), None).unwrap();
        assert_eq!(catalog.variant(), "production");

        let renamed = read_catalog(&dir.path().join("catalogs/production.json"), Some("trial")).unwrap();
        assert_eq!(renamed.variant(), "trial");
    }
}
