use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use pitchcraft_editor::Catalog;
use pitchcraft_workspace::CatalogWatcher;
use std::path::{Path, PathBuf};

use super::read_catalog;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog file to check
    pub file: PathBuf,

    /// Check again whenever the file changes
    #[arg(short, long)]
    pub watch: bool,
}

pub fn catalog(args: CatalogArgs, _cwd: &str) -> Result<()> {
    let catalog = read_catalog(&args.file, None)?;
    print_summary(&args.file, &catalog);

    if !args.watch {
        return Ok(());
    }

    let dir = args
        .file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let variant = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .context("Catalog path has no file name")?;
    let watcher = CatalogWatcher::new(dir)?;

    println!();
    println!("👀 Watching {} for changes...", args.file.display());
    while let Some(changed) = watcher.next_change() {
        if changed != variant {
            continue;
        }
        println!();
        match read_catalog(&args.file, None) {
            Ok(catalog) => print_summary(&args.file, &catalog),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }
    Ok(())
}

fn print_summary(path: &Path, catalog: &Catalog) {
    println!(
        "{} {} ({} variant, {} blocks)",
        "✓".green(),
        path.display(),
        catalog.variant().bright_white(),
        catalog.blocks().len()
    );
    for block in catalog.blocks() {
        let kind = if block.is_multi_select { "multi" } else { "single" };
        println!(
            "   {} {} [{}] {} options",
            block.title.bright_white(),
            block.anchor.dimmed(),
            kind,
            block.options.len()
        );
    }
}
