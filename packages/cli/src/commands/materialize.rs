use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use pitchcraft_editor::{unresolved_tokens, Context, OutputFormat};
use std::fs;
use std::path::{Path, PathBuf};

use super::{CliSession, SessionArgs};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct MaterializeArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// JSON file with the values to fill in
    #[arg(short = 'x', long)]
    pub context: Option<PathBuf>,

    /// Leave unresolved placeholders and anchors in the output
    #[arg(long)]
    pub keep_unresolved: bool,

    /// Emit HTML paragraphs
    #[arg(long)]
    pub html: bool,
}

pub fn materialize(args: MaterializeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut engine = config.engine.clone();
    if args.html {
        engine.output_format = OutputFormat::Html;
    }

    let context = match &args.context {
        Some(path) => read_context(path)?,
        None => Context::default(),
    };

    let mut cli = CliSession::open(&args.session, &config, engine, cwd)?;
    let letter = cli.session.materialize(&context, !args.keep_unresolved)?;
    println!("{}", letter);
    warn_unresolved(&letter);

    cli.save()
}

/// Report placeholders that made it into the letter unfilled
fn warn_unresolved(letter: &str) -> Vec<String> {
    let left = unresolved_tokens(letter);
    if !left.is_empty() {
        eprintln!(
            "  {} {} placeholder(s) left unfilled: {}",
            "⚠️".yellow(),
            left.len(),
            left.join(", ").bright_white()
        );
    }
    left
}

fn read_context(path: &Path) -> Result<Context> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid context in {}", path.display()))
}
