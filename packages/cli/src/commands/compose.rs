use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{CliSession, SessionArgs};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ComposeArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Print the draft markup instead of its plain text
    #[arg(short, long)]
    pub markup: bool,

    /// Print the structured index as JSON after the draft
    #[arg(short, long)]
    pub index: bool,
}

pub fn compose(args: ComposeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut cli = CliSession::open(&args.session, &config, config.engine.clone(), cwd)?;

    let session = &cli.session;
    eprintln!(
        "{} {} (version {})",
        "📝 Draft".bright_blue().bold(),
        session.catalog().variant().bright_white(),
        session.document().version
    );

    if args.markup {
        println!("{}", session.document().markup());
    } else {
        println!("{}", session.document().plain_text());
    }

    if args.index {
        println!("{}", serde_json::to_string_pretty(session.structured_index())?);
    }

    let edits = session.edit_state();
    for (block, snippets) in &edits.edited_snippets {
        let labels: Vec<&str> = snippets
            .iter()
            .filter(|(_, edited)| **edited)
            .map(|(label, _)| label.as_str())
            .collect();
        if !labels.is_empty() {
            eprintln!("  {} {} edited: {}", "✎".yellow(), block, labels.join(", "));
        }
    }

    cli.save()
}
