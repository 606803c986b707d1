use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pitchcraft_editor::substitution::{checkout_link, normalize_passcode};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct PasscodeArgs {
    /// Raw access code
    pub raw: String,

    /// Seed mixed into derived codes (defaults to the configured seed)
    #[arg(long)]
    pub seed: Option<String>,
}

pub fn passcode(args: PasscodeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let seed = args
        .seed
        .as_deref()
        .unwrap_or(&config.engine.passcode_seed);

    let code = normalize_passcode(&args.raw, seed);
    println!("{}", code.bright_white().bold());
    println!("{}", checkout_link(&config.engine.checkout_base_url, &code));
    Ok(())
}
