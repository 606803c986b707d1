use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const STARTER_CATALOG: &str = r#"{
  "variant": "production",
  "blocks": [
    {
      "title": "Risk Assessment",
      "anchor": "[Risk Assessment Placeholder]",
      "options": [
        { "label": "Low", "previewText": "Having reviewed your circumstances, we consider the risk to be low." },
        { "label": "High", "previewText": "Having reviewed your circumstances, we consider the risk to be high." }
      ]
    }
  ]
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Catalog directory
    #[arg(short, long, default_value = "catalogs")]
    pub catalog_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pitchcraft project...".bright_blue().bold());

    let config = Config {
        catalog_dir: args.catalog_dir.clone(),
        ..Config::default()
    };

    let catalog_dir = config.get_catalog_dir(cwd);
    if !catalog_dir.exists() {
        fs::create_dir_all(&catalog_dir)?;
        println!("  {} Created {}/", "✓".green(), args.catalog_dir);
    }

    let starter = catalog_dir.join(format!("{}.json", config.default_variant));
    if !starter.exists() {
        fs::write(&starter, STARTER_CATALOG)?;
        println!("  {} Created {}", "✓".green(), starter.display());
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✨ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Add template blocks to {}",
        starter.display().to_string().bright_white()
    );
    println!(
        "  2. Run {} to draft a letter",
        "pitchcraft compose --ops ops.json".bright_white()
    );

    Ok(())
}
