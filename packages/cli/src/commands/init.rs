use super::write_document;
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use chartdoc_document::starter_document_with;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Chart document to create
    #[arg(short, long, default_value = "chart.json")]
    pub document: String,

    /// Trading minutes of sample market data
    #[arg(short, long)]
    pub minutes: Option<usize>,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing chart project...".bright_blue().bold());

    let mut config = Config {
        document: args.document.clone(),
        ..Config::default()
    };
    if let Some(minutes) = args.minutes {
        config.starter.minutes = minutes;
    }

    let document_path = config.document_path(cwd, None);
    if document_path.exists() && !args.force {
        println!("  {} Kept existing {}", "•".dimmed(), args.document);
    } else {
        write_document(&document_path, &starter_document_with(&config.starter))?;
        println!("  {} Created {}", "✓".green(), args.document);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: chartdoc tree");
    println!("  2. Write edits to edits.json and run: chartdoc apply edits.json");
    println!("  3. Run: chartdoc check");

    Ok(())
}
