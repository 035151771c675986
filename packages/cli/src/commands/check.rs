use super::read_document;
use crate::config::Config;
use anyhow::Result;
use chartdoc_editor::{CheckRegistry, Diagnostic, DiagnosticLevel};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Chart document to check (defaults to the configured document)
    pub file: Option<PathBuf>,

    /// Show all diagnostics including info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.document_path(cwd, args.file.as_deref());
    let document = read_document(&path)?;

    let registry = CheckRegistry::with_config(&config.editor);
    let diagnostics = registry.check(&document);
    tracing::debug!(rules = registry.rules().len(), found = diagnostics.len(), "checked document");

    let errors = count(&diagnostics, DiagnosticLevel::Error);
    let warnings = count(&diagnostics, DiagnosticLevel::Warning);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        println!("🔍 {} {}", "Checking".green().bold(), path.display());
        println!();

        for diagnostic in &diagnostics {
            if !args.verbose && diagnostic.level == DiagnosticLevel::Info {
                continue;
            }
            print_diagnostic(diagnostic);
        }

        if !diagnostics.is_empty() {
            println!();
        }
        println!("   Total diagnostics: {}", diagnostics.len());
        if errors > 0 {
            println!("   {} {}", "Errors:".red(), errors);
        }
        if warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), warnings);
        }
        if errors == 0 && warnings == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    // Exit with error code if there are errors
    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn count(diagnostics: &[Diagnostic], level: DiagnosticLevel) -> usize {
    diagnostics.iter().filter(|d| d.level == level).count()
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let level_str = match diagnostic.level {
        DiagnosticLevel::Error => "error".red().bold(),
        DiagnosticLevel::Warning => "warning".yellow().bold(),
        DiagnosticLevel::Info => "info".blue().bold(),
    };

    match &diagnostic.path {
        Some(path) => println!(
            "  {} [{}] {}: {}",
            level_str,
            diagnostic.rule,
            path.bright_white(),
            diagnostic.message
        ),
        None => println!("  {} [{}] {}", level_str, diagnostic.rule, diagnostic.message),
    }

    if let Some(suggestion) = &diagnostic.suggestion {
        println!("    {} {}", "💡".dimmed(), suggestion.dimmed());
    }
}
