use super::{read_document, write_document};
use crate::config::Config;
use anyhow::{Context, Result};
use chartdoc_editor::{CommandOutcome, EditSession, Mutation};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// JSON file holding one mutation or an array of mutations
    pub mutations: PathBuf,

    /// Chart document to edit (defaults to the configured document)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write the result here instead of overwriting the document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Apply all mutations as one step; any rejection discards the batch
    #[arg(long)]
    pub atomic: bool,

    /// Undo this many steps after applying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Print the resulting document instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.document_path(cwd, args.file.as_deref());
    let mutations = read_mutations(&PathBuf::from(cwd).join(&args.mutations))?;

    println!(
        "✏️  {} {} mutation(s) to {}",
        "Applying".green().bold(),
        mutations.len(),
        path.display()
    );

    let mut session = EditSession::new(read_document(&path)?, config.editor.clone());
    let mut rejected = 0;

    if args.atomic {
        let outcome = session.dispatch_all("apply", mutations);
        rejected += report("batch", &outcome);
    } else {
        for (i, mutation) in mutations.into_iter().enumerate() {
            let name = format!("{:>3} {}", i + 1, mutation.name());
            let outcome = session.dispatch(mutation);
            rejected += report(&name, &outcome);
        }
    }

    for _ in 0..args.undo {
        let label = session.history().undo_label().map(str::to_string);
        if !session.undo().is_applied() {
            break;
        }
        println!("  {} undo {}", "↶".cyan(), label.unwrap_or_default());
    }

    println!();
    println!("   Version: {}", session.version());
    println!("   Undo levels: {}", session.history().undo_levels());

    if args.dry_run {
        println!();
        println!("{}", session.document().to_json_pretty()?);
    } else {
        let output = match &args.output {
            Some(output) => PathBuf::from(cwd).join(output),
            None => path,
        };
        write_document(&output, session.document())?;
        println!("   {} Wrote {}", "✓".green(), output.display());
    }

    if rejected > 0 {
        return Err(anyhow::anyhow!("{} mutation(s) rejected", rejected));
    }

    Ok(())
}

/// Accepts a single mutation object or an array of them
fn read_mutations(path: &Path) -> Result<Vec<Mutation>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let value: Value = serde_json::from_str(&source)?;

    let mutations = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(mutations)
}

fn report(name: &str, outcome: &CommandOutcome) -> usize {
    match outcome {
        CommandOutcome::Applied { version } => {
            println!("  {} {} {}", "✓".green(), name, format!("(v{})", version).dimmed());
            0
        }
        CommandOutcome::Unchanged => {
            println!("  {} {} {}", "•".dimmed(), name, "(no change)".dimmed());
            0
        }
        CommandOutcome::Rejected(error) => {
            println!("  {} {}: {}", "✗".red(), name, error);
            1
        }
    }
}
