mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, init, layout, tree, ApplyArgs, CheckArgs, InitArgs, LayoutArgs, TreeArgs,
};
use tracing_subscriber::EnvFilter;

/// Chartdoc CLI - structural editing for chart documents
#[derive(Parser, Debug)]
#[command(name = "chartdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a chart project with a starter document
    Init(InitArgs),

    /// Print the display tree of a document
    Tree(TreeArgs),

    /// Apply mutations from a JSON file
    Apply(ApplyArgs),

    /// Report dangling references and layout problems
    Check(CheckArgs),

    /// List matrix cells and what is placed in them
    Layout(LayoutArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Tree(args) => tree(args, &cwd),
                Command::Apply(args) => apply(args, &cwd),
                Command::Check(args) => check(args, &cwd),
                Command::Layout(args) => layout(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
