use super::read_document;
use crate::config::Config;
use anyhow::Result;
use chartdoc_editor::matrix::{cell_layout, column_label, components_at, dimensions, merge_regions, CellSpan};
use chartdoc_editor::Document;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Chart document to inspect (defaults to the configured document)
    pub file: Option<PathBuf>,

    /// Include cells with nothing placed in them
    #[arg(short, long)]
    pub all: bool,
}

pub fn layout(args: LayoutArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.document_path(cwd, args.file.as_deref());
    let document = read_document(&path)?;

    if document.matrix().is_none() {
        println!("{} {} has no matrix", "⚠️".yellow(), path.display());
        return Ok(());
    }

    let size = config.editor.default_matrix_size;
    let (cols, rows) = dimensions(&document, size);
    println!(
        "{} {} columns × {} rows, {} merged region(s)",
        "Matrix".bold(),
        cols,
        rows,
        merge_regions(&document).len()
    );
    println!();

    for line in describe_cells(&document, size, args.all) {
        println!("  {}", line);
    }

    Ok(())
}

/// One line per visible cell: `B3 2×1  title.0 (Volume)`
fn describe_cells(document: &Document, default_size: usize, all: bool) -> Vec<String> {
    cell_layout(document, default_size)
        .into_iter()
        .filter_map(|cell| {
            let components = components_at(document, cell.col, cell.row);
            if components.is_empty() && !all {
                return None;
            }

            let placed = components
                .iter()
                .map(|component| format!("{} ({})", component.path, component.label))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("{:<5} {:<4} {}", cell_name(&cell), span(&cell), placed))
        })
        .collect()
}

fn cell_name(cell: &CellSpan) -> String {
    format!("{}{}", column_label(cell.col), cell.row + 1)
}

fn span(cell: &CellSpan) -> String {
    if cell.col_span == 1 && cell.row_span == 1 {
        String::new()
    } else {
        format!("{}×{}", cell.col_span, cell.row_span)
    }
}
