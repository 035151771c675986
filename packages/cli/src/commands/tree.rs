use super::read_document;
use crate::config::Config;
use anyhow::Result;
use chartdoc_document::Slot;
use chartdoc_editor::{derive_hierarchy, DisplayNode};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Chart document to show (defaults to the configured document)
    pub file: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.document_path(cwd, args.file.as_deref());
    let document = read_document(&path)?;
    let roots = derive_hierarchy(&document);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&roots)?);
        return Ok(());
    }

    println!("{}", path.display().to_string().bright_white().bold());
    let mut out = String::new();
    for (i, node) in roots.iter().enumerate() {
        render_node(&mut out, node, "", i + 1 == roots.len());
    }
    print!("{}", out);

    Ok(())
}

fn render_node(out: &mut String, node: &DisplayNode, prefix: &str, last: bool) {
    let branch = if last { "└── " } else { "├── " };

    let label = match node.slot() {
        Slot::Matrix | Slot::Grid => node.label.bold().to_string(),
        _ => node.label.clone(),
    };
    let label = if node.visible {
        label
    } else {
        format!("{} {}", label.dimmed(), "(hidden)".dimmed())
    };

    out.push_str(prefix);
    out.push_str(branch);
    out.push_str(&label);
    if let Some(meta) = &node.meta {
        out.push(' ');
        out.push_str(&meta.cyan().to_string());
    }
    out.push_str(&format!("  {}\n", node.id().dimmed()));

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
    for (i, child) in node.children.iter().enumerate() {
        render_node(out, child, &child_prefix, i + 1 == node.children.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartdoc_editor::Document;
    use serde_json::json;

    #[test]
    fn test_render_nests_children() {
        colored::control::set_override(false);

        let document = Document::from_value(json!({
            "grid": [{}],
            "xAxis": [{}],
            "legend": { "show": false }
        }))
        .unwrap();

        let mut out = String::new();
        let roots = derive_hierarchy(&document);
        for (i, node) in roots.iter().enumerate() {
            render_node(&mut out, node, "", i + 1 == roots.len());
        }

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("├── Grid 1"));
        assert!(lines[1].starts_with("│   └── "));
        assert!(lines[1].contains("xAxis.0"));
        assert!(lines[2].contains("(hidden)"));
    }
}
