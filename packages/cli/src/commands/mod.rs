pub mod apply;
pub mod check;
pub mod init;
pub mod layout;
pub mod tree;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use layout::{layout, LayoutArgs};
pub use tree::{tree, TreeArgs};

use anyhow::{Context, Result};
use chartdoc_document::Document;
use std::fs;
use std::path::Path;

pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Document::from_json(&source).with_context(|| format!("Invalid chart document {}", path.display()))
}

pub(crate) fn write_document(path: &Path, document: &Document) -> Result<()> {
    fs::write(path, document.to_json_pretty()?)
        .with_context(|| format!("Cannot write {}", path.display()))
}
