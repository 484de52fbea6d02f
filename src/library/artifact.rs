//! The `library-data.js` artifact
//!
//! A single `const libraryData = {...};` statement holding the tree as
//! pretty-printed JSON, so the viewer can load it with a plain script tag.

use super::node::LibraryNode;
use crate::error::Result;

/// Name of the constant the viewer reads
pub const CONSTANT_NAME: &str = "libraryData";

/// Written when there is no `Library` folder at all
pub const EMPTY_ARTIFACT: &str = r#"const libraryData = { "name": "Library", "type": "folder", "items": [] };"#;

/// Render the tree as the artifact text
pub fn render(tree: &LibraryNode) -> Result<String> {
    let json = serde_json::to_string_pretty(tree)?;
    Ok(format!("const {} = {};", CONSTANT_NAME, json))
}

/// Pull the tree back out of artifact text
#[cfg(test)]
pub(crate) fn parse(artifact: &str) -> Result<LibraryNode> {
    let json = artifact
        .trim()
        .strip_prefix(&format!("const {} =", CONSTANT_NAME))
        .and_then(|rest| rest.trim().strip_suffix(';'))
        .unwrap_or(artifact);
    Ok(serde_json::from_str(json)?)
}
