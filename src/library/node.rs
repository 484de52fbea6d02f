//! The library tree handed to the viewer
//!
//! Serialized with a `type` tag so the viewer can tell folders from files:
//! `{"type": "folder", "name", "items", "previews"}` and
//! `{"type": "file", "name", "path", "preview_image"}`.

use serde::{Deserialize, Serialize};

/// Most previews a folder rolls up from its children
pub const MAX_FOLDER_PREVIEWS: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LibraryNode {
    Folder(FolderNode),
    File(FileNode),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: String,
    /// Children in directory listing order
    pub items: Vec<LibraryNode>,
    /// Up to four preview references, one per contributing child
    #[serde(default)]
    pub previews: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// File name without its extension
    pub name: String,
    /// Path relative to the library's parent, `/`-separated
    pub path: String,
    /// Preview reference, empty when the file has none
    pub preview_image: String,
}

impl LibraryNode {
    pub fn name(&self) -> &str {
        match self {
            LibraryNode::Folder(folder) => &folder.name,
            LibraryNode::File(file) => &file.name,
        }
    }

    /// The single preview this node offers to its parent's roll-up:
    /// a file's own preview, or the first of a folder's previews.
    pub fn representative_preview(&self) -> Option<&str> {
        let preview = match self {
            LibraryNode::File(file) => Some(file.preview_image.as_str()),
            LibraryNode::Folder(folder) => folder.previews.first().map(String::as_str),
        };
        preview.filter(|p| !p.is_empty())
    }
}

impl FolderNode {
    /// A folder with no children yet
    pub fn empty(name: impl Into<String>) -> Self {
        FolderNode {
            name: name.into(),
            items: Vec::new(),
            previews: Vec::new(),
        }
    }

    /// Recompute `previews` from the direct children, in child order.
    /// Only one level of delegation: a subfolder contributes its first
    /// preview, never a deeper search.
    pub fn roll_up_previews(&mut self) {
        self.previews = self
            .items
            .iter()
            .filter_map(LibraryNode::representative_preview)
            .take(MAX_FOLDER_PREVIEWS)
            .map(str::to_string)
            .collect();
    }

    /// Count files and folders below this one (not counting itself)
    pub fn count(&self) -> (usize, usize) {
        self.items.iter().fold((0, 0), |(files, folders), item| match item {
            LibraryNode::File(_) => (files + 1, folders),
            LibraryNode::Folder(sub) => {
                let (f, d) = sub.count();
                (files + f, folders + d + 1)
            }
        })
    }
}
