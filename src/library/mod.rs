//! Library tree construction
//!
//! This module handles:
//! - The folder/file tree and preview roll-up (node.rs)
//! - Walking the library folder (scanner.rs)
//! - Writing the tree out for the viewer (artifact.rs)

pub mod artifact;
pub mod node;
pub mod scanner;

pub use node::{FileNode, FolderNode, LibraryNode};
pub use scanner::{ScanStats, Scanner};
